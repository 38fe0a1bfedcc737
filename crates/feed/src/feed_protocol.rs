//! Agent text protocol for the runner's `--agent` headless mode.
//!
//! External programs (scripts, test harnesses, a dashboard backend) drive the
//! feed over newline-delimited JSON on stdin/stdout. Each line of stdin is one
//! `AgentCommand`; each line of stdout is one `AgentResponse`.
//!
//! `start`, `refetch` and `stop` are queued and take effect on the next fixed
//! tick, exactly like commands from inside the app. `step` runs `FixedUpdate`
//! directly, so an agent session is fully deterministic for a given seed.
//!
//! These types live in the `feed` crate so they can be unit-tested without
//! the binary. The I/O loop lives in `crates/app/src/agent_mode.rs`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::live_feed::{FeedPhase, FeedState, FeedTimers, PendingFeedCommands};
use crate::tracked_entity::TrackedEntity;
use crate::TickCounter;

// ---------------------------------------------------------------------------
// Commands (stdin → feed)
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum AgentCommand {
    /// Begin (or restart) a load.
    #[serde(rename = "start")]
    Start,

    /// Count a retry and restart the load.
    #[serde(rename = "refetch")]
    Refetch,

    /// Cancel all feed timers and discard the fleet.
    #[serde(rename = "stop")]
    Stop,

    /// Advance the feed by `ticks` fixed-update ticks.
    #[serde(rename = "step")]
    Step { ticks: u64 },

    /// Request the current fleet.
    #[serde(rename = "snapshot")]
    Snapshot,

    /// Request loading/error flags and timer state.
    #[serde(rename = "status")]
    Status,

    /// Gracefully shut down the agent session.
    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (feed → stdout)
// ---------------------------------------------------------------------------

/// Every response includes the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    /// The feed is ready to accept commands.
    #[serde(rename = "ready")]
    Ready,

    /// A command was queued.
    #[serde(rename = "ok")]
    Ok,

    /// The feed has advanced; reports the fixed-tick counter.
    #[serde(rename = "step_complete")]
    StepComplete { tick: u64 },

    #[serde(rename = "snapshot")]
    Snapshot {
        generation: u64,
        tick: u64,
        entities: Vec<TrackedEntity>,
    },

    #[serde(rename = "status")]
    Status {
        phase: FeedPhase,
        loading: bool,
        error: Option<String>,
        retry_count: u32,
        generation: u64,
        active_intervals: usize,
    },

    #[serde(rename = "error")]
    Error { message: String },

    /// The session is ending (response to `quit`).
    #[serde(rename = "goodbye")]
    Goodbye,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current protocol version. Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Upper bound on a single `step`, to keep a typo from hanging the session.
pub const MAX_STEP_TICKS: u64 = 10_000;

pub fn make_response(payload: ResponsePayload) -> AgentResponse {
    AgentResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

/// Parse one stdin line. Parse failures become an `error` response.
pub fn parse_command(line: &str) -> Result<AgentCommand, AgentResponse> {
    serde_json::from_str(line).map_err(|e| {
        make_response(ResponsePayload::Error {
            message: format!("Parse error: {e}"),
        })
    })
}

/// Apply one command to an app built with `FeedPlugin`.
pub fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    match cmd {
        AgentCommand::Start => queue(app, PendingFeedCommands::start),
        AgentCommand::Refetch => queue(app, PendingFeedCommands::refetch),
        AgentCommand::Stop => queue(app, PendingFeedCommands::stop),

        AgentCommand::Step { ticks } => {
            for _ in 0..ticks.min(MAX_STEP_TICKS) {
                if app.world_mut().try_run_schedule(FixedUpdate).is_err() {
                    return missing_feed();
                }
            }
            let tick = app
                .world()
                .get_resource::<TickCounter>()
                .map(|t| t.0)
                .unwrap_or(0);
            make_response(ResponsePayload::StepComplete { tick })
        }

        AgentCommand::Snapshot => match app.world().get_resource::<FeedState>() {
            Some(state) => make_response(ResponsePayload::Snapshot {
                generation: state.generation,
                tick: state.ticks_applied,
                entities: state.snapshot().to_vec(),
            }),
            None => missing_feed(),
        },

        AgentCommand::Status => {
            let world = app.world();
            let (Some(state), Some(timers)) = (
                world.get_resource::<FeedState>(),
                world.get_resource::<FeedTimers>(),
            ) else {
                return missing_feed();
            };
            make_response(ResponsePayload::Status {
                phase: state.phase,
                loading: state.is_loading(),
                error: state.last_error.as_ref().map(|e| e.to_string()),
                retry_count: state.retry_count,
                generation: state.generation,
                active_intervals: timers.active_intervals(),
            })
        }

        AgentCommand::Quit => make_response(ResponsePayload::Goodbye),
    }
}

fn queue(app: &mut App, push: fn(&mut PendingFeedCommands)) -> AgentResponse {
    match app.world_mut().get_resource_mut::<PendingFeedCommands>() {
        Some(mut pending) => {
            push(&mut *pending);
            make_response(ResponsePayload::Ok)
        }
        None => missing_feed(),
    }
}

fn missing_feed() -> AgentResponse {
    make_response(ResponsePayload::Error {
        message: "FeedPlugin is not installed".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
