//! Simulated live ambulance feed.
//!
//! After a `Start` (or `Refetch`) the feed waits out a simulated fetch
//! latency, pulls the fleet from the active `FeedSource`, and then advances
//! every moving unit once per update interval. Each successful load and each
//! movement tick publishes a `FeedSnapshot` event for the rendering side.
//!
//! ```text
//! Idle → Loading → Ready ⇄ tick
//!        Loading → Error → (refetch) → Loading
//! ```
//!
//! The feed never reads wall-clock time. Its timers advance by `FIXED_STEP`
//! once per `FixedUpdate` run, so whatever drives that schedule is the tick
//! source: Bevy's fixed main loop in the runner, `run_schedule` in tests.

use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{FeedConfig, FIXED_STEP};
use crate::error::FetchError;
use crate::feed_sets::FeedSet;
use crate::movement::advance_fleet;
use crate::sim_rng::SimRng;
use crate::source::FeedSource;
use crate::tracked_entity::{validate_fleet, TrackedEntity};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Everything the view needs: the fleet plus loading/error flags and the
/// retry counter. Owned by the feed's `World`; reset on `Stop`.
#[derive(Resource, Debug, Default)]
pub struct FeedState {
    /// `None` until the first successful load.
    pub entities: Option<Vec<TrackedEntity>>,
    pub phase: FeedPhase,
    pub last_error: Option<FetchError>,
    pub retry_count: u32,
    /// Bumped by every start. Snapshots carry it so stale ones can be dropped.
    pub generation: u64,
    /// Movement ticks applied since the current generation loaded.
    pub ticks_applied: u64,
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }

    pub fn is_error(&self) -> bool {
        self.phase == FeedPhase::Error
    }

    /// The latest fleet, or an empty slice before the first load.
    pub fn snapshot(&self) -> &[TrackedEntity] {
        self.entities.as_deref().unwrap_or(&[])
    }

    pub fn entity(&self, id: &str) -> Option<&TrackedEntity> {
        self.snapshot().iter().find(|e| e.id == id)
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// The feed's only two timers: a one-shot load delay and the repeating
/// movement interval. At most one of each exists at any time.
#[derive(Resource, Debug, Default)]
pub struct FeedTimers {
    pub load: Option<Timer>,
    pub interval: Option<Timer>,
}

impl FeedTimers {
    pub fn cancel(&mut self) {
        self.load = None;
        self.interval = None;
    }

    fn arm_load(&mut self, delay: Duration) {
        self.cancel();
        self.load = Some(Timer::new(delay, TimerMode::Once));
    }

    fn arm_interval(&mut self, period: Duration) {
        // A zero period would report unbounded completions per tick.
        let period = period.max(Duration::from_millis(1));
        self.interval = Some(Timer::new(period, TimerMode::Repeating));
    }

    /// Number of armed movement intervals: 0 or 1.
    pub fn active_intervals(&self) -> usize {
        usize::from(self.interval.is_some())
    }

    pub fn is_idle(&self) -> bool {
        self.load.is_none() && self.interval.is_none()
    }
}

// ---------------------------------------------------------------------------
// Commands and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedCommand {
    /// Begin (or restart) a load.
    Start,
    /// Count a retry, then restart.
    Refetch,
    /// Tear down all timers and discard the fleet.
    Stop,
}

/// Commands queued for the next `FixedUpdate` run, applied in order.
#[derive(Resource, Debug, Default)]
pub struct PendingFeedCommands {
    pub commands: Vec<FeedCommand>,
}

impl PendingFeedCommands {
    pub fn push(&mut self, command: FeedCommand) {
        self.commands.push(command);
    }

    pub fn start(&mut self) {
        self.push(FeedCommand::Start);
    }

    pub fn refetch(&mut self) {
        self.push(FeedCommand::Refetch);
    }

    pub fn stop(&mut self) {
        self.push(FeedCommand::Stop);
    }
}

/// Full fleet after a load (`tick == 0`) or after a movement tick.
#[derive(Event, Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub generation: u64,
    pub tick: u64,
    pub entities: Vec<TrackedEntity>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStatusChanged {
    pub generation: u64,
    pub phase: FeedPhase,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn queue_autostart(config: Res<FeedConfig>, mut pending: ResMut<PendingFeedCommands>) {
    if config.autostart {
        pending.start();
    }
}

fn begin_load(
    config: &FeedConfig,
    source_name: &str,
    state: &mut FeedState,
    timers: &mut FeedTimers,
    status: &mut EventWriter<FeedStatusChanged>,
) {
    timers.arm_load(config.load_delay());
    state.generation += 1;
    state.ticks_applied = 0;
    state.last_error = None;
    state.phase = FeedPhase::Loading;
    status.send(FeedStatusChanged {
        generation: state.generation,
        phase: FeedPhase::Loading,
    });
    info!(
        "Feed: loading from '{}' (generation {}, retries {})",
        source_name, state.generation, state.retry_count
    );
}

fn apply_feed_commands(
    config: Res<FeedConfig>,
    source: Res<FeedSource>,
    mut pending: ResMut<PendingFeedCommands>,
    mut state: ResMut<FeedState>,
    mut timers: ResMut<FeedTimers>,
    mut status: EventWriter<FeedStatusChanged>,
) {
    if pending.commands.is_empty() {
        return;
    }
    let commands: Vec<FeedCommand> = pending.commands.drain(..).collect();
    for command in commands {
        match command {
            FeedCommand::Start => {
                begin_load(&config, source.0.name(), &mut state, &mut timers, &mut status);
            }
            FeedCommand::Refetch => {
                state.retry_count += 1;
                begin_load(&config, source.0.name(), &mut state, &mut timers, &mut status);
            }
            FeedCommand::Stop => {
                timers.cancel();
                let generation = state.generation;
                *state = FeedState {
                    generation,
                    ..Default::default()
                };
                status.send(FeedStatusChanged {
                    generation,
                    phase: FeedPhase::Idle,
                });
                info!("Feed: stopped (generation {generation})");
            }
        }
    }
}

fn advance_feed_interval(
    config: Res<FeedConfig>,
    mut timers: ResMut<FeedTimers>,
    mut state: ResMut<FeedState>,
    mut rng: ResMut<SimRng>,
    mut snapshots: EventWriter<FeedSnapshot>,
) {
    let Some(interval) = timers.interval.as_mut() else {
        return;
    };
    interval.tick(FIXED_STEP);
    let due = interval.times_finished_this_tick();
    if due == 0 {
        return;
    }

    let params = config.movement();
    let state = &mut *state;
    let Some(entities) = state.entities.as_mut() else {
        return;
    };
    for _ in 0..due {
        let moved = advance_fleet(entities, &params, &mut rng.0);
        state.ticks_applied += 1;
        debug!(
            "Feed: tick {} moved {}/{} units",
            state.ticks_applied,
            moved,
            entities.len()
        );
        snapshots.send(FeedSnapshot {
            generation: state.generation,
            tick: state.ticks_applied,
            entities: entities.clone(),
        });
    }
}

fn complete_feed_load(
    config: Res<FeedConfig>,
    mut source: ResMut<FeedSource>,
    mut timers: ResMut<FeedTimers>,
    mut state: ResMut<FeedState>,
    mut snapshots: EventWriter<FeedSnapshot>,
    mut status: EventWriter<FeedStatusChanged>,
) {
    let Some(load) = timers.load.as_mut() else {
        return;
    };
    load.tick(FIXED_STEP);
    if !load.finished() {
        return;
    }
    timers.load = None;

    let result = source
        .0
        .fetch()
        .and_then(|fleet| validate_fleet(&fleet).map(|()| fleet));

    match result {
        Ok(fleet) => {
            info!(
                "Feed: loaded {} units from '{}' (generation {})",
                fleet.len(),
                source.0.name(),
                state.generation
            );
            snapshots.send(FeedSnapshot {
                generation: state.generation,
                tick: 0,
                entities: fleet.clone(),
            });
            state.entities = Some(fleet);
            state.ticks_applied = 0;
            state.phase = FeedPhase::Ready;
            status.send(FeedStatusChanged {
                generation: state.generation,
                phase: FeedPhase::Ready,
            });
            timers.arm_interval(config.update_interval());
        }
        Err(err) => {
            warn!(
                "Feed: load from '{}' failed, keeping previous snapshot: {}",
                source.0.name(),
                err
            );
            state.last_error = Some(err);
            state.phase = FeedPhase::Error;
            status.send(FeedStatusChanged {
                generation: state.generation,
                phase: FeedPhase::Error,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct LiveFeedPlugin;

impl Plugin for LiveFeedPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeedConfig>()
            .init_resource::<FeedSource>()
            .init_resource::<FeedState>()
            .init_resource::<FeedTimers>()
            .init_resource::<PendingFeedCommands>()
            .add_event::<FeedSnapshot>()
            .add_event::<FeedStatusChanged>()
            .add_systems(Startup, queue_autostart)
            .add_systems(FixedUpdate, apply_feed_commands.in_set(FeedSet::Control))
            .add_systems(
                FixedUpdate,
                (advance_feed_interval, complete_feed_load)
                    .chain()
                    .in_set(FeedSet::Simulation),
            );
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
