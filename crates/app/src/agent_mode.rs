//! Headless `--agent` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! The app is never `run()`; time only advances through `step`, so a session
//! replays identically for the same `--seed`. See [`feed::feed_protocol`]
//! for the schema.

use std::io::{BufRead, Write};

use bevy::prelude::*;

use feed::feed_protocol::{
    make_response, parse_command, process_command, AgentResponse, ResponsePayload,
    PROTOCOL_VERSION,
};

pub fn run_agent_mode(mut app: App) {
    // Startup systems and resource initialization.
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    if !send(&mut stdout, &make_response(ResponsePayload::Ready)) {
        return;
    }
    info!("agent mode v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_command(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(parse_error) => parse_error,
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);

        if !send(&mut stdout, &response) || is_goodbye {
            break;
        }
    }

    info!("agent mode shutting down");
}

/// Write one response line. Returns false once stdout is gone.
fn send(out: &mut impl Write, response: &AgentResponse) -> bool {
    let line = match serde_json::to_string(response) {
        Ok(line) => line,
        Err(e) => {
            warn!("could not encode response: {e}");
            return true;
        }
    };
    writeln!(out, "{line}").and_then(|()| out.flush()).is_ok()
}
