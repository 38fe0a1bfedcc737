use std::process::ExitCode;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;

use feed::config::FeedConfig;
use feed::error::ConfigError;
use feed::sim_rng::SimRng;
use feed::source::{EntitySource, FeedSource, StaticSource};
use feed::FeedPlugin;

mod agent_mode;
mod cli;
mod report;

use cli::RunOptions;

/// Frame pacing for the real-time loop. The feed itself runs on the 10 Hz
/// fixed step; this only bounds how often the runner wakes up.
const FRAME_INTERVAL: Duration = Duration::from_millis(10);

fn main() -> ExitCode {
    let opts = RunOptions::parse();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_INTERVAL)));
    // LogPlugin writes to stderr, so stdout stays free for --json and --agent.
    app.add_plugins(LogPlugin::default());

    if let Err(e) = insert_feed_resources(&mut app, &opts) {
        error!("startup failed: {e}");
        return ExitCode::FAILURE;
    }
    app.add_plugins(FeedPlugin);

    if opts.agent {
        agent_mode::run_agent_mode(app);
        return ExitCode::SUCCESS;
    }

    app.add_plugins(report::ReportPlugin {
        json: opts.json,
        max_ticks: opts.ticks,
    });
    match app.run() {
        AppExit::Success => ExitCode::SUCCESS,
        AppExit::Error(code) => ExitCode::from(code.get()),
    }
}

/// Config, seed list and RNG, inserted before `FeedPlugin` so its
/// `init_resource` calls keep them.
fn insert_feed_resources(app: &mut App, opts: &RunOptions) -> Result<(), ConfigError> {
    let mut config = match &opts.config {
        Some(path) => FeedConfig::load(path)?,
        None => FeedConfig::default(),
    };
    // In agent mode the driving program decides when to start.
    if opts.agent {
        config.autostart = false;
    }
    info!(
        "feed config: load {:?}, interval {:?}, autostart {}",
        config.load_delay(),
        config.update_interval(),
        config.autostart
    );

    let source = match &opts.fleet {
        Some(path) => StaticSource::load(path)?,
        None => StaticSource::default_fleet(),
    };
    info!(
        "fleet source '{}' with {} units",
        source.name(),
        source.seed().len()
    );

    let rng = match opts.seed {
        Some(seed) => SimRng::from_seed_u64(seed),
        None => SimRng::from_entropy(),
    };

    app.insert_resource(config)
        .insert_resource(FeedSource::new(source))
        .insert_resource(rng);
    Ok(())
}
