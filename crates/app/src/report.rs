//! Real-time mode reporting: log or print each snapshot, and stop the app
//! after `--ticks`.

use bevy::prelude::*;

use feed::live_feed::{FeedSnapshot, FeedStatusChanged};
use feed::{FeedSet, TickCounter};

#[derive(Resource, Debug, Default)]
pub struct ReportSettings {
    /// One JSON line per snapshot on stdout instead of log lines.
    pub json: bool,
    pub max_ticks: Option<u64>,
}

pub struct ReportPlugin {
    pub json: bool,
    pub max_ticks: Option<u64>,
}

impl Plugin for ReportPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ReportSettings {
            json: self.json,
            max_ticks: self.max_ticks,
        })
        .add_systems(
            FixedUpdate,
            (log_status_changes, report_snapshots, exit_after_ticks)
                .chain()
                .in_set(FeedSet::Report),
        );
    }
}

fn log_status_changes(mut events: EventReader<FeedStatusChanged>) {
    for event in events.read() {
        info!("feed generation {} is now {:?}", event.generation, event.phase);
    }
}

fn report_snapshots(settings: Res<ReportSettings>, mut events: EventReader<FeedSnapshot>) {
    for snapshot in events.read() {
        if settings.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!("could not encode snapshot: {e}"),
            }
            continue;
        }

        info!(
            "snapshot gen {} tick {}: {} units",
            snapshot.generation,
            snapshot.tick,
            snapshot.entities.len()
        );
        for unit in &snapshot.entities {
            info!(
                "  {} {:?} at ({:.5}, {:.5}) eta {:.1}",
                unit.id, unit.status, unit.position.lat, unit.position.lng, unit.eta
            );
        }
    }
}

fn exit_after_ticks(
    settings: Res<ReportSettings>,
    tick: Res<TickCounter>,
    mut exit: EventWriter<AppExit>,
) {
    if settings.max_ticks.is_some_and(|max| tick.0 >= max) {
        exit.send(AppExit::Success);
    }
}
