//! # TestFeed — headless test harness for the live feed
//!
//! Wraps `bevy::app::App` + `FeedPlugin` so tests can build a feed with a
//! chosen source, seed and config, drive `FixedUpdate` synchronously, and
//! assert on state and published events.

use bevy::app::App;
use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use crate::config::FeedConfig;
use crate::live_feed::{
    FeedPhase, FeedSnapshot, FeedState, FeedStatusChanged, FeedTimers, PendingFeedCommands,
};
use crate::sim_rng::SimRng;
use crate::source::{EntitySource, FeedSource, StaticSource};
use crate::tracked_entity::TrackedEntity;
use crate::FeedPlugin;

/// Fixed ticks from a queued start until the default 1 s load completes.
pub const LOAD_TICKS: u32 = 10;
/// Fixed ticks per default 2 s movement interval.
pub const INTERVAL_TICKS: u32 = 20;

pub struct TestFeed {
    app: App,
    snapshot_cursor: EventCursor<FeedSnapshot>,
    status_cursor: EventCursor<FeedStatusChanged>,
}

impl Default for TestFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFeed {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default fleet, default config, seed 42. The feed has NOT been started:
    /// autostart is off so each test decides when to start.
    pub fn new() -> Self {
        Self::build(
            FeedSource::default(),
            FeedConfig {
                autostart: false,
                ..Default::default()
            },
            SimRng::default(),
        )
    }

    /// A feed that serves `seed` through a `StaticSource`.
    ///
    /// Panics if the seed list is malformed; use `with_source` to test that.
    pub fn with_fleet(seed: Vec<TrackedEntity>) -> Self {
        let source = StaticSource::new("test-fleet", seed).expect("test fleet should be valid");
        Self::new().with_source(source)
    }

    fn build(source: FeedSource, config: FeedConfig, rng: SimRng) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);

        // Insert before the plugin so its init_resource calls keep these.
        app.insert_resource(source);
        app.insert_resource(config);
        app.insert_resource(rng);
        app.add_plugins(FeedPlugin);

        // Run one update so Startup systems execute.
        app.update();

        Self {
            app,
            snapshot_cursor: EventCursor::default(),
            status_cursor: EventCursor::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Builder methods (consume and return Self)
    // -----------------------------------------------------------------------

    pub fn with_source(mut self, source: impl EntitySource) -> Self {
        self.app.insert_resource(FeedSource::new(source));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.app.insert_resource(SimRng::from_seed_u64(seed));
        self
    }

    pub fn with_config(mut self, config: FeedConfig) -> Self {
        self.app.insert_resource(config);
        self
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn start(&mut self) -> &mut Self {
        self.pending_mut().start();
        self
    }

    pub fn refetch(&mut self) -> &mut Self {
        self.pending_mut().refetch();
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.pending_mut().stop();
        self
    }

    /// Start, then tick until the default load delay has elapsed.
    pub fn start_and_load(&mut self) -> &mut Self {
        self.start();
        self.tick(LOAD_TICKS);
        self
    }

    fn pending_mut(&mut self) -> Mut<'_, PendingFeedCommands> {
        self.app.world_mut().resource_mut::<PendingFeedCommands>()
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, bypassing Bevy's time system.
    pub fn tick(&mut self, n: u32) -> &mut Self {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
        self
    }

    /// Run exactly one movement interval at the default period.
    pub fn tick_interval(&mut self) -> &mut Self {
        self.tick(INTERVAL_TICKS)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The wrapped app, for driving it through `feed_protocol`.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn state(&self) -> &FeedState {
        self.resource::<FeedState>()
    }

    pub fn timers(&self) -> &FeedTimers {
        self.resource::<FeedTimers>()
    }

    pub fn phase(&self) -> FeedPhase {
        self.state().phase
    }

    pub fn snapshot(&self) -> Vec<TrackedEntity> {
        self.state().snapshot().to_vec()
    }

    pub fn entity(&self, id: &str) -> TrackedEntity {
        self.state()
            .entity(id)
            .cloned()
            .unwrap_or_else(|| panic!("no entity with id {id} in snapshot"))
    }

    /// Snapshot events published since the previous call.
    pub fn drain_snapshots(&mut self) -> Vec<FeedSnapshot> {
        let events = self.app.world().resource::<Events<FeedSnapshot>>();
        self.snapshot_cursor.read(events).cloned().collect()
    }

    /// Status transitions published since the previous call.
    pub fn drain_status(&mut self) -> Vec<FeedStatusChanged> {
        let events = self.app.world().resource::<Events<FeedStatusChanged>>();
        self.status_cursor.read(events).copied().collect()
    }

    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    pub fn assert_phase(&self, expected: FeedPhase) {
        let phase = self.phase();
        assert_eq!(phase, expected, "Expected feed phase {expected:?}, got {phase:?}");
    }

    pub fn assert_no_negative_eta(&self) {
        for e in self.state().snapshot() {
            assert!(e.eta >= 0.0, "{} has negative eta {}", e.id, e.eta);
        }
    }

    pub fn assert_single_interval(&self) {
        let n = self.timers().active_intervals();
        assert_eq!(n, 1, "Expected exactly one active interval, found {n}");
    }
}
