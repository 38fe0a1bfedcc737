use bevy::prelude::*;

pub mod config;
pub mod error;
pub mod feed_protocol;
pub mod feed_sets;
pub mod live_feed;
pub mod movement;
pub mod sim_rng;
pub mod source;
pub mod tracked_entity;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use feed_sets::FeedSet;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global counter of `FixedUpdate` runs since the app started.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

pub struct FeedPlugin;

impl Plugin for FeedPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (FeedSet::Control, FeedSet::Simulation, FeedSet::Report).chain(),
        );

        app.init_resource::<TickCounter>()
            .insert_resource(Time::<Fixed>::from_duration(config::FIXED_STEP))
            .add_systems(FixedUpdate, tick_counter.in_set(FeedSet::Control));

        app.add_plugins((sim_rng::SimRngPlugin, live_feed::LiveFeedPlugin));
    }
}
