//! Integration tests for the live feed using the `TestFeed` harness.
//!
//! These tests spin up a headless Bevy App with `FeedPlugin` and drive
//! `FixedUpdate` directly, checking timers, state and published events
//! together.


use crate::tracked_entity::{GeoPoint, TrackedEntity, UnitStatus};

/// Five units: three moving (one with a destination, two wandering) and two
/// available, one of which still reports a non-zero speed.
pub(crate) fn mixed_fleet() -> Vec<TrackedEntity> {
    vec![
        TrackedEntity::new("RUN-1", GeoPoint::new(34.00, -118.00), UnitStatus::Transporting)
            .with_speed(60.0)
            .with_eta(12.0)
            .with_destination("County General", GeoPoint::new(34.05, -118.10)),
        TrackedEntity::new("RUN-2", GeoPoint::new(40.71, -74.00), UnitStatus::Responding)
            .with_speed(35.0)
            .with_eta(15.0),
        TrackedEntity::new("RUN-3", GeoPoint::new(41.87, -87.62), UnitStatus::Responding)
            .with_speed(45.0)
            .with_eta(0.2),
        TrackedEntity::new("PARK-1", GeoPoint::new(34.07, -118.26), UnitStatus::Available),
        TrackedEntity::new("PARK-2", GeoPoint::new(47.60, -122.33), UnitStatus::Available)
            .with_speed(20.0)
            .with_eta(3.0),
    ]
}

pub(crate) fn same_position(a: &TrackedEntity, b: &TrackedEntity) -> bool {
    a.position.lat.to_bits() == b.position.lat.to_bits()
        && a.position.lng.to_bits() == b.position.lng.to_bits()
}
