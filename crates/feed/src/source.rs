//! Where the feed gets its fleet from.
//!
//! The feed calls `EntitySource::fetch` once per load, after the simulated
//! latency has elapsed. `StaticSource` serves a fixed seed list and never
//! fails; other sources can fail, and the feed keeps its previous snapshot
//! when they do.

use std::path::Path;

use bevy::prelude::*;

use crate::error::{ConfigError, FetchError};
use crate::tracked_entity::{validate_fleet, GeoPoint, TrackedEntity, UnitStatus};

pub trait EntitySource: Send + Sync + 'static {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Produce a fresh copy of the fleet.
    fn fetch(&mut self) -> Result<Vec<TrackedEntity>, FetchError>;
}

/// Serves a clone of a fixed, pre-validated seed list on every fetch.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    seed: Vec<TrackedEntity>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, seed: Vec<TrackedEntity>) -> Result<Self, FetchError> {
        validate_fleet(&seed)?;
        Ok(Self {
            name: name.into(),
            seed,
        })
    }

    /// The five units of the dashboard's mock ambulance feed.
    pub fn default_fleet() -> Self {
        Self {
            name: "default-fleet".to_string(),
            seed: default_fleet(),
        }
    }

    pub fn from_json_str(name: impl Into<String>, json: &str) -> Result<Self, ConfigError> {
        let seed: Vec<TrackedEntity> = serde_json::from_str(json)?;
        Ok(Self::new(name, seed)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(path.display().to_string(), &json)
    }

    pub fn seed(&self) -> &[TrackedEntity] {
        &self.seed
    }
}

impl EntitySource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Vec<TrackedEntity>, FetchError> {
        Ok(self.seed.clone())
    }
}

/// The active fleet source, owned by the feed's `World`.
#[derive(Resource)]
pub struct FeedSource(pub Box<dyn EntitySource>);

impl FeedSource {
    pub fn new(source: impl EntitySource) -> Self {
        Self(Box::new(source))
    }
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::new(StaticSource::default_fleet())
    }
}

/// Seed list for the built-in source: four moving units and one parked one
/// (AMB-9012) across Los Angeles, New York and Chicago.
pub fn default_fleet() -> Vec<TrackedEntity> {
    vec![
        TrackedEntity::new("AMB-1234", GeoPoint::new(34.0522, -118.2437), UnitStatus::Responding)
            .with_speed(45.0)
            .with_eta(8.0),
        TrackedEntity::new("AMB-5678", GeoPoint::new(34.0622, -118.2537), UnitStatus::Transporting)
            .with_speed(60.0)
            .with_eta(12.0)
            .with_destination("Memorial General Hospital", GeoPoint::new(34.0522, -118.2437)),
        TrackedEntity::new("AMB-9012", GeoPoint::new(34.0722, -118.2637), UnitStatus::Available),
        TrackedEntity::new("AMB-3456", GeoPoint::new(40.7128, -74.006), UnitStatus::Responding)
            .with_speed(35.0)
            .with_eta(15.0),
        TrackedEntity::new("AMB-7890", GeoPoint::new(41.8781, -87.6298), UnitStatus::Transporting)
            .with_speed(50.0)
            .with_eta(7.0)
            .with_destination("University Medical Center", GeoPoint::new(41.8781, -87.6298)),
    ]
}
