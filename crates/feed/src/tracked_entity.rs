//! Tracked units: position, status, speed, ETA and optional destination.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance in degree space. This is the metric the movement step
    /// converges on, not a great-circle distance.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        (other.lat - self.lat).hypot(other.lng - self.lng)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    #[serde(flatten)]
    pub position: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Responding,
    Transporting,
    Available,
}

/// One mobile unit in the feed.
///
/// Created from the seed list at load time, mutated in place on every tick
/// while it is moving, never removed during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedEntity {
    pub id: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub status: UnitStatus,
    /// km/h, never negative.
    pub speed: f64,
    /// Minutes, never negative.
    pub eta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
}

impl TrackedEntity {
    pub fn new(id: impl Into<String>, position: GeoPoint, status: UnitStatus) -> Self {
        Self {
            id: id.into(),
            position,
            status,
            speed: 0.0,
            eta: 0.0,
            destination: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_eta(mut self, eta: f64) -> Self {
        self.eta = eta;
        self
    }

    pub fn with_destination(mut self, name: impl Into<String>, position: GeoPoint) -> Self {
        self.destination = Some(Destination {
            name: name.into(),
            position,
        });
        self
    }

    /// Available units and units with zero speed are both left alone by the tick.
    pub fn is_stationary(&self) -> bool {
        self.status == UnitStatus::Available || self.speed == 0.0
    }

    pub fn distance_to_destination(&self) -> Option<f64> {
        self.destination
            .as_ref()
            .map(|d| self.position.distance_to(&d.position))
    }

    fn check(&self) -> Result<(), FetchError> {
        if self.id.trim().is_empty() {
            return Err(FetchError::Malformed("entity with empty id".to_string()));
        }
        if !self.position.is_finite() {
            return Err(FetchError::Malformed(format!(
                "{}: position is not finite",
                self.id
            )));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(FetchError::Malformed(format!(
                "{}: speed must be a non-negative number, got {}",
                self.id, self.speed
            )));
        }
        if !self.eta.is_finite() || self.eta < 0.0 {
            return Err(FetchError::Malformed(format!(
                "{}: eta must be a non-negative number, got {}",
                self.id, self.eta
            )));
        }
        if let Some(dest) = &self.destination {
            if !dest.position.is_finite() {
                return Err(FetchError::Malformed(format!(
                    "{}: destination '{}' is not finite",
                    self.id, dest.name
                )));
            }
        }
        Ok(())
    }
}

/// Check every entity against the data model and reject duplicate ids.
pub fn validate_fleet(entities: &[TrackedEntity]) -> Result<(), FetchError> {
    let mut seen = HashSet::with_capacity(entities.len());
    for entity in entities {
        entity.check()?;
        if !seen.insert(entity.id.as_str()) {
            return Err(FetchError::Malformed(format!(
                "duplicate entity id '{}'",
                entity.id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
