//! Per-tick movement step for tracked units.
//!
//! Units with a destination head straight for it along
//! `atan2(Δlat, Δlng)`; units without one wander by a random offset scaled by
//! their speed. Every moving unit loses a fixed slice of ETA, floored at zero.
//! Available units and units with zero speed are skipped entirely.
//!
//! A unit within one step of its destination snaps onto it, so a unit parked
//! on its destination stays put rather than drifting east at bearing 0.

use rand::Rng;

use crate::config::{BASE_STEP_DEGREES, ETA_DECREMENT_MINUTES, REFERENCE_SPEED};
use crate::tracked_entity::TrackedEntity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementParams {
    /// Degrees covered per tick at `reference_speed`.
    pub base_step: f64,
    pub reference_speed: f64,
    /// Minutes removed from ETA per tick.
    pub eta_decrement: f64,
}

impl Default for MovementParams {
    fn default() -> Self {
        Self {
            base_step: BASE_STEP_DEGREES,
            reference_speed: REFERENCE_SPEED,
            eta_decrement: ETA_DECREMENT_MINUTES,
        }
    }
}

impl MovementParams {
    /// Step length in degrees for a unit moving at `speed`.
    pub fn step_for(&self, speed: f64) -> f64 {
        self.base_step * (speed / self.reference_speed)
    }
}

/// Advance a single unit by one tick. Returns `false` if the unit was skipped.
pub fn advance_entity<R: Rng + ?Sized>(
    entity: &mut TrackedEntity,
    params: &MovementParams,
    rng: &mut R,
) -> bool {
    if entity.is_stationary() {
        return false;
    }

    let step = params.step_for(entity.speed);

    match &entity.destination {
        Some(dest) => {
            let target = dest.position;
            let d_lat = target.lat - entity.position.lat;
            let d_lng = target.lng - entity.position.lng;
            if d_lat.hypot(d_lng) <= step {
                // Arrive instead of overshooting.
                entity.position = target;
            } else {
                let bearing = d_lat.atan2(d_lng);
                entity.position.lat += bearing.sin() * step;
                entity.position.lng += bearing.cos() * step;
            }
        }
        None => {
            entity.position.lat += (rng.gen::<f64>() - 0.5) * step;
            entity.position.lng += (rng.gen::<f64>() - 0.5) * step;
        }
    }

    entity.eta = (entity.eta - params.eta_decrement).max(0.0);
    true
}

/// Advance every unit in the fleet by one tick. Returns how many units moved.
pub fn advance_fleet<R: Rng + ?Sized>(
    entities: &mut [TrackedEntity],
    params: &MovementParams,
    rng: &mut R,
) -> usize {
    entities
        .iter_mut()
        .map(|e| advance_entity(e, params, rng))
        .filter(|moved| *moved)
        .count()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracked_entity::{GeoPoint, UnitStatus};
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-12;

    fn heading_to(dest: GeoPoint) -> TrackedEntity {
        TrackedEntity::new("AMB-T", GeoPoint::new(0.0, 0.0), UnitStatus::Transporting)
            .with_speed(30.0)
            .with_eta(12.0)
            .with_destination("General", dest)
    }

    fn wanderer(speed: f64) -> TrackedEntity {
        TrackedEntity::new("AMB-W", GeoPoint::new(34.0, -118.0), UnitStatus::Responding)
            .with_speed(speed)
            .with_eta(8.0)
    }

    #[test]
    fn test_step_scales_with_speed() {
        let params = MovementParams::default();
        assert!((params.step_for(30.0) - 0.001).abs() < EPS);
        assert!((params.step_for(60.0) - 0.002).abs() < EPS);
        assert_eq!(params.step_for(0.0), 0.0);
    }

    #[test]
    fn test_due_north_moves_lat_only() {
        let mut e = heading_to(GeoPoint::new(1.0, 0.0));
        let mut rng = StepRng::new(0, 0);
        assert!(advance_entity(&mut e, &MovementParams::default(), &mut rng));
        assert!((e.position.lat - 0.001).abs() < EPS, "lat = {}", e.position.lat);
        assert!(e.position.lng.abs() < EPS, "lng = {}", e.position.lng);
    }

    #[test]
    fn test_due_east_moves_lng_only() {
        let mut e = heading_to(GeoPoint::new(0.0, 1.0));
        let mut rng = StepRng::new(0, 0);
        advance_entity(&mut e, &MovementParams::default(), &mut rng);
        assert!(e.position.lat.abs() < EPS);
        assert!((e.position.lng - 0.001).abs() < EPS);
    }

    #[test]
    fn test_diagonal_step_has_step_length() {
        let mut e = heading_to(GeoPoint::new(-1.0, -1.0));
        let before = e.position;
        let mut rng = StepRng::new(0, 0);
        advance_entity(&mut e, &MovementParams::default(), &mut rng);
        let moved = before.distance_to(&e.position);
        assert!((moved - 0.001).abs() < 1e-12, "moved {moved}");
        assert!(e.position.lat < 0.0 && e.position.lng < 0.0);
    }

    #[test]
    fn test_eta_decrements_and_floors_at_zero() {
        let params = MovementParams::default();
        let mut rng = StepRng::new(0, 0);
        let mut e = heading_to(GeoPoint::new(1.0, 1.0)).with_eta(0.2);
        advance_entity(&mut e, &params, &mut rng);
        assert_eq!(e.eta, 0.0);
        advance_entity(&mut e, &params, &mut rng);
        assert_eq!(e.eta, 0.0);

        let mut w = wanderer(30.0).with_eta(0.1);
        advance_entity(&mut w, &params, &mut rng);
        assert_eq!(w.eta, 0.0);
    }

    #[test]
    fn test_available_unit_untouched() {
        let mut e = heading_to(GeoPoint::new(1.0, 1.0));
        e.status = UnitStatus::Available;
        let before = e.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(!advance_entity(&mut e, &MovementParams::default(), &mut rng));
        assert_eq!(e, before);
    }

    #[test]
    fn test_zero_speed_responding_unit_untouched() {
        let mut e = wanderer(0.0);
        let before = e.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(!advance_entity(&mut e, &MovementParams::default(), &mut rng));
        assert_eq!(e, before, "eta must not decrement either");
    }

    #[test]
    fn test_wander_offset_uses_rng_sample() {
        // StepRng(0, 0) samples 0.0, so both axes shift by -0.5 * step.
        let mut e = wanderer(60.0);
        let mut rng = StepRng::new(0, 0);
        advance_entity(&mut e, &MovementParams::default(), &mut rng);
        assert!((e.position.lat - (34.0 - 0.001)).abs() < 1e-9);
        assert!((e.position.lng - (-118.0 - 0.001)).abs() < 1e-9);
        assert!((e.eta - 7.8).abs() < 1e-9);
    }

    #[test]
    fn test_wander_stays_within_step_box() {
        let params = MovementParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut e = wanderer(45.0);
        let half = params.step_for(45.0) / 2.0;
        for _ in 0..200 {
            let before = e.position;
            advance_entity(&mut e, &params, &mut rng);
            assert!((e.position.lat - before.lat).abs() <= half + EPS);
            assert!((e.position.lng - before.lng).abs() <= half + EPS);
        }
    }

    #[test]
    fn test_arrives_without_overshoot() {
        let params = MovementParams::default();
        let mut rng = StepRng::new(0, 0);
        let dest = GeoPoint::new(0.0, 0.0025);
        let mut e = heading_to(dest);
        for _ in 0..3 {
            advance_entity(&mut e, &params, &mut rng);
        }
        assert_eq!(e.position, dest);
        advance_entity(&mut e, &params, &mut rng);
        assert_eq!(e.position, dest, "unit parked on its destination stays put");
    }

    #[test]
    fn test_destination_distance_strictly_decreases() {
        let params = MovementParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut e = heading_to(GeoPoint::new(0.013, -0.021)).with_speed(50.0);
        let mut last = e.distance_to_destination().unwrap();
        while e.eta > 0.0 && last > 0.0 {
            advance_entity(&mut e, &params, &mut rng);
            let now = e.distance_to_destination().unwrap();
            assert!(now < last, "distance went from {last} to {now}");
            last = now;
        }
    }

    #[test]
    fn test_advance_fleet_counts_movers() {
        let mut fleet = vec![
            wanderer(30.0),
            wanderer(0.0),
            heading_to(GeoPoint::new(1.0, 1.0)),
        ];
        fleet[2].status = UnitStatus::Available;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(advance_fleet(&mut fleet, &MovementParams::default(), &mut rng), 1);
    }
}
