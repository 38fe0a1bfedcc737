//! Ordering of feed systems within `FixedUpdate`.
//!
//! ```text
//! Control  →  Simulation  →  Report
//! ```
//!
//! * **Control** – Tick counter and queued `FeedCommand`s (start, refetch,
//!   stop). Timers are torn down and re-armed here, so nothing later in the
//!   same run sees a stale interval.
//! * **Simulation** – The movement interval, then completion of a pending
//!   load. The interval runs first so a freshly armed interval is not
//!   advanced in the run that armed it.
//! * **Report** – Consumers of `FeedSnapshot` / `FeedStatusChanged` events
//!   (loggers, protocol writers). They only read feed state.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedSet {
    Control,
    Simulation,
    Report,
}
