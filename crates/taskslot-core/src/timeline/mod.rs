//! Time intervals and the busy-interval set.
//!
//! This module provides:
//! - [`Interval`]: a validated half-open time span
//! - [`BusyIntervalSet`]: the sorted set of committed time the scheduler
//!   checks every candidate placement against

mod busy;
mod interval;

pub use busy::BusyIntervalSet;
pub use interval::Interval;
