//! Simulation kernel: fixed-step clock and tick dispatch.
//!
//! # Invariants
//! - Clock leftover time stays in `[0, interval)` after every advance.
//! - The tick counter never decreases.
//! - Tick dispatch runs over a snapshot; no lock is held during callbacks.

pub mod clock;
pub mod tick;

pub use clock::{ClockAdvance, ClockError, FixedStepClock};
pub use tick::{TickRegistry, Tickable};

pub fn crate_info() -> &'static str {
    "sidescroll-kernel v0.1.0"
}
