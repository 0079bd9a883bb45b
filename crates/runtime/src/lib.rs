//! Frame orchestration: one call per presented frame.
//!
//! ```text
//! clock.advance(dt) -> N ticks, alpha
//!   N x tick_registry.dispatch_tick(interval)
//!   assets.advance_one_frame()
//!   render_registry.dispatch_render(alpha)
//! ```
//!
//! # Invariants
//! - Everything runs on the thread that calls `run_frame`.
//! - Registries are shared (`Arc`) so other threads may register into them.

mod driver;
mod timing;

pub use driver::{FrameDriver, FrameReport, RuntimeError};
pub use timing::FrameTimer;

pub fn crate_info() -> &'static str {
    "sidescroll-runtime v0.1.0"
}
