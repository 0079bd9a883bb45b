//! Render dispatch: z-ordered registry of renderables and the drawing-pass seam.
//!
//! # Invariants
//! - The registry is always sorted by order key, ascending and stable.
//! - Dispatch and snapshots never hold the lock while user code runs.
//! - The core does not draw; a [`DrawPass`] consumes [`RenderRegistry::snapshot`].

mod registry;
mod renderer;

pub use registry::{RenderRegistry, Renderable};
pub use renderer::{DebugTextDrawer, DrawPass};

pub fn crate_info() -> &'static str {
    "sidescroll-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
