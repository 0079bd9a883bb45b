use std::fmt::Write;
use std::sync::Arc;

use crate::registry::Renderable;

/// External drawing pass over a registry snapshot.
///
/// The registry only guarantees ordering and membership; a pass decides what
/// drawing means (GPU sprite batch, text dump, test capture).
pub trait DrawPass {
    /// The output type produced by this pass.
    type Output;

    /// Draw one frame from renderables already sorted by order key.
    fn draw(&self, renderables: &[Arc<dyn Renderable>], alpha: f64) -> Self::Output;
}

/// Text drawing pass for headless hosts, logs and tests.
///
/// Invisible renderables are listed but marked hidden.
#[derive(Debug, Default)]
pub struct DebugTextDrawer;

impl DebugTextDrawer {
    pub fn new() -> Self {
        Self
    }
}

impl DrawPass for DebugTextDrawer {
    type Output = String;

    fn draw(&self, renderables: &[Arc<dyn Renderable>], alpha: f64) -> String {
        let visible = renderables.iter().filter(|r| r.is_visible()).count();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame (alpha={alpha:.3}) renderables={} visible={visible} ===",
            renderables.len()
        );
        for r in renderables {
            let _ = writeln!(
                out,
                "  [z={:>4}] {}{}",
                r.order_key(),
                r.name(),
                if r.is_visible() { "" } else { " (hidden)" }
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderRegistry;

    struct Label {
        name: &'static str,
        key: i32,
        visible: bool,
    }

    impl Renderable for Label {
        fn order_key(&self) -> i32 {
            self.key
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn render(&self, _alpha: f64) {}

        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn empty_frame() {
        let out = DebugTextDrawer::new().draw(&[], 0.0);
        assert!(out.contains("renderables=0"));
        assert!(out.contains("alpha=0.000"));
    }

    #[test]
    fn lists_snapshot_in_draw_order() {
        let registry = RenderRegistry::new();
        let ground = Arc::new(Label {
            name: "ground",
            key: 0,
            visible: true,
        });
        let player = Arc::new(Label {
            name: "player",
            key: 10,
            visible: false,
        });
        registry.register(&player);
        registry.register(&ground);

        let out = DebugTextDrawer::new().draw(&registry.snapshot(), 0.5);
        let ground_at = out.find("ground").unwrap();
        let player_at = out.find("player").unwrap();
        assert!(ground_at < player_at);
        assert!(out.contains("player (hidden)"));
        assert!(out.contains("visible=1"));
    }

    #[test]
    fn default_name_is_type_name() {
        struct Anonymous;
        impl Renderable for Anonymous {
            fn order_key(&self) -> i32 {
                0
            }
            fn is_visible(&self) -> bool {
                true
            }
            fn render(&self, _alpha: f64) {}
        }

        let items: Vec<Arc<dyn Renderable>> = vec![Arc::new(Anonymous)];
        let out = DebugTextDrawer::new().draw(&items, 0.0);
        assert!(out.contains("Anonymous"));
    }
}
