//! Demo entities for the headless host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use glam::Vec2;
use sidescroll_assets::TextureHandle;
use sidescroll_kernel::Tickable;
use sidescroll_render::Renderable;

#[derive(Debug, Clone, Copy)]
struct Motion {
    previous: Vec2,
    position: Vec2,
    velocity: Vec2,
}

/// Moves at constant velocity and bounces between two x bounds.
#[derive(Debug)]
pub struct Walker {
    motion: Mutex<Motion>,
    min_x: f32,
    max_x: f32,
}

impl Walker {
    pub fn new(start: Vec2, velocity: Vec2, min_x: f32, max_x: f32) -> Self {
        Self {
            motion: Mutex::new(Motion {
                previous: start,
                position: start,
                velocity,
            }),
            min_x,
            max_x,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.motion().position
    }

    /// Position between the last two ticks at fraction `alpha`.
    pub fn interpolated(&self, alpha: f64) -> Vec2 {
        let m = self.motion();
        m.previous.lerp(m.position, alpha as f32)
    }

    fn motion(&self) -> Motion {
        *self.motion.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tickable for Walker {
    fn tick(&self, delta_seconds: f64) {
        let mut guard = self.motion.lock().unwrap_or_else(PoisonError::into_inner);
        let m = &mut *guard;
        m.previous = m.position;
        m.position += m.velocity * delta_seconds as f32;
        if m.position.x < self.min_x || m.position.x > self.max_x {
            m.position.x = m.position.x.clamp(self.min_x, self.max_x);
            m.velocity.x = -m.velocity.x;
        }
    }
}

/// Sprite drawn at a walker's interpolated position, or at a fixed spot.
pub struct Sprite {
    name: String,
    order_key: i32,
    visible: AtomicBool,
    texture: TextureHandle,
    anchor: Option<Arc<Walker>>,
    drawn_at: Mutex<Option<Vec2>>,
}

impl Sprite {
    pub fn new(name: impl Into<String>, order_key: i32, texture: TextureHandle) -> Self {
        Self {
            name: name.into(),
            order_key,
            visible: AtomicBool::new(true),
            texture,
            anchor: None,
            drawn_at: Mutex::new(None),
        }
    }

    pub fn following(mut self, walker: Arc<Walker>) -> Self {
        self.anchor = Some(walker);
        self
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Relaxed);
    }

    pub fn texture(&self) -> &TextureHandle {
        &self.texture
    }

    /// Where the last render placed this sprite.
    pub fn drawn_at(&self) -> Option<Vec2> {
        *self.drawn_at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Renderable for Sprite {
    fn order_key(&self) -> i32 {
        self.order_key
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Relaxed)
    }

    fn render(&self, alpha: f64) {
        let at = self
            .anchor
            .as_ref()
            .map_or(Vec2::ZERO, |w| w.interpolated(alpha));
        *self.drawn_at.lock().unwrap_or_else(PoisonError::into_inner) = Some(at);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walker_moves_by_velocity() {
        let w = Walker::new(Vec2::ZERO, Vec2::new(60.0, 0.0), -100.0, 100.0);
        w.tick(0.5);
        assert_eq!(w.position(), Vec2::new(30.0, 0.0));
        assert_eq!(w.interpolated(0.5), Vec2::new(15.0, 0.0));
    }

    #[test]
    fn walker_bounces_at_bounds() {
        let w = Walker::new(Vec2::new(9.0, 0.0), Vec2::new(10.0, 0.0), 0.0, 10.0);
        w.tick(1.0);
        assert_eq!(w.position().x, 10.0);
        w.tick(1.0);
        assert_eq!(w.position().x, 0.0);
    }

    #[test]
    fn walker_ticks_through_registry() {
        let registry = sidescroll_kernel::TickRegistry::new();
        let w = Arc::new(Walker::new(Vec2::ZERO, Vec2::new(120.0, 0.0), 0.0, 1000.0));
        registry.register(&w);
        for _ in 0..3 {
            registry.dispatch_tick(0.25);
        }
        assert_eq!(w.position(), Vec2::new(90.0, 0.0));
        assert_eq!(w.interpolated(0.0), Vec2::new(60.0, 0.0));
    }
}
