use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Anything drawn once per presented frame.
pub trait Renderable: Send + Sync {
    /// Lower keys are dispatched and drawn first.
    fn order_key(&self) -> i32;

    fn is_visible(&self) -> bool;

    /// Advance presentation state by the interpolation fraction in `[0, 1)`.
    fn render(&self, alpha: f64);

    /// Short label for debug output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

struct Entry {
    order_key: i32,
    handle: Weak<dyn Renderable>,
}

/// Thread-safe set of renderables kept sorted by order key.
///
/// Like the tick registry it holds `Weak` references only. The collection is
/// re-sorted on every successful registration; equal keys keep their
/// registration order.
#[derive(Default)]
pub struct RenderRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a renderable. Returns false if it was already registered.
    pub fn register<T: Renderable + 'static>(&self, renderable: &Arc<T>) -> bool {
        let handle: Weak<T> = Arc::downgrade(renderable);
        self.insert(handle)
    }

    pub fn register_dyn(&self, renderable: &Arc<dyn Renderable>) -> bool {
        self.insert(Arc::downgrade(renderable))
    }

    fn insert(&self, handle: Weak<dyn Renderable>) -> bool {
        let mut entries = self.lock();
        entries.retain(|e| e.handle.strong_count() > 0);
        if entries
            .iter()
            .any(|e| std::ptr::addr_eq(e.handle.as_ptr(), handle.as_ptr()))
        {
            return false;
        }
        let Some(live) = handle.upgrade() else {
            return false;
        };
        entries.push(Entry {
            order_key: live.order_key(),
            handle,
        });

        // Keys may have changed since the last sort; refresh before re-sorting.
        for entry in entries.iter_mut() {
            if let Some(r) = entry.handle.upgrade() {
                entry.order_key = r.order_key();
            }
        }
        entries.sort_by_key(|e| e.order_key);

        tracing::debug!(
            order_key = live.order_key(),
            count = entries.len(),
            "registered renderable"
        );
        true
    }

    /// Remove a renderable. Absent handles are ignored.
    pub fn unregister<T: ?Sized>(&self, renderable: &Arc<T>) -> bool {
        let target = Arc::as_ptr(renderable);
        let mut entries = self.lock();
        entries.retain(|e| e.handle.strong_count() > 0);
        let before = entries.len();
        entries.retain(|e| !std::ptr::addr_eq(e.handle.as_ptr(), target));
        let removed = entries.len() < before;
        if removed {
            tracing::debug!(count = entries.len(), "unregistered renderable");
        }
        removed
    }

    /// Live renderables in draw order, visible or not.
    pub fn snapshot(&self) -> Vec<Arc<dyn Renderable>> {
        let handles: Vec<Weak<dyn Renderable>> =
            self.lock().iter().map(|e| e.handle.clone()).collect();
        handles.iter().filter_map(Weak::upgrade).collect()
    }

    /// Call `render` on every visible renderable in ascending key order.
    ///
    /// Returns the number of renderables rendered.
    pub fn dispatch_render(&self, alpha: f64) -> usize {
        let mut rendered = 0;
        for renderable in self.snapshot() {
            if renderable.is_visible() {
                renderable.render(alpha);
                rendered += 1;
            }
        }
        rendered
    }

    pub fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|e| e.handle.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn visible_count(&self) -> usize {
        self.snapshot().iter().filter(|r| r.is_visible()).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RenderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderRegistry")
            .field("len", &self.len())
            .finish()
    }
}
