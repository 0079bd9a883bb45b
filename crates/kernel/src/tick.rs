use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Anything advanced once per fixed simulation tick.
///
/// Entities are shared with the registry, so `tick` takes `&self`; implementors
/// keep their mutable state behind a lock or atomics.
pub trait Tickable: Send + Sync {
    fn tick(&self, delta_seconds: f64);
}

/// Thread-safe ordered set of tick participants.
///
/// The registry never owns its entries. It keeps a `Weak` reference and the
/// registrant keeps the `Arc`; an entry whose owner is gone is skipped at
/// dispatch and pruned on the next mutation.
///
/// Dispatch runs in reverse registration order: the most recently registered
/// participant ticks first.
#[derive(Default)]
pub struct TickRegistry {
    entries: Mutex<Vec<Weak<dyn Tickable>>>,
    dispatches: AtomicU64,
    sample_every: Option<u64>,
}

impl TickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that logs a debug sample every `every` dispatches.
    pub fn with_sampling(every: u64) -> Self {
        Self {
            sample_every: (every > 0).then_some(every),
            ..Self::default()
        }
    }

    /// Add a participant. Returns false if it was already registered.
    pub fn register<T: Tickable + 'static>(&self, tickable: &Arc<T>) -> bool {
        let weak: Weak<T> = Arc::downgrade(tickable);
        self.insert(weak)
    }

    /// Same as [`register`](Self::register) for an already type-erased handle.
    pub fn register_dyn(&self, tickable: &Arc<dyn Tickable>) -> bool {
        self.insert(Arc::downgrade(tickable))
    }

    fn insert(&self, weak: Weak<dyn Tickable>) -> bool {
        let mut entries = self.lock();
        entries.retain(|w| w.strong_count() > 0);
        if entries.iter().any(|w| std::ptr::addr_eq(w.as_ptr(), weak.as_ptr())) {
            return false;
        }
        entries.push(weak);
        tracing::debug!(count = entries.len(), "registered tickable");
        true
    }

    /// Remove a participant. Absent handles are ignored.
    pub fn unregister<T: ?Sized>(&self, tickable: &Arc<T>) -> bool {
        let target = Arc::as_ptr(tickable);
        let mut entries = self.lock();
        entries.retain(|w| w.strong_count() > 0);
        let before = entries.len();
        entries.retain(|w| !std::ptr::addr_eq(w.as_ptr(), target));
        let removed = entries.len() < before;
        if removed {
            tracing::debug!(count = entries.len(), "unregistered tickable");
        }
        removed
    }

    /// Tick every live participant once, newest first.
    ///
    /// Membership changes made by participants during dispatch apply from the
    /// next call. Returns the number of participants ticked.
    pub fn dispatch_tick(&self, delta_seconds: f64) -> usize {
        let snapshot: Vec<Weak<dyn Tickable>> = self.lock().clone();

        let mut ticked = 0;
        for weak in snapshot.iter().rev() {
            if let Some(tickable) = weak.upgrade() {
                tickable.tick(delta_seconds);
                ticked += 1;
            }
        }

        let n = self.dispatches.fetch_add(1, Ordering::Relaxed) + 1;
        if self.sample_every.is_some_and(|every| n % every == 0) {
            tracing::debug!(dispatches = n, tickables = self.len(), "tick sample");
        }
        ticked
    }

    /// Number of live registered participants.
    pub fn len(&self) -> usize {
        self.lock().iter().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `dispatch_tick` calls so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Weak<dyn Tickable>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TickRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickRegistry")
            .field("len", &self.len())
            .field("dispatches", &self.dispatch_count())
            .finish()
    }
}
