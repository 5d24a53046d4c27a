//! Update events and listener registries
//!
//! A control reports every change through one of a few [`UpdateKind`]s so a
//! renderer can do the minimal amount of work:
//!
//! - `Redraw`: colors, paints, text, needle styles changed; repaint only
//! - `Visibility`: an element was shown or hidden; re-layout the parts
//! - `Lcd`: the LCD style table changed; reload the LCD resources
//! - `Recalc`: locale changed; recompute formatted strings
//! - `Section`: the section/area lists changed; rebuild the range overlays

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a renderer has to do after an attribute change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Redraw,
    Visibility,
    Lcd,
    Recalc,
    Section,
}

/// Handle returned by [`Listeners::add`], used to unregister
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Listener callback type
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A copy-on-iterate list of listeners
///
/// `emit` iterates over a snapshot, so listeners may add or remove listeners
/// (including themselves) while being notified. Changes apply from the next
/// `emit` on.
pub struct Listeners<E> {
    entries: RwLock<Arc<Vec<(ListenerId, Listener<E>)>>>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Register a listener
    pub fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId::next();
        let mut entries = self.entries.write();
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push((id, Arc::new(listener) as Listener<E>));
        *entries = Arc::new(next);
        id
    }

    /// Unregister a listener. Returns false if it wasn't registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        if !entries.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        let next: Vec<_> = entries
            .iter()
            .filter(|(existing, _)| *existing != id)
            .cloned()
            .collect();
        *entries = Arc::new(next);
        true
    }

    /// Notify every listener registered at the time of the call
    pub fn emit(&self, event: &E) {
        let snapshot = Arc::clone(&self.entries.read());
        for (_, listener) in snapshot.iter() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}
