//! Per-element state keyed by element identity
//!
//! The engine remembers, for each element it has seen, the native volume
//! captured on first sight and the gain stage built for it. Tables must never
//! keep an element alive: once the page drops an element, its entry becomes
//! unreachable. Whatever the entry still holds is released on [`ElementTable::prune`],
//! which the engine calls on every full pass, or earlier if the table can.

use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Side table of per-element engine state
pub trait ElementTable<E, N> {
    /// Native volume captured on first sight, if the element has been seen
    fn original_volume(&self, element: &E) -> Option<f64>;

    /// Record the native volume on first sight
    ///
    /// Has no effect when a volume is already recorded for `element`.
    fn capture_original_volume(&mut self, element: &E, volume: f64);

    fn gain_node(&self, element: &E) -> Option<N>;

    /// Remember the gain stage built for `element` for the rest of its life
    fn attach_gain_node(&mut self, element: &E, node: N);

    /// Release entries whose element no longer exists
    fn prune(&mut self) {}
}

/// Element handle backed by a reference-counted allocation
///
/// The allocation's address is the element's identity.
pub trait SharedElement {
    type Target;

    fn shared(&self) -> &Rc<Self::Target>;
}

struct Entry<T, N> {
    element: Weak<T>,
    original_volume: Option<f64>,
    gain_node: Option<N>,
}

impl<T, N> Entry<T, N> {
    fn is_for(&self, element: &Rc<T>) -> bool {
        self.element.strong_count() > 0 && std::ptr::eq(self.element.as_ptr(), Rc::as_ptr(element))
    }
}

/// [`ElementTable`] holding only weak references to its elements
///
/// Entries whose element has been dropped are ignored on lookup and pruned on
/// the next insertion or [`ElementTable::prune`], so a recycled address never
/// inherits stale state.
pub struct WeakElementTable<T, N> {
    entries: HashMap<usize, Entry<T, N>>,
}

impl<T, N> Default for WeakElementTable<T, N> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T, N> WeakElementTable<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries whose element is still alive
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.element.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key(element: &Rc<T>) -> usize {
        Rc::as_ptr(element) as usize
    }

    fn entry(&self, element: &Rc<T>) -> Option<&Entry<T, N>> {
        self.entries
            .get(&Self::key(element))
            .filter(|entry| entry.is_for(element))
    }

    fn entry_mut(&mut self, element: &Rc<T>) -> &mut Entry<T, N> {
        self.entries.retain(|_, entry| entry.element.strong_count() > 0);
        self.entries
            .entry(Self::key(element))
            .or_insert_with(|| Entry {
                element: Rc::downgrade(element),
                original_volume: None,
                gain_node: None,
            })
    }
}

impl<E, T, N> ElementTable<E, N> for WeakElementTable<T, N>
where
    E: SharedElement<Target = T>,
    N: Clone,
{
    fn original_volume(&self, element: &E) -> Option<f64> {
        self.entry(element.shared())
            .and_then(|entry| entry.original_volume)
    }

    fn capture_original_volume(&mut self, element: &E, volume: f64) {
        let entry = self.entry_mut(element.shared());
        if entry.original_volume.is_none() {
            entry.original_volume = Some(volume);
        }
    }

    fn gain_node(&self, element: &E) -> Option<N> {
        self.entry(element.shared())
            .and_then(|entry| entry.gain_node.clone())
    }

    fn attach_gain_node(&mut self, element: &E, node: N) {
        self.entry_mut(element.shared()).gain_node = Some(node);
    }

    fn prune(&mut self) {
        self.entries.retain(|_, entry| entry.element.strong_count() > 0);
    }
}
