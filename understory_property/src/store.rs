// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object sparse property storage.
//!
//! This module provides [`PropertyStore`], the slot table a node (or its style
//! object) carries. Only properties that have been written occupy a slot; an
//! absent slot means the descriptor default is in effect at
//! [`ValueSource::Default`].
//!
//! # Implementation
//!
//! Following the `WinUI` approach, slots live in a sorted vector with binary
//! search rather than a hash map:
//!
//! - contiguous memory and no hash buckets
//! - O(log n) lookup, which is fast for typical property counts (5-20)
//! - inline storage for small property sets via `SmallVec`
//!
//! Animated layers, captured native defaults, and pre-coercion requests are
//! rare, so they are kept out of line and cost one empty `Vec` each when unused.

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::source::{Layer, ValueSource};
use crate::value::{ErasedValue, PropertyType};

/// Default inline capacity for slots.
///
/// Most UI objects have fewer than 8 non-default properties set,
/// so this avoids heap allocation in the common case.
const INLINE_CAPACITY: usize = 8;

#[derive(Clone, Debug)]
struct Slot {
    value: ErasedValue,
    source: ValueSource,
}

/// A sorted association list for the cold per-property tables.
#[derive(Clone, Debug)]
struct SortedMap<Key, V> {
    entries: Vec<(Key, V)>,
}

impl<Key, V> Default for SortedMap<Key, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<Key: Ord + Copy, V> SortedMap<Key, V> {
    #[inline]
    fn find(&self, key: Key) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |(k, _)| *k)
    }

    fn get(&self, key: Key) -> Option<&V> {
        self.find(key).ok().map(|idx| &self.entries[idx].1)
    }

    fn insert(&mut self, key: Key, value: V) -> Option<V> {
        match self.find(key) {
            Ok(idx) => Some(core::mem::replace(&mut self.entries[idx].1, value)),
            Err(idx) => {
                self.entries.insert(idx, (key, value));
                None
            }
        }
    }

    fn remove(&mut self, key: Key) -> Option<V> {
        self.find(key).ok().map(|idx| self.entries.remove(idx).1)
    }

    fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    fn retain(&mut self, mut keep: impl FnMut(Key) -> bool) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| keep(*k));
        self.entries.len() != before
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-object sparse storage for property state.
///
/// A store holds, per property:
///
/// - the effective **slot**: the value currently in effect and its
///   [`ValueSource`]
/// - for animated properties, the value of each explicitly set [`Layer`]
/// - the **native default** captured from a native view before the first
///   mirror, so it can be restored later
/// - for coercible properties, the last **requested** value before coercion
///
/// The store is deliberately dumb: it enforces no precedence. Resolution
/// rules live in the cascade that drives it.
///
/// # Example
///
/// ```rust
/// use understory_property::{PropertyId, PropertyStore, ValueSource, ErasedValue};
///
/// let width = PropertyId::new(0);
/// let mut store = PropertyStore::new(1_u32);
///
/// // No slot: default source.
/// assert_eq!(store.source(width), ValueSource::Default);
///
/// store.insert(width, ErasedValue::new(100.0_f64), ValueSource::Local);
/// assert_eq!(store.source(width), ValueSource::Local);
/// assert_eq!(store.value(width), Some(&ErasedValue::new(100.0_f64)));
///
/// store.remove(width);
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct PropertyStore<K> {
    /// Effective slots, sorted by [`PropertyId`] for binary search lookup.
    slots: SmallVec<[(PropertyId, Slot); INLINE_CAPACITY]>,
    layers: SortedMap<(PropertyId, Layer), ErasedValue>,
    native_defaults: SortedMap<PropertyId, ErasedValue>,
    requested: SortedMap<PropertyId, ErasedValue>,
    owner: K,
}

impl<K: Copy> PropertyStore<K> {
    /// Creates a new property store for the given owner key.
    #[must_use]
    pub fn new(owner: K) -> Self {
        Self {
            slots: SmallVec::new(),
            layers: SortedMap::default(),
            native_defaults: SortedMap::default(),
            requested: SortedMap::default(),
            owner,
        }
    }

    /// Returns the owner key of this store.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> K {
        self.owner
    }

    /// Returns `true` if the store holds no state at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
            && self.layers.is_empty()
            && self.native_defaults.is_empty()
            && self.requested.is_empty()
    }

    /// Returns the number of properties with an effective slot.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns the property IDs that have an effective slot, in ascending order.
    pub fn property_ids(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.slots.iter().map(|(id, _)| *id)
    }

    /// Binary search for a slot by property ID.
    #[inline]
    fn find_slot(&self, id: PropertyId) -> Result<usize, usize> {
        self.slots.binary_search_by_key(&id, |(pid, _)| *pid)
    }

    // =========================================================================
    // Effective slots
    // =========================================================================

    /// Returns the stored effective value, if any.
    #[must_use]
    #[inline]
    pub fn value(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.find_slot(id).ok().map(|idx| &self.slots[idx].1.value)
    }

    /// Returns the stored effective value of a typed property, if any.
    #[must_use]
    #[inline]
    pub fn get<T: PropertyType>(&self, property: Property<T>) -> Option<&T> {
        self.value(property.id()).and_then(ErasedValue::downcast_ref)
    }

    /// Returns the recorded source, or [`ValueSource::Default`] without a slot.
    #[must_use]
    #[inline]
    pub fn source(&self, id: PropertyId) -> ValueSource {
        self.find_slot(id)
            .map_or(ValueSource::Default, |idx| self.slots[idx].1.source)
    }

    /// Returns `true` if the property has an effective slot.
    #[must_use]
    #[inline]
    pub fn contains(&self, id: PropertyId) -> bool {
        self.find_slot(id).is_ok()
    }

    /// Stores an effective value and its source.
    ///
    /// Returns the previously stored value.
    pub fn insert(
        &mut self,
        id: PropertyId,
        value: ErasedValue,
        source: ValueSource,
    ) -> Option<ErasedValue> {
        let slot = Slot { value, source };
        match self.find_slot(id) {
            Ok(idx) => Some(core::mem::replace(&mut self.slots[idx].1, slot).value),
            Err(idx) => {
                self.slots.insert(idx, (id, slot));
                None
            }
        }
    }

    /// Re-stamps the source of an existing slot.
    ///
    /// Returns `false` if there is no slot.
    pub fn set_source(&mut self, id: PropertyId, source: ValueSource) -> bool {
        match self.find_slot(id) {
            Ok(idx) => {
                self.slots[idx].1.source = source;
                true
            }
            Err(_) => false,
        }
    }

    /// Removes the effective slot, returning its value and source.
    pub fn remove(&mut self, id: PropertyId) -> Option<(ErasedValue, ValueSource)> {
        self.find_slot(id).ok().map(|idx| {
            let (_, slot) = self.slots.remove(idx);
            (slot.value, slot.source)
        })
    }

    // =========================================================================
    // Animated layers
    // =========================================================================

    /// Returns the value set on one layer, if any.
    #[must_use]
    pub fn layer(&self, id: PropertyId, layer: Layer) -> Option<&ErasedValue> {
        self.layers.get((id, layer))
    }

    /// Sets the value of one layer.
    pub fn set_layer(&mut self, id: PropertyId, layer: Layer, value: ErasedValue) {
        self.layers.insert((id, layer), value);
    }

    /// Clears one layer, returning its value.
    pub fn clear_layer(&mut self, id: PropertyId, layer: Layer) -> Option<ErasedValue> {
        self.layers.remove((id, layer))
    }

    /// Returns every `(property, layer)` pair with a value, in ascending order.
    pub fn layer_keys(&self) -> impl Iterator<Item = (PropertyId, Layer)> + '_ {
        self.layers.keys()
    }

    // =========================================================================
    // Native defaults
    // =========================================================================

    /// Returns the captured native default, if any.
    #[must_use]
    pub fn native_default(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.native_defaults.get(id)
    }

    /// Captures a native default unless one is already held.
    ///
    /// `capture` only runs when nothing was captured yet. Returns `true` if a
    /// value was captured.
    pub fn capture_native_default(
        &mut self,
        id: PropertyId,
        capture: impl FnOnce() -> ErasedValue,
    ) -> bool {
        if self.native_defaults.get(id).is_some() {
            return false;
        }
        self.native_defaults.insert(id, capture());
        true
    }

    /// Removes and returns the captured native default.
    pub fn take_native_default(&mut self, id: PropertyId) -> Option<ErasedValue> {
        self.native_defaults.remove(id)
    }

    // =========================================================================
    // Requested values
    // =========================================================================

    /// Returns the last locally requested value before coercion.
    #[must_use]
    pub fn requested(&self, id: PropertyId) -> Option<&ErasedValue> {
        self.requested.get(id)
    }

    /// Records the locally requested value before coercion.
    pub fn set_requested(&mut self, id: PropertyId, value: ErasedValue) {
        self.requested.insert(id, value);
    }

    /// Forgets the requested value.
    pub fn clear_requested(&mut self, id: PropertyId) -> Option<ErasedValue> {
        self.requested.remove(id)
    }

    /// Drops every piece of state held for `id`.
    ///
    /// Returns `true` if anything was removed.
    pub fn purge(&mut self, id: PropertyId) -> bool {
        let mut removed = self.remove(id).is_some();
        removed |= self.layers.retain(|(pid, _)| pid != id);
        removed |= self.native_defaults.remove(id).is_some();
        removed |= self.requested.remove(id).is_some();
        removed
    }
}
