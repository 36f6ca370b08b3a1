// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shorthand expansion output.

use smallvec::SmallVec;

use crate::id::{Property, PropertyId};
use crate::value::{ErasedValue, PropertyType, PropertyValue};

/// The elementary writes a shorthand value expands into.
///
/// A shorthand expander returns one of these; applying the shorthand replays
/// each entry, in order, through the elementary property's own entry point.
///
/// # Example
///
/// ```rust
/// use understory_property::{PropertyMetadataBuilder, PropertyRegistry, ShorthandExpansion};
///
/// let mut registry = PropertyRegistry::<u32>::new();
/// let top = registry.define_css("marginTop", "margin-top", PropertyMetadataBuilder::new(0.0_f64).build());
/// let left = registry.define_css("marginLeft", "margin-left", PropertyMetadataBuilder::new(0.0_f64).build());
///
/// let expansion = ShorthandExpansion::new().set(top, 4.0).unset(left);
/// assert_eq!(expansion.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShorthandExpansion {
    entries: SmallVec<[(PropertyId, PropertyValue<ErasedValue>); 4]>,
}

impl ShorthandExpansion {
    /// Creates an empty expansion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a write of `value` to `property`.
    #[must_use]
    pub fn set<T: PropertyType>(mut self, property: Property<T>, value: T) -> Self {
        self.push(property, PropertyValue::Value(value));
        self
    }

    /// Adds a reset of `property`.
    #[must_use]
    pub fn unset<T: PropertyType>(mut self, property: Property<T>) -> Self {
        self.push(property, PropertyValue::Unset);
        self
    }

    /// Appends an entry.
    pub fn push<T: PropertyType>(&mut self, property: Property<T>, value: PropertyValue<T>) {
        self.entries.push((property.id(), value.map(ErasedValue::new)));
    }

    /// Returns the number of elementary writes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the expansion writes nothing.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the elementary writes in order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue<ErasedValue>)> + '_ {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}

impl IntoIterator for ShorthandExpansion {
    type Item = (PropertyId, PropertyValue<ErasedValue>);
    type IntoIter = smallvec::IntoIter<[(PropertyId, PropertyValue<ErasedValue>); 4]>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
