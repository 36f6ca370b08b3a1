// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only access to one node's effective values.

use core::any::type_name;
use core::fmt;

use crate::id::Property;
use crate::registry::PropertyRegistry;
use crate::source::Scope;
use crate::store::PropertyStore;
use crate::value::PropertyType;

/// The effective values of one node, as seen by a coercion callback.
///
/// Reads return the stored value, or the descriptor default when nothing is
/// stored, so a callback can clamp against the node's other properties.
///
/// # Example
///
/// ```rust
/// use understory_property::{
///     ErasedValue, NodeValues, PropertyMetadataBuilder, PropertyRegistry, PropertyStore,
///     ValueSource,
/// };
///
/// let mut registry = PropertyRegistry::<u32>::new();
/// let max = registry.define("maxValue", PropertyMetadataBuilder::new(100.0_f64).build());
///
/// let mut props = PropertyStore::new(7);
/// let style = PropertyStore::new(7);
/// let values = NodeValues::new(7, &registry, &props, &style);
/// assert_eq!(*values.get(max), 100.0);
///
/// props.insert(max.id(), ErasedValue::new(10.0_f64), ValueSource::Local);
/// let values = NodeValues::new(7, &registry, &props, &style);
/// assert_eq!(values.node(), 7);
/// assert_eq!(*values.get(max), 10.0);
/// ```
pub struct NodeValues<'a, K> {
    node: K,
    registry: &'a PropertyRegistry<K>,
    props: &'a PropertyStore<K>,
    style: &'a PropertyStore<K>,
}

impl<'a, K: Copy + 'static> NodeValues<'a, K> {
    /// Bundles a node's two stores with the registry describing them.
    #[must_use]
    pub fn new(
        node: K,
        registry: &'a PropertyRegistry<K>,
        props: &'a PropertyStore<K>,
        style: &'a PropertyStore<K>,
    ) -> Self {
        Self {
            node,
            registry,
            props,
            style,
        }
    }

    /// Returns the node key.
    #[must_use]
    #[inline]
    pub fn node(&self) -> K {
        self.node
    }

    /// Returns the effective value of `property` on this node.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not defined in the registry.
    #[must_use]
    pub fn get<T: PropertyType>(&self, property: Property<T>) -> &'a T {
        let registration = self.registry.registration(property.id());
        let store = match registration.scope() {
            Scope::Node => self.props,
            Scope::Style => self.style,
        };
        match store
            .value(property.id())
            .unwrap_or_else(|| registration.default_value())
            .downcast_ref()
        {
            Some(value) => value,
            None => panic!(
                "property '{}' is not of type {}",
                registration.name(),
                type_name::<T>()
            ),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for NodeValues<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeValues")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use crate::source::ValueSource;
    use crate::value::ErasedValue;
    use alloc::string::String;

    #[test]
    fn reads_each_scope_with_default_fallback() {
        let mut registry = PropertyRegistry::<u32>::new();
        let min = registry.define("minValue", PropertyMetadataBuilder::new(0.0_f64).build());
        let color = registry.define_css(
            "color",
            "color",
            PropertyMetadataBuilder::new(String::from("black")).build(),
        );

        let props = PropertyStore::new(3);
        let mut style = PropertyStore::new(3);
        style.insert(
            color.id(),
            ErasedValue::new(String::from("red")),
            ValueSource::Stylesheet,
        );

        let values = NodeValues::new(3, &registry, &props, &style);
        assert_eq!(*values.get(min), 0.0);
        assert_eq!(values.get(color), "red");
    }
}
