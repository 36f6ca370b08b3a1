// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! This module provides [`PropertyMetadata`] for storing descriptor
//! configuration and [`PropertyMetadataBuilder`] for ergonomic construction.
//! `K` is the node key handed to callbacks; `T` is the value type.

use alloc::boxed::Box;
use core::fmt;
use smallvec::SmallVec;

use crate::error::ConversionError;
use crate::expand::ShorthandExpansion;
use crate::id::PropertyId;
use crate::node::NodeValues;

/// Callback invoked when a property's effective value changes.
///
/// Receives the node, the old value and the new value.
pub type PropertyChangedCallback<K, T> = Box<dyn Fn(K, &T, &T) + Send + Sync>;

/// Callback that normalizes a locally written value before it is stored.
///
/// Receives the node's current values and the requested value and returns
/// the value to store.
pub type CoerceValueCallback<K, T> = Box<dyn Fn(&NodeValues<'_, K>, T) -> T + Send + Sync>;

/// Custom equality used for change detection.
pub type EqualityComparer<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Converts textual input into a value.
pub type ValueConverter<T> = Box<dyn Fn(&str) -> Result<T, ConversionError> + Send + Sync>;

/// Expands a raw shorthand value into elementary writes.
pub type ShorthandExpander<T> =
    Box<dyn Fn(&T) -> Result<ShorthandExpansion, ConversionError> + Send + Sync>;

/// Metadata for a property descriptor.
///
/// # Example
///
/// ```rust
/// use understory_property::PropertyMetadataBuilder;
///
/// let metadata = PropertyMetadataBuilder::<u32, f64>::new(100.0)
///     .affects_layout(true)
///     .coerce(|_node, v| v.max(0.0))
///     .build();
///
/// assert_eq!(metadata.default_value(), &100.0);
/// assert!(metadata.affects_layout());
/// assert!(metadata.has_coerce_callback());
/// ```
pub struct PropertyMetadata<K, T> {
    default_value: T,
    affects_layout: bool,
    equality: Option<EqualityComparer<T>>,
    changed_callback: Option<PropertyChangedCallback<K, T>>,
    coerce_callback: Option<CoerceValueCallback<K, T>>,
    converter: Option<ValueConverter<T>>,
    shorthand: Option<(SmallVec<[PropertyId; 4]>, ShorthandExpander<T>)>,
}

impl<K, T: PartialEq> PropertyMetadata<K, T> {
    /// Creates metadata with the given default value and nothing else.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// Returns a reference to the default value.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    /// Returns whether a change to this property invalidates layout.
    #[must_use]
    #[inline]
    pub fn affects_layout(&self) -> bool {
        self.affects_layout
    }

    /// Compares two values with the custom comparer, or `==`.
    #[must_use]
    pub fn values_equal(&self, a: &T, b: &T) -> bool {
        match &self.equality {
            Some(eq) => eq(a, b),
            None => a == b,
        }
    }

    /// Invokes the changed callback if one is set.
    #[inline]
    pub fn on_changed(&self, node: K, old_value: &T, new_value: &T) {
        if let Some(callback) = &self.changed_callback {
            callback(node, old_value, new_value);
        }
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, node: &NodeValues<'_, K>, value: T) -> T {
        if let Some(callback) = &self.coerce_callback {
            callback(node, value)
        } else {
            value
        }
    }

    /// Runs the text converter.
    ///
    /// Returns `None` when no converter is set.
    pub fn convert(&self, text: &str) -> Option<Result<T, ConversionError>> {
        self.converter.as_ref().map(|converter| converter(text))
    }

    /// Runs the shorthand expander.
    ///
    /// Returns `None` when this is not shorthand metadata.
    pub fn expand(&self, value: &T) -> Option<Result<ShorthandExpansion, ConversionError>> {
        self.shorthand.as_ref().map(|(_, expander)| expander(value))
    }

    /// Returns the elementary properties a shorthand writes.
    #[must_use]
    pub fn shorthand_parts(&self) -> &[PropertyId] {
        self.shorthand
            .as_ref()
            .map_or(&[][..], |(parts, _)| parts.as_slice())
    }

    /// Returns whether a changed callback is set.
    #[must_use]
    #[inline]
    pub fn has_changed_callback(&self) -> bool {
        self.changed_callback.is_some()
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }

    /// Returns whether a text converter is set.
    #[must_use]
    #[inline]
    pub fn has_converter(&self) -> bool {
        self.converter.is_some()
    }

    /// Returns whether a shorthand expander is set.
    #[must_use]
    #[inline]
    pub fn is_shorthand(&self) -> bool {
        self.shorthand.is_some()
    }
}

// Manual Debug impl since callbacks aren't Debug
impl<K, T: fmt::Debug> fmt::Debug for PropertyMetadata<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("default_value", &self.default_value)
            .field("affects_layout", &self.affects_layout)
            .field("has_equality", &self.equality.is_some())
            .field("has_changed_callback", &self.changed_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .field("has_converter", &self.converter.is_some())
            .field(
                "shorthand_parts",
                &self.shorthand.as_ref().map(|(parts, _)| parts),
            )
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// # Example
///
/// ```rust
/// use understory_property::{make_parser, make_validator, PropertyMetadataBuilder};
///
/// let is_align = make_validator(&["left", "center", "right"]);
/// let metadata = PropertyMetadataBuilder::<u32, String>::new("left".into())
///     .converter(make_parser(is_align))
///     .build();
///
/// assert_eq!(metadata.convert("CENTER"), Some(Ok("center".to_string())));
/// assert!(metadata.convert("middle").unwrap().is_err());
/// ```
pub struct PropertyMetadataBuilder<K, T> {
    metadata: PropertyMetadata<K, T>,
}

// Manual Debug impl since callbacks aren't Debug
impl<K, T: fmt::Debug> fmt::Debug for PropertyMetadataBuilder<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyMetadataBuilder")
            .field(&self.metadata)
            .finish()
    }
}

impl<K, T> PropertyMetadataBuilder<K, T> {
    /// Creates a new builder with the given default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self {
            metadata: PropertyMetadata {
                default_value,
                affects_layout: false,
                equality: None,
                changed_callback: None,
                coerce_callback: None,
                converter: None,
                shorthand: None,
            },
        }
    }

    /// Marks the property as layout-affecting.
    ///
    /// Every committed change then requests a layout pass on the node.
    #[must_use]
    pub fn affects_layout(mut self, affects_layout: bool) -> Self {
        self.metadata.affects_layout = affects_layout;
        self
    }

    /// Replaces `==` for change detection.
    #[must_use]
    pub fn equality<F>(mut self, comparer: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        self.metadata.equality = Some(Box::new(comparer));
        self
    }

    /// Sets a callback to be invoked when the effective value changes.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(K, &T, &T) + Send + Sync + 'static,
    {
        self.metadata.changed_callback = Some(Box::new(callback));
        self
    }

    /// Sets a callback to coerce locally written values before they are stored.
    ///
    /// The callback can read the node's other properties, so a value can be
    /// clamped against them. Only plain properties honor coercion.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(&NodeValues<'_, K>, T) -> T + Send + Sync + 'static,
    {
        self.metadata.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Sets the converter applied to textual writes.
    #[must_use]
    pub fn converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&str) -> Result<T, ConversionError> + Send + Sync + 'static,
    {
        self.metadata.converter = Some(Box::new(converter));
        self
    }

    /// Makes this shorthand metadata.
    ///
    /// `parts` lists every elementary property the expander may write; they
    /// are all reset when the shorthand itself is reset.
    #[must_use]
    pub fn expands<F>(mut self, parts: impl IntoIterator<Item = PropertyId>, expander: F) -> Self
    where
        F: Fn(&T) -> Result<ShorthandExpansion, ConversionError> + Send + Sync + 'static,
    {
        self.metadata.shorthand = Some((parts.into_iter().collect(), Box::new(expander)));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<K, T> {
        self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Property;
    use crate::registry::PropertyRegistry;
    use crate::source::ValueSource;
    use crate::store::PropertyStore;
    use crate::value::ErasedValue;
    use alloc::format;
    use alloc::string::String;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn metadata_defaults() {
        let metadata = PropertyMetadata::<u32, i32>::new(42);
        assert_eq!(metadata.default_value(), &42);
        assert!(!metadata.affects_layout());
        assert!(!metadata.has_changed_callback());
        assert!(!metadata.has_coerce_callback());
        assert!(!metadata.has_converter());
        assert!(!metadata.is_shorthand());
        assert!(metadata.shorthand_parts().is_empty());
        assert_eq!(metadata.convert("1"), None);
    }

    #[test]
    fn metadata_coerce_reads_the_node() {
        let mut registry = PropertyRegistry::<u32>::new();
        let max = registry.define("maxValue", PropertyMetadata::new(100.0_f64));
        let metadata = PropertyMetadataBuilder::<u32, f64>::new(0.0)
            .coerce(move |node, v| v.clamp(0.0, *node.get(max)))
            .build();

        let mut props = PropertyStore::new(1);
        let style = PropertyStore::new(1);
        let values = NodeValues::new(1, &registry, &props, &style);
        assert_eq!(metadata.coerce(&values, -10.0), 0.0);
        assert_eq!(metadata.coerce(&values, 50.0), 50.0);

        props.insert(max.id(), ErasedValue::new(10.0_f64), ValueSource::Local);
        let values = NodeValues::new(1, &registry, &props, &style);
        assert_eq!(metadata.coerce(&values, 50.0), 10.0);
        assert_eq!(values.node(), 1);
    }

    #[test]
    fn metadata_custom_equality() {
        let metadata = PropertyMetadataBuilder::<u32, f64>::new(0.0)
            .equality(|a, b| (a - b).abs() < 0.5)
            .build();
        assert!(metadata.values_equal(&1.0, &1.25));
        assert!(!metadata.values_equal(&1.0, &2.0));

        let plain = PropertyMetadata::<u32, f64>::new(0.0);
        assert!(!plain.values_equal(&1.0, &1.25));
    }

    #[test]
    fn metadata_changed_callback() {
        let last = Arc::new(AtomicU32::new(0));
        let seen = last.clone();

        let metadata = PropertyMetadataBuilder::<u32, i32>::new(0)
            .on_changed(move |node, _, new| {
                seen.store(node * 100 + *new as u32, Ordering::SeqCst);
            })
            .build();

        assert!(metadata.has_changed_callback());
        metadata.on_changed(3, &0, &7);
        assert_eq!(last.load(Ordering::SeqCst), 307);
    }

    #[test]
    fn metadata_shorthand() {
        let left: Property<i32> = Property::from_id(PropertyId::new(0));
        let right: Property<i32> = Property::from_id(PropertyId::new(1));

        let metadata = PropertyMetadataBuilder::<u32, i32>::new(0)
            .expands([left.id(), right.id()], move |v| {
                Ok(ShorthandExpansion::new().set(left, *v).set(right, *v))
            })
            .build();

        assert!(metadata.is_shorthand());
        assert_eq!(metadata.shorthand_parts(), &[left.id(), right.id()]);
        assert_eq!(metadata.expand(&4).map(|r| r.map(|e| e.len())), Some(Ok(2)));
    }

    #[test]
    fn metadata_debug() {
        let metadata = PropertyMetadataBuilder::<u32, String>::new(String::from("auto"))
            .affects_layout(true)
            .build();

        let debug = format!("{:?}", metadata);
        assert!(debug.contains("PropertyMetadata"));
        assert!(debug.contains("auto"));
        assert!(debug.contains("affects_layout: true"));
    }
}
