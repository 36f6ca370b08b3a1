// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The typed entry points.

use core::any::{TypeId, type_name};
use core::fmt;

use understory_property::{
    ConversionError, ErasedValue, Layer, NodeValues, Property, PropertyId, PropertyKind,
    PropertyRegistration, PropertyRegistry, PropertyType, PropertyValue, Scope, Shorthand,
    ValueSource,
};

use crate::host::PropertyHost;
use crate::resolve::WriteFlags;

/// Resolves property values over a [`PropertyHost`] tree.
///
/// A `Cascade` borrows the registry and holds no other state: everything
/// per-node lives in the host's stores, so one cascade can serve any number
/// of trees.
///
/// Writes arrive through an entry point with a rank (`set` is
/// [`Local`](ValueSource::Local), `set_stylesheet` is
/// [`Stylesheet`](ValueSource::Stylesheet), and so on) and only take effect
/// when that rank is at least the rank currently recorded. A committed change
/// runs the change callback, mirrors the value to the native view, delivers a
/// change event and invalidates layout, in that order.
///
/// # Panics
///
/// Entry points panic on programmer errors: a handle from another registry,
/// a handle whose type does not match the descriptor, or an entry point the
/// descriptor's [`PropertyKind`] does not have.
pub struct Cascade<'r, K> {
    registry: &'r PropertyRegistry<K>,
}

impl<K> Clone for Cascade<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Cascade<'_, K> {}

impl<K> fmt::Debug for Cascade<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cascade")
            .field("registry", self.registry)
            .finish()
    }
}

impl<'r, K> Cascade<'r, K> {
    /// Creates a cascade over `registry`.
    #[must_use]
    pub fn new(registry: &'r PropertyRegistry<K>) -> Self {
        Self { registry }
    }

    /// Returns the registry this cascade resolves against.
    #[must_use]
    #[inline]
    pub fn registry(&self) -> &'r PropertyRegistry<K> {
        self.registry
    }
}

fn downcast<'a, K: Copy + 'static, T: 'static>(
    registration: &PropertyRegistration<K>,
    value: &'a ErasedValue,
) -> &'a T {
    match value.downcast_ref() {
        Some(value) => value,
        None => panic!(
            "value of '{}' is not a {}",
            registration.name(),
            type_name::<T>()
        ),
    }
}

fn assert_style<K: Copy + 'static>(registration: &PropertyRegistration<K>) {
    assert!(
        registration.kind().is_css() && registration.kind() != PropertyKind::Shorthand,
        "'{}' is not a style property",
        registration.name()
    );
}

impl<'r, K: Copy + fmt::Debug + 'static> Cascade<'r, K> {
    /// Looks up a registration and checks that it holds `T`.
    fn typed<T: PropertyType>(&self, id: PropertyId) -> &'r PropertyRegistration<K> {
        let registration = self.registry.registration(id);
        assert!(
            registration.type_id() == TypeId::of::<T>(),
            "property '{}' holds {}, not {}",
            registration.name(),
            registration.type_name(),
            type_name::<T>()
        );
        registration
    }

    /// Read access to the effective values of `node`, for coercion.
    pub(crate) fn node_values<'a, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &'a H,
        node: K,
    ) -> NodeValues<'a, K>
    where
        'r: 'a,
    {
        NodeValues::new(
            node,
            self.registry,
            host.store(node, Scope::Node),
            host.store(node, Scope::Style),
        )
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the effective value of `property` on `node`.
    pub fn get<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        property: Property<T>,
    ) -> T {
        self.get_ref(host, node, property).clone()
    }

    /// Returns a reference to the effective value of `property` on `node`.
    ///
    /// Without a stored value this borrows the registry's default.
    pub fn get_ref<'a, T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &'a H,
        node: K,
        property: Property<T>,
    ) -> &'a T
    where
        'r: 'a,
    {
        let id = property.id();
        let registration = self.typed::<T>(id);
        let value = host
            .store(node, registration.scope())
            .value(id)
            .unwrap_or_else(|| registration.default_value());
        downcast(registration, value)
    }

    /// Returns the rank of the value currently in effect.
    pub fn source<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        property: impl Into<PropertyId>,
    ) -> ValueSource {
        let id = property.into();
        let scope = self.registry.registration(id).scope();
        host.store(node, scope).source(id)
    }

    /// Returns `true` if anything above the default is in effect.
    pub fn is_set<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        property: impl Into<PropertyId>,
    ) -> bool {
        self.source(host, node, property) != ValueSource::Default
    }

    /// Returns the value one layer of an animated property holds, if any.
    pub fn layer_value<'a, T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &'a H,
        node: K,
        property: Property<T>,
        layer: Layer,
    ) -> Option<&'a T> {
        let id = property.id();
        let registration = self.typed::<T>(id);
        host.store(node, registration.scope())
            .layer(id, layer)
            .map(|value| downcast(registration, value))
    }

    /// Returns the raw value last applied to a shorthand, or its default.
    pub fn get_shorthand<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        shorthand: Shorthand<T>,
    ) -> T {
        let id = shorthand.id();
        let registration = self.typed::<T>(id);
        let value = host
            .store(node, registration.scope())
            .value(id)
            .unwrap_or_else(|| registration.default_value());
        let value: &T = downcast(registration, value);
        value.clone()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes `property` through the local entry point.
    ///
    /// For animated properties this is the [`Local`](Layer::Local) layer.
    /// [`PropertyValue::Unset`] retracts the local value: inherited kinds fall
    /// back to the parent's value, animated ones to their next layer, and
    /// everything else to the default.
    pub fn set<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        value: impl Into<PropertyValue<T>>,
    ) {
        let id = property.id();
        self.typed::<T>(id);
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Local,
            value.into().map(ErasedValue::new),
            WriteFlags::empty(),
        );
    }

    /// Retracts the local value of `property`.
    pub fn reset<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
    ) {
        self.set(host, node, property, PropertyValue::Unset);
    }

    /// Converts `text` and writes it through the local entry point.
    ///
    /// On a [`ConversionError`] nothing is written.
    pub fn set_str<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        text: &str,
    ) -> Result<(), ConversionError> {
        let id = property.id();
        let value = self.typed::<T>(id).convert(text)?;
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Local,
            PropertyValue::Value(value),
            WriteFlags::empty(),
        );
        Ok(())
    }

    /// Writes a style property through the stylesheet entry point.
    ///
    /// Has no effect while a local value is in effect.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not a style property.
    pub fn set_stylesheet<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        value: impl Into<PropertyValue<T>>,
    ) {
        let id = property.id();
        assert_style(self.typed::<T>(id));
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Stylesheet,
            value.into().map(ErasedValue::new),
            WriteFlags::empty(),
        );
    }

    /// Converts `text` and writes it through the stylesheet entry point.
    ///
    /// On a [`ConversionError`] nothing is written.
    pub fn set_stylesheet_str<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        text: &str,
    ) -> Result<(), ConversionError> {
        let id = property.id();
        let registration = self.typed::<T>(id);
        assert_style(registration);
        let value = registration.convert(text)?;
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Stylesheet,
            PropertyValue::Value(value),
            WriteFlags::empty(),
        );
        Ok(())
    }

    /// Pushes an inherited value onto `node`.
    ///
    /// This is how parents hand values to their children; it loses to every
    /// explicit source.
    ///
    /// # Panics
    ///
    /// Panics if `property` does not inherit.
    pub fn set_inherited_value<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        value: impl Into<PropertyValue<T>>,
    ) {
        let id = property.id();
        let registration = self.typed::<T>(id);
        assert!(
            registration.kind().inherits(),
            "'{}' does not inherit",
            registration.name()
        );
        self.write_ranked(
            host,
            node,
            id,
            ValueSource::Inherited,
            value.into().map(ErasedValue::new),
            WriteFlags::empty(),
        );
    }

    /// Writes the keyframe layer of an animated property.
    pub fn set_keyframe<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        value: impl Into<PropertyValue<T>>,
    ) {
        self.set_layer(host, node, property, Layer::Keyframe, value);
    }

    /// Writes one layer of an animated property.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not animated.
    pub fn set_layer<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        layer: Layer,
        value: impl Into<PropertyValue<T>>,
    ) {
        let id = property.id();
        let registration = self.typed::<T>(id);
        assert!(
            registration.kind() == PropertyKind::Animated,
            "'{}' is not animated",
            registration.name()
        );
        self.write_layer(
            host,
            node,
            id,
            layer,
            value.into().map(ErasedValue::new),
            WriteFlags::empty(),
        );
    }

    /// Applies a shorthand through the local entry point.
    ///
    /// Fails, writing nothing, if the expander rejects the value.
    pub fn set_shorthand<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        shorthand: Shorthand<T>,
        value: impl Into<PropertyValue<T>>,
    ) -> Result<(), ConversionError> {
        let id = shorthand.id();
        self.typed::<T>(id);
        self.apply_shorthand(
            host,
            node,
            id,
            ValueSource::Local,
            value.into().map(ErasedValue::new),
        )
    }

    /// Applies a shorthand through the stylesheet entry point.
    pub fn set_shorthand_stylesheet<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        shorthand: Shorthand<T>,
        value: impl Into<PropertyValue<T>>,
    ) -> Result<(), ConversionError> {
        let id = shorthand.id();
        self.typed::<T>(id);
        self.apply_shorthand(
            host,
            node,
            id,
            ValueSource::Stylesheet,
            value.into().map(ErasedValue::new),
        )
    }

    /// Converts `text` and applies it as a local shorthand value.
    pub fn set_shorthand_str<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        shorthand: Shorthand<T>,
        text: &str,
    ) -> Result<(), ConversionError> {
        let id = shorthand.id();
        let value = self.typed::<T>(id).convert(text)?;
        self.apply_shorthand(host, node, id, ValueSource::Local, PropertyValue::Value(value))
    }

    /// Runs the coercion callback again over the last requested value.
    ///
    /// Call this when something the callback depends on has changed. Without
    /// a requested value the descriptor default is coerced and written.
    pub fn coerce<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
    ) {
        let id = property.id();
        let registration = self.typed::<T>(id);
        let requested = host
            .store(node, registration.scope())
            .requested(id)
            .unwrap_or_else(|| registration.default_value())
            .clone();
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Local,
            PropertyValue::Value(requested),
            WriteFlags::empty(),
        );
    }

    /// Records a value the native view reported on its own, such as text the
    /// user typed.
    ///
    /// The value is stored at [`Local`](ValueSource::Local) and the change
    /// callback, event, and layout request fire as usual, but nothing is
    /// written back to the view and no coercion runs.
    pub fn native_value_changed<T: PropertyType, H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        property: Property<T>,
        value: T,
    ) {
        let id = property.id();
        self.typed::<T>(id);
        self.write_entry(
            host,
            node,
            id,
            ValueSource::Local,
            PropertyValue::Value(ErasedValue::new(value)),
            WriteFlags::FROM_NATIVE,
        );
    }

    /// Routes a write to the resolver for the descriptor's kind.
    pub(crate) fn write_entry<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        entry: ValueSource,
        value: PropertyValue<ErasedValue>,
        flags: WriteFlags,
    ) {
        let registration = self.registry.registration(id);
        match registration.kind() {
            PropertyKind::Animated => match Layer::from_source(entry) {
                Some(layer) => self.write_layer(host, node, id, layer, value, flags),
                None => panic!("animated '{}' has no {entry} layer", registration.name()),
            },
            PropertyKind::Shorthand => panic!(
                "'{}' is a shorthand and must be written through the shorthand entry points",
                registration.name()
            ),
            _ => self.write_ranked(host, node, id, entry, value, flags),
        }
    }
}
