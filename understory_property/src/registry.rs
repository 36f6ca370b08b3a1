// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property descriptor registry.
//!
//! This module provides [`PropertyRegistry`], which owns every descriptor,
//! hands out typed handles, tracks which type each descriptor was registered
//! on, and keeps the two inheritable-property lists that propagation walks.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::error::{ConfigurationError, ConversionError};
use crate::expand::ShorthandExpansion;
use crate::id::{Property, PropertyId, Shorthand};
use crate::metadata::PropertyMetadata;
use crate::node::NodeValues;
use crate::source::Scope;
use crate::value::{ErasedValue, PropertyType};

/// How a descriptor resolves its value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// A node property with Default and Local ranks.
    Plain,
    /// A node property that also inherits down the node tree.
    Inherited,
    /// A style property with Local and Stylesheet entry points.
    Css,
    /// A style property that also inherits down the tree of style objects.
    InheritedCss,
    /// A style property with four independently settable layers.
    Animated,
    /// A style property that expands into elementary style properties.
    Shorthand,
}

impl PropertyKind {
    /// Returns which per-node object stores this kind of property.
    #[must_use]
    pub const fn scope(self) -> Scope {
        match self {
            Self::Plain | Self::Inherited => Scope::Node,
            Self::Css | Self::InheritedCss | Self::Animated | Self::Shorthand => Scope::Style,
        }
    }

    /// Returns `true` for kinds that inherit from the parent.
    #[must_use]
    pub const fn inherits(self) -> bool {
        matches!(self, Self::Inherited | Self::InheritedCss)
    }

    /// Returns `true` for kinds that have a stylesheet entry point.
    #[must_use]
    pub const fn is_css(self) -> bool {
        matches!(self.scope(), Scope::Style)
    }
}

/// A registration entry for a descriptor.
///
/// This stores the descriptor's names, kind, value type, erased default, and
/// metadata. The erased accessors panic if handed a value of the wrong type;
/// typed handles make that impossible from safe call sites.
pub struct PropertyRegistration<K> {
    name: &'static str,
    css_name: Option<&'static str>,
    event_name: String,
    kind: PropertyKind,
    type_id: TypeId,
    type_name: &'static str,
    default_value: ErasedValue,
    metadata: Box<dyn ErasedMetadata<K>>,
    registered_on: Option<(TypeId, &'static str)>,
}

impl<K: Copy + 'static> PropertyRegistration<K> {
    /// Returns the descriptor name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the CSS name, for style-scoped kinds.
    #[must_use]
    #[inline]
    pub fn css_name(&self) -> Option<&'static str> {
        self.css_name
    }

    /// Returns the change event name, `"<name>Change"`.
    #[must_use]
    #[inline]
    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Returns the resolution kind.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Returns which per-node object stores this property.
    #[must_use]
    #[inline]
    pub fn scope(&self) -> Scope {
        self.kind.scope()
    }

    /// Returns the [`TypeId`] of the value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the value type.
    #[must_use]
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the descriptor default.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> &ErasedValue {
        &self.default_value
    }

    /// Returns whether changes invalidate layout.
    #[must_use]
    #[inline]
    pub fn affects_layout(&self) -> bool {
        self.metadata.affects_layout()
    }

    /// Returns the name of the type this descriptor was registered on.
    #[must_use]
    pub fn registered_on(&self) -> Option<&'static str> {
        self.registered_on.map(|(_, name)| name)
    }

    /// Compares two values with the descriptor's equality.
    #[must_use]
    pub fn values_equal(&self, a: &ErasedValue, b: &ErasedValue) -> bool {
        self.metadata.values_equal(a, b)
    }

    /// Returns whether a coercion callback is set.
    #[must_use]
    pub fn has_coerce(&self) -> bool {
        self.metadata.has_coerce()
    }

    /// Runs the coercion callback, or returns `value` unchanged.
    #[must_use]
    pub fn coerce(&self, node: &NodeValues<'_, K>, value: ErasedValue) -> ErasedValue {
        self.metadata.coerce(node, value)
    }

    /// Invokes the change callback, if any.
    pub fn notify_changed(&self, node: K, old_value: &ErasedValue, new_value: &ErasedValue) {
        self.metadata.notify_changed(node, old_value, new_value);
    }

    /// Converts text into a value of this descriptor's type.
    ///
    /// Without a converter, `String`-typed descriptors take the text as is
    /// and every other type fails with [`ConversionError::NoConverter`].
    pub fn convert(&self, text: &str) -> Result<ErasedValue, ConversionError> {
        self.metadata.convert(text)
    }

    /// Expands a raw shorthand value.
    pub fn expand(&self, value: &ErasedValue) -> Result<ShorthandExpansion, ConversionError> {
        self.metadata.expand(value)
    }

    /// Returns the elementary properties a shorthand writes.
    #[must_use]
    pub fn shorthand_parts(&self) -> &[PropertyId] {
        self.metadata.shorthand_parts()
    }
}

impl<K> fmt::Debug for PropertyRegistration<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("name", &self.name)
            .field("css_name", &self.css_name)
            .field("kind", &self.kind)
            .field("type_name", &self.type_name)
            .field("default_value", &self.default_value)
            .field("registered_on", &self.registered_on.map(|(_, name)| name))
            .finish_non_exhaustive()
    }
}

/// A registry for property descriptors.
///
/// Descriptors are defined once at startup, before any node exists, and the
/// registry is read-only afterwards. `K` is the node key passed to change and
/// coercion callbacks.
///
/// # Example
///
/// ```rust
/// use understory_property::{PropertyKind, PropertyMetadataBuilder, PropertyRegistry};
///
/// struct Label;
///
/// let mut registry = PropertyRegistry::<u32>::new();
/// let color = registry.define_inherited_css(
///     "color",
///     "color",
///     PropertyMetadataBuilder::new(String::from("black")).build(),
/// );
/// registry.register::<Label>(color).unwrap();
///
/// assert_eq!(registry.by_css_name("color"), Some(color.id()));
/// assert_eq!(registry.inheritable_css(), &[color.id()]);
/// assert_eq!(registry.registration(color.id()).kind(), PropertyKind::InheritedCss);
/// assert!(registry.register::<Label>(color).is_err());
/// ```
pub struct PropertyRegistry<K> {
    properties: Vec<PropertyRegistration<K>>,
    by_name: HashMap<&'static str, PropertyId>,
    by_css_name: HashMap<&'static str, PropertyId>,
    inheritable: Vec<PropertyId>,
    inheritable_css: Vec<PropertyId>,
}

impl<K> Default for PropertyRegistry<K> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            by_name: HashMap::new(),
            by_css_name: HashMap::new(),
            inheritable: Vec::new(),
            inheritable_css: Vec::new(),
        }
    }
}

impl<K: Copy + 'static> PropertyRegistry<K> {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a plain node property.
    ///
    /// If the metadata carries a coercion callback the property is coercible.
    ///
    /// # Panics
    ///
    /// Panics if the name is already defined, or if more than 65,535
    /// descriptors are defined.
    pub fn define<T: PropertyType>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Property<T> {
        Property::from_id(self.define_kind(name, None, PropertyKind::Plain, metadata))
    }

    /// Defines a node property that inherits down the node tree.
    ///
    /// # Panics
    ///
    /// See [`define`](Self::define).
    pub fn define_inherited<T: PropertyType>(
        &mut self,
        name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Property<T> {
        Property::from_id(self.define_kind(name, None, PropertyKind::Inherited, metadata))
    }

    /// Defines a style property.
    ///
    /// # Panics
    ///
    /// Panics if the name or CSS name is already defined.
    pub fn define_css<T: PropertyType>(
        &mut self,
        name: &'static str,
        css_name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Property<T> {
        Property::from_id(self.define_kind(name, Some(css_name), PropertyKind::Css, metadata))
    }

    /// Defines a style property that inherits down the tree of style objects.
    ///
    /// # Panics
    ///
    /// Panics if the name or CSS name is already defined.
    pub fn define_inherited_css<T: PropertyType>(
        &mut self,
        name: &'static str,
        css_name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Property<T> {
        Property::from_id(self.define_kind(
            name,
            Some(css_name),
            PropertyKind::InheritedCss,
            metadata,
        ))
    }

    /// Defines a layered style property that keyframe animations can drive.
    ///
    /// # Panics
    ///
    /// Panics if the name or CSS name is already defined.
    pub fn define_animated_css<T: PropertyType>(
        &mut self,
        name: &'static str,
        css_name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Property<T> {
        Property::from_id(self.define_kind(
            name,
            Some(css_name),
            PropertyKind::Animated,
            metadata,
        ))
    }

    /// Defines a shorthand style property.
    ///
    /// # Panics
    ///
    /// Panics if the name or CSS name is already defined, or if the metadata
    /// has no expander (see
    /// [`PropertyMetadataBuilder::expands`](crate::PropertyMetadataBuilder::expands)).
    pub fn define_shorthand<T: PropertyType>(
        &mut self,
        name: &'static str,
        css_name: &'static str,
        metadata: PropertyMetadata<K, T>,
    ) -> Shorthand<T> {
        assert!(
            metadata.is_shorthand(),
            "Shorthand '{name}' has no expander"
        );
        Shorthand::from_id(self.define_kind(
            name,
            Some(css_name),
            PropertyKind::Shorthand,
            metadata,
        ))
    }

    fn define_kind<T: PropertyType>(
        &mut self,
        name: &'static str,
        css_name: Option<&'static str>,
        kind: PropertyKind,
        metadata: PropertyMetadata<K, T>,
    ) -> PropertyId {
        assert!(
            !self.by_name.contains_key(name),
            "Property '{name}' is already defined"
        );
        if let Some(css_name) = css_name {
            assert!(
                !self.by_css_name.contains_key(css_name),
                "CSS property '{css_name}' is already defined"
            );
        }
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties defined (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            name,
            css_name,
            event_name: format!("{name}Change"),
            kind,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            default_value: ErasedValue::new(metadata.default_value().clone()),
            metadata: Box::new(metadata),
            registered_on: None,
        });
        self.by_name.insert(name, id);
        if let Some(css_name) = css_name {
            self.by_css_name.insert(css_name, id);
        }
        match kind {
            PropertyKind::Inherited => self.inheritable.push(id),
            PropertyKind::InheritedCss => self.inheritable_css.push(id),
            _ => {}
        }

        id
    }

    /// Installs a descriptor on type `O`.
    ///
    /// Each descriptor can be registered exactly once.
    ///
    /// # Panics
    ///
    /// Panics if `property` was not defined in this registry.
    pub fn register<O: ?Sized + 'static>(
        &mut self,
        property: impl Into<PropertyId>,
    ) -> Result<(), ConfigurationError> {
        let id = property.into();
        let registration = self.registration_mut(id);
        if registration.registered_on.is_some() {
            return Err(ConfigurationError::AlreadyRegistered {
                name: registration.name,
            });
        }
        registration.registered_on = Some((TypeId::of::<O>(), type_name::<O>()));
        debug!(
            property = registration.name,
            owner = type_name::<O>(),
            "registered property"
        );
        Ok(())
    }

    /// Returns the descriptors registered on type `O`, in definition order.
    pub fn registered_on<O: ?Sized + 'static>(&self) -> impl Iterator<Item = PropertyId> + '_ {
        let owner = TypeId::of::<O>();
        self.iter()
            .filter(move |(_, r)| r.registered_on.is_some_and(|(ty, _)| ty == owner))
            .map(|(id, _)| id)
    }

    /// Returns the descriptors that were defined but never registered.
    pub fn unregistered(&self) -> impl Iterator<Item = PropertyId> + '_ {
        self.iter()
            .filter(|(_, r)| r.registered_on.is_none())
            .map(|(id, _)| id)
    }

    /// Startup lint: fails if any descriptor was never registered on a type.
    ///
    /// Each offending descriptor is also logged at `warn` level.
    pub fn check_registered(&self) -> Result<(), ConfigurationError> {
        let names: Vec<_> = self
            .unregistered()
            .map(|id| self.registration(id).name)
            .collect();
        if names.is_empty() {
            return Ok(());
        }
        for name in &names {
            warn!(property = *name, "property defined but never registered");
        }
        Err(ConfigurationError::Unregistered { names })
    }

    /// Returns the inheritable node properties, in definition order.
    #[must_use]
    pub fn inheritable(&self) -> &[PropertyId] {
        &self.inheritable
    }

    /// Returns the inheritable style properties, in definition order.
    #[must_use]
    pub fn inheritable_css(&self) -> &[PropertyId] {
        &self.inheritable_css
    }

    /// Returns the number of defined descriptors.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no descriptors are defined.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<PropertyId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a style descriptor by CSS name.
    #[must_use]
    pub fn by_css_name(&self, css_name: &str) -> Option<PropertyId> {
        self.by_css_name.get(css_name).copied()
    }

    /// Returns the name of a descriptor.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(|r| r.name)
    }

    /// Returns the registration for a descriptor.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration<K>> {
        self.properties.get(usize::from(id.index()))
    }

    /// Returns the registration for a descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not defined in this registry.
    #[must_use]
    pub fn registration(&self, id: PropertyId) -> &PropertyRegistration<K> {
        match self.get(id) {
            Some(registration) => registration,
            None => panic!("{id:?} not found in registry"),
        }
    }

    fn registration_mut(&mut self, id: PropertyId) -> &mut PropertyRegistration<K> {
        match self.properties.get_mut(usize::from(id.index())) {
            Some(registration) => registration,
            None => panic!("{id:?} not found in registry"),
        }
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not defined or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyType>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<K, T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.as_any().downcast_ref())
    }

    /// Returns an iterator over all descriptors in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration<K>)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }
}

impl<K> fmt::Debug for PropertyRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self.properties.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .field("inheritable", &self.inheritable)
            .field("inheritable_css", &self.inheritable_css)
            .finish()
    }
}

/// Type-erased metadata trait for heterogeneous storage.
trait ErasedMetadata<K>: Any {
    fn as_any(&self) -> &dyn Any;
    fn affects_layout(&self) -> bool;
    fn values_equal(&self, a: &ErasedValue, b: &ErasedValue) -> bool;
    fn has_coerce(&self) -> bool;
    fn coerce(&self, node: &NodeValues<'_, K>, value: ErasedValue) -> ErasedValue;
    fn notify_changed(&self, node: K, old_value: &ErasedValue, new_value: &ErasedValue);
    fn convert(&self, text: &str) -> Result<ErasedValue, ConversionError>;
    fn expand(&self, value: &ErasedValue) -> Result<ShorthandExpansion, ConversionError>;
    fn shorthand_parts(&self) -> &[PropertyId];
}

fn typed<T: PropertyType>(value: &ErasedValue) -> &T {
    match value.downcast_ref() {
        Some(value) => value,
        None => panic!("expected a value of type {}, got {value:?}", type_name::<T>()),
    }
}

impl<K: Copy + 'static, T: PropertyType> ErasedMetadata<K> for PropertyMetadata<K, T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn affects_layout(&self) -> bool {
        Self::affects_layout(self)
    }

    fn values_equal(&self, a: &ErasedValue, b: &ErasedValue) -> bool {
        Self::values_equal(self, typed::<T>(a), typed::<T>(b))
    }

    fn has_coerce(&self) -> bool {
        self.has_coerce_callback()
    }

    fn coerce(&self, node: &NodeValues<'_, K>, value: ErasedValue) -> ErasedValue {
        if !self.has_coerce_callback() {
            return value;
        }
        match value.downcast::<T>() {
            Ok(value) => ErasedValue::new(Self::coerce(self, node, value)),
            Err(value) => panic!("expected a value of type {}, got {value:?}", type_name::<T>()),
        }
    }

    fn notify_changed(&self, node: K, old_value: &ErasedValue, new_value: &ErasedValue) {
        if self.has_changed_callback() {
            self.on_changed(node, typed::<T>(old_value), typed::<T>(new_value));
        }
    }

    fn convert(&self, text: &str) -> Result<ErasedValue, ConversionError> {
        match Self::convert(self, text) {
            Some(result) => result.map(ErasedValue::new),
            None if TypeId::of::<T>() == TypeId::of::<String>() => {
                Ok(ErasedValue::new(String::from(text)))
            }
            None => Err(ConversionError::NoConverter {
                value: String::from(text),
            }),
        }
    }

    fn expand(&self, value: &ErasedValue) -> Result<ShorthandExpansion, ConversionError> {
        Self::expand(self, typed::<T>(value)).unwrap_or_else(|| Ok(ShorthandExpansion::new()))
    }

    fn shorthand_parts(&self) -> &[PropertyId] {
        Self::shorthand_parts(self)
    }
}
