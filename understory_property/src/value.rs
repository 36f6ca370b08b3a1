// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property values: the typed write envelope and type-erased storage.
//!
//! [`PropertyValue`] is what callers hand to a write entry point. It makes the
//! reset sentinel and the force-notify marker explicit variants instead of
//! magic payloads. [`ErasedValue`] is how stores, registries, and change events
//! hold values of heterogeneous types.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// Bounds every property value type must satisfy.
///
/// Values are cloned into stores, compared to detect changes, and formatted
/// in diagnostics.
pub trait PropertyType: Clone + PartialEq + fmt::Debug + 'static {}

impl<T: Clone + PartialEq + fmt::Debug + 'static> PropertyType for T {}

/// A write to a property.
///
/// ```rust
/// use understory_property::PropertyValue;
///
/// let plain: PropertyValue<f64> = 10.0.into();
/// assert_eq!(plain, PropertyValue::Value(10.0));
/// assert!(PropertyValue::Forced(10.0).is_forced());
/// assert!(PropertyValue::<f64>::Unset.is_unset());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue<T> {
    /// Store the value; notify only if the effective value changes.
    Value(T),
    /// Store the value and notify even if it compares equal to the current one.
    Forced(T),
    /// Retract the value written through this entry point.
    Unset,
}

impl<T> PropertyValue<T> {
    /// Returns `true` for [`PropertyValue::Unset`].
    #[must_use]
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` for [`PropertyValue::Forced`].
    #[must_use]
    #[inline]
    pub fn is_forced(&self) -> bool {
        matches!(self, Self::Forced(_))
    }

    /// Returns the payload, or `None` for a reset.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Value(value) | Self::Forced(value) => Some(value),
            Self::Unset => None,
        }
    }

    /// Maps the payload, keeping the variant.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PropertyValue<U> {
        match self {
            Self::Value(value) => PropertyValue::Value(f(value)),
            Self::Forced(value) => PropertyValue::Forced(f(value)),
            Self::Unset => PropertyValue::Unset,
        }
    }
}

impl<T> From<T> for PropertyValue<T> {
    #[inline]
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

/// A type-erased property value.
///
/// Wraps any [`PropertyType`] on the heap together with its [`TypeId`].
/// Unlike `Box<dyn Any>` it can be cloned, compared, and debug-printed.
///
/// # Example
///
/// ```rust
/// use understory_property::ErasedValue;
///
/// let value = ErasedValue::new(42_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&42));
/// assert_eq!(value, ErasedValue::new(42_i32));
/// assert_ne!(value, ErasedValue::new(42_i64));
/// ```
pub struct ErasedValue {
    inner: Box<dyn ErasedValueTrait>,
    type_id: TypeId,
}

impl ErasedValue {
    /// Creates a new erased value from a concrete value.
    #[must_use]
    pub fn new<T: PropertyType>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            inner: Box::new(value),
        }
    }

    /// Returns the [`TypeId`] of the contained value.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if the contained value is of type `T`.
    #[must_use]
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Attempts to downcast to a reference of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            self.inner.as_any().downcast_ref()
        } else {
            None
        }
    }

    /// Attempts to take the contained value out as a `T`.
    ///
    /// Returns the erased value unchanged if the type does not match.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let type_id = self.type_id;
        match self.inner.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            // The type id matched, so this arm is never taken.
            Err(_) => unreachable!("ErasedValue type id {type_id:?} did not match its contents"),
        }
    }
}

impl Clone for ErasedValue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
            type_id: self.type_id,
        }
    }
}

impl PartialEq for ErasedValue {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.inner.eq_any(other.inner.as_any())
    }
}

impl fmt::Debug for ErasedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt_debug(f)
    }
}

/// Trait object for type-erased values that can be cloned, compared, and printed.
trait ErasedValueTrait: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait>;
    fn eq_any(&self, other: &dyn Any) -> bool;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: PropertyType> ErasedValueTrait for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedValueTrait> {
        Box::new(self.clone())
    }

    fn eq_any(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
