// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification types.
//!
//! [`PropertyId`] is the small integer slot index assigned when a descriptor is
//! defined. [`Property<T>`] and [`Shorthand<T>`] wrap it with the value type so
//! reads and writes are checked at compile time.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// This is the index of the descriptor inside its
/// [`PropertyRegistry`](crate::PropertyRegistry). Per-object stores key their
/// slots by it, so the u16 size keeps slot tables compact.
///
/// # Example
///
/// ```rust
/// use understory_property::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a new property ID from the given index.
    ///
    /// This is normally done by the registry's `define_*` methods.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this property ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// A type-safe handle to an elementary property descriptor.
///
/// Returned by every `define_*` method of
/// [`PropertyRegistry`](crate::PropertyRegistry) except
/// [`define_shorthand`](crate::PropertyRegistry::define_shorthand). The phantom
/// type ties reads and writes to the descriptor's value type:
///
/// ```rust
/// use understory_property::{Property, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::<u32>::new();
/// let width: Property<f64> = registry.define(
///     "width",
///     PropertyMetadataBuilder::new(0.0_f64).build(),
/// );
/// assert_eq!(registry.name(width.id()), Some("width"));
/// ```
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed property from a property ID.
    ///
    /// The caller must make sure `id` was defined with value type `T`;
    /// resolution panics on a mismatch.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

/// A type-safe handle to a shorthand descriptor.
///
/// `T` is the raw shorthand value type (often `String`). Shorthands expand into
/// elementary [`Property`] writes, so they get their own handle type and their
/// own fallible entry points.
pub struct Shorthand<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Shorthand<T> {
    /// Creates a typed shorthand handle from a property ID.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

// Manual trait implementations to avoid requiring T: Clone, etc.

macro_rules! impl_handle_traits {
    ($handle:ident) => {
        impl<T> Copy for $handle<T> {}

        impl<T> Clone for $handle<T> {
            #[inline]
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> PartialEq for $handle<T> {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl<T> Eq for $handle<T> {}

        impl<T> Hash for $handle<T> {
            #[inline]
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        impl<T> fmt::Debug for $handle<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($handle))
                    .field("id", &self.id)
                    .field("type", &core::any::type_name::<T>())
                    .finish()
            }
        }

        impl<T> From<$handle<T>> for PropertyId {
            #[inline]
            fn from(handle: $handle<T>) -> Self {
                handle.id
            }
        }
    };
}

impl_handle_traits!(Property);
impl_handle_traits!(Shorthand);
