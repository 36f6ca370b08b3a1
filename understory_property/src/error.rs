// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;
use alloc::vec::Vec;

/// A descriptor was wired up incorrectly at startup.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// [`register`](crate::PropertyRegistry::register) was called twice for the
    /// same descriptor.
    #[error("property `{name}` already registered")]
    AlreadyRegistered {
        /// The descriptor name.
        name: &'static str,
    },
    /// Descriptors that were defined but never registered on a type.
    #[error("properties defined but never registered: {names:?}")]
    Unregistered {
        /// The offending descriptor names, in definition order.
        names: Vec<&'static str>,
    },
}

/// Text could not be converted to a property value.
///
/// A write that fails conversion leaves the property untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A converter or keyword parser rejected the input.
    #[error("invalid value: {value}")]
    InvalidValue {
        /// The rejected input.
        value: String,
    },
    /// The property has no converter and is not `String`-typed.
    #[error("no converter for textual value: {value}")]
    NoConverter {
        /// The rejected input.
        value: String,
    },
}

impl ConversionError {
    /// Shorthand for [`ConversionError::InvalidValue`].
    #[must_use]
    pub fn invalid(value: impl Into<String>) -> Self {
        Self::InvalidValue {
            value: value.into(),
        }
    }
}

/// Failure applying a declaration by CSS name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The value text was rejected.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// No CSS-scoped descriptor has this CSS name.
    #[error("unknown css property `{0}`")]
    UnknownCssProperty(String),
}
