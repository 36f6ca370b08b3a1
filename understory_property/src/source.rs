// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value-source ranks, animated layers, and storage scopes.

use core::fmt;

/// Where the effective value of a property came from.
///
/// The variants are ordered from lowest to highest priority, and that order is
/// the only rule behind every precedence decision: a write at rank `R` changes
/// the effective value only when `R` is at least the recorded rank, and a reset
/// at rank `R` only applies when `R` is at least the recorded rank.
///
/// ```rust
/// use understory_property::ValueSource;
///
/// assert!(ValueSource::Default < ValueSource::Inherited);
/// assert!(ValueSource::Stylesheet < ValueSource::Local);
/// assert!(ValueSource::Local.admits(ValueSource::Stylesheet));
/// assert!(!ValueSource::Stylesheet.admits(ValueSource::Local));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueSource {
    /// No value recorded; the descriptor default is in effect.
    #[default]
    Default = 0,
    /// Pushed down from the parent.
    Inherited = 1,
    /// Applied by a matched stylesheet declaration.
    Stylesheet = 2,
    /// Set explicitly by the author.
    Local = 3,
    /// Driven by a running keyframe animation.
    Keyframe = 4,
}

impl ValueSource {
    /// Returns `true` if a write or reset arriving at rank `self` may replace
    /// a value currently recorded at rank `current`.
    ///
    /// Ties favor the incoming write.
    #[must_use]
    #[inline]
    pub fn admits(self, current: Self) -> bool {
        self >= current
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Inherited => "inherited",
            Self::Stylesheet => "stylesheet",
            Self::Local => "local",
            Self::Keyframe => "keyframe",
        })
    }
}

/// One of the four independently settable layers of an animated property.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// A per-object override of the descriptor default.
    Default,
    /// The stylesheet layer.
    Stylesheet,
    /// The author-set layer.
    Local,
    /// The keyframe animation layer.
    Keyframe,
}

impl Layer {
    /// All layers, highest priority first.
    pub const DESCENDING: [Self; 4] = [Self::Keyframe, Self::Local, Self::Stylesheet, Self::Default];

    /// Returns the value-source rank this layer writes at.
    #[must_use]
    #[inline]
    pub const fn source(self) -> ValueSource {
        match self {
            Self::Default => ValueSource::Default,
            Self::Stylesheet => ValueSource::Stylesheet,
            Self::Local => ValueSource::Local,
            Self::Keyframe => ValueSource::Keyframe,
        }
    }

    /// Returns the layer written by an entry point of the given rank.
    ///
    /// There is no inherited layer, so [`ValueSource::Inherited`] maps to `None`.
    #[must_use]
    pub const fn from_source(source: ValueSource) -> Option<Self> {
        match source {
            ValueSource::Default => Some(Self::Default),
            ValueSource::Inherited => None,
            ValueSource::Stylesheet => Some(Self::Stylesheet),
            ValueSource::Local => Some(Self::Local),
            ValueSource::Keyframe => Some(Self::Keyframe),
        }
    }
}

/// Which per-node object holds a descriptor's state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The node's own store.
    Node,
    /// The store of the node's style object.
    Style,
}
