// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Property: property descriptors and per-object storage.
//!
//! This crate provides the static half of a property system for a
//! retained-mode UI tree: descriptors, value-source ranks, and the sparse slot
//! table each node and style object carries. Resolution (which source wins,
//! inheritance, native mirroring) lives in `understory_cascade`.
//!
//! ## Core Concepts
//!
//! ### Descriptors
//!
//! A [`PropertyRegistry`] is built once at startup. Each `define_*` call
//! returns a typed [`Property<T>`] (or [`Shorthand<T>`]) handle and fixes the
//! descriptor's [`PropertyKind`]:
//!
//! | Kind | Stored on | Entry points |
//! |------|-----------|--------------|
//! | [`Plain`](PropertyKind::Plain) | node | local |
//! | [`Inherited`](PropertyKind::Inherited) | node | local, inherited |
//! | [`Css`](PropertyKind::Css) | style | local, stylesheet |
//! | [`InheritedCss`](PropertyKind::InheritedCss) | style | local, stylesheet, inherited |
//! | [`Animated`](PropertyKind::Animated) | style | one per [`Layer`] |
//! | [`Shorthand`](PropertyKind::Shorthand) | style | local, stylesheet (expanding) |
//!
//! [`register`](PropertyRegistry::register) then installs the descriptor on a
//! type, exactly once.
//!
//! ### Value sources
//!
//! [`ValueSource`] ranks every value: `Default < Inherited < Stylesheet <
//! Local < Keyframe`. A [`PropertyStore`] records the rank next to each stored
//! value; an absent slot means the default at rank `Default`.
//!
//! ### Writes
//!
//! [`PropertyValue`] is the write envelope: a plain value, a value that must
//! notify even when unchanged, or the reset sentinel.
//!
//! ## Quick Start
//!
//! ```rust
//! use understory_property::{
//!     make_parser, make_validator, PropertyMetadataBuilder, PropertyRegistry,
//! };
//!
//! struct TextBase;
//!
//! let mut registry = PropertyRegistry::<u32>::new();
//! let font_size = registry.define_inherited_css(
//!     "fontSize",
//!     "font-size",
//!     PropertyMetadataBuilder::new(14.0_f64)
//!         .affects_layout(true)
//!         .converter(|text| {
//!             text.parse().map_err(|_| understory_property::ConversionError::invalid(text))
//!         })
//!         .build(),
//! );
//! let align = registry.define_css(
//!     "textAlignment",
//!     "text-align",
//!     PropertyMetadataBuilder::new(String::from("initial"))
//!         .converter(make_parser(make_validator(&["initial", "left", "center", "right"])))
//!         .build(),
//! );
//!
//! registry.register::<TextBase>(font_size).unwrap();
//! registry.register::<TextBase>(align).unwrap();
//! registry.check_registered().unwrap();
//!
//! let reg = registry.registration(align.id());
//! assert!(reg.convert("justify").is_err());
//! ```
//!
//! ## Memory Optimizations
//!
//! | Optimization | Description |
//! |--------------|-------------|
//! | **Sparse storage** | `PropertyStore` only allocates for written properties |
//! | **Shared defaults** | Default values stored in registry, not per-object |
//! | **Inline storage** | `SmallVec` for small property counts |
//! | **`PropertyId` as u16** | Compact property identification |
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod error;
mod expand;
mod id;
mod metadata;
mod node;
mod registry;
mod source;
mod store;
mod validate;
mod value;

pub use error::{ConfigurationError, ConversionError, PropertyError};
pub use expand::ShorthandExpansion;
pub use id::{Property, PropertyId, Shorthand};
pub use metadata::{
    CoerceValueCallback, EqualityComparer, PropertyChangedCallback, PropertyMetadata,
    PropertyMetadataBuilder, ShorthandExpander, ValueConverter,
};
pub use node::NodeValues;
pub use registry::{PropertyKind, PropertyRegistration, PropertyRegistry};
pub use source::{Layer, Scope, ValueSource};
pub use store::PropertyStore;
pub use validate::{KeywordValidator, Validator, make_keyword_parser, make_parser, make_validator};
pub use value::{ErasedValue, PropertyType, PropertyValue};
