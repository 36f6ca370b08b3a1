// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Cascade: property value resolution for UI trees.
//!
//! This crate decides which value of a property is in effect on a node. It
//! works over descriptors from `understory_property` and over a tree it does
//! not own: the surrounding framework implements [`PropertyHost`] to expose
//! parent/child links, per-node stores, native views, and listeners.
//!
//! ## Resolution
//!
//! Every write enters through an entry point with a rank
//! (`Default < Inherited < Stylesheet < Local < Keyframe`) and only takes
//! effect if that rank is at least the rank currently recorded. There are two
//! resolvers behind [`Cascade`]:
//!
//! - **Ranked**: plain, inherited, and CSS properties keep one value and its
//!   rank. Resetting an inheritable property adopts the parent's value when
//!   the parent has one.
//! - **Layered**: animated properties keep a value per layer (default,
//!   stylesheet, local, keyframe) and a computed winner. Clearing the winning
//!   layer falls back to the next layer down.
//!
//! A committed change runs the change callback, mirrors the value onto the
//! node's native view, delivers a `"<name>Change"` event if anything listens,
//! and invalidates layout for layout-affecting properties.
//!
//! ## Inheritance
//!
//! Changes to inheritable properties flow to children at rank `Inherited`
//! and stop at any child with a stylesheet or local value. The tree hooks
//! [`Cascade::propagate_inherited_properties`] and
//! [`Cascade::clear_inherited_properties`] handle attach and detach.
//!
//! ## Quick Start
//!
//! ```rust
//! use core::ops::ControlFlow;
//! use understory_cascade::{Cascade, PropertyHost};
//! use understory_property::{PropertyMetadataBuilder, PropertyRegistry, PropertyStore, Scope, ValueSource};
//!
//! struct Node {
//!     parent: Option<usize>,
//!     children: Vec<usize>,
//!     props: PropertyStore<usize>,
//!     style: PropertyStore<usize>,
//! }
//!
//! struct Tree(Vec<Node>);
//!
//! impl PropertyHost<usize> for Tree {
//!     fn parent(&self, node: usize) -> Option<usize> {
//!         self.0[node].parent
//!     }
//!     fn for_each_child(&self, node: usize, visit: &mut dyn FnMut(usize) -> ControlFlow<()>) {
//!         for &child in &self.0[node].children {
//!             if visit(child).is_break() {
//!                 break;
//!             }
//!         }
//!     }
//!     fn store(&self, node: usize, scope: Scope) -> &PropertyStore<usize> {
//!         match scope {
//!             Scope::Node => &self.0[node].props,
//!             Scope::Style => &self.0[node].style,
//!         }
//!     }
//!     fn store_mut(&mut self, node: usize, scope: Scope) -> &mut PropertyStore<usize> {
//!         match scope {
//!             Scope::Node => &mut self.0[node].props,
//!             Scope::Style => &mut self.0[node].style,
//!         }
//!     }
//! }
//!
//! let mut registry = PropertyRegistry::new();
//! let color = registry.define_inherited_css(
//!     "color",
//!     "color",
//!     PropertyMetadataBuilder::new(String::from("black")).build(),
//! );
//!
//! let node = |key, parent| Node {
//!     parent,
//!     children: Vec::new(),
//!     props: PropertyStore::new(key),
//!     style: PropertyStore::new(key),
//! };
//! let mut tree = Tree(vec![node(0, None), node(1, Some(0))]);
//! tree.0[0].children.push(1);
//!
//! let cascade = Cascade::new(&registry);
//! cascade.set(&mut tree, 0, color, String::from("red"));
//! assert_eq!(cascade.get(&tree, 1, color), "red");
//! assert_eq!(cascade.source(&tree, 1, color), ValueSource::Inherited);
//!
//! // Stylesheet values never beat local ones.
//! cascade.set_stylesheet(&mut tree, 0, color, String::from("blue"));
//! assert_eq!(cascade.get(&tree, 0, color), "red");
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod cascade;
mod host;
mod layered;
mod native;
mod propagate;
mod resolve;
mod shorthand;
mod stylesheet;

#[cfg(test)]
mod testing;

pub use cascade::Cascade;
pub use host::{NativeView, PropertyChangeEvent, PropertyHost};
