// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits: the node tree and the native view.
//!
//! The cascade owns no nodes. It reads and writes per-node state through
//! [`PropertyHost`], which the surrounding framework implements over its own
//! tree, and mirrors values onto whatever [`NativeView`] a node has attached.

use core::ops::ControlFlow;

use understory_property::{ErasedValue, PropertyId, PropertyStore, Scope};

/// The tree the cascade operates on.
///
/// Every node owns two [`PropertyStore`]s: its own ([`Scope::Node`]) and its
/// style object's ([`Scope::Style`]). Only the tree-walk and storage methods
/// are required; the rest default to a host with no native views, no
/// listeners, and no layout.
///
/// # Example
///
/// ```rust
/// use core::ops::ControlFlow;
/// use understory_cascade::PropertyHost;
/// use understory_property::{PropertyStore, Scope};
///
/// struct Node {
///     parent: Option<usize>,
///     children: Vec<usize>,
///     props: PropertyStore<usize>,
///     style: PropertyStore<usize>,
/// }
///
/// struct Arena(Vec<Node>);
///
/// impl PropertyHost<usize> for Arena {
///     fn parent(&self, node: usize) -> Option<usize> {
///         self.0[node].parent
///     }
///
///     fn for_each_child(&self, node: usize, visit: &mut dyn FnMut(usize) -> ControlFlow<()>) {
///         for &child in &self.0[node].children {
///             if visit(child).is_break() {
///                 break;
///             }
///         }
///     }
///
///     fn store(&self, node: usize, scope: Scope) -> &PropertyStore<usize> {
///         match scope {
///             Scope::Node => &self.0[node].props,
///             Scope::Style => &self.0[node].style,
///         }
///     }
///
///     fn store_mut(&mut self, node: usize, scope: Scope) -> &mut PropertyStore<usize> {
///         match scope {
///             Scope::Node => &mut self.0[node].props,
///             Scope::Style => &mut self.0[node].style,
///         }
///     }
/// }
/// ```
pub trait PropertyHost<K: Copy> {
    /// Returns the parent of `node`.
    fn parent(&self, node: K) -> Option<K>;

    /// Visits the children of `node` in order until `visit` breaks.
    fn for_each_child(&self, node: K, visit: &mut dyn FnMut(K) -> ControlFlow<()>);

    /// Returns the store of `node` or of its style object.
    fn store(&self, node: K, scope: Scope) -> &PropertyStore<K>;

    /// Returns the store of `node` or of its style object, mutably.
    fn store_mut(&mut self, node: K, scope: Scope) -> &mut PropertyStore<K>;

    /// Returns the native view attached to `node`, if any.
    fn native_view(&self, node: K) -> Option<&dyn NativeView> {
        let _ = node;
        None
    }

    /// Returns the native view attached to `node` mutably, if any.
    fn native_view_mut(&mut self, node: K) -> Option<&mut dyn NativeView> {
        let _ = node;
        None
    }

    /// Returns `true` if anything listens for `event_name` on the node
    /// (or on its style object).
    fn has_listeners(&self, node: K, scope: Scope, event_name: &str) -> bool {
        let _ = (node, scope, event_name);
        false
    }

    /// Delivers a change event. Only called when
    /// [`has_listeners`](Self::has_listeners) returned `true`.
    fn notify(&mut self, node: K, event: &PropertyChangeEvent<'_>) {
        let _ = (node, event);
    }

    /// Invalidates layout for `node`.
    fn request_layout(&mut self, node: K) {
        let _ = node;
    }
}

/// An externally owned platform widget.
///
/// A view mirrors a subset of properties. Before the first framework write to
/// a mirrored property the cascade reads the view's own value and keeps it,
/// so detaching can restore the widget to how it was found.
pub trait NativeView {
    /// Returns `true` if this view has a native counterpart for `property`.
    fn mirrors(&self, property: PropertyId) -> bool;

    /// Reads the view's current value for a mirrored property.
    fn native_value(&self, property: PropertyId) -> ErasedValue;

    /// Writes a value onto the view.
    fn set_native_value(&mut self, property: PropertyId, value: &ErasedValue);
}

/// A committed property change.
#[derive(Clone, Copy, Debug)]
pub struct PropertyChangeEvent<'a> {
    /// `"<name>Change"`.
    pub event_name: &'a str,
    /// The property that changed.
    pub property: PropertyId,
    /// The descriptor name.
    pub property_name: &'static str,
    /// Whether the node or its style object changed.
    pub scope: Scope,
    /// The effective value before the change.
    pub old_value: &'a ErasedValue,
    /// The effective value after the change.
    pub value: &'a ErasedValue,
}
