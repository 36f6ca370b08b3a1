// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree inheritance propagation.
//!
//! Inherited values travel down through the `Inherited` entry point, so a
//! child with a stylesheet or local value is never overwritten and the walk
//! stops there on its own.

use core::fmt;
use core::ops::ControlFlow;

use smallvec::SmallVec;
use tracing::debug;
use understory_property::{ErasedValue, PropertyId, PropertyValue, Scope, ValueSource};

use crate::cascade::Cascade;
use crate::host::PropertyHost;
use crate::resolve::{WriteFlags, effective};

fn children<K: Copy, H: PropertyHost<K> + ?Sized>(host: &H, node: K) -> SmallVec<[K; 8]> {
    let mut children = SmallVec::new();
    host.for_each_child(node, &mut |child| {
        children.push(child);
        ControlFlow::Continue(())
    });
    children
}

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Pushes a changed inheritable value to the children of `node`.
    ///
    /// `value` is `None` when `node` fell back to the default: children that
    /// inherited are then reset, which cascades on down.
    pub(crate) fn propagate_change<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        value: Option<&ErasedValue>,
    ) {
        let scope = self.registry().registration(id).scope();
        for child in children(host, node) {
            let source = host.store(child, scope).source(id);
            match value {
                None if source == ValueSource::Inherited => {
                    self.write_ranked(
                        host,
                        child,
                        id,
                        ValueSource::Inherited,
                        PropertyValue::Unset,
                        WriteFlags::empty(),
                    );
                }
                Some(value) if source <= ValueSource::Inherited => {
                    self.write_ranked(
                        host,
                        child,
                        id,
                        ValueSource::Inherited,
                        PropertyValue::Value(value.clone()),
                        WriteFlags::empty(),
                    );
                }
                _ => {}
            }
        }
    }

    /// Pushes every inheritable value `node` holds down to its children.
    ///
    /// Call this after `node` gains a child. Children with a stylesheet or
    /// local value keep it. Does nothing if `node` holds no inheritable value.
    pub fn propagate_inherited_properties<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
    ) {
        let registry = self.registry();
        let values: SmallVec<[(PropertyId, Scope, ErasedValue); 8]> = registry
            .inheritable()
            .iter()
            .chain(registry.inheritable_css())
            .filter_map(|&id| {
                let registration = registry.registration(id);
                let scope = registration.scope();
                let store = host.store(node, scope);
                (store.source(id) != ValueSource::Default)
                    .then(|| (id, scope, effective(store, registration, id)))
            })
            .collect();
        if values.is_empty() {
            return;
        }

        let children = children(host, node);
        debug!(
            ?node,
            properties = values.len(),
            children = children.len(),
            "propagating inherited properties"
        );
        for child in children {
            for (id, scope, value) in &values {
                if host.store(child, *scope).source(*id) <= ValueSource::Inherited {
                    self.write_ranked(
                        host,
                        child,
                        *id,
                        ValueSource::Inherited,
                        PropertyValue::Value(value.clone()),
                        WriteFlags::empty(),
                    );
                }
            }
        }
    }

    /// Drops every value `node` inherited, falling back to the defaults.
    ///
    /// Call this when `node` is detached from its parent. Descendants that
    /// inherited through `node` are reset as well.
    pub fn clear_inherited_properties<H: PropertyHost<K> + ?Sized>(&self, host: &mut H, node: K) {
        let registry = self.registry();
        let inherited: SmallVec<[PropertyId; 8]> = registry
            .inheritable()
            .iter()
            .chain(registry.inheritable_css())
            .copied()
            .filter(|&id| {
                let scope = registry.registration(id).scope();
                host.store(node, scope).source(id) == ValueSource::Inherited
            })
            .collect();

        debug!(?node, properties = inherited.len(), "clearing inherited properties");
        for id in inherited {
            self.write_ranked(
                host,
                node,
                id,
                ValueSource::Inherited,
                PropertyValue::Unset,
                WriteFlags::DETACH,
            );
        }
    }
}
