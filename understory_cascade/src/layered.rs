// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layered resolver for animated properties.
//!
//! An animated property keeps one value per [`Layer`] plus a computed slot
//! holding the winning value and its rank. Writing a layer at or above the
//! computed rank takes over immediately. Clearing a layer that is winning (or
//! outranks the winner) recomputes from the remaining layers, highest first.

use core::fmt;

use tracing::trace;
use understory_property::{ErasedValue, Layer, PropertyId, PropertyStore, PropertyValue, Scope};

use crate::cascade::Cascade;
use crate::host::PropertyHost;
use crate::resolve::{WriteFlags, effective};

/// Re-derives the computed slot from the layers that are still set.
fn recompute<K: Copy>(store: &mut PropertyStore<K>, id: PropertyId) {
    let winner = Layer::DESCENDING
        .into_iter()
        .find_map(|layer| store.layer(id, layer).map(|value| (layer, value.clone())));
    match winner {
        Some((layer, value)) => {
            store.insert(id, value, layer.source());
        }
        None => {
            store.remove(id);
        }
    }
}

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Writes or clears one layer of an animated property.
    pub(crate) fn write_layer<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        layer: Layer,
        value: PropertyValue<ErasedValue>,
        flags: WriteFlags,
    ) {
        let registration = self.registry().registration(id);
        let rank = layer.source();

        let store = host.store_mut(node, Scope::Style);
        let old = effective(store, registration, id);
        let computed = store.source(id);
        // Forcing only notifies when the written layer becomes the winner.
        let forced = value.is_forced() && rank.admits(computed);

        match value.into_value() {
            Some(value) => {
                store.set_layer(id, layer, value.clone());
                if rank.admits(computed) {
                    store.insert(id, value, rank);
                }
            }
            None => {
                store.clear_layer(id, layer);
                if computed >= rank {
                    recompute(store, id);
                }
            }
        }

        let new = effective(store, registration, id);
        let reset = !store.contains(id);

        let changed = !registration.values_equal(&old, &new);
        if !changed && !forced {
            trace!(
                property = registration.name(),
                ?node,
                ?layer,
                "computed value unchanged"
            );
            return;
        }

        self.commit(host, node, registration, id, &old, &new, reset, flags);
    }
}
