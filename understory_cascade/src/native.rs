// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native view synchronization.
//!
//! The first framework write to a mirrored property captures the view's own
//! value as a shadow default. Resetting the property (or detaching the view)
//! hands the shadow back, so the widget ends up as it was found.

use core::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_property::{ErasedValue, PropertyId, PropertyKind, PropertyRegistration, Scope};

use crate::cascade::Cascade;
use crate::host::PropertyHost;
use crate::resolve::effective;

const SCOPES: [Scope; 2] = [Scope::Node, Scope::Style];

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Writes a committed value onto the native view, if `node` has one that
    /// mirrors `id`.
    pub(crate) fn mirror<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        registration: &PropertyRegistration<K>,
        id: PropertyId,
        value: &ErasedValue,
        reset: bool,
    ) {
        let scope = registration.scope();
        let Some(view) = host.native_view(node) else {
            return;
        };
        if !view.mirrors(id) {
            return;
        }

        if reset {
            let Some(shadow) = host.store_mut(node, scope).take_native_default(id) else {
                return;
            };
            trace!(property = registration.name(), ?node, ?shadow, "restoring native default");
            if let Some(view) = host.native_view_mut(node) {
                view.set_native_value(id, &shadow);
            }
            return;
        }

        if host.store(node, scope).native_default(id).is_none() {
            let native = view.native_value(id);
            host.store_mut(node, scope).capture_native_default(id, || native);
        }
        trace!(property = registration.name(), ?node, ?value, "mirroring to native view");
        if let Some(view) = host.native_view_mut(node) {
            view.set_native_value(id, value);
        }
    }

    /// Returns the properties of `node` in `scope` that have state and are
    /// mirrored by its native view.
    fn mirrored<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        scope: Scope,
    ) -> SmallVec<[PropertyId; 8]> {
        let Some(view) = host.native_view(node) else {
            return SmallVec::new();
        };
        let store = host.store(node, scope);
        let mut ids: SmallVec<[PropertyId; 8]> = store
            .property_ids()
            .chain(store.layer_keys().map(|(id, _)| id))
            .filter(|&id| {
                self.registry().registration(id).kind() != PropertyKind::Shorthand
                    && view.mirrors(id)
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Pushes the stored values of `node` onto its freshly attached native
    /// view.
    ///
    /// Each mirrored property that holds a value captures the view's own value
    /// first (unless a shadow already exists) and then receives the resolved
    /// value. Properties at their default are left alone.
    pub fn init_native_view<H: PropertyHost<K> + ?Sized>(&self, host: &mut H, node: K) {
        for scope in SCOPES {
            let ids = self.mirrored(host, node, scope);
            if !ids.is_empty() {
                debug!(?node, ?scope, properties = ids.len(), "initializing native view");
            }
            for id in ids {
                let registration = self.registry().registration(id);
                let store = host.store(node, scope);
                if !store.contains(id) {
                    continue;
                }
                let value = effective(store, registration, id);
                self.mirror(host, node, registration, id, &value, false);
            }
        }
    }

    /// Restores the native view of `node` and forgets everything the cascade
    /// holds for the mirrored properties.
    ///
    /// Each mirrored property gets its captured native default back, then its
    /// slot, layers, requested value and shadow are purged. No callbacks or
    /// events fire: detaching a view is not a property change.
    pub fn reset_native_view<H: PropertyHost<K> + ?Sized>(&self, host: &mut H, node: K) {
        for scope in SCOPES {
            let ids = self.mirrored(host, node, scope);
            if ids.is_empty() {
                continue;
            }
            debug!(?node, ?scope, properties = ids.len(), "resetting native view");
            for id in ids {
                let store = host.store_mut(node, scope);
                let shadow = store.take_native_default(id);
                store.purge(id);
                if let (Some(shadow), Some(view)) = (shadow, host.native_view_mut(node)) {
                    view.set_native_value(id, &shadow);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use understory_property::{
        ErasedValue, Layer, Property, PropertyMetadataBuilder, PropertyRegistry, PropertyValue,
        ValueSource,
    };

    use crate::Cascade;
    use crate::testing::{TestTree, TestView};

    struct Props {
        text: Property<&'static str>,
        opacity: Property<f64>,
        hidden: Property<bool>,
    }

    fn registry() -> (PropertyRegistry<usize>, Props) {
        let mut registry = PropertyRegistry::new();
        let text = registry.define("text", PropertyMetadataBuilder::new("").build());
        let opacity = registry.define_animated_css(
            "opacity",
            "opacity",
            PropertyMetadataBuilder::new(1.0_f64).build(),
        );
        let hidden = registry.define("hidden", PropertyMetadataBuilder::new(false).build());
        (
            registry,
            Props {
                text,
                opacity,
                hidden,
            },
        )
    }

    fn view(p: &Props) -> TestView {
        TestView::default()
            .with(p.text, ErasedValue::new("native"))
            .with(p.opacity, ErasedValue::new(0.75_f64))
    }

    #[test]
    fn writes_mirror_and_reset_restores_the_shadow() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.attach_view(0, view(&p));

        cascade.set(&mut tree, 0, p.text, "framework");
        assert_eq!(tree.view(0).value(p.text), Some(&ErasedValue::new("framework")));
        assert_eq!(
            tree.node_store(0).native_default(p.text.id()),
            Some(&ErasedValue::new("native"))
        );

        cascade.set(&mut tree, 0, p.text, "again");
        assert_eq!(
            tree.node_store(0).native_default(p.text.id()),
            Some(&ErasedValue::new("native")),
            "the shadow is captured once"
        );

        cascade.reset(&mut tree, 0, p.text);
        assert_eq!(tree.view(0).value(p.text), Some(&ErasedValue::new("native")));
        assert!(tree.node_store(0).is_empty());
    }

    #[test]
    fn unmirrored_properties_never_touch_the_view() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.attach_view(0, view(&p));

        cascade.set(&mut tree, 0, p.hidden, true);
        assert_eq!(tree.view(0).writes(), 0);
        assert!(tree.node_store(0).native_default(p.hidden.id()).is_none());
    }

    #[test]
    fn native_reports_do_not_write_back() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.attach_view(0, view(&p));
        tree.listen(0);

        cascade.native_value_changed(&mut tree, 0, p.text, "typed");
        assert_eq!(cascade.get(&tree, 0, p.text), "typed");
        assert_eq!(cascade.source(&tree, 0, p.text), ValueSource::Local);
        assert_eq!(tree.view(0).writes(), 0);
        assert_eq!(tree.events(0).len(), 1);
    }

    #[test]
    fn init_pushes_stored_values_onto_a_new_view() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, p.text, "early");
        cascade.set_stylesheet(&mut tree, 0, p.opacity, 0.5);

        tree.attach_view(0, view(&p));
        cascade.init_native_view(&mut tree, 0);

        assert_eq!(tree.view(0).value(p.text), Some(&ErasedValue::new("early")));
        assert_eq!(tree.view(0).value(p.opacity), Some(&ErasedValue::new(0.5_f64)));
        assert_eq!(
            tree.style_store(0).native_default(p.opacity.id()),
            Some(&ErasedValue::new(0.75_f64))
        );
    }

    #[test]
    fn reset_native_view_restores_silently_and_leaves_no_state() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.attach_view(0, view(&p));
        tree.listen(0);

        cascade.set(&mut tree, 0, p.text, "framework");
        cascade.set(&mut tree, 0, p.opacity, 0.2);
        cascade.set_keyframe(&mut tree, 0, p.opacity, 0.3);
        cascade.set(&mut tree, 0, p.hidden, true);
        let events = tree.events(0).len();

        cascade.reset_native_view(&mut tree, 0);

        assert_eq!(tree.view(0).value(p.text), Some(&ErasedValue::new("native")));
        assert_eq!(tree.view(0).value(p.opacity), Some(&ErasedValue::new(0.75_f64)));
        assert_eq!(tree.events(0).len(), events, "no events on detach");
        assert!(tree.style_store(0).is_empty());
        assert_eq!(cascade.source(&tree, 0, p.text), ValueSource::Default);
        assert_eq!(cascade.layer_value(&tree, 0, p.opacity, Layer::Keyframe), None);
        // Unmirrored state survives.
        assert!(cascade.get(&tree, 0, p.hidden));
    }

    #[test]
    fn reset_after_unset_layers_restores_once() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.attach_view(0, view(&p));

        cascade.set(&mut tree, 0, p.opacity, 0.4);
        cascade.set(&mut tree, 0, p.opacity, PropertyValue::Unset);
        assert_eq!(tree.view(0).value(p.opacity), Some(&ErasedValue::new(0.75_f64)));
        assert!(tree.style_store(0).native_default(p.opacity.id()).is_none());
    }
}
