// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ranked resolver for plain, inherited, and CSS properties.
//!
//! One algorithm serves all four single-slot kinds. A write arrives through an
//! entry point with a [`ValueSource`] rank and proceeds only if that rank
//! admits the rank currently recorded. Kinds differ only in which entry points
//! they expose (checked by [`Cascade`] before calling in here) and in whether
//! a reset falls back to the parent's value.

use core::fmt;

use tracing::trace;
use understory_property::{
    ErasedValue, PropertyId, PropertyKind, PropertyRegistration, PropertyStore, PropertyValue,
    ValueSource,
};

use crate::cascade::Cascade;
use crate::host::{PropertyChangeEvent, PropertyHost};

bitflags::bitflags! {
    /// Adjustments to a single write.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub(crate) struct WriteFlags: u8 {
        /// The value was reported by the native view: skip coercion and do not
        /// write it back.
        const FROM_NATIVE = 0b0000_0001;
        /// A reset falls back to the default even if the parent has a value.
        const DETACH      = 0b0000_0010;
    }
}

/// Returns the stored value of `id`, or the descriptor default.
pub(crate) fn effective<K: Copy + 'static>(
    store: &PropertyStore<K>,
    registration: &PropertyRegistration<K>,
    id: PropertyId,
) -> ErasedValue {
    store
        .value(id)
        .unwrap_or_else(|| registration.default_value())
        .clone()
}

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Runs one write through the ranked resolver.
    pub(crate) fn write_ranked<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        entry: ValueSource,
        value: PropertyValue<ErasedValue>,
        flags: WriteFlags,
    ) {
        let registration = self.registry().registration(id);
        let kind = registration.kind();
        let scope = kind.scope();

        let store = host.store(node, scope);
        let current = store.source(id);
        if !entry.admits(current) {
            trace!(
                property = registration.name(),
                ?node,
                %entry,
                %current,
                "ignored lower-ranked write"
            );
            return;
        }
        let old = effective(store, registration, id);
        let forced = value.is_forced();

        let next = match value.into_value() {
            Some(value) => {
                let value = if kind == PropertyKind::Plain
                    && entry == ValueSource::Local
                    && registration.has_coerce()
                    && !flags.contains(WriteFlags::FROM_NATIVE)
                {
                    let coerced = registration.coerce(&self.node_values(host, node), value.clone());
                    host.store_mut(node, scope).set_requested(id, value);
                    coerced
                } else {
                    value
                };
                Some((value, entry))
            }
            None => {
                host.store_mut(node, scope).clear_requested(id);
                self.inherited_fallback(host, node, registration, id, flags)
            }
        };

        let store = host.store_mut(node, scope);
        let reset = match next {
            Some((value, source)) => {
                store.insert(id, value, source);
                false
            }
            None => {
                store.remove(id);
                true
            }
        };
        let new = effective(store, registration, id);

        let changed = !registration.values_equal(&old, &new);
        if !changed && !forced {
            trace!(property = registration.name(), ?node, "value unchanged");
            return;
        }

        self.commit(host, node, registration, id, &old, &new, reset, flags);

        if changed && kind.inherits() {
            self.propagate_change(host, node, id, (!reset).then_some(&new));
        }
    }

    /// The value a reset falls back to: the parent's, if the parent holds one.
    fn inherited_fallback<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &H,
        node: K,
        registration: &PropertyRegistration<K>,
        id: PropertyId,
        flags: WriteFlags,
    ) -> Option<(ErasedValue, ValueSource)> {
        if !registration.kind().inherits() || flags.contains(WriteFlags::DETACH) {
            return None;
        }
        let parent = host.parent(node)?;
        let store = host.store(parent, registration.scope());
        (store.source(id) != ValueSource::Default)
            .then(|| (effective(store, registration, id), ValueSource::Inherited))
    }

    /// Fires the side effects of a committed change, in order: change
    /// callback, native mirror, change event, layout invalidation.
    ///
    /// `reset` means the property no longer has a slot, so the native view
    /// gets its captured default back instead of `new`.
    pub(crate) fn commit<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        registration: &PropertyRegistration<K>,
        id: PropertyId,
        old: &ErasedValue,
        new: &ErasedValue,
        reset: bool,
        flags: WriteFlags,
    ) {
        trace!(
            property = registration.name(),
            ?node,
            ?old,
            ?new,
            reset,
            "committed change"
        );
        registration.notify_changed(node, old, new);

        if !flags.contains(WriteFlags::FROM_NATIVE) {
            self.mirror(host, node, registration, id, new, reset);
        }

        let scope = registration.scope();
        if host.has_listeners(node, scope, registration.event_name()) {
            host.notify(
                node,
                &PropertyChangeEvent {
                    event_name: registration.event_name(),
                    property: id,
                    property_name: registration.name(),
                    scope,
                    old_value: old,
                    value: new,
                },
            );
        }

        if registration.affects_layout() {
            host.request_layout(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use understory_property::{
        Property, PropertyMetadataBuilder, PropertyRegistry, PropertyValue, ValueSource,
    };

    use crate::Cascade;
    use crate::testing::TestTree;

    struct Props {
        width: Property<f64>,
        enabled: Property<bool>,
        color: Property<String>,
        font_size: Property<f64>,
    }

    fn registry() -> (PropertyRegistry<usize>, Props) {
        let mut registry = PropertyRegistry::new();
        let width = registry.define(
            "width",
            PropertyMetadataBuilder::new(0.0_f64)
                .affects_layout(true)
                .coerce(|_, v: f64| v.max(0.0))
                .build(),
        );
        let enabled =
            registry.define_inherited("isEnabled", PropertyMetadataBuilder::new(true).build());
        let color = registry.define_css(
            "color",
            "color",
            PropertyMetadataBuilder::new(String::from("black")).build(),
        );
        let font_size = registry.define_inherited_css(
            "fontSize",
            "font-size",
            PropertyMetadataBuilder::new(14.0_f64).build(),
        );
        (
            registry,
            Props {
                width,
                enabled,
                color,
                font_size,
            },
        )
    }

    #[test]
    fn absent_slot_reads_default() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let tree = TestTree::with_nodes(1);

        assert_eq!(cascade.get(&tree, 0, p.width), 0.0);
        assert_eq!(cascade.source(&tree, 0, p.width), ValueSource::Default);
        assert!(!cascade.is_set(&tree, 0, p.color));
    }

    #[test]
    fn local_write_then_reset() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, p.width, 10.0);
        assert_eq!(cascade.get(&tree, 0, p.width), 10.0);
        assert_eq!(cascade.source(&tree, 0, p.width), ValueSource::Local);
        assert_eq!(tree.layout_requests(0), 1);

        cascade.reset(&mut tree, 0, p.width);
        assert_eq!(cascade.get(&tree, 0, p.width), 0.0);
        assert_eq!(cascade.source(&tree, 0, p.width), ValueSource::Default);
        assert!(tree.node_store(0).is_empty(), "reset leaves no residue");
        assert_eq!(tree.layout_requests(0), 2);
    }

    #[test]
    fn coercion_keeps_the_requested_value() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, p.width, -5.0);
        assert_eq!(cascade.get(&tree, 0, p.width), 0.0);
        assert_eq!(cascade.source(&tree, 0, p.width), ValueSource::Local);
    }

    #[test]
    fn stylesheet_cannot_override_local() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, p.color, String::from("red"));
        cascade.set_stylesheet(&mut tree, 0, p.color, String::from("blue"));
        assert_eq!(cascade.get(&tree, 0, p.color), "red");

        // A stylesheet reset cannot retract a local value either.
        cascade.set_stylesheet(&mut tree, 0, p.color, PropertyValue::Unset);
        assert_eq!(cascade.get(&tree, 0, p.color), "red");
        assert_eq!(cascade.source(&tree, 0, p.color), ValueSource::Local);
    }

    #[test]
    fn local_overrides_stylesheet_and_reset_falls_to_default() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set_stylesheet(&mut tree, 0, p.color, String::from("blue"));
        assert_eq!(cascade.source(&tree, 0, p.color), ValueSource::Stylesheet);

        cascade.set(&mut tree, 0, p.color, String::from("green"));
        assert_eq!(cascade.get(&tree, 0, p.color), "green");

        cascade.reset(&mut tree, 0, p.color);
        assert_eq!(cascade.get(&tree, 0, p.color), "black");
        assert_eq!(cascade.source(&tree, 0, p.color), ValueSource::Default);
    }

    #[test]
    fn same_rank_write_with_same_value_only_restamps() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.listen(0);

        cascade.set_stylesheet(&mut tree, 0, p.color, String::from("red"));
        cascade.set(&mut tree, 0, p.color, String::from("red"));
        assert_eq!(cascade.source(&tree, 0, p.color), ValueSource::Local);
        assert_eq!(tree.events(0).len(), 1, "equal value must not notify twice");
    }

    #[test]
    fn forced_writes_always_notify() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);
        tree.listen(0);

        cascade.set(&mut tree, 0, p.color, PropertyValue::Forced(String::from("red")));
        cascade.set(&mut tree, 0, p.color, PropertyValue::Forced(String::from("red")));
        assert_eq!(tree.events(0).len(), 2);
    }

    #[test]
    fn inherited_reset_adopts_the_parent_value() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(2);
        tree.attach(0, 1);

        cascade.set(&mut tree, 0, p.enabled, false);
        assert!(!cascade.get(&tree, 1, p.enabled));
        assert_eq!(cascade.source(&tree, 1, p.enabled), ValueSource::Inherited);

        cascade.set(&mut tree, 1, p.enabled, true);
        assert_eq!(cascade.source(&tree, 1, p.enabled), ValueSource::Local);

        cascade.reset(&mut tree, 1, p.enabled);
        assert!(!cascade.get(&tree, 1, p.enabled));
        assert_eq!(cascade.source(&tree, 1, p.enabled), ValueSource::Inherited);
    }

    #[test]
    fn inherited_push_never_beats_higher_ranks() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set_stylesheet(&mut tree, 0, p.font_size, 20.0);
        cascade.set_inherited_value(&mut tree, 0, p.font_size, 30.0);
        assert_eq!(cascade.get(&tree, 0, p.font_size), 20.0);
        assert_eq!(cascade.source(&tree, 0, p.font_size), ValueSource::Stylesheet);
    }

    #[test]
    fn inherited_css_reset_cascades_down() {
        let (registry, p) = registry();
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(3);
        tree.attach(0, 1);
        tree.attach(1, 2);

        cascade.set_stylesheet(&mut tree, 0, p.font_size, 18.0);
        assert_eq!(cascade.get(&tree, 2, p.font_size), 18.0);
        assert_eq!(cascade.source(&tree, 2, p.font_size), ValueSource::Inherited);

        cascade.set_stylesheet(&mut tree, 0, p.font_size, PropertyValue::Unset);
        for node in 0..3 {
            assert_eq!(cascade.get(&tree, node, p.font_size), 14.0);
            assert_eq!(cascade.source(&tree, node, p.font_size), ValueSource::Default);
        }
    }

    #[test]
    fn change_callback_sees_old_and_new() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let mut registry = PropertyRegistry::<usize>::new();
        let text = registry.define(
            "text",
            PropertyMetadataBuilder::new(String::new())
                .on_changed(move |node, old: &String, new: &String| {
                    log.lock().unwrap().push((node, old.clone(), new.clone()));
                })
                .build(),
        );
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, text, String::from("a"));
        cascade.set(&mut tree, 0, text, String::from("a"));
        cascade.reset(&mut tree, 0, text);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            [
                (0, String::new(), String::from("a")),
                (0, String::from("a"), String::new()),
            ]
        );
    }

    #[test]
    fn custom_equality_suppresses_changes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = PropertyRegistry::<usize>::new();
        let opacity = registry.define(
            "opacity",
            PropertyMetadataBuilder::new(1.0_f64)
                .equality(|a, b| (a - b).abs() < 0.01)
                .on_changed(move |_, _, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .build(),
        );
        let cascade = Cascade::new(&registry);
        let mut tree = TestTree::with_nodes(1);

        cascade.set(&mut tree, 0, opacity, 1.001);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        cascade.set(&mut tree, 0, opacity, 0.5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
