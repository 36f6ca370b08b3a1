// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stylesheet declarations and their retraction.

use core::fmt;

use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_property::{
    Layer, PropertyError, PropertyId, PropertyKind, PropertyValue, Scope, ValueSource,
};

use crate::cascade::Cascade;
use crate::host::PropertyHost;
use crate::resolve::WriteFlags;

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Applies a matched declaration such as `text-align: center` to `node`.
    ///
    /// The text goes through the descriptor's converter and then the
    /// stylesheet entry point; shorthands expand as usual.
    pub fn apply_declaration<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        css_name: &str,
        text: &str,
    ) -> Result<(), PropertyError> {
        let id = self
            .registry()
            .by_css_name(css_name)
            .ok_or_else(|| PropertyError::UnknownCssProperty(css_name.into()))?;
        let registration = self.registry().registration(id);
        let value = PropertyValue::Value(registration.convert(text)?);
        trace!(property = registration.name(), ?node, text, "applying declaration");
        if registration.kind() == PropertyKind::Shorthand {
            self.apply_shorthand(host, node, id, ValueSource::Stylesheet, value)?;
        } else {
            self.write_entry(
                host,
                node,
                id,
                ValueSource::Stylesheet,
                value,
                WriteFlags::empty(),
            );
        }
        Ok(())
    }

    /// Retracts everything stylesheets applied to the style object of `node`.
    ///
    /// Call this before re-matching selectors. Stylesheet values are unset
    /// (falling back to inherited values where the property inherits), and
    /// animated properties also lose their stylesheet and keyframe layers.
    /// Local values are untouched.
    pub fn reset_css_properties<H: PropertyHost<K> + ?Sized>(&self, host: &mut H, node: K) {
        let store = host.store(node, Scope::Style);
        let mut ids: SmallVec<[PropertyId; 8]> = store
            .property_ids()
            .chain(store.layer_keys().map(|(id, _)| id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        debug!(?node, properties = ids.len(), "resetting css properties");

        for id in ids {
            let registration = self.registry().registration(id);
            let source = host.store(node, Scope::Style).source(id);
            match registration.kind() {
                PropertyKind::Animated => {
                    for layer in [Layer::Keyframe, Layer::Stylesheet] {
                        if host.store(node, Scope::Style).layer(id, layer).is_some() {
                            self.write_layer(
                                host,
                                node,
                                id,
                                layer,
                                PropertyValue::Unset,
                                WriteFlags::empty(),
                            );
                        }
                    }
                }
                PropertyKind::Shorthand if source == ValueSource::Stylesheet => {
                    self.retract_shorthand(host, node, id, ValueSource::Stylesheet);
                }
                PropertyKind::Css | PropertyKind::InheritedCss
                    if source == ValueSource::Stylesheet =>
                {
                    self.write_ranked(
                        host,
                        node,
                        id,
                        ValueSource::Stylesheet,
                        PropertyValue::Unset,
                        WriteFlags::empty(),
                    );
                }
                _ => {}
            }
        }
    }
}
