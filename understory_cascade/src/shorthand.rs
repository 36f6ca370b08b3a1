// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shorthand application.
//!
//! A shorthand keeps the highest-ranked raw value it was given in its own
//! slot, at the rank of the entry point that wrote it. The expansion is
//! replayed through
//! the same entry point of each elementary property, so precedence and
//! notification work exactly as if the parts were written one by one.

use core::fmt;

use tracing::trace;
use understory_property::{ConversionError, ErasedValue, PropertyId, PropertyValue, ValueSource};

use crate::cascade::Cascade;
use crate::host::PropertyHost;
use crate::resolve::WriteFlags;

impl<K: Copy + fmt::Debug + 'static> Cascade<'_, K> {
    /// Applies or retracts a shorthand through the entry point ranked `entry`.
    ///
    /// Expansion happens before anything is stored, so a rejected value leaves
    /// the shorthand and all of its parts untouched. A value is replayed even
    /// when a higher-ranked shorthand is recorded, so parts the higher one
    /// left unset still pick it up.
    pub(crate) fn apply_shorthand<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        entry: ValueSource,
        value: PropertyValue<ErasedValue>,
    ) -> Result<(), ConversionError> {
        let registration = self.registry().registration(id);
        let scope = registration.scope();
        let store = host.store(node, scope);
        let current = store.source(id);
        let forced = value.is_forced();
        let Some(raw) = value.into_value() else {
            if entry.admits(current) {
                self.retract_shorthand(host, node, id, entry);
            } else {
                trace!(
                    property = registration.name(),
                    ?node,
                    %entry,
                    %current,
                    "ignored lower-ranked shorthand reset"
                );
            }
            return Ok(());
        };
        if !forced
            && current == entry
            && store
                .value(id)
                .is_some_and(|last| registration.values_equal(last, &raw))
        {
            trace!(property = registration.name(), ?node, "shorthand unchanged");
            return Ok(());
        }

        let expansion = registration.expand(&raw)?;
        // The raw slot keeps the highest-ranked text; every part still runs
        // through its own guard.
        if entry.admits(current) {
            host.store_mut(node, scope).insert(id, raw, entry);
        }
        trace!(
            property = registration.name(),
            ?node,
            parts = expansion.len(),
            "expanding shorthand"
        );
        for (part, value) in expansion {
            let value = match value {
                PropertyValue::Value(value) if forced => PropertyValue::Forced(value),
                value => value,
            };
            self.write_entry(host, node, part, entry, value, WriteFlags::empty());
        }
        Ok(())
    }

    /// Drops the raw shorthand value and resets every part it covers.
    ///
    /// The caller has already checked that `entry` admits the current rank.
    pub(crate) fn retract_shorthand<H: PropertyHost<K> + ?Sized>(
        &self,
        host: &mut H,
        node: K,
        id: PropertyId,
        entry: ValueSource,
    ) {
        let registration = self.registry().registration(id);
        if host.store_mut(node, registration.scope()).remove(id).is_none() {
            return;
        }
        for &part in registration.shorthand_parts() {
            self.write_entry(
                host,
                node,
                part,
                entry,
                PropertyValue::Unset,
                WriteFlags::empty(),
            );
        }
    }
}
