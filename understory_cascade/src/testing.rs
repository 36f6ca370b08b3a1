// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An arena tree implementing [`PropertyHost`] for unit tests.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::ControlFlow;

use understory_property::{ErasedValue, PropertyId, PropertyStore, Scope};

use crate::host::{NativeView, PropertyChangeEvent, PropertyHost};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RecordedEvent {
    pub(crate) event_name: String,
    pub(crate) property: PropertyId,
    pub(crate) scope: Scope,
    pub(crate) value: ErasedValue,
}

/// A native view holding one value per mirrored property.
#[derive(Debug, Default)]
pub(crate) struct TestView {
    values: Vec<(PropertyId, ErasedValue)>,
    writes: usize,
}

impl TestView {
    pub(crate) fn with(mut self, property: impl Into<PropertyId>, value: ErasedValue) -> Self {
        self.values.push((property.into(), value));
        self
    }

    pub(crate) fn value(&self, property: impl Into<PropertyId>) -> Option<&ErasedValue> {
        let property = property.into();
        self.values
            .iter()
            .find(|(id, _)| *id == property)
            .map(|(_, value)| value)
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes
    }
}

impl NativeView for TestView {
    fn mirrors(&self, property: PropertyId) -> bool {
        self.value(property).is_some()
    }

    fn native_value(&self, property: PropertyId) -> ErasedValue {
        match self.value(property) {
            Some(value) => value.clone(),
            None => panic!("{property:?} is not mirrored"),
        }
    }

    fn set_native_value(&mut self, property: PropertyId, value: &ErasedValue) {
        self.writes += 1;
        if let Some(slot) = self.values.iter_mut().find(|(id, _)| *id == property) {
            slot.1 = value.clone();
        }
    }
}

#[derive(Debug)]
struct TestNode {
    parent: Option<usize>,
    children: Vec<usize>,
    props: PropertyStore<usize>,
    style: PropertyStore<usize>,
    view: Option<TestView>,
    listening: bool,
    events: Vec<RecordedEvent>,
    layout_requests: usize,
}

#[derive(Debug, Default)]
pub(crate) struct TestTree {
    nodes: Vec<TestNode>,
}

impl TestTree {
    pub(crate) fn with_nodes(count: usize) -> Self {
        Self {
            nodes: (0..count)
                .map(|key| TestNode {
                    parent: None,
                    children: Vec::new(),
                    props: PropertyStore::new(key),
                    style: PropertyStore::new(key),
                    view: None,
                    listening: false,
                    events: Vec::new(),
                    layout_requests: 0,
                })
                .collect(),
        }
    }

    pub(crate) fn attach(&mut self, parent: usize, child: usize) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub(crate) fn detach(&mut self, child: usize) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&c| c != child);
        }
    }

    pub(crate) fn listen(&mut self, node: usize) {
        self.nodes[node].listening = true;
    }

    pub(crate) fn events(&self, node: usize) -> &[RecordedEvent] {
        &self.nodes[node].events
    }

    pub(crate) fn layout_requests(&self, node: usize) -> usize {
        self.nodes[node].layout_requests
    }

    pub(crate) fn node_store(&self, node: usize) -> &PropertyStore<usize> {
        &self.nodes[node].props
    }

    pub(crate) fn style_store(&self, node: usize) -> &PropertyStore<usize> {
        &self.nodes[node].style
    }

    pub(crate) fn attach_view(&mut self, node: usize, view: TestView) {
        self.nodes[node].view = Some(view);
    }

    pub(crate) fn view(&self, node: usize) -> &TestView {
        match &self.nodes[node].view {
            Some(view) => view,
            None => panic!("node {node} has no view"),
        }
    }
}

impl PropertyHost<usize> for TestTree {
    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }

    fn for_each_child(&self, node: usize, visit: &mut dyn FnMut(usize) -> ControlFlow<()>) {
        for &child in &self.nodes[node].children {
            if visit(child).is_break() {
                break;
            }
        }
    }

    fn store(&self, node: usize, scope: Scope) -> &PropertyStore<usize> {
        match scope {
            Scope::Node => &self.nodes[node].props,
            Scope::Style => &self.nodes[node].style,
        }
    }

    fn store_mut(&mut self, node: usize, scope: Scope) -> &mut PropertyStore<usize> {
        match scope {
            Scope::Node => &mut self.nodes[node].props,
            Scope::Style => &mut self.nodes[node].style,
        }
    }

    fn native_view(&self, node: usize) -> Option<&dyn NativeView> {
        self.nodes[node].view.as_ref().map(|v| v as &dyn NativeView)
    }

    fn native_view_mut(&mut self, node: usize) -> Option<&mut dyn NativeView> {
        self.nodes[node]
            .view
            .as_mut()
            .map(|v| v as &mut dyn NativeView)
    }

    fn has_listeners(&self, node: usize, _scope: Scope, _event_name: &str) -> bool {
        self.nodes[node].listening
    }

    fn notify(&mut self, node: usize, event: &PropertyChangeEvent<'_>) {
        self.nodes[node].events.push(RecordedEvent {
            event_name: String::from(event.event_name),
            property: event.property,
            scope: event.scope,
            value: event.value.clone(),
        });
    }

    fn request_layout(&mut self, node: usize) {
        self.nodes[node].layout_requests += 1;
    }
}
