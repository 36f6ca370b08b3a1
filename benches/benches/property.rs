// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_property` + `understory_cascade`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::ops::ControlFlow;
use std::sync::Once;
use std::{string::String, vec::Vec};

use understory_cascade::{Cascade, PropertyHost};
use understory_property::{
    Layer, Property, PropertyMetadataBuilder, PropertyRegistry, PropertyStore, Scope,
};

#[derive(Clone)]
struct Elem {
    parent: Option<u32>,
    children: Vec<u32>,
    props: PropertyStore<u32>,
    style: PropertyStore<u32>,
}

#[derive(Clone)]
struct Tree(Vec<Elem>);

impl Tree {
    /// A chain `0 <- 1 <- ... <- len - 1`.
    fn chain(len: u32) -> Self {
        Self(
            (0..len)
                .map(|i| Elem {
                    parent: i.checked_sub(1),
                    children: if i + 1 < len { vec![i + 1] } else { Vec::new() },
                    props: PropertyStore::new(i),
                    style: PropertyStore::new(i),
                })
                .collect(),
        )
    }

    /// One root with `len` leaf children.
    fn fan(len: u32) -> Self {
        let mut tree = Self::chain(1);
        for i in 1..=len {
            tree.0[0].children.push(i);
            tree.0.push(Elem {
                parent: Some(0),
                children: Vec::new(),
                props: PropertyStore::new(i),
                style: PropertyStore::new(i),
            });
        }
        tree
    }
}

impl PropertyHost<u32> for Tree {
    fn parent(&self, node: u32) -> Option<u32> {
        self.0[node as usize].parent
    }

    fn for_each_child(&self, node: u32, visit: &mut dyn FnMut(u32) -> ControlFlow<()>) {
        for &child in &self.0[node as usize].children {
            if visit(child).is_break() {
                break;
            }
        }
    }

    fn store(&self, node: u32, scope: Scope) -> &PropertyStore<u32> {
        let elem = &self.0[node as usize];
        match scope {
            Scope::Node => &elem.props,
            Scope::Style => &elem.style,
        }
    }

    fn store_mut(&mut self, node: u32, scope: Scope) -> &mut PropertyStore<u32> {
        let elem = &mut self.0[node as usize];
        match scope {
            Scope::Node => &mut elem.props,
            Scope::Style => &mut elem.style,
        }
    }
}

fn bench_property(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: PropertyStore<u32>={} Elem={} ErasedValue={}",
            size_of::<PropertyStore<u32>>(),
            size_of::<Elem>(),
            size_of::<understory_property::ErasedValue>(),
        );
    });

    let mut registry = PropertyRegistry::new();
    let width: Property<f64> = registry.define(
        "width",
        PropertyMetadataBuilder::new(0.0_f64)
            .affects_layout(true)
            .build(),
    );
    let font_size: Property<f64> = registry.define_inherited_css(
        "fontSize",
        "font-size",
        PropertyMetadataBuilder::new(12.0_f64).build(),
    );
    let opacity: Property<f64> = registry.define_animated_css(
        "opacity",
        "opacity",
        PropertyMetadataBuilder::new(1.0_f64).build(),
    );
    let text: Property<String> =
        registry.define("text", PropertyMetadataBuilder::new(String::new()).build());
    let cascade = Cascade::new(&registry);

    let mut group = c.benchmark_group("property/resolve");

    group.bench_function("default", |b| {
        let tree = Tree::chain(1);
        b.iter(|| black_box(cascade.get(&tree, 0, width)));
    });

    group.bench_function("local", |b| {
        let mut tree = Tree::chain(1);
        cascade.set(&mut tree, 0, width, 100.0);
        b.iter(|| black_box(cascade.get(&tree, 0, width)));
    });

    group.bench_function("layered", |b| {
        let mut tree = Tree::chain(1);
        cascade.set_stylesheet(&mut tree, 0, opacity, 0.5);
        cascade.set_keyframe(&mut tree, 0, opacity, 0.25);
        b.iter(|| black_box(cascade.get(&tree, 0, opacity)));
    });

    group.bench_function("string_ref", |b| {
        let mut tree = Tree::chain(1);
        cascade.set(&mut tree, 0, text, String::from("hello world hello world"));
        b.iter(|| black_box(cascade.get_ref(&tree, 0, text).len()));
    });

    group.finish();

    let mut group = c.benchmark_group("property/mutate");

    group.bench_function("set_local", |b| {
        b.iter_batched(
            || Tree::chain(1),
            |mut tree| {
                cascade.set(&mut tree, 0, width, 123.0);
                black_box(tree);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("keyframe_tick", |b| {
        let mut tree = Tree::chain(1);
        cascade.set(&mut tree, 0, opacity, 1.0);
        let mut t = 0.0_f64;
        b.iter(|| {
            t = (t + 0.01) % 1.0;
            cascade.set_keyframe(&mut tree, 0, opacity, t);
        });
    });

    group.bench_function("clear_layer", |b| {
        b.iter_batched(
            || {
                let mut tree = Tree::chain(1);
                cascade.set_stylesheet(&mut tree, 0, opacity, 0.5);
                cascade.set_layer(&mut tree, 0, opacity, Layer::Local, 0.75);
                tree
            },
            |mut tree| {
                cascade.reset(&mut tree, 0, opacity);
                black_box(tree);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    let mut group = c.benchmark_group("property/propagate");

    for len in [16_u32, 64] {
        group.bench_function(BenchmarkId::new("chain", len), |b| {
            b.iter_batched(
                || Tree::chain(len),
                |mut tree| {
                    cascade.set_stylesheet(&mut tree, 0, font_size, 18.0);
                    black_box(tree);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(BenchmarkId::new("fan", len), |b| {
            b.iter_batched(
                || {
                    let mut tree = Tree::fan(len);
                    cascade.set(&mut tree, 0, font_size, 18.0);
                    for child in 1..=len {
                        cascade.clear_inherited_properties(&mut tree, child);
                    }
                    tree
                },
                |mut tree| {
                    cascade.propagate_inherited_properties(&mut tree, 0);
                    black_box(tree);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
