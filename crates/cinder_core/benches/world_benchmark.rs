//! # World Benchmark
//!
//! Entity churn, component attach/detach and a movement phase over a
//! fully populated world.
//!
//! Run with: `cargo bench --package cinder_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use bytemuck::{Pod, Zeroable};
use cinder_core::{mask, Component, ComponentType, SystemPhase, World};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Entity count for the full-world benchmarks.
const ENTITY_COUNT: u32 = 100_000;

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Position {
    x: f32,
    y: f32,
}

impl Component for Position {
    const ID: ComponentType = 0;
}

#[derive(Clone, Copy, Default, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    dx: f32,
    dy: f32,
}

impl Component for Velocity {
    const ID: ComponentType = 1;
}

fn movement(world: &mut World) {
    for index in 0..world.for_count() {
        let Some(entity) = world.entity_at(index) else {
            continue;
        };
        if !world.has_mask(entity, &mask![Position, Velocity]) {
            continue;
        }
        let Ok(&velocity) = world.get_component::<Velocity>(entity) else {
            continue;
        };
        if let Ok(position) = world.get_component_mut::<Position>(entity) {
            position.x += velocity.dx;
            position.y += velocity.dy;
        }
    }
}

fn populated_world(count: u32) -> World {
    let mut world = World::new(count, 2, 1);
    world.register_component::<Position>(count).unwrap();
    world.register_component::<Velocity>(count).unwrap();

    for i in 0..count {
        let entity = world.create_entity().unwrap();
        let f = i as f32;
        world.add_component(entity, Position { x: f, y: f }).unwrap();
        world.add_component(entity, Velocity { dx: 0.1, dy: 0.2 }).unwrap();
    }

    world
}

/// Benchmark: Create a world and register its pools.
fn bench_world_creation(c: &mut Criterion) {
    c.bench_function("world_creation_100k", |b| {
        b.iter(|| {
            let mut world = World::new(ENTITY_COUNT, 2, 1);
            world.register_component::<Position>(ENTITY_COUNT).unwrap();
            black_box(world)
        });
    });
}

/// Benchmark: Fill the entity table, then destroy everything.
fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut world = World::new(count, 0, 0);
            b.iter(|| {
                for _ in 0..count {
                    black_box(world.create_entity().unwrap());
                }
                for index in 0..count {
                    if let Some(entity) = world.entity_at(index) {
                        world.destroy_entity(entity).unwrap();
                    }
                }
                world.alive_count()
            });
        });
    }

    group.finish();
}

/// Benchmark: Attach and detach one component on every entity.
fn bench_attach_detach(c: &mut Criterion) {
    let mut world = World::new(ENTITY_COUNT, 1, 0);
    world.register_component::<Position>(ENTITY_COUNT).unwrap();
    let entities: Vec<_> = (0..ENTITY_COUNT)
        .map(|_| world.create_entity().unwrap())
        .collect();

    c.bench_function("attach_detach_100k", |b| {
        b.iter(|| {
            for &entity in &entities {
                world.add_component(entity, Position::default()).unwrap();
            }
            for &entity in &entities {
                world.remove_component(entity, Position::ID).unwrap();
            }
        });
    });
}

/// Benchmark: One update phase moving every entity.
fn bench_movement_phase(c: &mut Criterion) {
    let mut world = populated_world(ENTITY_COUNT);
    world.register_system(movement, SystemPhase::Update).unwrap();

    c.bench_function("movement_phase_100k", |b| {
        b.iter(|| black_box(world.run_phase(SystemPhase::Update)));
    });
}

criterion_group!(
    benches,
    bench_world_creation,
    bench_entity_churn,
    bench_attach_detach,
    bench_movement_phase,
);
criterion_main!(benches);
