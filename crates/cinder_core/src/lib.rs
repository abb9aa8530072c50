//! # Cinder Core
//!
//! Fixed-capacity Entity Component System (ECS):
//! - Entity handles with version stamps that detect stale references
//! - One pre-allocated pool per component type
//! - Phase-tagged systems run in registration order
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations after setup** - Tables and pools are sized up front
//! 2. **No silent misuse** - Every invalid operation returns an [`EcsError`]
//!    and logs a warning through `tracing`
//! 3. **Stale handles are harmless** - Destroying an entity bumps its slot
//!    version, so old handles can never reach the slot's next occupant
//!
//! ## Example
//!
//! ```rust,ignore
//! use cinder_core::{mask, Component, SystemPhase, World};
//!
//! let mut world = World::new(1024, 8, 4);
//! world.register_component::<Position>(1024)?;
//! world.register_component::<Velocity>(1024)?;
//!
//! let entity = world.create_entity()?;
//! world.add_component(entity, Position { x: 0, y: 0 })?;
//! world.add_component(entity, Velocity { dx: 1, dy: 1 })?;
//!
//! world.register_system(movement, SystemPhase::Update)?;
//! world.run_phase(SystemPhase::Update);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod memory;

pub use config::WorldConfig;
pub use ecs::{
    Component, ComponentRecord, ComponentType, Entity, EntityReport, SystemEntry, SystemFn,
    SystemId, SystemPhase, SystemRegistry, World,
};
pub use error::{ConfigError, EcsError, EcsResult, ErrorKind};
pub use memory::{ComponentPool, ErasedPool, IndexStack, ReleaseHook};
