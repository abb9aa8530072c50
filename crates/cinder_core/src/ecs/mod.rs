//! # Entity Component System
//!
//! A fixed-capacity ECS: every table is sized when the world is created.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated at world creation
//! - Components live in per-type pools, recycled through index stacks
//! - Entity handles are slot indices with version stamps
//! - Systems are plain functions run in registration order per phase

mod component;
mod entity;
mod inspect;
mod system;
mod world;

pub use component::{Component, ComponentType};
pub use entity::Entity;
pub use inspect::{ComponentRecord, EntityReport};
pub use system::{SystemEntry, SystemFn, SystemId, SystemPhase, SystemRegistry};
pub use world::World;
