//! # Memory Management
//!
//! Pre-allocated index stacks and component pools.
//!
//! ## Design Philosophy
//!
//! All memory is allocated once, when a table or pool is created. After that:
//! - No heap allocations
//! - Slots are recycled, never grown
//! - Running out of room is an error, not a reallocation

mod pool;
mod stack;

pub use pool::{ComponentPool, ErasedPool, ReleaseHook};
pub use stack::IndexStack;
