//! # System Registry
//!
//! Systems are plain functions over the world, tagged with the phase they run
//! in. Registration is append-only; systems are never removed or reordered.

use std::fmt;

use super::world::World;
use crate::error::{EcsError, EcsResult};

/// A system: any function taking the whole world.
///
/// Systems iterate entities themselves, typically via
/// [`World::for_count`] / [`World::entity_at`] or [`World::entities_with`],
/// and read or write components through the world.
pub type SystemFn = fn(&mut World);

/// Execution phase a system belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemPhase {
    /// Simulation step.
    Update,
    /// Presentation step.
    Render,
    /// Application-defined phase.
    Custom(u16),
}

/// Registration index of a system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(pub u32);

impl SystemId {
    /// Returns the registration index as a `usize`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "System({})", self.0)
    }
}

/// A registered system.
#[derive(Clone, Copy)]
pub struct SystemEntry {
    /// The system function.
    pub run: SystemFn,
    /// Phase the system runs in.
    pub phase: SystemPhase,
}

impl fmt::Debug for SystemEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemEntry")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity, append-only table of systems in registration order.
#[derive(Debug)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
    capacity: u32,
}

impl SystemRegistry {
    /// Creates an empty registry with room for `capacity` systems.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            entries: Vec::with_capacity(capacity as usize),
            capacity,
        }
    }

    /// Appends a system.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemCapacityExhausted`] if the table is full.
    pub fn register(&mut self, run: SystemFn, phase: SystemPhase) -> EcsResult<SystemId> {
        if self.entries.len() >= self.capacity as usize {
            tracing::warn!(capacity = self.capacity, ?phase, "system table is full");
            return Err(EcsError::SystemCapacityExhausted {
                capacity: self.capacity,
            });
        }

        let id = SystemId(self.entries.len() as u32);
        self.entries.push(SystemEntry { run, phase });
        Ok(id)
    }

    /// Gets a system by registration index.
    #[inline]
    #[must_use]
    pub fn get(&self, id: SystemId) -> Option<SystemEntry> {
        self.entries.get(id.index()).copied()
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether no system has been registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum number of systems.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Iterates over the ids of systems in `phase`, in registration order.
    pub fn ids_in_phase(&self, phase: SystemPhase) -> impl Iterator<Item = SystemId> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| entry.phase == phase)
            .map(|(index, _)| SystemId(index as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_world: &mut World) {}

    #[test]
    fn test_register_in_order() {
        let mut registry = SystemRegistry::new(3);
        assert!(registry.is_empty());

        let a = registry.register(noop, SystemPhase::Update).unwrap();
        let b = registry.register(noop, SystemPhase::Render).unwrap();
        let c = registry.register(noop, SystemPhase::Update).unwrap();

        assert_eq!((a, b, c), (SystemId(0), SystemId(1), SystemId(2)));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(b).map(|e| e.phase), Some(SystemPhase::Render));

        let update: Vec<SystemId> = registry.ids_in_phase(SystemPhase::Update).collect();
        assert_eq!(update, vec![a, c]);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut registry = SystemRegistry::new(1);
        registry.register(noop, SystemPhase::Update).unwrap();

        let err = registry.register(noop, SystemPhase::Update).unwrap_err();
        assert_eq!(err, EcsError::SystemCapacityExhausted { capacity: 1 });
        assert_eq!(registry.len(), 1);
        assert!(registry.get(SystemId(1)).is_none());
    }

    #[test]
    fn test_custom_phase() {
        let mut registry = SystemRegistry::new(2);
        registry.register(noop, SystemPhase::Custom(7)).unwrap();
        assert_eq!(registry.ids_in_phase(SystemPhase::Custom(7)).count(), 1);
        assert_eq!(registry.ids_in_phase(SystemPhase::Custom(8)).count(), 0);
        assert_eq!(SystemId(1).to_string(), "System(1)");
    }
}
