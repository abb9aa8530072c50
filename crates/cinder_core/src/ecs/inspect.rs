//! # Entity Inspection
//!
//! Debug snapshots of an entity slot's bookkeeping.

use std::fmt;

use super::component::ComponentType;

/// Presence and pool slot of one component type on an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentRecord {
    /// The component type.
    pub component_type: ComponentType,
    /// Whether the entity carries this component.
    pub present: bool,
    /// Pool slot index. Only meaningful when `present`; otherwise it is the
    /// slot the component last occupied.
    pub pool_slot: u32,
}

/// Snapshot of one entity slot, produced by [`World::inspect`](super::World::inspect).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityReport {
    /// Slot index.
    pub index: u32,
    /// Current slot version.
    pub version: u32,
    /// Whether the slot is allocated.
    pub alive: bool,
    /// One record per component type, in type order.
    pub components: Vec<ComponentRecord>,
}

impl EntityReport {
    /// Presence bits, highest component type first.
    #[must_use]
    pub fn mask_string(&self) -> String {
        self.components
            .iter()
            .rev()
            .map(|record| if record.present { '1' } else { '0' })
            .collect()
    }
}

impl fmt::Display for EntityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---- Entity ----")?;
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Alive: {}", self.alive)?;
        writeln!(f, "Mask: {}", self.mask_string())?;
        for record in &self.components {
            if record.present {
                writeln!(
                    f,
                    "Component Type: {} (Index: {})",
                    record.component_type, record.pool_slot
                )?;
            } else {
                writeln!(f, "Component Type: {} (Index: -)", record.component_type)?;
            }
        }
        write!(f, "----------------")
    }
}
