//! # Entity Management
//!
//! Entities are opaque handles consisting of:
//! - A slot index into the entity table
//! - A version stamp for detecting stale references after slot reuse

use std::fmt;

/// Handle to an entity.
///
/// The handle is a single `u64`:
/// - Lower 32 bits: Slot index into the entity table
/// - Upper 32 bits: Version of the slot when the handle was issued
///
/// A handle is valid only while the world's stored version for its slot
/// equals the handle's version. Destroying the entity bumps the slot version,
/// invalidating every outstanding copy of the handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Creates a handle from a slot index and version.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `version` - The slot version (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, version: u32) -> Self {
        Self(((version as u64) << 32) | (index as u64))
    }

    /// Returns the slot index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the version portion of the handle.
    #[inline]
    #[must_use]
    pub const fn version(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from its packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({} v{})", self.index(), self.version())
    }
}

/// One row of the entity table.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct EntitySlot {
    /// Bumped every time the slot's entity is destroyed.
    pub version: u32,
    /// Whether the slot is currently allocated to an entity.
    pub alive: bool,
}

impl EntitySlot {
    /// Handle for this slot at its current version.
    #[inline]
    pub const fn handle(self, index: u32) -> Entity {
        Entity::new(index, self.version)
    }
}
