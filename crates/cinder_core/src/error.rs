//! # ECS Error Types
//!
//! Every condition the world can detect is reported as an [`EcsError`].
//! Nothing here is fatal: the operation that produced the error leaves the
//! world exactly as it found it, and a warning has already been emitted
//! through `tracing` by the time the caller sees the value.

use thiserror::Error;

use crate::ecs::{ComponentType, Entity};

/// Broad classification of an [`EcsError`].
///
/// Lets callers tell "already there" apart from "not there" or "out of room"
/// without re-querying world state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The thing being created or attached already exists.
    Duplicate,
    /// The thing being read, removed or run does not exist.
    Absent,
    /// A fixed-capacity table or pool has no free slot left.
    Exhausted,
    /// The caller broke the registration contract (bad type id, wrong type).
    Contract,
}

/// Errors that can occur in the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component type was registered a second time.
    #[error("component type {component_type} registered more than once")]
    ComponentAlreadyRegistered {
        /// The duplicated component type.
        component_type: ComponentType,
    },

    /// A component type was used before its pool was registered.
    #[error("component type {component_type} has no registered pool")]
    ComponentNotRegistered {
        /// The unregistered component type.
        component_type: ComponentType,
    },

    /// A component type id is outside the range the world was built for.
    #[error("component type {component_type} out of range (world has {count} types)")]
    ComponentTypeOutOfRange {
        /// The offending component type.
        component_type: ComponentType,
        /// Number of component types the world was created with.
        count: u32,
    },

    /// The pool registered for a type holds a different Rust type.
    #[error("component type {component_type} is not stored as {requested}")]
    ComponentTypeMismatch {
        /// The component type id.
        component_type: ComponentType,
        /// Name of the Rust type the caller asked for.
        requested: &'static str,
    },

    /// Raw component bytes did not match the registered element size.
    #[error("component type {component_type} expects {expected} bytes, got {actual}")]
    ComponentSizeMismatch {
        /// The component type id.
        component_type: ComponentType,
        /// Element size of the registered pool.
        expected: usize,
        /// Length of the supplied byte slice.
        actual: usize,
    },

    /// The entity already carries a component of this type.
    #[error("component {component_type} already exists on {entity}")]
    ComponentAlreadyPresent {
        /// The entity.
        entity: Entity,
        /// The component type.
        component_type: ComponentType,
    },

    /// The entity does not carry a component of this type.
    #[error("component {component_type} doesn't exist on {entity}")]
    ComponentMissing {
        /// The entity.
        entity: Entity,
        /// The component type.
        component_type: ComponentType,
    },

    /// The handle refers to a destroyed, recycled or never-allocated slot.
    #[error("{entity} is stale or was never allocated")]
    StaleEntity {
        /// The stale handle.
        entity: Entity,
    },

    /// Every entity slot is in use.
    #[error("entity table full: capacity {capacity}")]
    EntityCapacityExhausted {
        /// Maximum number of live entities.
        capacity: u32,
    },

    /// Every slot of a component pool is in use.
    #[error("pool for component type {component_type} full: capacity {capacity}")]
    PoolExhausted {
        /// The component type whose pool is full.
        component_type: ComponentType,
        /// Pool capacity.
        capacity: u32,
    },

    /// A pool slot was released while not holding a live component.
    #[error("pool slot {slot} of component type {component_type} is not live")]
    PoolSlotNotLive {
        /// The component type whose pool was asked.
        component_type: ComponentType,
        /// The released slot.
        slot: u32,
    },

    /// An index was pushed onto a full free-index stack.
    #[error("failed to push {value}, index stack full at capacity {capacity}")]
    StackFull {
        /// The value that was dropped.
        value: u32,
        /// Stack capacity.
        capacity: u32,
    },

    /// The system table has no room for another registration.
    #[error("system table full: capacity {capacity}")]
    SystemCapacityExhausted {
        /// Maximum number of systems.
        capacity: u32,
    },

    /// No system was registered at this index.
    #[error("no system registered at index {index}")]
    UnknownSystem {
        /// The requested system index.
        index: u32,
    },
}

impl EcsError {
    /// Returns the broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ComponentAlreadyRegistered { .. } | Self::ComponentAlreadyPresent { .. } => {
                ErrorKind::Duplicate
            }
            Self::ComponentNotRegistered { .. }
            | Self::ComponentMissing { .. }
            | Self::StaleEntity { .. }
            | Self::PoolSlotNotLive { .. }
            | Self::UnknownSystem { .. } => ErrorKind::Absent,
            Self::EntityCapacityExhausted { .. }
            | Self::PoolExhausted { .. }
            | Self::StackFull { .. }
            | Self::SystemCapacityExhausted { .. } => ErrorKind::Exhausted,
            Self::ComponentTypeOutOfRange { .. }
            | Self::ComponentTypeMismatch { .. }
            | Self::ComponentSizeMismatch { .. } => ErrorKind::Contract,
        }
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors produced while loading or validating a [`WorldConfig`](crate::WorldConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("invalid world config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A capacity in the config is unusable.
    #[error("invalid world config: {0}")]
    Invalid(String),
}
