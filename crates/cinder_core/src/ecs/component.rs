//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must be plain old data so a pool can pre-allocate them zeroed and
//! hand out byte views of them.

use bytemuck::{Pod, Zeroable};

/// Runtime identifier of a component type.
///
/// Indexes the world's pool table and each entity's presence row, so it must
/// be below the `component_types` count the world was created with.
pub type ComponentType = u32;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Pod`: Plain old data, bitwise copyable, no destructor
/// - `Zeroable`: Pool slots start out zeroed
///
/// Per-release cleanup is attached to the pool at registration instead of
/// being a `Drop` impl, see
/// [`World::register_component_with_release`](crate::World::register_component_with_release).
///
/// # Example
///
/// ```rust,ignore
/// use bytemuck::{Pod, Zeroable};
/// use cinder_core::Component;
///
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: i32,
///     y: i32,
/// }
///
/// impl Component for Position {
///     const ID: u32 = 0;
/// }
/// ```
pub trait Component: Pod + Zeroable + Send + Sync + 'static {
    /// Component type id, used for the pool table and presence masks.
    const ID: ComponentType;
}

/// Builds a component type list for [`World::has_mask`](crate::World::has_mask)
/// and [`World::entities_with`](crate::World::entities_with).
///
/// ```rust,ignore
/// // Position::ID == 0, Velocity::ID == 4
/// assert_eq!(mask![Position, Velocity], [0, 4]);
/// ```
#[macro_export]
macro_rules! mask {
    ($($component:ty),* $(,)?) => {
        [$(<$component as $crate::Component>::ID),*]
    };
}
