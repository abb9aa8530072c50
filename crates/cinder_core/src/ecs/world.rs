//! # ECS World
//!
//! The central container for all entities, components and systems.
//! Pre-allocates all memory at creation time.

use std::any::type_name;

use super::component::{Component, ComponentType};
use super::entity::{Entity, EntitySlot};
use super::inspect::{ComponentRecord, EntityReport};
use super::system::{SystemFn, SystemId, SystemPhase, SystemRegistry};
use crate::config::WorldConfig;
use crate::error::{ConfigError, EcsError, EcsResult};
use crate::memory::{ComponentPool, ErasedPool, IndexStack};

/// The ECS World - entity table, component pools and system table.
///
/// All tables are sized at creation and never grow. No allocations occur
/// during normal operation (create, destroy, attach, detach, access).
///
/// # Layout
///
/// - One [`EntitySlot`] per entity slot (version + allocation flag)
/// - A presence flag and a pool slot index per (entity slot, component type),
///   stored row-major as `slot * component_types + type`
/// - One pool per registered component type
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(1024, 8, 4);
/// world.register_component::<Position>(1024)?;
///
/// let entity = world.create_entity()?;
/// world.add_component(entity, Position { x: 1, y: 2 })?;
/// assert_eq!(world.get_component::<Position>(entity)?.x, 1);
/// ```
pub struct World {
    /// Entity slots (pre-allocated).
    slots: Box<[EntitySlot]>,
    /// Free entity slot indices.
    free_slots: IndexStack,
    /// Highest slot index ever handed out. Never decreases.
    high_water: u32,
    /// Number of currently allocated slots.
    alive_count: u32,
    /// Number of component types (width of each presence row).
    component_types: u32,
    /// Presence flag per (slot, type).
    presence: Box<[bool]>,
    /// Pool slot index per (slot, type), meaningful only where present.
    pool_slots: Box<[u32]>,
    /// One pool per component type, `None` until registered.
    pools: Box<[Option<Box<dyn ErasedPool>>]>,
    /// Registered systems.
    systems: SystemRegistry,
}

impl World {
    /// Creates a new world.
    ///
    /// This pre-allocates all memory upfront:
    /// - Entity slots, all at version 0 with no components
    /// - Presence and pool-slot tables for every component type
    /// - The free list of entity slots
    /// - The system table
    ///
    /// Component pools are allocated later by
    /// [`register_component`](Self::register_component). A world with
    /// `max_entities` of zero is usable but every
    /// [`create_entity`](Self::create_entity) fails.
    ///
    /// # Arguments
    ///
    /// * `max_entities` - Maximum number of live entities
    /// * `component_types` - Number of component type ids (`0..component_types`)
    /// * `max_systems` - Maximum number of registered systems
    #[must_use]
    pub fn new(max_entities: u32, component_types: u32, max_systems: u32) -> Self {
        let table_len = max_entities as usize * component_types as usize;

        tracing::debug!(max_entities, component_types, max_systems, "creating world");

        Self {
            slots: vec![EntitySlot::default(); max_entities as usize].into_boxed_slice(),
            free_slots: IndexStack::filled(max_entities),
            high_water: 0,
            alive_count: 0,
            component_types,
            presence: vec![false; table_len].into_boxed_slice(),
            pool_slots: vec![0; table_len].into_boxed_slice(),
            pools: (0..component_types).map(|_| None).collect(),
            systems: SystemRegistry::new(max_systems),
        }
    }

    /// Creates a world from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not
    /// validate.
    pub fn from_config(config: &WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.max_entities,
            config.component_types,
            config.max_systems,
        ))
    }

    /// Tears the world down, freeing every table and pool.
    ///
    /// Release hooks are **not** run for components that are still attached;
    /// only detaching or destroying an entity runs them.
    pub fn destroy(self) {
        let attached: u32 = self.pools.iter().flatten().map(|pool| pool.live_count()).sum();
        tracing::debug!(
            alive = self.alive_count,
            attached,
            "destroying world without releasing attached components"
        );
        drop(self);
    }

    // =========================================================================
    // Capacity queries
    // =========================================================================

    /// Returns the maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Returns the number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Returns the number of component type ids this world supports.
    #[inline]
    #[must_use]
    pub const fn component_type_count(&self) -> u32 {
        self.component_types
    }

    /// Checks whether a pool has been registered for `component_type`.
    #[must_use]
    pub fn is_registered(&self, component_type: ComponentType) -> bool {
        self.pool(component_type).is_some()
    }

    /// Returns the capacity of the pool registered for `component_type`.
    #[must_use]
    pub fn pool_capacity(&self, component_type: ComponentType) -> Option<u32> {
        self.pool(component_type).map(ErasedPool::capacity)
    }

    /// Returns the number of live components in the pool for `component_type`.
    #[must_use]
    pub fn pool_live_count(&self, component_type: ComponentType) -> Option<u32> {
        self.pool(component_type).map(ErasedPool::live_count)
    }

    // =========================================================================
    // Component registration
    // =========================================================================

    /// Registers a pool of `count` slots for component `C`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::ComponentTypeOutOfRange`] if `C::ID` is not below
    ///   [`component_type_count`](Self::component_type_count)
    /// - [`EcsError::ComponentAlreadyRegistered`] if `C::ID` already has a
    ///   pool; the existing pool is kept
    pub fn register_component<C: Component>(&mut self, count: u32) -> EcsResult<()> {
        self.ensure_unregistered(C::ID)?;
        self.install_pool(C::ID, Box::new(ComponentPool::<C>::new(count)));
        Ok(())
    }

    /// Registers a pool of `count` slots for component `C` that runs `hook`
    /// on each component right before its slot is recycled.
    ///
    /// # Errors
    ///
    /// Same as [`register_component`](Self::register_component); on error the
    /// hook is dropped without being called.
    pub fn register_component_with_release<C, F>(&mut self, count: u32, hook: F) -> EcsResult<()>
    where
        C: Component,
        F: FnMut(&mut C) + 'static,
    {
        self.ensure_unregistered(C::ID)?;
        self.install_pool(C::ID, Box::new(ComponentPool::<C>::with_release_hook(count, hook)));
        Ok(())
    }

    fn ensure_unregistered(&self, component_type: ComponentType) -> EcsResult<()> {
        self.check_type(component_type)?;
        if self.pool(component_type).is_some() {
            tracing::warn!(component_type, "component type registered more than once");
            return Err(EcsError::ComponentAlreadyRegistered { component_type });
        }
        Ok(())
    }

    fn install_pool(&mut self, component_type: ComponentType, pool: Box<dyn ErasedPool>) {
        tracing::debug!(
            component_type,
            component = pool.type_name(),
            capacity = pool.capacity(),
            "registered component pool"
        );
        self.pools[component_type as usize] = Some(pool);
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Creates a new entity.
    ///
    /// Pops the lowest recently freed slot and returns a handle stamped with
    /// the slot's current version. This is a **zero-allocation** operation.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExhausted`] if every slot is in use.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let Some(index) = self.free_slots.pop() else {
            tracing::warn!(capacity = self.capacity(), "entity table is full");
            return Err(EcsError::EntityCapacityExhausted {
                capacity: self.capacity(),
            });
        };

        let slot = &mut self.slots[index as usize];
        slot.alive = true;
        let entity = slot.handle(index);

        if index > self.high_water {
            self.high_water = index;
        }
        self.alive_count += 1;

        tracing::trace!(%entity, "created entity");
        Ok(entity)
    }

    /// Destroys an entity.
    ///
    /// The slot version is bumped first, invalidating every copy of the
    /// handle. Then every attached component is released through its pool
    /// (running release hooks), and the slot returns to the free list.
    ///
    /// A component whose pool refuses the release is logged and detached
    /// anyway; the slot is always returned.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is not live. Nothing
    /// is changed in that case.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.check_alive(entity)?;

        let index = entity.index();
        let slot = &mut self.slots[index as usize];
        slot.version = slot.version.wrapping_add(1);
        slot.alive = false;
        self.alive_count -= 1;

        for component_type in 0..self.component_types {
            let row = self.row(index, component_type);
            if !self.presence[row] {
                continue;
            }
            if let Err(err) = self.release_component(index, component_type) {
                tracing::warn!(%entity, component_type, %err, "detaching unreleased component");
                self.presence[row] = false;
            }
        }

        tracing::trace!(%entity, "destroyed entity");
        self.free_slots.push(index)
    }

    /// Checks whether the handle's version matches its slot's version.
    ///
    /// This is the stale-handle check: it turns false as soon as the entity
    /// is destroyed. A never-allocated slot still at version 0 also matches;
    /// use [`is_alive`](Self::is_alive) to exclude those.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.version == entity.version())
    }

    /// Checks whether the handle is valid and its slot is allocated.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index() as usize)
            .is_some_and(|slot| slot.alive && slot.version == entity.version())
    }

    /// Returns the current version of the handle's slot.
    ///
    /// This is the slot's stored version, not the handle's own; the two
    /// differ once the entity has been destroyed.
    #[inline]
    #[must_use]
    pub fn version(&self, entity: Entity) -> Option<u32> {
        self.slots.get(entity.index() as usize).map(|slot| slot.version)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Returns one past the highest slot index ever allocated.
    ///
    /// The bound only grows. Slots below it may be free (destroyed or never
    /// allocated), so callers walking `0..for_count()` with
    /// [`entity_at`](Self::entity_at) must filter with
    /// [`is_alive`](Self::is_alive) or a mask check.
    #[inline]
    #[must_use]
    pub const fn for_count(&self) -> u32 {
        self.high_water + 1
    }

    /// Returns the handle for slot `index` at its current version.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        self.slots.get(index as usize).map(|slot| slot.handle(index))
    }

    /// Iterates over live entities below the iteration bound.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.for_count()).filter_map(move |index| {
            let slot = self.slots.get(index as usize)?;
            slot.alive.then(|| slot.handle(index))
        })
    }

    /// Iterates over live entities carrying every component type in `mask`.
    pub fn entities_with<'a>(
        &'a self,
        mask: &'a [ComponentType],
    ) -> impl Iterator<Item = Entity> + 'a {
        self.entities().filter(move |&entity| self.has_mask(entity, mask))
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches component `value` to `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is not live
    /// - [`EcsError::ComponentTypeOutOfRange`] / [`EcsError::ComponentNotRegistered`]
    ///   / [`EcsError::ComponentTypeMismatch`] if `C` has no usable pool
    /// - [`EcsError::ComponentAlreadyPresent`] if the entity already carries a
    ///   `C`; the existing value is left untouched
    /// - [`EcsError::PoolExhausted`] if the pool for `C` is full
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> EcsResult<()> {
        let row = self.vacant_row(entity, C::ID)?;
        let slot = self.typed_pool_mut::<C>()?.acquire(value)?;
        self.pool_slots[row] = slot;
        self.presence[row] = true;
        Ok(())
    }

    /// Attaches a component given as raw bytes.
    ///
    /// `bytes` must be exactly the registered element size for
    /// `component_type`.
    ///
    /// # Errors
    ///
    /// As [`add_component`](Self::add_component), plus
    /// [`EcsError::ComponentSizeMismatch`] on a length mismatch.
    pub fn add_component_bytes(
        &mut self,
        entity: Entity,
        component_type: ComponentType,
        bytes: &[u8],
    ) -> EcsResult<()> {
        let row = self.vacant_row(entity, component_type)?;
        let slot = self.erased_pool_mut(component_type)?.acquire_bytes(bytes)?;
        self.pool_slots[row] = slot;
        self.presence[row] = true;
        Ok(())
    }

    /// Detaches the component of `component_type` from `entity`, running the
    /// pool's release hook.
    ///
    /// # Errors
    ///
    /// - [`EcsError::StaleEntity`] if the handle is not live
    /// - [`EcsError::ComponentTypeOutOfRange`] for an unknown type id
    /// - [`EcsError::ComponentMissing`] if the entity has no such component
    pub fn remove_component(
        &mut self,
        entity: Entity,
        component_type: ComponentType,
    ) -> EcsResult<()> {
        self.occupied_row(entity, component_type)?;
        self.release_component(entity.index(), component_type)
    }

    /// Gets `entity`'s component of type `C`.
    ///
    /// The reference points straight into pool storage, so the borrow checker
    /// rules out holding it across any call that could recycle the slot.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`], [`EcsError::ComponentMissing`], or a
    /// registration error if `C` has no usable pool.
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        let row = self.occupied_row(entity, C::ID)?;
        let slot = self.pool_slots[row];
        self.typed_pool::<C>()?
            .get(slot)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component_type: C::ID,
            })
    }

    /// Gets `entity`'s component of type `C` mutably.
    ///
    /// # Errors
    ///
    /// See [`get_component`](Self::get_component).
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let row = self.occupied_row(entity, C::ID)?;
        let slot = self.pool_slots[row];
        self.typed_pool_mut::<C>()?
            .get_mut(slot)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component_type: C::ID,
            })
    }

    /// Gets a byte view of `entity`'s component of `component_type`.
    ///
    /// # Errors
    ///
    /// See [`get_component`](Self::get_component).
    pub fn get_component_bytes(
        &self,
        entity: Entity,
        component_type: ComponentType,
    ) -> EcsResult<&[u8]> {
        let row = self.occupied_row(entity, component_type)?;
        let slot = self.pool_slots[row];
        self.erased_pool(component_type)?
            .bytes(slot)
            .ok_or(EcsError::ComponentMissing {
                entity,
                component_type,
            })
    }

    /// Checks whether `entity` carries a component of `component_type`.
    ///
    /// False for stale handles and out-of-range type ids.
    #[inline]
    #[must_use]
    pub fn has_component(&self, entity: Entity, component_type: ComponentType) -> bool {
        self.is_valid(entity)
            && component_type < self.component_types
            && self.presence[self.row(entity.index(), component_type)]
    }

    /// Checks whether `entity` carries a component of type `C`.
    #[inline]
    #[must_use]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.has_component(entity, C::ID)
    }

    /// Checks whether `entity` carries every component type in `mask`.
    ///
    /// An empty mask is always satisfied.
    #[must_use]
    pub fn has_mask(&self, entity: Entity, mask: &[ComponentType]) -> bool {
        mask.iter()
            .all(|&component_type| self.has_component(entity, component_type))
    }

    /// Builds a printable snapshot of an entity slot's bookkeeping.
    ///
    /// Returns `None` if the handle's index is outside the entity table. The
    /// report reflects the slot as it is now, whatever the handle's version.
    #[must_use]
    pub fn inspect(&self, entity: Entity) -> Option<EntityReport> {
        let index = entity.index();
        let slot = self.slots.get(index as usize)?;

        let components = (0..self.component_types)
            .map(|component_type| {
                let row = self.row(index, component_type);
                ComponentRecord {
                    component_type,
                    present: self.presence[row],
                    pool_slot: self.pool_slots[row],
                }
            })
            .collect();

        Some(EntityReport {
            index,
            version: slot.version,
            alive: slot.alive,
            components,
        })
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a system to run in `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::SystemCapacityExhausted`] if the system table is
    /// full.
    pub fn register_system(&mut self, run: SystemFn, phase: SystemPhase) -> EcsResult<SystemId> {
        self.systems.register(run, phase)
    }

    /// Runs every system registered for `phase`, in registration order.
    ///
    /// The system table is re-read after each system, so a system registered
    /// by a running system of the same phase also runs in this pass.
    ///
    /// # Returns
    ///
    /// Number of systems run.
    pub fn run_phase(&mut self, phase: SystemPhase) -> usize {
        let mut ran = 0;
        let mut next = 0;

        while let Some(entry) = self.systems.get(SystemId(next)) {
            if entry.phase == phase {
                (entry.run)(self);
                ran += 1;
            }
            next += 1;
        }

        ran
    }

    /// Runs a single system by registration index, whatever its phase.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownSystem`] if no system has that index.
    pub fn run_system(&mut self, id: SystemId) -> EcsResult<()> {
        let Some(entry) = self.systems.get(id) else {
            tracing::warn!(system = id.0, "no system registered at index");
            return Err(EcsError::UnknownSystem { index: id.0 });
        };

        (entry.run)(self);
        Ok(())
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Returns the system table.
    #[inline]
    #[must_use]
    pub const fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    // =========================================================================
    // Internals
    // =========================================================================

    #[inline]
    fn row(&self, index: u32, component_type: ComponentType) -> usize {
        index as usize * self.component_types as usize + component_type as usize
    }

    fn check_type(&self, component_type: ComponentType) -> EcsResult<()> {
        if component_type >= self.component_types {
            tracing::warn!(
                component_type,
                count = self.component_types,
                "component type out of range"
            );
            return Err(EcsError::ComponentTypeOutOfRange {
                component_type,
                count: self.component_types,
            });
        }
        Ok(())
    }

    fn check_alive(&self, entity: Entity) -> EcsResult<()> {
        if !self.is_alive(entity) {
            tracing::warn!(%entity, "entity is stale or was never allocated");
            return Err(EcsError::StaleEntity { entity });
        }
        Ok(())
    }

    /// Row for attaching `component_type` to a live entity that lacks it.
    fn vacant_row(&self, entity: Entity, component_type: ComponentType) -> EcsResult<usize> {
        self.check_alive(entity)?;
        self.check_type(component_type)?;

        let row = self.row(entity.index(), component_type);
        if self.presence[row] {
            tracing::warn!(%entity, component_type, "component already exists on entity");
            return Err(EcsError::ComponentAlreadyPresent {
                entity,
                component_type,
            });
        }
        Ok(row)
    }

    /// Row of an attached `component_type` on a live entity.
    fn occupied_row(&self, entity: Entity, component_type: ComponentType) -> EcsResult<usize> {
        self.check_alive(entity)?;
        self.check_type(component_type)?;

        let row = self.row(entity.index(), component_type);
        if !self.presence[row] {
            tracing::warn!(%entity, component_type, "component doesn't exist on entity");
            return Err(EcsError::ComponentMissing {
                entity,
                component_type,
            });
        }
        Ok(row)
    }

    /// Releases the pool slot behind (`index`, `component_type`) and clears
    /// the presence flag. Does not look at the slot's version.
    fn release_component(&mut self, index: u32, component_type: ComponentType) -> EcsResult<()> {
        let row = self.row(index, component_type);
        let pool_slot = self.pool_slots[row];
        self.erased_pool_mut(component_type)?.release(pool_slot)?;
        self.presence[row] = false;
        Ok(())
    }

    fn pool(&self, component_type: ComponentType) -> Option<&dyn ErasedPool> {
        self.pools.get(component_type as usize)?.as_deref()
    }

    fn erased_pool(&self, component_type: ComponentType) -> EcsResult<&dyn ErasedPool> {
        self.check_type(component_type)?;
        self.pool(component_type).ok_or_else(|| {
            tracing::warn!(component_type, "component type has no registered pool");
            EcsError::ComponentNotRegistered { component_type }
        })
    }

    fn erased_pool_mut(&mut self, component_type: ComponentType) -> EcsResult<&mut dyn ErasedPool> {
        self.check_type(component_type)?;
        match self.pools[component_type as usize].as_deref_mut() {
            Some(pool) => Ok(pool),
            None => {
                tracing::warn!(component_type, "component type has no registered pool");
                Err(EcsError::ComponentNotRegistered { component_type })
            }
        }
    }

    fn typed_pool<C: Component>(&self) -> EcsResult<&ComponentPool<C>> {
        let pool = self.erased_pool(C::ID)?;
        let stored = pool.type_name();
        pool.as_any()
            .downcast_ref::<ComponentPool<C>>()
            .ok_or_else(|| type_mismatch::<C>(stored))
    }

    fn typed_pool_mut<C: Component>(&mut self) -> EcsResult<&mut ComponentPool<C>> {
        let pool = self.erased_pool_mut(C::ID)?;
        let stored = pool.type_name();
        pool.as_any_mut()
            .downcast_mut::<ComponentPool<C>>()
            .ok_or_else(|| type_mismatch::<C>(stored))
    }
}

fn type_mismatch<C: Component>(stored: &'static str) -> EcsError {
    tracing::warn!(
        component_type = C::ID,
        stored,
        requested = type_name::<C>(),
        "component type id is registered for a different type"
    );
    EcsError::ComponentTypeMismatch {
        component_type: C::ID,
        requested: type_name::<C>(),
    }
}
