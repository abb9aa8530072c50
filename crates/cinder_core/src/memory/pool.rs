//! # Component Pool
//!
//! Fixed-size block storage for one component type, recycled through an
//! [`IndexStack`].

use std::any::Any;
use std::mem::size_of;

use super::stack::IndexStack;
use crate::ecs::{Component, ComponentType};
use crate::error::{EcsError, EcsResult};

/// Callback run on an element right before its slot is recycled.
pub type ReleaseHook<C> = Box<dyn FnMut(&mut C)>;

/// A pool of `count` slots holding components of type `C`.
///
/// All memory is pre-allocated (zeroed) at creation. Slots are handed out
/// lowest index first and returned in LIFO order.
///
/// The optional release hook runs when a slot is released, i.e. when the
/// component is detached or its entity is destroyed. Dropping the pool does
/// **not** run the hook for elements that are still live.
///
/// # Example
///
/// ```rust,ignore
/// use bytemuck::{Pod, Zeroable};
/// use cinder_core::{Component, ComponentPool};
///
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// #[repr(C)]
/// struct Health(u32);
///
/// impl Component for Health {
///     const ID: u32 = 0;
/// }
///
/// let mut pool = ComponentPool::new(2);
/// let slot = pool.acquire(Health(10)).unwrap();
/// assert_eq!(pool.get(slot).map(|h| h.0), Some(10));
/// pool.release(slot).unwrap();
/// assert_eq!(pool.live_count(), 0);
/// ```
pub struct ComponentPool<C: Component> {
    /// Element storage, one entry per slot.
    storage: Box<[C]>,
    /// Slots not currently holding a live component.
    free: IndexStack,
    /// Per-slot liveness, kept in step with `free`.
    live: Box<[bool]>,
    /// Runs on an element before its slot returns to `free`.
    on_release: Option<ReleaseHook<C>>,
}

impl<C: Component> ComponentPool<C> {
    /// Creates a pool with `count` slots and no release hook.
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            storage: vec![C::zeroed(); count as usize].into_boxed_slice(),
            free: IndexStack::filled(count),
            live: vec![false; count as usize].into_boxed_slice(),
            on_release: None,
        }
    }

    /// Creates a pool with `count` slots that runs `hook` on every release.
    #[must_use]
    pub fn with_release_hook<F>(count: u32, hook: F) -> Self
    where
        F: FnMut(&mut C) + 'static,
    {
        Self {
            on_release: Some(Box::new(hook)),
            ..Self::new(count)
        }
    }

    /// Returns the number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.free.capacity()
    }

    /// Returns the number of slots holding a live component.
    #[inline]
    #[must_use]
    pub fn live_count(&self) -> u32 {
        self.capacity() - self.free.top() as u32
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> u32 {
        self.free.top() as u32
    }

    /// Stores `value` in a free slot and returns the slot index.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::PoolExhausted`] if every slot is live. The pool is
    /// left untouched.
    pub fn acquire(&mut self, value: C) -> EcsResult<u32> {
        let Some(slot) = self.free.pop() else {
            tracing::warn!(
                component_type = C::ID,
                capacity = self.capacity(),
                "component pool exhausted"
            );
            return Err(EcsError::PoolExhausted {
                component_type: C::ID,
                capacity: self.capacity(),
            });
        };

        self.storage[slot as usize] = value;
        self.live[slot as usize] = true;
        Ok(slot)
    }

    /// Runs the release hook on `slot` and returns it to the free stack.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::PoolSlotNotLive`] if `slot` is out of range or was
    /// not handed out by [`acquire`](Self::acquire) since its last release.
    /// The hook does not run and the free stack is untouched.
    pub fn release(&mut self, slot: u32) -> EcsResult<()> {
        if !self.is_live(slot) {
            tracing::warn!(component_type = C::ID, slot, "released pool slot is not live");
            return Err(EcsError::PoolSlotNotLive {
                component_type: C::ID,
                slot,
            });
        }

        if let (Some(hook), Some(value)) =
            (self.on_release.as_mut(), self.storage.get_mut(slot as usize))
        {
            hook(value);
        }

        self.live[slot as usize] = false;
        self.free.push(slot)
    }

    /// Checks whether `slot` currently holds a live component.
    #[inline]
    #[must_use]
    pub fn is_live(&self, slot: u32) -> bool {
        self.live.get(slot as usize).copied().unwrap_or(false)
    }

    /// Gets the component stored in `slot`.
    ///
    /// Free slots still hold their last value; check [`is_live`](Self::is_live)
    /// when that matters.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&C> {
        self.storage.get(slot as usize)
    }

    /// Gets the component stored in `slot` mutably.
    #[inline]
    pub fn get_mut(&mut self, slot: u32) -> Option<&mut C> {
        self.storage.get_mut(slot as usize)
    }
}

/// Type-erased view of a [`ComponentPool`].
///
/// The world keeps one boxed `ErasedPool` per registered component type.
/// Operations that do not need the concrete type (releasing a slot, byte
/// access) go through this trait; typed access downcasts via [`Any`].
pub trait ErasedPool {
    /// Component type id the pool was registered under.
    fn component_type(&self) -> ComponentType;

    /// Rust type name of the stored component.
    fn type_name(&self) -> &'static str;

    /// Size in bytes of one element.
    fn element_size(&self) -> usize;

    /// Number of slots.
    fn capacity(&self) -> u32;

    /// Number of live slots.
    fn live_count(&self) -> u32;

    /// Releases a slot, running the release hook.
    ///
    /// # Errors
    ///
    /// See [`ComponentPool::release`].
    fn release(&mut self, slot: u32) -> EcsResult<()>;

    /// Copies `bytes` into a free slot and returns the slot index.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ComponentSizeMismatch`] if `bytes` is not exactly
    /// one element long, or [`EcsError::PoolExhausted`] if the pool is full.
    fn acquire_bytes(&mut self, bytes: &[u8]) -> EcsResult<u32>;

    /// Byte view of the element in `slot`.
    fn bytes(&self, slot: u32) -> Option<&[u8]>;

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedPool for ComponentPool<C> {
    fn component_type(&self) -> ComponentType {
        C::ID
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<C>()
    }

    fn element_size(&self) -> usize {
        size_of::<C>()
    }

    fn capacity(&self) -> u32 {
        Self::capacity(self)
    }

    fn live_count(&self) -> u32 {
        Self::live_count(self)
    }

    fn release(&mut self, slot: u32) -> EcsResult<()> {
        Self::release(self, slot)
    }

    fn acquire_bytes(&mut self, bytes: &[u8]) -> EcsResult<u32> {
        if bytes.len() != size_of::<C>() {
            tracing::warn!(
                component_type = C::ID,
                expected = size_of::<C>(),
                actual = bytes.len(),
                "component byte length does not match element size"
            );
            return Err(EcsError::ComponentSizeMismatch {
                component_type: C::ID,
                expected: size_of::<C>(),
                actual: bytes.len(),
            });
        }

        self.acquire(bytemuck::pod_read_unaligned(bytes))
    }

    fn bytes(&self, slot: u32) -> Option<&[u8]> {
        self.get(slot).map(bytemuck::bytes_of)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{Pod, Zeroable};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Counter {
        value: u32,
    }

    impl Component for Counter {
        const ID: ComponentType = 3;
    }

    #[test]
    fn test_pool_hands_out_lowest_slot_first() {
        let mut pool: ComponentPool<Counter> = ComponentPool::new(3);
        assert_eq!(pool.acquire(Counter { value: 1 }).unwrap(), 0);
        assert_eq!(pool.acquire(Counter { value: 2 }).unwrap(), 1);
        assert_eq!(pool.get(1), Some(&Counter { value: 2 }));
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_pool_full() {
        let mut pool: ComponentPool<Counter> = ComponentPool::new(1);
        let slot = pool.acquire(Counter { value: 5 }).unwrap();

        let err = pool.acquire(Counter { value: 6 }).unwrap_err();
        assert_eq!(err, EcsError::PoolExhausted { component_type: 3, capacity: 1 });
        assert_eq!(pool.get(slot), Some(&Counter { value: 5 }));
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool: ComponentPool<Counter> = ComponentPool::new(2);
        let a = pool.acquire(Counter { value: 1 }).unwrap();
        let _b = pool.acquire(Counter { value: 2 }).unwrap();
        pool.release(a).unwrap();

        let c = pool.acquire(Counter { value: 3 }).unwrap();
        assert_eq!(a, c);
        assert_eq!(pool.get(c), Some(&Counter { value: 3 }));
    }

    #[test]
    fn test_double_release_is_rejected() {
        let mut pool: ComponentPool<Counter> = ComponentPool::new(2);
        let a = pool.acquire(Counter { value: 1 }).unwrap();
        let b = pool.acquire(Counter { value: 2 }).unwrap();

        pool.release(a).unwrap();
        assert!(!pool.is_live(a));
        assert_eq!(
            pool.release(a),
            Err(EcsError::PoolSlotNotLive { component_type: 3, slot: a })
        );
        assert_eq!(
            pool.release(9),
            Err(EcsError::PoolSlotNotLive { component_type: 3, slot: 9 })
        );

        // The free stack holds `a` once, so the two new components get distinct slots.
        let x = pool.acquire(Counter { value: 3 }).unwrap();
        assert_eq!(x, a);
        assert!(pool.acquire(Counter { value: 4 }).is_err());
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.get(b), Some(&Counter { value: 2 }));
    }

    #[test]
    fn test_double_release_skips_hook() {
        let seen = Rc::new(Cell::new(0));
        let hook_seen = Rc::clone(&seen);
        let mut pool = ComponentPool::with_release_hook(1, move |_: &mut Counter| {
            hook_seen.set(hook_seen.get() + 1);
        });

        let slot = pool.acquire(Counter { value: 1 }).unwrap();
        pool.release(slot).unwrap();
        assert!(pool.release(slot).is_err());
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_release_hook_runs_before_recycle() {
        let seen = Rc::new(Cell::new(0));
        let hook_seen = Rc::clone(&seen);
        let mut pool = ComponentPool::with_release_hook(2, move |c: &mut Counter| {
            hook_seen.set(hook_seen.get() + c.value);
        });

        let slot = pool.acquire(Counter { value: 40 }).unwrap();
        assert_eq!(seen.get(), 0);
        pool.release(slot).unwrap();
        assert_eq!(seen.get(), 40);
    }

    #[test]
    fn test_drop_skips_release_hook() {
        let seen = Rc::new(Cell::new(0));
        let hook_seen = Rc::clone(&seen);
        {
            let mut pool = ComponentPool::with_release_hook(2, move |_: &mut Counter| {
                hook_seen.set(hook_seen.get() + 1);
            });
            pool.acquire(Counter { value: 1 }).unwrap();
            pool.acquire(Counter { value: 2 }).unwrap();
        }
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn test_erased_byte_access() {
        let mut pool: Box<dyn ErasedPool> = Box::new(ComponentPool::<Counter>::new(2));
        assert_eq!(pool.element_size(), 4);
        assert_eq!(pool.component_type(), 3);

        let slot = pool.acquire_bytes(&9u32.to_ne_bytes()).unwrap();
        assert_eq!(pool.bytes(slot), Some(&9u32.to_ne_bytes()[..]));

        let err = pool.acquire_bytes(&[1, 2]).unwrap_err();
        assert_eq!(
            err,
            EcsError::ComponentSizeMismatch { component_type: 3, expected: 4, actual: 2 }
        );

        let typed = pool.as_any().downcast_ref::<ComponentPool<Counter>>().unwrap();
        assert_eq!(typed.get(slot), Some(&Counter { value: 9 }));
    }
}
