//! # Index Stack
//!
//! Fixed-capacity LIFO of `u32` indices. This is the only allocation
//! primitive in the crate: entity slots and component pool slots are both
//! recycled through one.

use crate::error::{EcsError, EcsResult};

/// A fixed-capacity stack of recyclable indices.
///
/// Storage is allocated once, sized exactly to the capacity. The stack never
/// grows: pushing onto a full stack drops the value and reports
/// [`EcsError::StackFull`], popping an empty stack returns `None`.
///
/// # Example
///
/// ```rust,ignore
/// use cinder_core::IndexStack;
///
/// let mut free = IndexStack::filled(3);
/// assert_eq!(free.pop(), Some(0));
/// assert_eq!(free.pop(), Some(1));
/// free.push(0).unwrap();
/// assert_eq!(free.peek(), Some(0));
/// ```
#[derive(Clone, Debug)]
pub struct IndexStack {
    /// Backing storage, `capacity` entries long.
    data: Box<[u32]>,
    /// Number of entries currently on the stack.
    top: usize,
}

impl IndexStack {
    /// Creates an empty stack able to hold `capacity` indices.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            data: vec![0; capacity as usize].into_boxed_slice(),
            top: 0,
        }
    }

    /// Creates a full stack holding every index in `0..capacity`.
    ///
    /// Indices are pushed in descending order, so they pop in ascending
    /// order: index 0 is handed out first.
    #[must_use]
    pub fn filled(capacity: u32) -> Self {
        let data: Box<[u32]> = (0..capacity).rev().collect();
        let top = data.len();
        Self { data, top }
    }

    /// Returns the maximum number of indices the stack can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.data.len() as u32
    }

    /// Returns the number of indices currently on the stack.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Checks whether the stack holds no indices.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.top == 0
    }

    /// Checks whether the stack is at capacity.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.top == self.data.len()
    }

    /// Pushes an index.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StackFull`] if the stack is at capacity. The value
    /// is dropped, not queued.
    #[inline]
    pub fn push(&mut self, value: u32) -> EcsResult<()> {
        if self.is_full() {
            tracing::warn!(value, capacity = self.capacity(), "failed to push, index stack is full");
            return Err(EcsError::StackFull {
                value,
                capacity: self.capacity(),
            });
        }

        self.data[self.top] = value;
        self.top += 1;
        Ok(())
    }

    /// Pops the most recently pushed index, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<u32> {
        if self.is_empty() {
            tracing::warn!("failed to pop, index stack is empty");
            return None;
        }

        self.top -= 1;
        Some(self.data[self.top])
    }

    /// Returns the index `pop` would return, without removing it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<u32> {
        if self.is_empty() {
            tracing::warn!("failed to peek, index stack is empty");
            return None;
        }

        Some(self.data[self.top - 1])
    }
}
