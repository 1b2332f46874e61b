//! A bump (linear) arena for tree nodes whose lifetime is one force-kernel
//! call.
//!
//! Allocation is a single increment; there is no per-node destructor and no
//! freeing of individual slots. `reset` drops the whole tree at once by
//! rewinding the cursor. Nodes are addressed by index into the arena
//! rather than by machine pointer: this halves node size on 64-bit
//! targets and keeps the arena `Send`/`Sync` trivially, which the parallel
//! force evaluator in [`crate::force`] relies on.

use crate::error::{BhError, BhResult};

/// Index of a node within an [`Arena`]. `NONE` marks an empty child slot.
pub type NodeIndex = u32;

/// Sentinel for "no node here".
pub const NONE: NodeIndex = u32::MAX;

pub struct Arena<T> {
    slots: Vec<T>,
    used: usize,
}

impl<T: Clone + Default> Arena<T> {
    /// Pre-allocates `capacity` slots. Callers typically pick
    /// `capacity = c * n` with `c` in `[4, 10]`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![T::default(); capacity],
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// O(1): rewinds the cursor without touching slot contents. Every slot
    /// handed out again by [`Self::alloc`] is fully reinitialised by the
    /// caller before being read.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Doubles capacity. Does not reset `used`; callers that grow
    /// mid-build are expected to `reset()` and restart construction from
    /// scratch.
    pub fn grow(&mut self) {
        let new_capacity = (self.slots.len() * 2).max(1);
        self.slots.resize(new_capacity, T::default());
    }

    /// Hands out the next slot, or faults with `ArenaExhausted` if the
    /// arena is full (the fallback when auto-grow is disabled or already
    /// attempted).
    pub fn alloc(&mut self, n_particles: usize, capacity_factor: usize) -> BhResult<NodeIndex> {
        if self.used == self.slots.len() {
            return Err(BhError::ArenaExhausted {
                capacity: self.slots.len(),
                n: n_particles,
                suggested: self.slots.len() * 2,
                factor: capacity_factor,
            });
        }
        let idx = self.used;
        self.used += 1;
        Ok(idx as NodeIndex)
    }

    pub fn get(&self, idx: NodeIndex) -> &T {
        &self.slots[idx as usize]
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> &mut T {
        &mut self.slots[idx as usize]
    }

    pub fn set(&mut self, idx: NodeIndex, value: T) {
        self.slots[idx as usize] = value;
    }
}
