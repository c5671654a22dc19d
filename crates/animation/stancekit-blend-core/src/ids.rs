//! Identifiers and the allocator for registered actions.

use serde::{Deserialize, Serialize};

/// Dense index of an action inside its registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u32);

impl ActionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Caller-chosen token echoed back when a one-shot finishes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CompletionTag(pub u32);

/// Monotonic allocator for ActionId.
/// Ids double as registry indices, so they are never reused.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_action: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_action(&mut self) -> ActionId {
        let id = ActionId(self.next_action);
        self.next_action = self.next_action.wrapping_add(1);
        id
    }

    #[inline]
    pub fn allocated(&self) -> usize {
        self.next_action as usize
    }
}
