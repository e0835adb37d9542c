//! Fixed-capacity FIFO of nodes awaiting expansion.

use crate::node::{NodeId, NODE_COUNT};

/// Array-backed queue. A search enqueues each node at most once, so
/// `NODE_COUNT` slots are always enough and the queue never wraps.
#[derive(Debug, Clone)]
pub struct FrontierQueue {
    slots: [NodeId; NODE_COUNT],
    front: usize,
    rear: usize,
}

impl FrontierQueue {
    pub fn new() -> Self {
        Self {
            slots: [NodeId::from_index(0); NODE_COUNT],
            front: 0,
            rear: 0,
        }
    }

    pub fn push_back(&mut self, node: NodeId) {
        debug_assert!(self.rear < NODE_COUNT, "frontier enqueued a node twice");
        self.slots[self.rear] = node;
        self.rear += 1;
    }

    pub fn pop_front(&mut self) -> Option<NodeId> {
        if self.front == self.rear {
            return None;
        }
        let node = self.slots[self.front];
        self.front += 1;
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.rear - self.front
    }

    pub fn is_empty(&self) -> bool {
        self.front == self.rear
    }

    /// Total number of nodes ever enqueued.
    pub fn enqueued(&self) -> usize {
        self.rear
    }
}

impl Default for FrontierQueue {
    fn default() -> Self {
        Self::new()
    }
}
