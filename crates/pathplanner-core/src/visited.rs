//! Visited set packed into a single 32-bit word.
//!
//! Bit `i` is set once node `i` has been enqueued. One word covers the whole
//! graph, so the set lives on the stack of each search.

use crate::node::NodeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VisitedMask(u32);

impl VisitedMask {
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, node: NodeId) -> bool {
        self.0 & node.bit() != 0
    }

    /// Mark `node` visited. Returns `true` if it was not visited before.
    #[inline]
    pub fn insert(&mut self, node: NodeId) -> bool {
        let fresh = !self.contains(node);
        self.0 |= node.bit();
        fresh
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Visited nodes in ascending index order.
    pub fn iter(self) -> impl Iterator<Item = NodeId> {
        NodeId::all().filter(move |node| self.contains(*node))
    }
}
