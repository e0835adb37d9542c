//! Node indices.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{PlannerError, Result};

/// Number of nodes in every graph handled by the planner.
pub const NODE_COUNT: usize = 32;

/// A node index known to be in `0..NODE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(u8);

impl NodeId {
    /// Validate a raw index.
    pub fn new(raw: u8) -> Result<Self> {
        if (raw as usize) < NODE_COUNT {
            Ok(Self(raw))
        } else {
            Err(PlannerError::InvalidIndex { index: raw as u64 })
        }
    }

    /// Build a node from an index already known to be in range.
    pub(crate) const fn from_index(index: usize) -> Self {
        debug_assert!(index < NODE_COUNT);
        Self(index as u8)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The single-bit mask selecting this node in an adjacency or visited mask.
    pub const fn bit(self) -> u32 {
        1u32 << self.0
    }

    /// Every node, in ascending index order.
    pub fn all() -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (0..NODE_COUNT).map(Self::from_index)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl TryFrom<u8> for NodeId {
    type Error = PlannerError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<u32> for NodeId {
    type Error = PlannerError;

    fn try_from(value: u32) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| PlannerError::InvalidIndex {
                index: value as u64,
            })
            .and_then(Self::new)
    }
}

impl TryFrom<usize> for NodeId {
    type Error = PlannerError;

    fn try_from(value: usize) -> Result<Self> {
        if value < NODE_COUNT {
            Ok(Self::from_index(value))
        } else {
            Err(PlannerError::InvalidIndex {
                index: value as u64,
            })
        }
    }
}

impl From<NodeId> for u8 {
    fn from(node: NodeId) -> Self {
        node.0
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u32::deserialize(deserializer)?;
        NodeId::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_indices_past_the_last_node() {
        assert!(NodeId::new(31).is_ok());
        assert!(matches!(
            NodeId::new(32),
            Err(PlannerError::InvalidIndex { index: 32 })
        ));
        assert!(NodeId::try_from(300u32).is_err());
        assert!(NodeId::try_from(NODE_COUNT).is_err());
    }

    #[test]
    fn bit_selects_the_node() {
        assert_eq!(NodeId::new(0).unwrap().bit(), 1);
        assert_eq!(NodeId::new(31).unwrap().bit(), 0x8000_0000);
    }

    #[test]
    fn all_is_ascending() {
        let raw: Vec<u8> = NodeId::all().map(NodeId::raw).collect();
        assert_eq!(raw, (0..32).collect::<Vec<u8>>());
    }

    #[test]
    fn deserialize_revalidates_range() {
        let ok: NodeId = serde_json::from_str("17").unwrap();
        assert_eq!(ok.raw(), 17);
        assert!(serde_json::from_str::<NodeId>("40").is_err());
    }
}
