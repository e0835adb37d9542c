//! Memory-mapped register access.
//!
//! The embedded build talks to the outside world through a small register
//! window. [`HardwarePort`] abstracts byte/word access to that window so the
//! same adapters drive either a simulated address space ([`MemoryPort`]) or
//! the physical bus ([`MmioPort`], feature `mmio`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PlannerError, Result};
use crate::node::NODE_COUNT;

/// Bytes occupied by the adjacency table.
const GRAPH_BYTES: u32 = 4 * NODE_COUNT as u32;

/// Addresses of the planner's register window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterMap {
    /// Start node (u8, read).
    pub start: u32,
    /// End node (u8, read).
    pub end: u32,
    /// Current node along the planned path (u8, written once per node).
    pub node_point: u32,
    /// Set to 1 once the whole path has been published (u8).
    pub cpu_done: u32,
    /// First of `NODE_COUNT` little-endian adjacency words.
    pub graph_base: u32,
    /// First byte of the planned path buffer.
    pub path_base: u32,
    /// Planned path length in nodes (u8).
    pub path_length: u32,
}

impl RegisterMap {
    pub const DEFAULT: RegisterMap = RegisterMap {
        start: 0x0200_0000,
        end: 0x0200_0004,
        node_point: 0x0200_0008,
        cpu_done: 0x0200_000c,
        graph_base: 0x0200_0010,
        path_base: 0x0200_00d0,
        path_length: 0x0200_00e0,
    };

    /// Address of the adjacency word for node `index`. Wraps like the bus;
    /// [`validate`](Self::validate) rejects tables that would wrap.
    pub const fn graph_word(&self, index: usize) -> u32 {
        self.graph_base.wrapping_add(4 * index as u32)
    }

    /// One past the last byte of the adjacency table.
    pub const fn graph_end(&self) -> u32 {
        self.graph_word(NODE_COUNT)
    }

    /// Bytes available in the path buffer before it runs into the
    /// `path_length` register (the board places that register 16 bytes in).
    pub fn path_capacity(&self) -> usize {
        match self.path_length.checked_sub(self.path_base) {
            Some(gap) if gap > 0 => (gap as usize).min(NODE_COUNT),
            _ => NODE_COUNT,
        }
    }

    /// Check that every register and region fits in the 32-bit address
    /// space and that no two of them share a byte.
    ///
    /// The path buffer is taken as `path_capacity()` bytes, so the stock
    /// layout (with `path_length` right after the usable buffer) passes.
    pub fn validate(&self) -> Result<()> {
        let regions = [
            ("start", self.start, 1),
            ("end", self.end, 1),
            ("node_point", self.node_point, 1),
            ("cpu_done", self.cpu_done, 1),
            ("path_length", self.path_length, 1),
            ("graph", self.graph_base, GRAPH_BYTES),
            ("path buffer", self.path_base, self.path_capacity() as u32),
        ];

        let mut spans = Vec::with_capacity(regions.len());
        for (name, base, len) in regions {
            let last = base.checked_add(len - 1).ok_or_else(|| {
                PlannerError::InvalidRegisterMap(format!(
                    "{name} at {base:#010x} (+{len} bytes) runs past the end of the address space"
                ))
            })?;
            spans.push((name, base, last));
        }

        for (i, &(a, a_first, a_last)) in spans.iter().enumerate() {
            for &(b, b_first, b_last) in &spans[i + 1..] {
                if a_first <= b_last && b_first <= a_last {
                    return Err(PlannerError::InvalidRegisterMap(format!(
                        "{a} ({a_first:#010x}..={a_last:#010x}) overlaps {b} ({b_first:#010x}..={b_last:#010x})"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Byte and word access to a register window.
pub trait HardwarePort {
    fn read_u8(&mut self, addr: u32) -> u8;

    fn write_u8(&mut self, addr: u32, value: u8);

    /// Addresses wrap at the top of the address space, as on the bus.
    fn read_u32(&mut self, addr: u32) -> u32 {
        let mut bytes = [0u8; 4];
        for (offset, byte) in (0u32..).zip(bytes.iter_mut()) {
            *byte = self.read_u8(addr.wrapping_add(offset));
        }
        u32::from_le_bytes(bytes)
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        for (offset, byte) in (0u32..).zip(value.to_le_bytes()) {
            self.write_u8(addr.wrapping_add(offset), byte);
        }
    }
}

impl<P: HardwarePort + ?Sized> HardwarePort for &mut P {
    fn read_u8(&mut self, addr: u32) -> u8 {
        (**self).read_u8(addr)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        (**self).write_u8(addr, value)
    }

    fn read_u32(&mut self, addr: u32) -> u32 {
        (**self).read_u32(addr)
    }

    fn write_u32(&mut self, addr: u32, value: u32) {
        (**self).write_u32(addr, value)
    }
}

/// Simulated address space for host builds and tests.
///
/// Unwritten bytes read as zero. Every byte write is also appended to a
/// per-address history, so a register that is overwritten several times
/// (such as `node_point`) can be inspected afterwards.
#[derive(Debug, Default, Clone)]
pub struct MemoryPort {
    bytes: BTreeMap<u32, u8>,
    history: BTreeMap<u32, Vec<u8>>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// All values written to `addr`, oldest first.
    pub fn writes_to(&self, addr: u32) -> &[u8] {
        self.history
            .get(&addr)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Read `len` consecutive bytes without recording anything.
    pub fn peek(&self, addr: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| addr.wrapping_add(offset as u32))
            .map(|a| self.bytes.get(&a).copied().unwrap_or(0))
            .collect()
    }

    /// Forget the write history while keeping memory contents.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl HardwarePort for MemoryPort {
    fn read_u8(&mut self, addr: u32) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(0)
    }

    fn write_u8(&mut self, addr: u32, value: u8) {
        self.bytes.insert(addr, value);
        self.history.entry(addr).or_default().push(value);
    }
}

#[cfg(feature = "mmio")]
pub use mmio::MmioPort;

#[cfg(feature = "mmio")]
mod mmio {
    use super::HardwarePort;

    /// Volatile access to the physical register window.
    pub struct MmioPort {
        _private: (),
    }

    impl MmioPort {
        /// # Safety
        /// Every address later passed to this port must be a valid, mapped
        /// device register for the running target, and no other code may
        /// alias that window while the port is alive.
        pub unsafe fn new() -> Self {
            Self { _private: () }
        }
    }

    impl HardwarePort for MmioPort {
        fn read_u8(&mut self, addr: u32) -> u8 {
            // SAFETY: guaranteed by the contract of `MmioPort::new`.
            unsafe { core::ptr::read_volatile(addr as usize as *const u8) }
        }

        fn write_u8(&mut self, addr: u32, value: u8) {
            // SAFETY: guaranteed by the contract of `MmioPort::new`.
            unsafe { core::ptr::write_volatile(addr as usize as *mut u8, value) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let mut port = MemoryPort::new();
        port.write_u32(0x100, 0x0403_0201);
        assert_eq!(port.peek(0x100, 4), vec![1, 2, 3, 4]);
        assert_eq!(port.read_u32(0x100), 0x0403_0201);
    }

    #[test]
    fn history_keeps_every_write() {
        let mut port = MemoryPort::new();
        for value in [7u8, 8, 9] {
            port.write_u8(0x20, value);
        }
        assert_eq!(port.read_u8(0x20), 9);
        assert_eq!(port.writes_to(0x20), &[7, 8, 9]);
        assert!(port.writes_to(0x21).is_empty());
    }

    #[test]
    fn path_capacity_ignores_registers_below_the_buffer() {
        let map = RegisterMap {
            path_length: 0x10,
            ..RegisterMap::DEFAULT
        };
        assert_eq!(map.path_capacity(), NODE_COUNT);
    }

    #[test]
    fn stock_layout_validates() {
        assert!(RegisterMap::DEFAULT.validate().is_ok());
    }

    #[test]
    fn graph_table_past_the_address_space_is_rejected() {
        let map = RegisterMap {
            graph_base: 0xffff_ffa0,
            ..RegisterMap::DEFAULT
        };
        let err = map.validate().unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRegisterMap(_)));
        assert!(err.to_string().contains("graph at 0xffffffa0"));
    }

    #[test]
    fn path_buffer_ending_on_the_last_byte_is_accepted() {
        let map = RegisterMap {
            path_base: u32::MAX - (NODE_COUNT as u32 - 1),
            ..RegisterMap::DEFAULT
        };
        assert_eq!(map.path_capacity(), NODE_COUNT);
        assert!(map.validate().is_ok());
    }

    #[test]
    fn overlapping_regions_are_rejected() {
        let map = RegisterMap {
            cpu_done: RegisterMap::DEFAULT.graph_base + 8,
            ..RegisterMap::DEFAULT
        };
        let err = map.validate().unwrap_err();
        assert!(err.to_string().contains("cpu_done"));
        assert!(err.to_string().contains("overlaps graph"));

        let shared = RegisterMap {
            end: RegisterMap::DEFAULT.start,
            ..RegisterMap::DEFAULT
        };
        assert!(shared.validate().is_err());
    }

    #[test]
    fn word_access_wraps_at_the_top_of_memory() {
        let mut port = MemoryPort::new();
        port.write_u32(u32::MAX - 1, 0x0403_0201);
        assert_eq!(port.peek(u32::MAX - 1, 4), vec![1, 2, 3, 4]);
        assert_eq!(port.read_u8(1), 4);
    }

    #[test]
    fn default_map_matches_the_board() {
        let map = RegisterMap::default();
        assert_eq!(map.graph_word(31), 0x0200_008c);
        assert_eq!(map.graph_end(), 0x0200_0090);
        assert!(map.graph_end() <= map.path_base);
        assert_eq!(map.path_capacity(), 16);
    }
}
