//! Memory subsystem: the bus contract seen by the core and a region-mapped
//! implementation of it.
//!
//! The truncation warnings are allowed because region sizes are capped to
//! the 32-bit address space at construction time.

#![allow(clippy::cast_possible_truncation)]

use tracing::warn;

use crate::error::{AccessType, MemResult, MemoryFault};

/// Width of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 8 bits (sb).
    Byte,
    /// 16 bits (sh).
    Half,
    /// 32 bits (sw).
    Word,
}

impl Width {
    /// Number of bytes written.
    #[must_use]
    pub fn bytes(self) -> u32 {
        match self {
            Width::Byte => 1,
            Width::Half => 2,
            Width::Word => 4,
        }
    }

    /// Number of bits written.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.bytes() * 8
    }
}

/// Memory as seen by the execution core.
///
/// Both operations are infallible: alignment and bounds are the
/// implementation's business, not the core's.
pub trait Bus {
    /// Read the 32-bit little-endian word starting at `addr`.
    fn read32(&self, addr: u32) -> u32;

    /// Fetch the instruction word at `addr`.
    fn fetch32(&self, addr: u32) -> u32 {
        self.read32(addr)
    }

    /// Write the low `width` bytes of `value` starting at `addr`.
    fn write(&mut self, addr: u32, value: u32, width: Width);
}

/// One contiguous mapped range.
#[derive(Debug, Clone)]
pub struct Region {
    start: u32,
    data: Vec<u8>,
}

impl Region {
    /// Create a zeroed region.
    #[must_use]
    pub fn new(start: u32, size: u32) -> Self {
        Region {
            start,
            data: vec![0u8; size as usize],
        }
    }

    /// First mapped address.
    #[must_use]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Offset of `addr..addr+len` within this region, if fully contained.
    #[inline]
    fn offset(&self, addr: u32, len: u32) -> Option<usize> {
        let offset = addr.checked_sub(self.start)?;
        let end = offset.checked_add(len)?;
        (end <= self.size()).then_some(offset as usize)
    }
}

/// Little-endian, byte-addressable memory made of disjoint regions.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    regions: Vec<Region>,
}

impl Memory {
    /// Create a memory with no mapped regions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory from a list of regions.
    #[must_use]
    pub fn with_regions(regions: Vec<Region>) -> Self {
        Memory { regions }
    }

    /// All mapped regions, in insertion order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Find the region containing `addr..addr+len`.
    #[inline]
    fn locate(&self, addr: u32, len: u32, access: AccessType) -> MemResult<(usize, usize)> {
        self.regions
            .iter()
            .enumerate()
            .find_map(|(i, region)| region.offset(addr, len).map(|offset| (i, offset)))
            .ok_or(MemoryFault { addr, access })
    }

    /// Whether every byte of `addr..addr+len` is mapped in a single region.
    #[must_use]
    pub fn is_mapped(&self, addr: u32, len: u32) -> bool {
        self.locate(addr, len, AccessType::Read).is_ok()
    }

    /// Load a byte.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the address is unmapped.
    #[inline]
    pub fn load_u8(&self, addr: u32) -> MemResult<u8> {
        let (region, offset) = self.locate(addr, 1, AccessType::Read)?;
        Ok(self.regions[region].data[offset])
    }

    /// Load a halfword, little-endian.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if any byte is unmapped.
    #[inline]
    pub fn load_u16(&self, addr: u32) -> MemResult<u16> {
        let (region, offset) = self.locate(addr, 2, AccessType::Read)?;
        let data = &self.regions[region].data;
        Ok(u16::from_le_bytes([data[offset], data[offset + 1]]))
    }

    /// Load a word, little-endian.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if any byte is unmapped.
    #[inline]
    pub fn load_u32(&self, addr: u32) -> MemResult<u32> {
        self.load_word(addr, AccessType::Read)
    }

    /// Fetch an instruction word.
    ///
    /// Identical to `load_u32` but reports [`AccessType::Execute`] on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if any byte is unmapped.
    #[inline]
    pub fn fetch(&self, addr: u32) -> MemResult<u32> {
        self.load_word(addr, AccessType::Execute)
    }

    fn load_word(&self, addr: u32, access: AccessType) -> MemResult<u32> {
        let (region, offset) = self.locate(addr, 4, access)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.regions[region].data[offset..offset + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Store a byte.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the address is unmapped.
    #[inline]
    pub fn store_u8(&mut self, addr: u32, value: u8) -> MemResult<()> {
        self.store_bytes(addr, &[value])
    }

    /// Store a halfword, little-endian.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if any byte is unmapped.
    #[inline]
    pub fn store_u16(&mut self, addr: u32, value: u16) -> MemResult<()> {
        self.store_bytes(addr, &value.to_le_bytes())
    }

    /// Store a word, little-endian.
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if any byte is unmapped.
    #[inline]
    pub fn store_u32(&mut self, addr: u32, value: u32) -> MemResult<()> {
        self.store_bytes(addr, &value.to_le_bytes())
    }

    /// Load a slice of bytes (for dumps and bulk reads).
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the range is not inside one region.
    pub fn load_bytes(&self, addr: u32, len: u32) -> MemResult<&[u8]> {
        let (region, offset) = self.locate(addr, len, AccessType::Read)?;
        Ok(&self.regions[region].data[offset..offset + len as usize])
    }

    /// Store a slice of bytes (for program loading).
    ///
    /// # Errors
    ///
    /// Returns a [`MemoryFault`] if the range is not inside one region.
    pub fn store_bytes(&mut self, addr: u32, bytes: &[u8]) -> MemResult<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| MemoryFault {
            addr,
            access: AccessType::Write,
        })?;
        let (region, offset) = self.locate(addr, len, AccessType::Write)?;
        self.regions[region].data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl Bus for Memory {
    /// Bytes past the end of a region read as 0, so a sub-word load of the
    /// last mapped bytes still sees them in the low bits.
    fn read32(&self, addr: u32) -> u32 {
        if let Ok(word) = self.load_u32(addr) {
            return word;
        }
        if let Err(fault) = self.load_u8(addr) {
            warn!(addr = format_args!("{addr:#010x}"), "{fault}; reading 0");
            return 0;
        }
        let mut bytes = [0u8; 4];
        for (i, byte) in (0u32..).zip(bytes.iter_mut()) {
            if let Some(next) = addr.checked_add(i) {
                *byte = self.load_u8(next).unwrap_or(0);
            }
        }
        u32::from_le_bytes(bytes)
    }

    fn fetch32(&self, addr: u32) -> u32 {
        self.fetch(addr).unwrap_or_else(|fault| {
            warn!(addr = format_args!("{addr:#010x}"), "{fault}; fetching 0");
            0
        })
    }

    fn write(&mut self, addr: u32, value: u32, width: Width) {
        let result = match width {
            Width::Byte => self.store_u8(addr, value as u8),
            Width::Half => self.store_u16(addr, value as u16),
            Width::Word => self.store_u32(addr, value),
        };
        if let Err(fault) = result {
            warn!(
                addr = format_args!("{addr:#010x}"),
                bits = width.bits(),
                "{fault}; write dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_memory() -> Memory {
        Memory::with_regions(vec![
            Region::new(0x0040_0000, 0x100),
            Region::new(0x1000_0000, 0x100),
        ])
    }

    #[test]
    fn test_load_store_word_little_endian() {
        let mut mem = make_memory();

        mem.store_u32(0x1000_0000, 0x1234_5678).unwrap();

        assert_eq!(mem.load_u8(0x1000_0000).unwrap(), 0x78);
        assert_eq!(mem.load_u8(0x1000_0001).unwrap(), 0x56);
        assert_eq!(mem.load_u8(0x1000_0002).unwrap(), 0x34);
        assert_eq!(mem.load_u8(0x1000_0003).unwrap(), 0x12);
        assert_eq!(mem.load_u16(0x1000_0002).unwrap(), 0x1234);
        assert_eq!(mem.load_u32(0x1000_0000).unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_unaligned_word_read() {
        let mut mem = make_memory();
        mem.store_u32(0x1000_0000, 0x4433_2211).unwrap();
        mem.store_u32(0x1000_0004, 0x8877_6655).unwrap();

        assert_eq!(mem.read32(0x1000_0001), 0x5544_3322);
    }

    #[test]
    fn test_bus_write_touches_only_its_width() {
        let mut mem = make_memory();
        mem.store_u32(0x1000_0010, 0xAABB_CCDD).unwrap();

        mem.write(0x1000_0010, 0x1234_5611, Width::Byte);
        assert_eq!(mem.read32(0x1000_0010), 0xAABB_CC11);

        mem.write(0x1000_0012, 0xFFFF_9988, Width::Half);
        assert_eq!(mem.read32(0x1000_0010), 0x9988_CC11);

        mem.write(0x1000_0010, 0x0102_0304, Width::Word);
        assert_eq!(mem.read32(0x1000_0010), 0x0102_0304);
    }

    #[test]
    fn test_unmapped_reads_zero_and_drops_writes() {
        let mut mem = make_memory();

        assert_eq!(mem.read32(0x2000_0000), 0);
        mem.write(0x2000_0000, 0xFFFF_FFFF, Width::Word);
        assert_eq!(mem.read32(0x2000_0000), 0);

        // Straddling the end of a region faults for load_u32, while read32
        // keeps the mapped low bytes
        mem.store_u16(0x1000_00FE, 0x1234).unwrap();
        assert!(mem.load_u32(0x1000_00FE).is_err());
        assert_eq!(mem.read32(0x1000_00FE), 0x1234);
    }

    #[test]
    fn test_fault_reports_access_type() {
        let mem = make_memory();
        let fault = mem.fetch(0).unwrap_err();
        assert_eq!(fault.access, AccessType::Execute);
        assert_eq!(fault.addr, 0);
    }

    #[test]
    fn test_bounds_checking() {
        let mem = make_memory();

        assert!(mem.load_u8(0x0040_00FF).is_ok());
        assert!(mem.load_u32(0x0040_00FC).is_ok());
        assert!(mem.load_u8(0x0040_0100).is_err());
        assert!(mem.load_u8(0x003F_FFFF).is_err());
        assert!(mem.is_mapped(0x0040_0000, 0x100));
        assert!(!mem.is_mapped(0x0040_0000, 0x101));
    }

    #[test]
    fn test_address_space_top_does_not_overflow() {
        let mem = Memory::with_regions(vec![Region::new(0xFFFF_FF00, 0x100)]);
        assert!(mem.load_u32(0xFFFF_FFFC).is_ok());
        assert!(mem.load_u32(0xFFFF_FFFE).is_err());
    }

    #[test]
    fn test_read32_at_region_end_keeps_mapped_bytes() {
        let mut mem = make_memory();
        mem.write(0x1000_00FF, 0x7F, Width::Byte);
        mem.write(0x1000_00FC, 0xBEEF, Width::Half);
        mem.write(0x1000_00FE, 0x8001, Width::Half);

        assert_eq!(mem.read32(0x1000_00FF), 0x0000_0080);
        assert_eq!(mem.read32(0x1000_00FE), 0x0000_8001);
        assert_eq!(mem.read32(0x1000_00FD), 0x0080_01BE);
        assert_eq!(mem.read32(0x1000_00FC), 0x8001_BEEF);
        assert_eq!(mem.read32(0x1000_0100), 0);
    }

    #[test]
    fn test_read32_at_top_of_address_space() {
        let mut mem = Memory::with_regions(vec![Region::new(0xFFFF_FF00, 0x100)]);
        mem.store_u8(0xFFFF_FFFF, 0xAB).unwrap();
        assert_eq!(mem.read32(0xFFFF_FFFF), 0xAB);
    }

    #[test]
    fn test_fetch32_unmapped_reads_zero() {
        let mut mem = make_memory();
        mem.store_u32(0x0040_0000, 0x2402_000A).unwrap();
        assert_eq!(mem.fetch32(0x0040_0000), 0x2402_000A);
        assert_eq!(mem.fetch32(0x0040_00FE), 0);
        assert_eq!(mem.fetch32(0x2000_0000), 0);
    }

    #[test]
    fn test_width() {
        assert_eq!(Width::Byte.bits(), 8);
        assert_eq!(Width::Half.bits(), 16);
        assert_eq!(Width::Word.bytes(), 4);
    }
}
