//! ROM image with free space tracking

pub mod address;
pub mod alloc;
pub mod pointer_table;

use std::ops::Range;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub use address::{to_banked, to_local, BANK_SIZE};
pub use alloc::{FreeSpace, RangeAllocator};
pub use pointer_table::PointerTable;

/// Copier header prepended by some dumps
pub const HEADER_SIZE: usize = 0x200;
/// Unexpanded retail image
pub const BASE_SIZE: usize = 0x30_0000;
/// Expanded HiROM image
pub const EXPANDED_SIZE: usize = 0x40_0000;
/// Expanded ExHiROM image
pub const EX_EXPANDED_SIZE: usize = 0x60_0000;

/// Internal header bytes patched when switching to ExHiROM
const MAP_MODE_ADDR: usize = 0xFFD5;
const ROM_SIZE_ADDR: usize = 0xFFD7;
const EX_HIROM_MAP_MODE: u8 = 0x25;
const EX_HIROM_ROM_SIZE: u8 = 0x0D;
/// Upper half of bank 0 (vectors and internal header), mirrored into bank 0x40
const BOOT_MIRROR: Range<usize> = 0x8000..0x1_0000;

#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
    free: FreeSpace,
    has_header: bool,
}

impl Rom {
    /// Wrap a raw image, stripping a copier header if one is present
    pub fn from_bytes(mut data: Vec<u8>) -> Self {
        let has_header = data.len() % 0x400 == HEADER_SIZE;
        if has_header {
            debug!("stripping {HEADER_SIZE:#x}-byte copier header");
            data.drain(..HEADER_SIZE);
        }
        Self { data, free: FreeSpace::new(), has_header }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rom = Self::from_bytes(std::fs::read(path)?);
        if ![BASE_SIZE, EXPANDED_SIZE, EX_EXPANDED_SIZE].contains(&rom.len()) {
            warn!("{} has unexpected size {:#x}", path.display(), rom.len());
        }
        info!("loaded {} ({:#x} bytes, header: {})", path.display(), rom.len(), rom.has_header);
        Ok(rom)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut out = Vec::with_capacity(self.data.len() + HEADER_SIZE);
        if self.has_header {
            out.resize(HEADER_SIZE, 0);
        }
        out.extend_from_slice(&self.data);
        std::fs::write(path, out)?;
        info!("saved {} ({:#x} bytes)", path.display(), self.data.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Keep a copier header when saving
    pub fn add_header(&mut self) {
        self.has_header = true;
    }

    pub fn strip_header(&mut self) {
        self.has_header = false;
    }

    pub fn check_range(&self, addr: usize, len: usize) -> Result<()> {
        match addr.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(Error::OutOfBounds { addr, len, size: self.data.len() }),
        }
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8> {
        self.check_range(addr, 1)?;
        Ok(self.data[addr])
    }

    pub fn read_bytes(&self, addr: usize, len: usize) -> Result<&[u8]> {
        self.check_range(addr, len)?;
        Ok(&self.data[addr..addr + len])
    }

    /// Read an `n`-byte little-endian unsigned value (n = 1..=4)
    pub fn read_multi(&self, addr: usize, n: usize) -> Result<u32> {
        check_width(n)?;
        let bytes = self.read_bytes(addr, n)?;
        Ok(LittleEndian::read_uint(bytes, n) as u32)
    }

    /// Write the low `n` bytes of `value` little-endian (n = 1..=4)
    pub fn write_multi(&mut self, addr: usize, value: u32, n: usize) -> Result<()> {
        check_width(n)?;
        self.check_range(addr, n)?;
        LittleEndian::write_uint(&mut self.data[addr..addr + n], u64::from(value) & width_mask(n), n);
        Ok(())
    }

    pub fn write_bytes(&mut self, addr: usize, bytes: &[u8]) -> Result<()> {
        self.check_range(addr, bytes.len())?;
        self.data[addr..addr + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn free_space(&self) -> &FreeSpace {
        &self.free
    }

    /// Return a range to the free pool so later writers may reuse it
    pub fn deallocate(&mut self, range: Range<usize>) {
        self.free.deallocate(range);
    }

    /// Mark a range as in use so no allocation can land on it
    pub fn reserve(&mut self, range: Range<usize>) {
        self.free.reserve(range);
    }

    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        self.free.allocate(size)
    }

    pub fn allocate_in_bank(&mut self, size: usize) -> Result<usize> {
        self.free.allocate_in_bank(size)
    }

    /// Grow the image to `size` bytes. The new area is zeroed and free.
    ///
    /// Growing to [`EX_EXPANDED_SIZE`] also switches the internal header to
    /// ExHiROM and mirrors the boot area into bank 0x40, which stays in use.
    pub fn expand(&mut self, size: usize) -> Result<()> {
        if self.data.len() >= size {
            return Err(Error::InvalidRom(format!(
                "image is already {:#x} bytes, cannot expand to {size:#x}",
                self.data.len()
            )));
        }
        let old = self.data.len();
        self.data.resize(size, 0);
        self.free.deallocate(old..size);

        if size == EX_EXPANDED_SIZE {
            self.data[MAP_MODE_ADDR] = EX_HIROM_MAP_MODE;
            self.data[ROM_SIZE_ADDR] = EX_HIROM_ROM_SIZE;

            let mirror = EXPANDED_SIZE + BOOT_MIRROR.start..EXPANDED_SIZE + BOOT_MIRROR.end;
            self.data.copy_within(BOOT_MIRROR, mirror.start);
            self.free.reserve(mirror);
            debug!("mirrored boot area into bank 0x40");
        }
        info!("expanded image from {old:#x} to {size:#x} bytes");
        Ok(())
    }

    /// Treat everything past the retail image as free.
    ///
    /// Only valid for a clean base image, where nothing has been written
    /// to the expansion area yet.
    pub fn release_expansion_area(&mut self) {
        if self.data.len() > BASE_SIZE {
            self.free.deallocate(BASE_SIZE..self.data.len());
        }
    }
}

fn check_width(n: usize) -> Result<()> {
    if (1..=4).contains(&n) {
        Ok(())
    } else {
        Err(Error::InvalidRom(format!("unsupported integer width {n}")))
    }
}

fn width_mask(n: usize) -> u64 {
    (1u64 << (8 * n)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_detection() {
        let rom = Rom::from_bytes(vec![0; BASE_SIZE + HEADER_SIZE]);
        assert!(rom.has_header());
        assert_eq!(rom.len(), BASE_SIZE);

        let rom = Rom::from_bytes(vec![0; BASE_SIZE]);
        assert!(!rom.has_header());
    }

    #[test]
    fn test_multi_access() {
        let mut rom = Rom::from_bytes(vec![0; 0x100]);
        rom.write_multi(0x10, 0xCF61E7, 3).unwrap();
        assert_eq!(rom.read_bytes(0x10, 3).unwrap(), &[0xE7, 0x61, 0xCF]);
        assert_eq!(rom.read_multi(0x10, 3).unwrap(), 0xCF61E7);
        assert_eq!(rom.read_multi(0x10, 2).unwrap(), 0x61E7);

        // Only the low bytes are written
        rom.write_multi(0x20, 0x12345678, 2).unwrap();
        assert_eq!(rom.read_multi(0x20, 4).unwrap(), 0x5678);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut rom = Rom::from_bytes(vec![0; 0x10]);
        assert!(matches!(rom.read_multi(0x0F, 2), Err(Error::OutOfBounds { .. })));
        assert!(matches!(rom.write_bytes(0x0E, &[1, 2, 3]), Err(Error::OutOfBounds { .. })));
        assert!(rom.read_multi(0, 5).is_err());
        assert!(rom.read_u8(0x0F).is_ok());
    }

    #[test]
    fn test_expand_marks_free() {
        let mut rom = Rom::from_bytes(vec![0xFF; BASE_SIZE]);
        rom.expand(EXPANDED_SIZE).unwrap();
        assert_eq!(rom.len(), EXPANDED_SIZE);
        assert_eq!(rom.free_space().ranges(), &[BASE_SIZE..EXPANDED_SIZE]);
        assert_eq!(rom.read_u8(BASE_SIZE).unwrap(), 0);
        assert!(matches!(rom.expand(EXPANDED_SIZE), Err(Error::InvalidRom(_))));
    }

    #[test]
    fn test_ex_expand_patches_header() {
        let mut rom = Rom::from_bytes(vec![0; BASE_SIZE]);
        rom.write_bytes(0xFFC0, b"EARTH BOUND").unwrap();
        rom.write_multi(0xFFFC, 0xFF00, 2).unwrap();
        rom.expand(EX_EXPANDED_SIZE).unwrap();

        assert_eq!(rom.len(), EX_EXPANDED_SIZE);
        assert_eq!(rom.read_u8(0xFFD5).unwrap(), 0x25);
        assert_eq!(rom.read_u8(0xFFD7).unwrap(), 0x0D);
        assert_eq!(rom.read_bytes(0x40_8000, 0x8000).unwrap(), rom.read_bytes(0x8000, 0x8000).unwrap());
        assert_eq!(rom.read_bytes(0x40_FFC0, 11).unwrap(), b"EARTH BOUND");
        assert_eq!(rom.read_multi(0x40_FFFC, 2).unwrap(), 0xFF00);

        assert_eq!(
            rom.free_space().ranges(),
            &[BASE_SIZE..0x40_8000, 0x41_0000..EX_EXPANDED_SIZE]
        );
    }

    #[test]
    fn test_plain_expand_leaves_header() {
        let mut rom = Rom::from_bytes(vec![0; BASE_SIZE]);
        rom.expand(EXPANDED_SIZE).unwrap();
        assert_eq!(rom.read_u8(0xFFD5).unwrap(), 0);
        assert_eq!(rom.read_u8(0xFFD7).unwrap(), 0);
    }

    #[test]
    fn test_save_restores_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.sfc");

        let mut rom = Rom::from_bytes(vec![0xAB; 0x8000]);
        rom.add_header();
        rom.save(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0x8200);

        let mut reloaded = Rom::load(&path).unwrap();
        assert!(reloaded.has_header());
        assert_eq!(reloaded.read_u8(0).unwrap(), 0xAB);

        reloaded.strip_header();
        reloaded.save(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0x8000);
    }
}
