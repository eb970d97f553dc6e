use tracing::debug;

use super::{to_local, Rom};
use crate::codec::{BinaryReader, BinaryWriter};
use crate::error::Result;

/// Table of 16-bit in-bank offsets, one per grid cell. Zero means "no entry".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerTable {
    entries: Vec<u16>,
}

impl PointerTable {
    pub const ENTRY_SIZE: usize = 2;

    /// A table of `height` zero entries
    pub fn cleared(height: usize) -> Self {
        Self { entries: vec![0; height] }
    }

    /// Follow the long pointer at `header_offset` and read `height` entries
    ///
    /// Returns the table and the local address it was read from.
    pub fn read(rom: &Rom, header_offset: usize, height: usize) -> Result<(Self, usize)> {
        let location = to_local(rom.read_multi(header_offset, 3)? as usize);
        debug!("pointer table at {location:#08x} ({height} entries)");

        let bytes = rom.read_bytes(location, height * Self::ENTRY_SIZE)?;
        let mut reader = BinaryReader::new(bytes);
        let entries = (0..height)
            .map(|_| reader.read_u16_le())
            .collect::<Result<Vec<_>>>()?;
        Ok((Self { entries }, location))
    }

    /// Reset every entry to the zero sentinel
    pub fn clear(&mut self, height: usize) {
        self.entries.clear();
        self.entries.resize(height, 0);
    }

    pub fn height(&self) -> usize {
        self.entries.len()
    }

    pub fn byte_len(&self) -> usize {
        self.entries.len() * Self::ENTRY_SIZE
    }

    pub fn get(&self, index: usize) -> Option<u16> {
        self.entries.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: u16) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = value;
        }
    }

    pub fn entries(&self) -> &[u16] {
        &self.entries
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::with_capacity(self.byte_len());
        for &entry in &self.entries {
            writer.write_u16_le(entry);
        }
        writer.into_vec()
    }

    /// Place the table in fresh free space and write it
    ///
    /// Returns the local address. The caller updates the header pointer.
    pub fn write(&self, rom: &mut Rom) -> Result<usize> {
        let location = rom.allocate_in_bank(self.byte_len())?;
        rom.write_bytes(location, &self.to_bytes())?;
        debug!("wrote pointer table at {location:#08x} ({} entries)", self.height());
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rom::to_banked;

    #[test]
    fn test_read_through_header() {
        let mut rom = Rom::from_bytes(vec![0; 0x1000]);
        rom.write_multi(0x10, to_banked(0x200) as u32, 3).unwrap();
        rom.write_bytes(0x200, &[0x00, 0x00, 0xE7, 0x61, 0x34, 0x12]).unwrap();

        let (table, location) = PointerTable::read(&rom, 0x10, 3).unwrap();
        assert_eq!(location, 0x200);
        assert_eq!(table.entries(), &[0x0000, 0x61E7, 0x1234]);
    }

    #[test]
    fn test_write_to_free() {
        let mut rom = Rom::from_bytes(vec![0xFF; 0x1000]);
        let mut table = PointerTable::cleared(4);
        table.set(1, 0xBEEF);
        table.set(9, 0x1111);

        assert!(matches!(table.write(&mut rom), Err(Error::AllocationExhausted { .. })));

        rom.deallocate(0x800..0x1000);
        let location = table.write(&mut rom).unwrap();
        assert_eq!(location, 0x800);
        assert_eq!(rom.read_bytes(0x800, 8).unwrap(), &[0, 0, 0xEF, 0xBE, 0, 0, 0, 0]);
        assert_eq!(rom.free_space().ranges(), &[0x808..0x1000]);

        table.clear(2);
        assert_eq!(table.entries(), &[0, 0]);
    }
}
