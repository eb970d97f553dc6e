//! Per-cell sprite placement blocks
//!
//! Layout: `NN NN [II II YY XX]*`
//! - `NN NN` entry count (u16 LE)
//! - `II II` NPC ID (u16 LE)
//! - `YY` y position, `XX` x position (note Y comes first on disk)

use super::{BinaryReader, BinaryWriter};
use crate::error::Result;

/// Size of the entry count prefix
pub const COUNT_SIZE: usize = 2;
/// Size of a single placement record
pub const RECORD_SIZE: usize = 4;

/// One NPC placed at a pixel offset within a map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpritePlacement {
    pub npc_id: u16,
    pub x: u8,
    pub y: u8,
}

impl SpritePlacement {
    pub fn new(npc_id: u16, x: u8, y: u8) -> Self {
        Self { npc_id, x, y }
    }

    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let npc_id = reader.read_u16_le()?;
        let y = reader.read_u8()?;
        let x = reader.read_u8()?;
        Ok(Self { npc_id, x, y })
    }

    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u16_le(self.npc_id);
        writer.write_u8(self.y);
        writer.write_u8(self.x);
    }
}

/// Number of bytes a block holding `count` placements occupies
pub fn encoded_len(count: usize) -> usize {
    COUNT_SIZE + count * RECORD_SIZE
}

/// Decode the block starting at `addr`. The stored count is trusted.
pub fn decode_sprite_list(data: &[u8], addr: usize) -> Result<Vec<SpritePlacement>> {
    let mut reader = BinaryReader::at(data, addr);
    let count = reader.read_u16_le()? as usize;
    let mut sprites = Vec::with_capacity(count);
    for _ in 0..count {
        sprites.push(SpritePlacement::read(&mut reader)?);
    }
    Ok(sprites)
}

/// Encode a placement list. Empty lists have no block at all.
///
/// Callers must keep the list under `u16::MAX` entries; the placement
/// window is far smaller than that, so allocation rejects such lists first.
pub fn encode_sprite_list(sprites: &[SpritePlacement]) -> Vec<u8> {
    if sprites.is_empty() {
        return Vec::new();
    }
    let mut writer = BinaryWriter::with_capacity(encoded_len(sprites.len()));
    writer.write_u16_le(sprites.len() as u16);
    for sprite in sprites {
        sprite.write(&mut writer);
    }
    writer.into_vec()
}
