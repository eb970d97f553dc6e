//! Format constants for the map sprite table

use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rom::{PointerTable, BANK_SIZE};

/// Largest grid whose pointer table fits in one bank
pub const MAX_CELLS: usize = BANK_SIZE / PointerTable::ENTRY_SIZE;

/// Where the map sprite data lives and how it is shaped.
///
/// `Default` describes the retail game; a JSON file with the same field
/// names can override any subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSpriteLayout {
    /// ROM offset of the 3-byte banked pointer to the pointer table
    pub header_pointer: usize,
    /// Local base OR'ed into every non-zero table entry
    pub sprite_bank: usize,
    /// Local window sprite-list blocks are packed into
    pub window_start: usize,
    pub window_end: usize,
    pub height: usize,
    pub width: usize,
    /// Project resource name of the document
    pub resource: String,
}

impl Default for MapSpriteLayout {
    fn default() -> Self {
        Self {
            header_pointer: 0x2261,
            sprite_bank: 0x0F_0000,
            window_start: 0x0F_61E7,
            window_end: 0x0F_8984,
            height: 40,
            width: 32,
            resource: "map_sprites".to_string(),
        }
    }
}

impl MapSpriteLayout {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let layout: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Cells in the grid. Saturates for layouts `validate` would reject.
    pub fn cell_count(&self) -> usize {
        self.height.saturating_mul(self.width)
    }

    pub fn window(&self) -> Range<usize> {
        self.window_start..self.window_end
    }

    /// Table entries hold only the low 16 bits, so the window must sit in
    /// the sprite bank.
    pub fn validate(&self) -> Result<()> {
        if self.sprite_bank % BANK_SIZE != 0 {
            return Err(Error::InvalidLayout(format!(
                "sprite bank {:#x} is not bank aligned",
                self.sprite_bank
            )));
        }
        let bank = self.sprite_bank..self.sprite_bank + BANK_SIZE;
        if self.window_start > self.window_end
            || self.window_start < bank.start
            || self.window_end > bank.end
        {
            return Err(Error::InvalidLayout(format!(
                "window {:#x}..{:#x} is outside sprite bank {:#x}",
                self.window_start, self.window_end, self.sprite_bank
            )));
        }
        // An offset of zero would read back as "no entry"
        if self.window_start == self.sprite_bank {
            return Err(Error::InvalidLayout(
                "window may not start at offset 0 of the sprite bank".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidLayout("grid must have at least one cell".into()));
        }
        // The pointer table has to fit in a single bank
        match self.height.checked_mul(self.width) {
            Some(cells) if cells <= MAX_CELLS => Ok(()),
            _ => Err(Error::InvalidLayout(format!(
                "grid of {}x{} exceeds {MAX_CELLS} cells",
                self.height, self.width
            ))),
        }
    }
}
