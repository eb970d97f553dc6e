//! Map sprite placement table
//!
//! ROM side: a pointer table (found through a long pointer in the header
//! area) holding one 16-bit offset per 32x40 grid cell. Non-zero offsets
//! point into the sprite bank at a count-prefixed list of placements.
//!
//! Project side: a [`MapSpriteDocument`] keyed by row, then column.

use std::io::Write;

use tracing::{debug, info};

use crate::codec::{decode_sprite_list, encode_sprite_list, encoded_len};
use crate::document::{MapSpriteDocument, CELL_PROGRESS};
use crate::error::Result;
use crate::grid::{Cell, Grid};
use crate::layout::MapSpriteLayout;
use crate::progress::Progress;
use crate::project::{Project, RESOURCE_EXT};
use crate::rom::{to_banked, PointerTable, RangeAllocator, Rom};

/// Progress reported before and after the per-cell walk
const PHASE_PROGRESS: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct MapSpriteModule {
    layout: MapSpriteLayout,
    grid: Grid,
}

impl Default for MapSpriteModule {
    fn default() -> Self {
        let layout = MapSpriteLayout::default();
        let grid = Grid::new(layout.height, layout.width);
        Self { layout, grid }
    }
}

impl MapSpriteModule {
    pub const NAME: &'static str = "Map Sprites";

    pub fn new(layout: MapSpriteLayout) -> Result<Self> {
        layout.validate()?;
        let grid = Grid::new(layout.height, layout.width);
        Ok(Self { layout, grid })
    }

    pub fn layout(&self) -> &MapSpriteLayout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn read_from_rom(&mut self, rom: &Rom, progress: &mut dyn Progress) -> Result<()> {
        self.layout.validate()?;
        let cell_count = self.layout.cell_count();
        let (table, location) = PointerTable::read(rom, self.layout.header_pointer, cell_count)?;
        progress.advance(PHASE_PROGRESS);

        let pct = CELL_PROGRESS / cell_count as f32;
        let mut cells = Vec::with_capacity(cell_count);
        for &offset in table.entries() {
            let cell = if offset == 0 {
                Cell::Empty
            } else {
                let addr = self.layout.sprite_bank | usize::from(offset);
                Cell::from_list(Some(decode_sprite_list(rom.data(), addr)?))
            };
            cells.push(cell);
            progress.advance(pct);
        }

        self.grid = Grid::from_cells(self.layout.height, self.layout.width, cells)?;
        info!(
            "read {} sprites in {} cells from table at {location:#08x}",
            self.grid.sprite_count(),
            self.grid.occupied_count()
        );
        Ok(())
    }

    /// Pack every cell into the sprite window and write a fresh pointer table
    ///
    /// All space is reserved before any byte is written, so a failure
    /// leaves the ROM as it was.
    pub fn write_to_rom(&self, rom: &mut Rom, progress: &mut dyn Progress) -> Result<()> {
        self.layout.validate()?;
        let window = self.layout.window();
        rom.check_range(window.start, window.len())?;
        rom.check_range(self.layout.header_pointer, 3)?;

        let mut table = PointerTable::cleared(self.grid.len());
        let mut alloc = RangeAllocator::new("map sprite", window.clone());
        let mut staged = Vec::new();

        let pct = CELL_PROGRESS / self.grid.len().max(1) as f32;
        for (i, cell) in self.grid.cells().iter().enumerate() {
            if let Some(sprites) = cell.sprites() {
                let addr = alloc.allocate(encoded_len(sprites.len()))?;
                table.set(i, (addr & 0xFFFF) as u16);
                staged.push((addr, encode_sprite_list(sprites)));
            }
            progress.advance(pct);
        }
        debug!(
            "packed {} blocks into {:#08x}..{:#08x}",
            staged.len(),
            window.start,
            alloc.cursor()
        );

        // The window may still be marked free from an earlier pass
        rom.reserve(window.clone());
        let table_loc = table.write(rom)?;
        for (addr, block) in &staged {
            rom.write_bytes(*addr, block)?;
        }
        rom.write_multi(self.layout.header_pointer, to_banked(table_loc) as u32, 3)?;

        if let Some(leftover) = alloc.leftover() {
            debug!("{} bytes of the sprite window left unused", leftover.len());
            rom.deallocate(leftover);
        }
        progress.advance(PHASE_PROGRESS);

        info!(
            "wrote {} sprite blocks ({} bytes), pointer table at {table_loc:#08x}",
            staged.len(),
            alloc.cursor() - window.start
        );
        Ok(())
    }

    pub fn read_from_project(&mut self, project: &Project, progress: &mut dyn Progress) -> Result<()> {
        let reader = project.open_reader(&self.layout.resource, RESOURCE_EXT)?;
        let doc = MapSpriteDocument::from_reader(reader)?;
        progress.advance(PHASE_PROGRESS);

        self.grid = doc.to_grid(self.layout.height, self.layout.width, progress)?;
        info!(
            "read {} sprites from {}",
            self.grid.sprite_count(),
            project.resource_path(&self.layout.resource, RESOURCE_EXT).display()
        );
        Ok(())
    }

    pub fn write_to_project(&self, project: &Project, progress: &mut dyn Progress) -> Result<()> {
        let doc = MapSpriteDocument::from_grid(&self.grid, progress);

        let mut writer = project.create_writer(&self.layout.resource, RESOURCE_EXT)?;
        doc.to_writer(&mut writer)?;
        writer.flush()?;
        progress.advance(PHASE_PROGRESS);

        info!(
            "wrote {} rows to {}",
            doc.row_count(),
            project.resource_path(&self.layout.resource, RESOURCE_EXT).display()
        );
        Ok(())
    }
}
