//! EarthBound map sprite table tools
//!
//! Decompiles the map sprite placement table of a ROM image into an
//! editable row/column document and compiles it back, repacking the
//! placement blocks into their fixed window.

pub mod codec;
pub mod document;
pub mod error;
pub mod grid;
pub mod layout;
pub mod map_sprites;
pub mod progress;
pub mod project;
pub mod rom;

pub use error::{Error, Result};
pub use codec::{SpritePlacement, BinaryReader, BinaryWriter};
pub use document::{MapSpriteDocument, SpriteRecord};
pub use grid::{Cell, CellPosition, Grid};
pub use layout::MapSpriteLayout;
pub use map_sprites::MapSpriteModule;
pub use progress::{Progress, NoProgress, LogProgress};
pub use project::Project;
pub use rom::{Rom, PointerTable, FreeSpace, RangeAllocator, to_local, to_banked};
