//! Row/column document form of the map sprite grid
//!
//! ```json
//! { "0": { "0": null, "1": [ { "NPC ID": 12, "X": 8, "Y": 16 } ], ... }, ... }
//! ```
//!
//! Rows and columns are keyed by their 0-based index. Reconstruction sorts
//! keys numerically rather than trusting the order they appear in the file.

use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec::SpritePlacement;
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::progress::Progress;

/// Share of an operation's progress spent walking cells
pub(crate) const CELL_PROGRESS: f32 = 45.0;

/// One sprite as it appears in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRecord {
    #[serde(rename = "NPC ID")]
    pub npc_id: u16,
    #[serde(rename = "X")]
    pub x: u8,
    #[serde(rename = "Y")]
    pub y: u8,
}

impl From<&SpritePlacement> for SpriteRecord {
    fn from(sp: &SpritePlacement) -> Self {
        Self { npc_id: sp.npc_id, x: sp.x, y: sp.y }
    }
}

impl From<&SpriteRecord> for SpritePlacement {
    fn from(rec: &SpriteRecord) -> Self {
        SpritePlacement::new(rec.npc_id, rec.x, rec.y)
    }
}

/// Column index to the cell's sprites (`None` for an empty cell)
pub type DocumentRow = IndexMap<u32, Option<Vec<SpriteRecord>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapSpriteDocument {
    rows: IndexMap<u32, DocumentRow>,
}

impl MapSpriteDocument {
    pub fn from_grid(grid: &Grid, progress: &mut dyn Progress) -> Self {
        let pct = CELL_PROGRESS / grid.len().max(1) as f32;
        let mut rows = IndexMap::with_capacity(grid.height());
        for (y, cells) in grid.rows().enumerate() {
            let mut row = DocumentRow::with_capacity(grid.width());
            for (x, cell) in cells.iter().enumerate() {
                let sprites = cell
                    .sprites()
                    .map(|list| list.iter().map(SpriteRecord::from).collect());
                row.insert(x as u32, sprites);
                progress.advance(pct);
            }
            rows.insert(y as u32, row);
        }
        Self { rows }
    }

    /// Rebuild a `height` x `width` grid. Every row and column must be present.
    pub fn to_grid(&self, height: usize, width: usize, progress: &mut dyn Progress) -> Result<Grid> {
        let pct = CELL_PROGRESS / (height * width).max(1) as f32;
        let rows = sorted_by_index(&self.rows, height, "row")?;

        let mut cells = Vec::with_capacity(height * width);
        for (y, row) in rows.into_iter().enumerate() {
            let columns = sorted_by_index(row, width, &format!("column of row {y}"))?;
            for entry in columns {
                let sprites = entry
                    .as_ref()
                    .map(|list| list.iter().map(SpritePlacement::from).collect());
                cells.push(Cell::from_list(sprites));
                progress.advance(pct);
            }
        }
        Grid::from_cells(height, width, cells)
    }

    pub fn row(&self, y: u32) -> Option<&DocumentRow> {
        self.rows.get(&y)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Values of `map` ordered by key, requiring keys to be exactly `0..len`
fn sorted_by_index<'a, V>(map: &'a IndexMap<u32, V>, len: usize, what: &str) -> Result<Vec<&'a V>> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(k, _)| **k);

    if entries.len() != len {
        return Err(Error::MalformedDocument(format!(
            "expected {len} {what} entries, found {}",
            entries.len()
        )));
    }
    for (expected, (key, _)) in entries.iter().enumerate() {
        if **key as usize != expected {
            return Err(Error::MalformedDocument(format!(
                "missing {what} {expected} (found {key} instead)"
            )));
        }
    }
    Ok(entries.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellPosition;
    use crate::progress::NoProgress;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new(3, 4);
        grid.set(1, vec![SpritePlacement::new(0x1234, 7, 5)].into());
        grid.set(
            7,
            vec![SpritePlacement::new(1, 0, 0), SpritePlacement::new(0x03FF, 255, 128)].into(),
        );
        grid.set(8, vec![SpritePlacement::new(42, 1, 2)].into());
        grid
    }

    #[test]
    fn test_grid_roundtrip() {
        let grid = sample_grid();
        let doc = MapSpriteDocument::from_grid(&grid, &mut NoProgress);
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.to_grid(3, 4, &mut NoProgress).unwrap(), grid);
    }

    #[test]
    fn test_row_major_layout() {
        let doc = MapSpriteDocument::from_grid(&sample_grid(), &mut NoProgress);
        // Index 7 is row 1, column 3
        let cell = doc.row(1).unwrap().get(&3).unwrap().as_ref().unwrap();
        assert_eq!(cell.len(), 2);
        assert_eq!(cell[1], SpriteRecord { npc_id: 0x03FF, x: 255, y: 128 });
        assert_eq!(doc.row(2).unwrap().get(&0).unwrap().as_ref().unwrap()[0].npc_id, 42);
        assert_eq!(doc.row(0).unwrap().get(&0), Some(&None));
    }

    #[test]
    fn test_json_field_names() {
        let doc = MapSpriteDocument::from_grid(&sample_grid(), &mut NoProgress);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["0"]["0"], serde_json::Value::Null);
        assert_eq!(
            value["0"]["1"],
            serde_json::json!([{ "NPC ID": 0x1234, "X": 7, "Y": 5 }])
        );
    }

    #[test]
    fn test_out_of_order_keys_are_sorted() {
        let json = r#"{
            "1": { "1": [ { "NPC ID": 9, "X": 3, "Y": 4 } ], "0": null },
            "0": { "0": null, "1": null }
        }"#;
        let doc = MapSpriteDocument::from_reader(json.as_bytes()).unwrap();
        let grid = doc.to_grid(2, 2, &mut NoProgress).unwrap();
        assert_eq!(
            grid.get_at(CellPosition { row: 1, col: 1 }).unwrap().sprites().unwrap(),
            &[SpritePlacement::new(9, 3, 4)]
        );
        assert_eq!(grid.occupied_count(), 1);
    }

    #[test]
    fn test_empty_list_reads_as_empty_cell() {
        let json = r#"{ "0": { "0": [], "1": null } }"#;
        let doc = MapSpriteDocument::from_reader(json.as_bytes()).unwrap();
        let grid = doc.to_grid(1, 2, &mut NoProgress).unwrap();
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_malformed_documents() {
        let missing_row = r#"{ "0": { "0": null } }"#;
        let doc = MapSpriteDocument::from_reader(missing_row.as_bytes()).unwrap();
        assert!(matches!(doc.to_grid(2, 1, &mut NoProgress), Err(Error::MalformedDocument(_))));

        let gap = r#"{ "0": { "0": null, "2": null } }"#;
        let doc = MapSpriteDocument::from_reader(gap.as_bytes()).unwrap();
        assert!(matches!(doc.to_grid(1, 2, &mut NoProgress), Err(Error::MalformedDocument(_))));

        let bad_field = r#"{ "0": { "0": [ { "NPC ID": 70000, "X": 0, "Y": 0 } ] } }"#;
        assert!(matches!(
            MapSpriteDocument::from_reader(bad_field.as_bytes()),
            Err(Error::Document(_))
        ));
    }

    #[test]
    fn test_progress_covers_cells() {
        let mut total = 0.0f32;
        let mut observer = |p: f32| total += p;
        MapSpriteDocument::from_grid(&sample_grid(), &mut observer);
        assert!((total - CELL_PROGRESS).abs() < 0.01);
    }
}
