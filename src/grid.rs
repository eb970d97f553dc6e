use crate::codec::SpritePlacement;
use crate::error::{Error, Result};

/// Sprites placed in one map cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Vec<SpritePlacement>),
}

impl Cell {
    /// Both a missing list and an empty one mean "no sprites"
    pub fn from_list(list: Option<Vec<SpritePlacement>>) -> Self {
        match list {
            Some(sprites) if !sprites.is_empty() => Self::Occupied(sprites),
            _ => Self::Empty,
        }
    }

    pub fn sprites(&self) -> Option<&[SpritePlacement]> {
        match self {
            Self::Empty => None,
            Self::Occupied(sprites) => Some(sprites),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn normalized(self) -> Self {
        match self {
            Self::Occupied(sprites) => Self::from_list(Some(sprites)),
            Self::Empty => Self::Empty,
        }
    }
}

impl From<Vec<SpritePlacement>> for Cell {
    fn from(sprites: Vec<SpritePlacement>) -> Self {
        Self::from_list(Some(sprites))
    }
}

/// Row/column of a cell in the map-sprite grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

/// Fixed-size row-major grid of cells. Never resized after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            cells: vec![Cell::Empty; height * width],
        }
    }

    /// Build a grid from a flat row-major cell sequence
    pub fn from_cells(height: usize, width: usize, cells: Vec<Cell>) -> Result<Self> {
        let expected = height * width;
        if cells.len() != expected {
            return Err(Error::GridSize { height, width, expected, actual: cells.len() });
        }
        Ok(Self {
            height,
            width,
            cells: cells.into_iter().map(Cell::normalized).collect(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn position_of(&self, index: usize) -> CellPosition {
        CellPosition {
            row: index / self.width,
            col: index % self.width,
        }
    }

    pub fn index_of(&self, pos: CellPosition) -> Option<usize> {
        (pos.row < self.height && pos.col < self.width)
            .then(|| pos.row * self.width + pos.col)
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn get_at(&self, pos: CellPosition) -> Option<&Cell> {
        self.index_of(pos).and_then(|i| self.cells.get(i))
    }

    /// Replace a cell. Returns false when `index` is outside the grid.
    pub fn set(&mut self, index: usize, cell: Cell) -> bool {
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = cell.normalized();
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows as slices of `width` cells
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn sprite_count(&self) -> usize {
        self.cells.iter().filter_map(Cell::sprites).map(<[_]>::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing() {
        let grid = Grid::new(40, 32);
        assert_eq!(grid.len(), 1280);
        assert_eq!(grid.position_of(63), CellPosition { row: 1, col: 31 });
        assert_eq!(grid.position_of(64), CellPosition { row: 2, col: 0 });
        assert_eq!(grid.index_of(CellPosition { row: 2, col: 0 }), Some(64));
        assert_eq!(grid.index_of(CellPosition { row: 40, col: 0 }), None);
        assert_eq!(grid.index_of(CellPosition { row: 0, col: 32 }), None);
    }

    #[test]
    fn test_empty_list_collapses() {
        assert_eq!(Cell::from_list(None), Cell::Empty);
        assert_eq!(Cell::from_list(Some(Vec::new())), Cell::Empty);

        let mut grid = Grid::new(2, 2);
        assert!(grid.set(3, Cell::Occupied(Vec::new())));
        assert_eq!(grid.get(3), Some(&Cell::Empty));
        assert!(!grid.set(4, Cell::Empty));
    }

    #[test]
    fn test_from_cells_length() {
        assert!(matches!(
            Grid::from_cells(2, 2, vec![Cell::Empty; 3]),
            Err(Error::GridSize { expected: 4, actual: 3, .. })
        ));

        let sprite = SpritePlacement::new(7, 1, 2);
        let mut cells = vec![Cell::Empty; 4];
        cells[2] = vec![sprite, sprite].into();
        let grid = Grid::from_cells(2, 2, cells).unwrap();
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.sprite_count(), 2);
        assert_eq!(grid.get_at(CellPosition { row: 1, col: 0 }).unwrap().sprites().unwrap().len(), 2);
        assert_eq!(grid.rows().count(), 2);
    }
}
