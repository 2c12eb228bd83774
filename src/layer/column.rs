use std::fmt;

use crate::layer::{LayerError, TileId};

/// One vertical slice of the level, cells ordered top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileColumn {
    index: usize,
    cells: Vec<TileId>,
}

impl TileColumn {
    /// Empty column of `height` cells. `index` is the x position the column was loaded from
    /// and is never updated when the grid is reordered.
    pub fn new(index: usize, height: usize) -> Result<Self, LayerError> {
        if height == 0 {
            return Err(LayerError::InvalidArgument(format!(
                "column {index}: height must be positive"
            )));
        }
        Ok(Self {
            index,
            cells: vec![0; height],
        })
    }

    /// Column built from an existing top-to-bottom cell sequence.
    pub fn with_cells(index: usize, cells: Vec<TileId>) -> Result<Self, LayerError> {
        if cells.is_empty() {
            return Err(LayerError::InvalidArgument(format!(
                "column {index}: height must be positive"
            )));
        }
        Ok(Self { index, cells })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }

    pub(crate) fn set(&mut self, row: usize, tile: TileId) {
        self.cells[row] = tile;
    }

    /// Rows from the floor up to and including the highest non-empty cell.
    /// Zero for a fully empty column.
    pub fn occupied_height(&self) -> usize {
        self.cells
            .iter()
            .position(|&tile| tile != 0)
            .map(|row| self.cells.len() - row)
            .unwrap_or(0)
    }
}

impl fmt::Display for TileColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, tile) in self.cells.iter().enumerate() {
            if row > 0 {
                f.write_str(",")?;
            }
            write!(f, "{tile}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(cells: &[TileId]) -> TileColumn {
        TileColumn::with_cells(0, cells.to_vec()).expect("non-empty column")
    }

    #[test]
    fn occupied_height_reaches_the_highest_tile() {
        assert_eq!(column(&[0, 0, 5, 0, 3]).occupied_height(), 3);
        assert_eq!(column(&[0, 0, 0, 0, 3]).occupied_height(), 1);
    }

    #[test]
    fn occupied_height_of_empty_column_is_zero() {
        assert_eq!(column(&[0, 0, 0, 0]).occupied_height(), 0);
    }

    #[test]
    fn occupied_height_of_top_row_tile_is_full_height() {
        assert_eq!(column(&[7, 0, 0, 0, 0]).occupied_height(), 5);
    }

    #[test]
    fn zero_height_is_rejected() {
        assert!(matches!(
            TileColumn::new(3, 0),
            Err(LayerError::InvalidArgument(_))
        ));
        assert!(TileColumn::with_cells(3, Vec::new()).is_err());
    }

    #[test]
    fn new_column_starts_empty() {
        let column = TileColumn::new(2, 4).expect("positive height");
        assert_eq!(column.index(), 2);
        assert_eq!(column.cells(), &[0, 0, 0, 0]);
        assert_eq!(column.to_string(), "0,0,0,0");
    }
}
