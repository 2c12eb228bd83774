use std::fmt::Write as _;

use crate::layer::{LayerError, TileColumn, TileId};

/// Ordered columns of one tile layer. Column order is the left-to-right layout of the level;
/// reordering is the only mutation applied after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    columns: Vec<TileColumn>,
}

impl TileGrid {
    /// Decodes a row-major comma-separated payload. Token `y * width + x` lands in column `x`,
    /// row `y`. Tokens are separated by commas or line breaks; a comma closing a line is
    /// optional, and whitespace around tokens is ignored.
    pub fn decode_csv(raw: &str, width: usize, height: usize) -> Result<Self, LayerError> {
        check_dimensions(width, height)?;

        let tokens = tokenize(raw);
        let expected = width * height;
        if tokens.len() != expected {
            return Err(LayerError::Format(format!(
                "expected {expected} tiles for a {width}x{height} layer, found {}",
                tokens.len()
            )));
        }

        let mut columns = (0..width)
            .map(|x| TileColumn::new(x, height))
            .collect::<Result<Vec<_>, _>>()?;

        for (flat, token) in tokens.iter().enumerate() {
            let (x, y) = (flat % width, flat / width);
            let tile = token.parse::<TileId>().map_err(|err| {
                LayerError::Format(format!("tile ({x}, {y}): '{token}' is not an integer: {err}"))
            })?;
            columns[x].set(y, tile);
        }

        Ok(Self {
            width,
            height,
            columns,
        })
    }

    /// Builds a grid from already-populated columns. All columns must share one height.
    pub fn from_columns(columns: Vec<TileColumn>) -> Result<Self, LayerError> {
        let Some(first) = columns.first() else {
            return Err(LayerError::InvalidArgument(
                "a layer needs at least one column".to_string(),
            ));
        };
        let height = first.height();
        if let Some(odd) = columns.iter().find(|column| column.height() != height) {
            return Err(LayerError::InvalidArgument(format!(
                "column {} has {} cells, expected {height}",
                odd.index(),
                odd.height()
            )));
        }
        Ok(Self {
            width: columns.len(),
            height,
            columns,
        })
    }

    /// Re-encodes in decode order: rows top to bottom, a comma after every tile but the last,
    /// a newline after every row but the last.
    pub fn encode_csv(&self) -> String {
        let mut out = String::with_capacity(self.width * self.height * 3);
        for y in 0..self.height {
            for (x, column) in self.columns.iter().enumerate() {
                let _ = write!(out, "{}", column.cells()[y]);
                if y != self.height - 1 || x != self.width - 1 {
                    out.push(',');
                }
            }
            if y != self.height - 1 {
                out.push('\n');
            }
        }
        out
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn columns(&self) -> &[TileColumn] {
        &self.columns
    }

    /// Mutable view for in-place permutation. Slices cannot grow or shrink, so the
    /// column count stays equal to `width`.
    pub(crate) fn columns_mut(&mut self) -> &mut [TileColumn] {
        &mut self.columns
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) {
        self.columns.swap(a, b);
    }

    pub fn occupied_heights(&self) -> Vec<usize> {
        self.columns.iter().map(TileColumn::occupied_height).collect()
    }

    /// Provenance indices in current left-to-right order.
    pub fn column_order(&self) -> Vec<usize> {
        self.columns.iter().map(TileColumn::index).collect()
    }
}

fn tokenize(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            let line = line.strip_suffix(',').unwrap_or(line);
            line.split(',').map(str::trim)
        })
        .collect()
}

fn check_dimensions(width: usize, height: usize) -> Result<(), LayerError> {
    if width == 0 || height == 0 {
        return Err(LayerError::InvalidArgument(format!(
            "layer dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}
