//! Static terrain for the board.
//!
//! A [`TerrainMap`] is built once at setup, either from a textual layout or
//! from the procedural default pattern, and never changes afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::Cell;

/// Terrain kind of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open ground.
    #[default]
    Plains,
    /// High ground. Good cover against melee.
    Mountain,
    /// Woodland. Good cover against missiles.
    Forest,
}

impl TerrainKind {
    /// Every terrain kind.
    pub const ALL: [TerrainKind; 3] = [Self::Plains, Self::Mountain, Self::Forest];

    /// Parse a layout symbol. `.` and `P` are both plains.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' | 'P' => Some(Self::Plains),
            'M' => Some(Self::Mountain),
            'F' => Some(Self::Forest),
            _ => None,
        }
    }

    /// Canonical layout symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Plains => '.',
            Self::Mountain => 'M',
            Self::Forest => 'F',
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plains => "Plains",
            Self::Mountain => "Mountain",
            Self::Forest => "Forest",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to board terrain.
///
/// The movement graph and the combat resolver only need this view, so tests
/// can hand them any board shape.
pub trait TerrainProvider {
    /// Number of rows on the board.
    fn rows(&self) -> i32;

    /// Number of columns on the board.
    fn cols(&self) -> i32;

    /// Terrain at `cell`.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] for an invalid cell, and
    /// [`GameError::MissingTerrain`] for a valid cell with no terrain mapped.
    fn terrain_at(&self, cell: Cell) -> Result<TerrainKind>;

    /// Whether `cell` lies on the board.
    fn is_valid(&self, cell: Cell) -> bool {
        (0..self.rows()).contains(&cell.row) && (0..self.cols()).contains(&cell.col)
    }
}

/// Largest board, in cells, that a map or movement graph will allocate.
pub const MAX_CELLS: i64 = 1 << 20;

/// Check that board dimensions are positive, fit the cell coordinate type
/// and stay within [`MAX_CELLS`].
pub(crate) fn check_dimensions(rows: i64, cols: i64) -> Result<(i32, i32)> {
    let within_limit = rows
        .checked_mul(cols)
        .is_some_and(|cells| cells <= MAX_CELLS);
    match (i32::try_from(rows), i32::try_from(cols)) {
        (Ok(r), Ok(c)) if r > 0 && c > 0 && within_limit => Ok((r, c)),
        _ => Err(GameError::InvalidDimensions { rows, cols }),
    }
}

/// Dense terrain storage, row-major.
///
/// Cells may be left unmapped when the map is built from sparse entries.
/// Looking one of those up reports [`GameError::MissingTerrain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainMap {
    rows: i32,
    cols: i32,
    cells: Vec<Option<TerrainKind>>,
}

impl TerrainMap {
    /// A board covered by one terrain kind.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] if either dimension is not positive or
    /// the board exceeds [`MAX_CELLS`].
    pub fn uniform(rows: i64, cols: i64, kind: TerrainKind) -> Result<Self> {
        let (rows, cols) = check_dimensions(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![Some(kind); cell_count(rows, cols)],
        })
    }

    /// The default battlefield pattern.
    ///
    /// Plains everywhere, with mountain ridges on even rows where
    /// `(r + c) % 6 == 0` or `(r - c) mod 5 == 2`, then forest wherever
    /// `(r + c) % 15 == 0`.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] if either dimension is not positive or
    /// the board exceeds [`MAX_CELLS`].
    pub fn procedural(rows: i64, cols: i64) -> Result<Self> {
        let mut map = Self::uniform(rows, cols, TerrainKind::Plains)?;
        for row in 0..map.rows {
            for col in 0..map.cols {
                let ridge = (row + col) % 6 == 0 || (row - col).rem_euclid(5) == 2;
                let kind = if (row + col) % 15 == 0 {
                    TerrainKind::Forest
                } else if ridge && row % 2 == 0 {
                    TerrainKind::Mountain
                } else {
                    TerrainKind::Plains
                };
                let index = map.offset(Cell::new(row, col));
                map.cells[index] = Some(kind);
            }
        }
        Ok(map)
    }

    /// Parse a textual layout, one line per row.
    ///
    /// Lines are trimmed and blank lines skipped. Every row must have the
    /// same width.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] for an empty layout, and
    /// [`GameError::MapFormat`] for ragged rows or unknown symbols.
    pub fn from_layout<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let rows: Vec<&str> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |line| line.chars().count());
        let (row_count, col_count) = check_dimensions(rows.len() as i64, width as i64)?;

        let mut cells = Vec::with_capacity(cell_count(row_count, col_count));
        for (r, line) in rows.iter().enumerate() {
            let len = line.chars().count();
            if len != width {
                return Err(GameError::MapFormat {
                    row: r,
                    col: len.min(width),
                    message: format!("expected {width} columns, found {len}"),
                });
            }
            for (c, symbol) in line.chars().enumerate() {
                let kind = TerrainKind::from_symbol(symbol).ok_or_else(|| GameError::MapFormat {
                    row: r,
                    col: c,
                    message: format!("unknown terrain symbol '{symbol}'"),
                })?;
                cells.push(Some(kind));
            }
        }

        Ok(Self {
            rows: row_count,
            cols: col_count,
            cells,
        })
    }

    /// Build a map from explicit entries. Cells not listed stay unmapped.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidDimensions`] for non-positive or oversized dimensions and
    /// [`GameError::OutOfBounds`] for an entry outside the board.
    pub fn from_entries(
        rows: i64,
        cols: i64,
        entries: impl IntoIterator<Item = (Cell, TerrainKind)>,
    ) -> Result<Self> {
        let (rows, cols) = check_dimensions(rows, cols)?;
        let mut map = Self {
            rows,
            cols,
            cells: vec![None; cell_count(rows, cols)],
        };
        for (cell, kind) in entries {
            map.set(cell, kind)?;
        }
        Ok(map)
    }

    /// Overwrite the terrain of one cell. Used while building scenarios.
    ///
    /// # Errors
    ///
    /// [`GameError::OutOfBounds`] if `cell` is off the board.
    pub fn set(&mut self, cell: Cell, kind: TerrainKind) -> Result<()> {
        if !self.is_valid(cell) {
            return Err(GameError::OutOfBounds(cell));
        }
        let index = self.offset(cell);
        self.cells[index] = Some(kind);
        Ok(())
    }

    /// Render the map as layout lines. Unmapped cells show as `?`.
    #[must_use]
    pub fn to_layout(&self) -> Vec<String> {
        self.cells
            .chunks(self.cols as usize)
            .map(|row| {
                row.iter()
                    .map(|kind| kind.map_or('?', TerrainKind::symbol))
                    .collect()
            })
            .collect()
    }

    /// Count of cells with each terrain kind, in [`TerrainKind::ALL`] order.
    #[must_use]
    pub fn census(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for kind in self.cells.iter().flatten() {
            let slot = match kind {
                TerrainKind::Plains => 0,
                TerrainKind::Mountain => 1,
                TerrainKind::Forest => 2,
            };
            counts[slot] += 1;
        }
        counts
    }

    /// Row-major offset of a valid cell.
    #[inline]
    fn offset(&self, cell: Cell) -> usize {
        (cell.row as usize) * (self.cols as usize) + (cell.col as usize)
    }
}

impl TerrainProvider for TerrainMap {
    fn rows(&self) -> i32 {
        self.rows
    }

    fn cols(&self) -> i32 {
        self.cols
    }

    fn terrain_at(&self, cell: Cell) -> Result<TerrainKind> {
        if !self.is_valid(cell) {
            return Err(GameError::OutOfBounds(cell));
        }
        self.cells[self.offset(cell)].ok_or(GameError::MissingTerrain(cell))
    }
}

#[inline]
fn cell_count(rows: i32, cols: i32) -> usize {
    (rows as usize) * (cols as usize)
}
