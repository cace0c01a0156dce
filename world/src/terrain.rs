//! Terrain grid storage and procedural generation.

use blast_arena_core::{CellCoord, CellKind, TerrainView};
use rand::Rng;

/// Dense row-major grid of cell kinds owned by a simulation session.
///
/// After construction the only transition is `DestructibleWall -> Open`,
/// performed through [`Terrain::clear_to_open`] by the blast engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    columns: u32,
    rows: u32,
    cells: Vec<CellKind>,
}

impl Terrain {
    /// Creates a grid where every cell holds `kind`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, kind: CellKind) -> Self {
        Self {
            columns,
            rows,
            cells: vec![kind; cell_count(columns, rows)],
        }
    }

    /// Creates an open arena surrounded by an indestructible border.
    #[must_use]
    pub fn bordered(columns: u32, rows: u32) -> Self {
        let mut terrain = Self::filled(columns, rows, CellKind::Open);
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if is_border(cell, columns, rows) {
                    terrain.write(cell, CellKind::IndestructibleWall);
                }
            }
        }
        terrain
    }

    /// Wraps an explicit row-major cell list, returning `None` when its length
    /// does not match the dimensions.
    #[must_use]
    pub fn from_cells(columns: u32, rows: u32, cells: Vec<CellKind>) -> Option<Self> {
        if cells.len() != cell_count(columns, rows) {
            return None;
        }
        Some(Self {
            columns,
            rows,
            cells,
        })
    }

    /// Procedurally generates an arena.
    ///
    /// Border cells and cells with two even coordinates become indestructible
    /// pillars. Every other interior cell becomes a destructible wall with
    /// probability `wall_density`, except the three-cell pocket around each
    /// spawn which is always open.
    ///
    /// Pockets are resolved before pillars, so on even-sized grids a corner
    /// spawn that falls on two even coordinates stays open.
    pub fn generate<R: Rng + ?Sized>(
        columns: u32,
        rows: u32,
        wall_density: f32,
        spawns: &[CellCoord],
        rng: &mut R,
    ) -> Self {
        let pockets: Vec<CellCoord> = spawns
            .iter()
            .flat_map(|spawn| spawn_pocket(*spawn, columns, rows))
            .collect();

        let mut terrain = Self::filled(columns, rows, CellKind::Open);
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                let kind = if is_border(cell, columns, rows) {
                    CellKind::IndestructibleWall
                } else if pockets.contains(&cell) {
                    CellKind::Open
                } else if column % 2 == 0 && row % 2 == 0 {
                    CellKind::IndestructibleWall
                } else if rng.gen::<f32>() < wall_density {
                    CellKind::DestructibleWall
                } else {
                    CellKind::Open
                };
                terrain.write(cell, kind);
            }
        }
        terrain
    }

    /// Returns a copy of the grid with `cell` set to `kind`.
    ///
    /// Intended for building fixed layouts; out-of-bounds cells are ignored.
    #[must_use]
    pub fn with_cell(mut self, cell: CellCoord, kind: CellKind) -> Self {
        self.write(cell, kind);
        self
    }

    /// Captures a read-only view of the grid.
    #[must_use]
    pub fn view(&self) -> TerrainView<'_> {
        TerrainView::new(&self.cells, self.columns, self.rows)
    }

    /// Provides the grid dimensions as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        self.view().in_bounds(cell)
    }

    /// Returns the kind of the cell, if it lies inside the grid.
    #[must_use]
    pub fn kind(&self, cell: CellCoord) -> Option<CellKind> {
        self.view().kind(cell)
    }

    /// Reports whether the cell is open floor.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.view().is_open(cell)
    }

    /// Reports whether the cell holds a destructible wall.
    #[must_use]
    pub fn is_destructible(&self, cell: CellCoord) -> bool {
        self.view().is_destructible(cell)
    }

    /// Reports whether the cell holds an indestructible wall.
    #[must_use]
    pub fn is_indestructible(&self, cell: CellCoord) -> bool {
        self.view().is_indestructible(cell)
    }

    /// Converts a destructible wall at `cell` into open floor.
    ///
    /// Returns `true` only when the cell actually changed kind; open cells,
    /// indestructible walls and out-of-bounds cells are left untouched.
    pub fn clear_to_open(&mut self, cell: CellCoord) -> bool {
        if !self.is_destructible(cell) {
            return false;
        }
        self.write(cell, CellKind::Open);
        true
    }

    fn write(&mut self, cell: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = kind;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Corner spawn points in actor order: top-left, bottom-right, top-right,
/// bottom-left.
#[must_use]
pub fn corner_spawns(columns: u32, rows: u32) -> [CellCoord; 4] {
    let right = columns.saturating_sub(2).max(1);
    let bottom = rows.saturating_sub(2).max(1);
    [
        CellCoord::new(1, 1),
        CellCoord::new(right, bottom),
        CellCoord::new(right, 1),
        CellCoord::new(1, bottom),
    ]
}

/// The spawn cell plus its horizontal and vertical neighbours that point
/// toward the arena interior.
fn spawn_pocket(spawn: CellCoord, columns: u32, rows: u32) -> [CellCoord; 3] {
    let column = if spawn.column() * 2 < columns {
        spawn.column().saturating_add(1)
    } else {
        spawn.column().saturating_sub(1)
    };
    let row = if spawn.row() * 2 < rows {
        spawn.row().saturating_add(1)
    } else {
        spawn.row().saturating_sub(1)
    };
    [
        spawn,
        CellCoord::new(column, spawn.row()),
        CellCoord::new(spawn.column(), row),
    ]
}

fn is_border(cell: CellCoord, columns: u32, rows: u32) -> bool {
    cell.column() == 0
        || cell.row() == 0
        || cell.column() + 1 == columns
        || cell.row() + 1 == rows
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let count = u64::from(columns) * u64::from(rows);
    usize::try_from(count).unwrap_or(0)
}
