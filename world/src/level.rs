//! Persisted level parsing with a generated fallback.
//!
//! The text format starts with a `rows,cols` header followed by one line per
//! row of comma-separated cell codes:
//!
//! | code | meaning |
//! |------|---------|
//! | `0` | open floor |
//! | `1` | indestructible wall |
//! | `2` | destructible wall |
//! | `3` | first player spawn (open floor) |
//! | `4` | second player spawn (open floor) |

use blast_arena_core::{ArenaConfig, CellCoord, CellKind};
use log::warn;
use rand::Rng;
use thiserror::Error;

use crate::terrain::{corner_spawns, Terrain};

/// Reasons a persisted level is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The text contained no header line.
    #[error("level is empty")]
    MissingHeader,
    /// The header was not a `rows,cols` pair of integers.
    #[error("invalid level header '{0}'")]
    InvalidHeader(String),
    /// The declared dimensions differ from the configured arena.
    #[error("level declares {rows}x{columns} but the arena expects {expected_rows}x{expected_columns}")]
    DimensionMismatch {
        /// Declared row count.
        rows: u32,
        /// Declared column count.
        columns: u32,
        /// Configured row count.
        expected_rows: u32,
        /// Configured column count.
        expected_columns: u32,
    },
    /// Fewer rows followed the header than it declared.
    #[error("level declares {expected} rows but only {found} are present")]
    TruncatedRows {
        /// Declared row count.
        expected: u32,
        /// Rows actually present.
        found: u32,
    },
    /// More rows followed the header than it declared.
    #[error("level has rows beyond the declared {expected}")]
    TrailingRows {
        /// Declared row count.
        expected: u32,
    },
    /// A row held the wrong number of cells.
    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        /// Zero-based row index.
        row: u32,
        /// Declared column count.
        expected: u32,
        /// Cells actually present.
        found: usize,
    },
    /// A cell was not a number.
    #[error("cell ({column}, {row}) is not numeric: '{value}'")]
    InvalidCell {
        /// Zero-based row index.
        row: u32,
        /// Zero-based column index.
        column: u32,
        /// Raw cell text.
        value: String,
    },
    /// A cell used a code outside the known set.
    #[error("cell ({column}, {row}) uses unknown code {code}")]
    UnknownCellCode {
        /// Zero-based row index.
        row: u32,
        /// Zero-based column index.
        column: u32,
        /// Rejected code.
        code: u32,
    },
    /// Fewer spawn points sit on open floor than the arena needs.
    #[error("level has {found} open spawn points but {required} are required")]
    TooFewSpawns {
        /// Spawn points on open floor.
        found: usize,
        /// Spawn points the arena needs.
        required: u32,
    },
}

/// Terrain plus the spawn points recorded for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    terrain: Terrain,
    spawns: Vec<CellCoord>,
}

impl Level {
    /// Bundles a terrain grid with its spawn points in actor order.
    #[must_use]
    pub fn new(terrain: Terrain, spawns: Vec<CellCoord>) -> Self {
        Self { terrain, spawns }
    }

    /// Generates a procedural level with corner spawns.
    pub fn generate<R: Rng + ?Sized>(config: &ArenaConfig, rng: &mut R) -> Self {
        let spawns = corner_spawns(config.columns, config.rows);
        let terrain = Terrain::generate(
            config.columns,
            config.rows,
            config.wall_density,
            &spawns,
            rng,
        );
        Self::new(terrain, spawns.to_vec())
    }

    /// Parses a persisted level whose dimensions must match the expected grid.
    ///
    /// Spawn markers become open floor and override the first two corner
    /// spawns. Corner spawns that land on a wall are dropped; at least two
    /// open spawns must remain.
    pub fn parse(text: &str, expected_columns: u32, expected_rows: u32) -> Result<Self, LevelError> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let header = lines.next().ok_or(LevelError::MissingHeader)?;
        let (rows, columns) = parse_header(header)?;
        if rows != expected_rows || columns != expected_columns {
            return Err(LevelError::DimensionMismatch {
                rows,
                columns,
                expected_rows,
                expected_columns,
            });
        }

        let width = usize::try_from(columns).unwrap_or(usize::MAX);
        let mut spawns = corner_spawns(columns, rows).to_vec();
        let mut cells = Vec::with_capacity(width.saturating_mul(usize::try_from(rows).unwrap_or(0)));

        for row in 0..rows {
            let line = lines.next().ok_or(LevelError::TruncatedRows {
                expected: rows,
                found: row,
            })?;
            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            if values.len() != width {
                return Err(LevelError::RowLength {
                    row,
                    expected: columns,
                    found: values.len(),
                });
            }

            for (column, value) in (0..columns).zip(values) {
                let code: u32 = value.parse().map_err(|_| LevelError::InvalidCell {
                    row,
                    column,
                    value: value.to_owned(),
                })?;
                let kind = match code {
                    0 => CellKind::Open,
                    1 => CellKind::IndestructibleWall,
                    2 => CellKind::DestructibleWall,
                    3 | 4 => {
                        let slot = usize::try_from(code - 3).unwrap_or(0);
                        spawns[slot] = CellCoord::new(column, row);
                        CellKind::Open
                    }
                    other => {
                        return Err(LevelError::UnknownCellCode {
                            row,
                            column,
                            code: other,
                        })
                    }
                };
                cells.push(kind);
            }
        }

        if lines.next().is_some() {
            return Err(LevelError::TrailingRows { expected: rows });
        }

        let terrain = Terrain::from_cells(columns, rows, cells).ok_or(LevelError::TruncatedRows {
            expected: rows,
            found: 0,
        })?;
        spawns.retain(|spawn| terrain.is_open(*spawn));
        Self::new(terrain, spawns).require_spawns(2)
    }

    /// Parses `text` for `config`, substituting a generated level when it is
    /// malformed or lacks a spawn for every configured actor.
    pub fn load_or_generate<R: Rng + ?Sized>(text: &str, config: &ArenaConfig, rng: &mut R) -> Self {
        Self::parse(text, config.columns, config.rows)
            .and_then(|level| level.require_spawns(config.actor_count))
            .unwrap_or_else(|error| Self::fallback(&error, config, rng))
    }

    /// Checks that the level offers at least `required` spawn points.
    pub fn require_spawns(self, required: u32) -> Result<Self, LevelError> {
        let found = self.spawns.len();
        if u32::try_from(found).unwrap_or(u32::MAX) < required {
            return Err(LevelError::TooFewSpawns { found, required });
        }
        Ok(self)
    }

    pub(crate) fn fallback<R: Rng + ?Sized>(
        error: &LevelError,
        config: &ArenaConfig,
        rng: &mut R,
    ) -> Self {
        warn!("rejected persisted level ({error}); generating a default arena");
        Self::generate(config, rng)
    }

    /// Terrain grid of the level.
    #[must_use]
    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Spawn points in actor order.
    #[must_use]
    pub fn spawns(&self) -> &[CellCoord] {
        &self.spawns
    }
}

fn parse_header(header: &str) -> Result<(u32, u32), LevelError> {
    let invalid = || LevelError::InvalidHeader(header.to_owned());
    let (rows, columns) = header.split_once(',').ok_or_else(invalid)?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;
    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((rows, columns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const SMALL_LEVEL: &str = "\
5,5
1,1,1,1,1
1,3,0,2,1
1,0,1,0,1
1,2,0,4,1
1,1,1,1,1
";

    #[test]
    fn parses_cells_and_spawn_markers() {
        let level = Level::parse(SMALL_LEVEL, 5, 5).expect("level parses");

        assert!(level.terrain().is_open(CellCoord::new(1, 1)));
        assert!(level.terrain().is_destructible(CellCoord::new(3, 1)));
        assert!(level.terrain().is_indestructible(CellCoord::new(2, 2)));
        assert!(level.terrain().is_open(CellCoord::new(3, 3)));
        assert_eq!(level.spawns()[0], CellCoord::new(1, 1));
        assert_eq!(level.spawns()[1], CellCoord::new(3, 3));
        assert_eq!(level.spawns().len(), 2, "walled corners are not spawns");
    }

    #[test]
    fn unmarked_level_keeps_only_open_corners() {
        let text = "5,5\n1,1,1,1,1\n1,1,0,0,1\n1,0,0,0,1\n1,0,0,1,1\n1,1,1,1,1\n";

        let level = Level::parse(text, 5, 5).expect("level parses");

        assert_eq!(level.spawns(), &[CellCoord::new(3, 1), CellCoord::new(1, 3)]);
        assert!(level
            .spawns()
            .iter()
            .all(|spawn| level.terrain().is_open(*spawn)));
    }

    #[test]
    fn rejects_level_without_two_open_spawns() {
        let text = "5,5\n1,1,1,1,1\n1,1,0,0,1\n1,0,0,0,1\n1,0,0,1,1\n1,1,1,2,1\n";
        let walled = "5,5\n1,1,1,1,1\n1,1,0,2,1\n1,0,0,0,1\n1,2,0,1,1\n1,1,1,1,1\n";

        assert!(Level::parse(text, 5, 5).is_ok());
        assert_eq!(
            Level::parse(walled, 5, 5),
            Err(LevelError::TooFewSpawns {
                found: 0,
                required: 2,
            })
        );
    }

    #[test]
    fn too_few_spawns_for_configured_actors_falls_back() {
        let text = "5,5\n1,1,1,1,1\n1,1,0,0,1\n1,0,0,0,1\n1,0,0,1,1\n1,1,1,1,1\n";
        let config = ArenaConfig {
            columns: 5,
            rows: 5,
            actor_count: 3,
            ..ArenaConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut expected_rng = ChaCha8Rng::seed_from_u64(2);

        let level = Level::load_or_generate(text, &config, &mut rng);

        assert_eq!(level, Level::generate(&config, &mut expected_rng));
    }

    #[test]
    fn rejects_dimension_mismatch() {
        assert_eq!(
            Level::parse(SMALL_LEVEL, 15, 13),
            Err(LevelError::DimensionMismatch {
                rows: 5,
                columns: 5,
                expected_rows: 13,
                expected_columns: 15,
            })
        );
    }

    #[test]
    fn rejects_truncated_rows() {
        let text = "3,3\n1,1,1\n1,0,1\n";
        assert_eq!(
            Level::parse(text, 3, 3),
            Err(LevelError::TruncatedRows {
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let text = "2,2\n0,x\n0,0\n";
        assert!(matches!(
            Level::parse(text, 2, 2),
            Err(LevelError::InvalidCell { row: 0, column: 1, .. })
        ));
    }

    #[test]
    fn rejects_unknown_codes_and_short_rows() {
        assert!(matches!(
            Level::parse("2,2\n0,7\n0,0\n", 2, 2),
            Err(LevelError::UnknownCellCode { code: 7, .. })
        ));
        assert!(matches!(
            Level::parse("2,2\n0\n0,0\n", 2, 2),
            Err(LevelError::RowLength { row: 0, found: 1, .. })
        ));
        assert!(matches!(
            Level::parse("2,2\n0,0\n0,0\n0,0\n", 2, 2),
            Err(LevelError::TrailingRows { expected: 2 })
        ));
    }

    #[test]
    fn rejects_bad_header() {
        assert_eq!(Level::parse("", 2, 2), Err(LevelError::MissingHeader));
        assert_eq!(
            Level::parse("two,2\n", 2, 2),
            Err(LevelError::InvalidHeader("two,2".to_owned()))
        );
    }

    #[test]
    fn malformed_level_falls_back_to_generated_arena() {
        let config = ArenaConfig::default();
        let mut fallback_rng = ChaCha8Rng::seed_from_u64(8);
        let mut expected_rng = ChaCha8Rng::seed_from_u64(8);

        let level = Level::load_or_generate("not a level", &config, &mut fallback_rng);

        assert_eq!(level, Level::generate(&config, &mut expected_rng));
        assert_eq!(level.terrain().dimensions(), (15, 13));
    }
}
