//! Row types for the tiles table.

use std::fmt;

/// One row of the tiles table.
///
/// `created_at` is kept as the raw text the database returned; the exporter
/// parses it per row so that a malformed value aborts the run at that row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRecord {
    /// Tile column index.
    pub x: i64,
    /// Tile row index.
    pub y: i64,
    /// Zoom level.
    pub z: i64,
    /// Encoded image bytes.
    pub data: Vec<u8>,
    /// Creation timestamp as stored in the source.
    pub created_at: String,
}

impl TileRecord {
    /// Creates a tile record.
    pub fn new(x: i64, y: i64, z: i64, data: impl Into<Vec<u8>>, created_at: impl Into<String>) -> Self {
        Self {
            x,
            y,
            z,
            data: data.into(),
            created_at: created_at.into(),
        }
    }

    /// Returns true if the tile carries no image data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for TileRecord {
    /// Formats the tile as `z/x/y`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}
