//! Tile file layout and writing.
//!
//! Tiles are laid out the way tile servers expect them:
//! `{base}/{z}/{x}/{y}.png`.

use crate::db::TileRecord;
use crate::error::{ExportError, Result};
use std::fs::{self, File, FileTimes};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File extension of exported tiles.
const TILE_EXTENSION: &str = "png";

/// Writes tiles below a base directory.
#[derive(Debug, Clone)]
pub struct TileWriter {
    base: PathBuf,
}

impl TileWriter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Returns `{base}/{z}/{x}`.
    pub fn tile_dir(&self, tile: &TileRecord) -> PathBuf {
        self.base.join(tile.z.to_string()).join(tile.x.to_string())
    }

    /// Returns `{base}/{z}/{x}/{y}.png`.
    pub fn tile_path(&self, tile: &TileRecord) -> PathBuf {
        self.tile_dir(tile).join(format!("{}.{TILE_EXTENSION}", tile.y))
    }

    /// Creates the tile's directory and any missing parents.
    ///
    /// Succeeds if the directory already exists.
    pub fn create_tile_dir(&self, tile: &TileRecord) -> Result<PathBuf> {
        let dir = self.tile_dir(tile);
        fs::create_dir_all(&dir).map_err(|e| {
            ExportError::filesystem(format!("Cannot create directory {}: {e}", dir.display()))
        })?;
        Ok(dir)
    }

    /// Writes the tile's bytes, replacing any existing file, and stamps the
    /// file's access and modification times with `created_at`.
    ///
    /// The directory must already exist (see `create_tile_dir`).
    pub fn write_tile(&self, tile: &TileRecord, created_at: SystemTime) -> Result<PathBuf> {
        let path = self.tile_path(tile);

        let mut file = File::create(&path).map_err(|e| {
            ExportError::filesystem(format!("Cannot create {}: {e}", path.display()))
        })?;
        file.write_all(&tile.data).map_err(|e| {
            ExportError::filesystem(format!("Cannot write {}: {e}", path.display()))
        })?;

        let times = FileTimes::new()
            .set_accessed(created_at)
            .set_modified(created_at);
        file.set_times(times).map_err(|e| {
            ExportError::filesystem(format!("Cannot set timestamps on {}: {e}", path.display()))
        })?;

        Ok(path)
    }
}
