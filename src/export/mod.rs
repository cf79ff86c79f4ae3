//! Tile export.
//!
//! Pulls rows from a `TileSource` one at a time and materializes each as a
//! file. Every row prints one progress line; the run ends with the row
//! count. The first error aborts the run, leaving files already written in
//! place.

mod timestamp;
mod writer;

pub use timestamp::{parse_created_at, TimeZoneMode};
pub use writer::TileWriter;

use crate::config::ExportConfig;
use crate::db::{TileRecord, TileSource};
use crate::error::{ExportError, Result};
use futures::TryStreamExt;
use std::io::Write;
use tracing::{debug, info, warn};

/// Row handling options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Zone for `created_at` values without an offset.
    pub timezone: TimeZoneMode,
    /// Skip rows with an empty blob.
    pub skip_empty: bool,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            timezone: config.timezone,
            skip_empty: config.skip_empty,
        }
    }
}

/// Counters of a finished export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Rows pulled from the source.
    pub rows: u64,
    /// Tile files written.
    pub written: u64,
    /// Empty rows skipped.
    pub skipped: u64,
}

/// Streams tiles from a source into a `TileWriter`, reporting progress to `out`.
pub struct Exporter<W: Write> {
    writer: TileWriter,
    options: ExportOptions,
    out: W,
}

impl<W: Write> Exporter<W> {
    /// Creates an exporter printing progress to `out`.
    pub fn new(writer: TileWriter, options: ExportOptions, out: W) -> Self {
        Self {
            writer,
            options,
            out,
        }
    }

    /// Returns the progress sink, consuming the exporter.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Exports every row of `source`.
    ///
    /// The row stream is dropped before this returns, on success and on
    /// error, so the source can be closed right after.
    pub async fn run(&mut self, source: &dyn TileSource) -> Result<ExportSummary> {
        info!("Exporting tiles to {}", self.writer.base().display());

        let mut summary = ExportSummary::default();
        let mut tiles = source.tiles();

        while let Some(tile) = tiles.try_next().await? {
            summary.rows += 1;
            self.export_tile(&tile, &mut summary)?;
        }

        self.print(format_args!("Number of rows returned: {}", summary.rows))?;

        info!(
            "Export finished: {} rows, {} written, {} skipped",
            summary.rows, summary.written, summary.skipped
        );
        Ok(summary)
    }

    fn export_tile(&mut self, tile: &TileRecord, summary: &mut ExportSummary) -> Result<()> {
        let created_at =
            parse_created_at(&tile.created_at, self.options.timezone).map_err(|e| match e {
                ExportError::Parse(msg) => ExportError::parse(format!("{msg} for tile {tile}")),
                other => other,
            })?;

        if self.options.skip_empty && tile.is_empty() {
            warn!("Skipping empty tile {tile}");
            self.print(format_args!(
                "skipping empty tile x({}) y({}) z({})",
                tile.x, tile.y, tile.z
            ))?;
            summary.skipped += 1;
            return Ok(());
        }

        self.writer.create_tile_dir(tile)?;

        self.print(format_args!(
            "x({}) y({}) z({}), created_at({})",
            tile.x,
            tile.y,
            tile.z,
            created_at.timestamp()
        ))?;

        let path = self.writer.write_tile(tile, created_at.into())?;
        debug!("Wrote {} ({} bytes)", path.display(), tile.data.len());
        summary.written += 1;

        Ok(())
    }

    fn print(&mut self, line: std::fmt::Arguments<'_>) -> Result<()> {
        writeln!(self.out, "{line}")
            .map_err(|e| ExportError::internal(format!("Cannot write progress output: {e}")))
    }
}

/// Runs `exporter` over `source`, then closes the source.
///
/// The source is closed on every path; an export error takes precedence over
/// a close error.
pub async fn export_tiles<W: Write>(
    source: &dyn TileSource,
    exporter: &mut Exporter<W>,
) -> Result<ExportSummary> {
    let result = exporter.run(source).await;
    let closed = source.close().await;

    match (result, closed) {
        (Err(e), Err(close_err)) => {
            warn!("Failed to close tile source: {close_err}");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Ok(summary), Ok(())) => Ok(summary),
    }
}
