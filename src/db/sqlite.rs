//! SQLite tile source.
//!
//! Reads a tiles table kept in an SQLite file. The file is opened read-only
//! and must already exist.

use crate::config::ConnectionConfig;
use crate::db::{decode_tile_row, format_query_error, map_connection_error, TileRecord, TileSource};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::debug;

/// SQLite tile source.
#[derive(Debug)]
pub struct SqliteTileSource {
    pool: SqlitePool,
    query: String,
}

impl SqliteTileSource {
    /// Opens the database file named by `config.database()`.
    pub async fn connect(config: &ConnectionConfig, table: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(config.database())
            .read_only(true)
            .create_if_missing(false);

        debug!("Opening {}", config.display_string());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        Ok(Self::from_pool(pool, table))
    }

    /// Creates a source from an existing connection pool.
    pub fn from_pool(pool: SqlitePool, table: &str) -> Self {
        Self {
            pool,
            query: select_tiles_sql(table),
        }
    }
}

/// Builds the export query; casts give every column a runtime type sqlx can
/// decode regardless of the declared column type.
fn select_tiles_sql(table: &str) -> String {
    format!(
        "SELECT CAST(x AS INTEGER) AS x, CAST(y AS INTEGER) AS y, CAST(z AS INTEGER) AS z, \
         data, CAST(created_at AS TEXT) AS created_at FROM \"{table}\""
    )
}

#[async_trait]
impl TileSource for SqliteTileSource {
    fn tiles(&self) -> BoxStream<'_, Result<TileRecord>> {
        sqlx::query(&self.query)
            .fetch(&self.pool)
            .map(|row| {
                row.map_err(|e| ExportError::query(format_query_error(e)))
                    .and_then(|row| decode_tile_row(&row))
            })
            .boxed()
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
