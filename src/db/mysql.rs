//! MySQL tile source.
//!
//! Provides the `MySqlTileSource` struct that implements the `TileSource`
//! trait for MySQL and MariaDB using sqlx.

use crate::config::ConnectionConfig;
use crate::db::{decode_tile_row, format_query_error, map_connection_error, TileRecord, TileSource};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

/// Seconds to wait for the server before giving up.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// MySQL tile source.
///
/// Holds a pool of exactly one connection; the export needs one cursor and
/// nothing else.
#[derive(Debug)]
pub struct MySqlTileSource {
    pool: MySqlPool,
    query: String,
}

impl MySqlTileSource {
    /// Connects to the server described by `config` and prepares to read `table`.
    ///
    /// A failed attempt is reported immediately; there are no retries.
    pub async fn connect(config: &ConnectionConfig, table: &str) -> Result<Self> {
        let options = connect_options(config);

        debug!("Connecting to {}", config.display_string());

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .connect_with(options)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self::from_pool(pool, table))
    }

    /// Creates a source from an existing connection pool.
    pub fn from_pool(pool: MySqlPool, table: &str) -> Self {
        Self {
            pool,
            query: select_tiles_sql(table),
        }
    }
}

/// Builds the connect options for `config`.
///
/// The session keeps the server's time zone: TIMESTAMP columns are rendered
/// in it, and `created_at` is interpreted as local time by default.
fn connect_options(config: &ConnectionConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(config.host())
        .port(config.port())
        .username(config.user())
        .password(config.password())
        .database(config.database())
        .timezone(None::<String>)
}

/// Builds the export query.
///
/// The casts normalize unsigned or narrow integer columns to BIGINT and
/// DATETIME/TIMESTAMP columns to text.
fn select_tiles_sql(table: &str) -> String {
    format!(
        "SELECT CAST(x AS SIGNED) AS x, CAST(y AS SIGNED) AS y, CAST(z AS SIGNED) AS z, \
         data, CAST(created_at AS CHAR) AS created_at FROM `{table}`"
    )
}

#[async_trait]
impl TileSource for MySqlTileSource {
    fn tiles(&self) -> BoxStream<'_, Result<TileRecord>> {
        debug!("Streaming tiles: {}", self.query);

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
