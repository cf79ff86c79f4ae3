//! Tile source abstraction.
//!
//! A tile source hands out the rows of the tiles table as a lazy stream, so
//! only one row is held in memory at a time. Backends are interchangeable
//! behind the `TileSource` trait.

mod mock;
mod mysql;
mod sqlite;
mod types;

pub use mock::{FailingTileSource, MockTileSource};
pub use mysql::MySqlTileSource;
pub use sqlite::SqliteTileSource;
pub use types::TileRecord;

use crate::config::ConnectionConfig;
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MySql,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Self::MySql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MySql => 3306,
            Self::Sqlite => 0,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        self.as_str()
    }
}

/// Opens a tile source for the given backend and configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig, table: &str) -> Result<Box<dyn TileSource>> {
    match config.backend() {
        DatabaseBackend::MySql => {
            let source = MySqlTileSource::connect(config, table).await?;
            Ok(Box::new(source))
        }
        DatabaseBackend::Sqlite => {
            let source = SqliteTileSource::connect(config, table).await?;
            Ok(Box::new(source))
        }
    }
}

/// Trait defining the interface for tile sources.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Streams every row of the tiles table in cursor order.
    ///
    /// The stream is finite and not restartable. Query failures surface as
    /// the first item.
    fn tiles(&self) -> BoxStream<'_, Result<TileRecord>>;

    /// Releases the connection. Any stream obtained from `tiles` must be
    /// dropped first.
    async fn close(&self) -> Result<()>;
}

/// Decodes one `x, y, z, data, created_at` row of any sqlx backend.
pub(crate) fn decode_tile_row<'r, R>(row: &'r R) -> Result<TileRecord>
where
    R: sqlx::Row,
    &'static str: sqlx::ColumnIndex<R>,
    i64: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    String: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    Vec<u8>: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    let column_error =
        |column: &str, e: sqlx::Error| ExportError::query(format!("Cannot read column '{column}': {e}"));

    let data: Option<Vec<u8>> = row.try_get("data").map_err(|e| column_error("data", e))?;

    Ok(TileRecord {
        x: row.try_get("x").map_err(|e| column_error("x", e))?,
        y: row.try_get("y").map_err(|e| column_error("y", e))?,
        z: row.try_get("z").map_err(|e| column_error("z", e))?,
        data: data.unwrap_or_default(),
        created_at: row
            .try_get("created_at")
            .map_err(|e| column_error("created_at", e))?,
    })
}

/// Maps sqlx connection errors to user-friendly messages.
pub(crate) fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ExportError {
    let host = config.host();
    let port = config.port();
    let user = config.user();
    let database = config.database();

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ExportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("access denied") || error_str.contains("authentication failed") {
        ExportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        ExportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("unable to open database file") {
        ExportError::connection(format!("Cannot open SQLite database '{database}'."))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ExportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ExportError::connection(error.to_string())
    }
}

/// Formats a query error, keeping the database's own message when present.
pub(crate) fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => {
            let mut result = String::from("ERROR: ");
            result.push_str(db_error.message());
            if let Some(code) = db_error.code() {
                result.push_str(" (code ");
                result.push_str(&code);
                result.push(')');
            }
            result
        }
        None => error.to_string(),
    }
}
