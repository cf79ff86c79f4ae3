//! Shared fixtures: SQLite tile databases in temporary directories.

use db_tile_export::config::ConnectionConfig;
use db_tile_export::db::DatabaseBackend;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};

/// A row to seed: `(x, y, z, data, created_at)`.
pub type SeedRow<'a> = (i64, i64, i64, Option<&'a [u8]>, &'a str);

/// Creates `tiles.db` in `dir` with a `tiles` table holding `rows`.
pub async fn create_tile_db(dir: &Path, rows: &[SeedRow<'_>]) -> PathBuf {
    create_tile_db_with_table(dir, "tiles", rows).await
}

/// Creates `tiles.db` in `dir` with a table named `table` holding `rows`.
pub async fn create_tile_db_with_table(dir: &Path, table: &str, rows: &[SeedRow<'_>]) -> PathBuf {
    let path = dir.join("tiles.db");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query(&format!(
        "CREATE TABLE {table} (x INTEGER, y INTEGER, z INTEGER, data BLOB, created_at DATETIME)"
    ))
    .execute(&pool)
    .await
    .unwrap();

    for (x, y, z, data, created_at) in rows {
        sqlx::query(&format!(
            "INSERT INTO {table} (x, y, z, data, created_at) VALUES (?, ?, ?, ?, ?)"
        ))
        .bind(x)
        .bind(y)
        .bind(z)
        .bind(data.map(<[u8]>::to_vec))
        .bind(*created_at)
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;
    path
}

/// Returns a connection config pointing at the SQLite file `path`.
pub fn sqlite_config(path: &Path) -> ConnectionConfig {
    ConnectionConfig {
        backend: Some(DatabaseBackend::Sqlite),
        database: Some(path.display().to_string()),
        ..Default::default()
    }
}
