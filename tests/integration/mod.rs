//! Integration tests for tile export.
//!
//! SQLite-backed tests always run. MySQL tests need a server; set
//! TILE_DATABASE_URL to run them.

pub mod fixtures;
pub mod mysql_test;
