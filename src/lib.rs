//! Tile export: moves map tiles stored in a database table into a
//! `{z}/{x}/{y}.png` directory tree, keeping each tile's timestamp.
//!
//! This library exposes the core modules for the binary and the integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
