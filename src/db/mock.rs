//! Mock tile sources for testing.
//!
//! Provides in-memory sources so the exporter can be exercised without a
//! database server.

use super::{TileRecord, TileSource};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};

/// A tile source that yields predefined rows.
#[derive(Debug, Default)]
pub struct MockTileSource {
    records: Vec<TileRecord>,
    fail_after: Option<(usize, String)>,
    closed: AtomicBool,
}

impl MockTileSource {
    /// Creates a mock source yielding `records` in order.
    pub fn new(records: Vec<TileRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Makes the stream fail with a query error after `rows` rows.
    pub fn with_error_after(mut self, rows: usize, msg: impl Into<String>) -> Self {
        self.fail_after = Some((rows, msg.into()));
        self
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileSource for MockTileSource {
    fn tiles(&self) -> BoxStream<'_, Result<TileRecord>> {
        match &self.fail_after {
            Some((rows, msg)) => {
                let head = self.records.iter().take(*rows).cloned().map(Ok);
                let failure = std::iter::once(Err(ExportError::query(msg.clone())));
                stream::iter(head.chain(failure)).boxed()
            }
            None => stream::iter(self.records.iter().cloned().map(Ok)).boxed(),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A tile source whose query always fails.
#[derive(Debug)]
pub struct FailingTileSource {
    message: String,
    closed: AtomicBool,
}

impl FailingTileSource {
    /// Creates a source failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileSource for FailingTileSource {
    fn tiles(&self) -> BoxStream<'_, Result<TileRecord>> {
        stream::once(futures::future::ready(Err(ExportError::query(
            self.message.clone(),
        ))))
        .boxed()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
