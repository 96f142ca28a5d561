// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders, fake sinks, and assertion helpers.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::record::{Level, LogRecord};
use crate::sink::{Dispatcher, LogSink};
use crate::store::{LogStore, StoreConfig};

/// Builder for constructing a `LogStore` in tests with sensible defaults.
pub struct StoreBuilder {
    capacity: usize,
    lock_timeout: Duration,
    cursor_cache: bool,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self { capacity: 4096, lock_timeout: Duration::from_millis(50), cursor_cache: true }
    }

    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    pub fn lock_timeout(mut self, d: Duration) -> Self {
        self.lock_timeout = d;
        self
    }

    pub fn cursor_cache(mut self, enabled: bool) -> Self {
        self.cursor_cache = enabled;
        self
    }

    pub fn build(self) -> Arc<LogStore> {
        Arc::new(LogStore::new(StoreConfig {
            capacity: self.capacity,
            lock_timeout: self.lock_timeout,
            cursor_cache: self.cursor_cache,
        }))
    }

    /// Build the store and a dispatcher with the store registered first.
    pub fn build_with_dispatcher(self) -> anyhow::Result<(Arc<LogStore>, Arc<Dispatcher>)> {
        let store = self.build();
        let dispatcher = Arc::new(Dispatcher::new());
        dispatcher.register(Arc::clone(&store) as Arc<dyn LogSink>)?;
        Ok((store, dispatcher))
    }
}

/// A record with fixed task, core, and timestamp so tests compare exactly.
pub fn record(level: Level, tag: &str, payload: impl Into<Bytes>) -> LogRecord {
    LogRecord::new(level, tag, payload).with_task("test").with_core(0).with_timestamp(1_000)
}

/// A sink that keeps every record it receives.
pub struct MemorySink {
    name: String,
    records: parking_lot::Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { name: name.into(), records: parking_lot::Mutex::new(Vec::new()) })
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn payloads(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.payload_str().into_owned()).collect()
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Drain every record from `store` in order.
pub fn drain(store: &LogStore) -> anyhow::Result<Vec<LogRecord>> {
    let mut out = Vec::new();
    while let Some(record) = store.pull()? {
        out.push(record);
    }
    Ok(out)
}

/// Walk every record with `peek`, starting from sequence 0.
pub fn scan(store: &LogStore) -> anyhow::Result<Vec<LogRecord>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(record) = store.peek(cursor)? {
        cursor = record.sequence;
        out.push(record);
    }
    Ok(out)
}

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
