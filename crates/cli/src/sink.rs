// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of captured records to registered sinks.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::record::LogRecord;

/// Most sinks a [`Dispatcher`] accepts.
pub const MAX_SINKS: usize = 10;

/// A consumer of log records (store, console, network forwarder).
///
/// `accept` runs on the producer's thread and must not block for long.
pub trait LogSink: Send + Sync {
    fn name(&self) -> &str;
    fn accept(&self, record: &LogRecord);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// All [`MAX_SINKS`] slots are taken.
    Full,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "FULL: at most {MAX_SINKS} sinks may be registered"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Ordered, bounded set of sinks. Records reach sinks in registration order.
#[derive(Default)]
pub struct Dispatcher {
    sinks: RwLock<Vec<Arc<dyn LogSink>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sink: Arc<dyn LogSink>) -> Result<(), SinkError> {
        let slot = {
            let mut sinks = self.sinks.write();
            if sinks.len() >= MAX_SINKS {
                return Err(SinkError::Full);
            }
            sinks.push(Arc::clone(&sink));
            sinks.len() - 1
        };
        // Logged after the write lock is released: the event may be captured
        // and dispatched back through this registry.
        debug!(sink = sink.name(), slot, "registered log sink");
        Ok(())
    }

    pub fn dispatch(&self, record: &LogRecord) {
        // Sinks run outside the registry lock.
        let sinks = self.sinks.read().clone();
        for sink in &sinks {
            sink.accept(record);
        }
    }

    pub fn len(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.sinks.read().iter().map(|s| s.name().to_owned()).collect()
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
