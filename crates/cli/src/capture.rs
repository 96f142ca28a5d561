// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turning raw text and `tracing` events into [`LogRecord`]s.
//!
//! Producers may write a line in several fragments. [`LineAssembler`] keeps
//! one partial line per producer and emits a record once the line ends with
//! a newline or fills the payload.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, LazyLock};

use bytes::Bytes;
use regex::Regex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::record::{Level, LogRecord, Tag, MAX_PAYLOAD};
use crate::sink::Dispatcher;

/// Device-style line prefix: `"<L> (<uptime>) <tag>: "`.
static PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([NEWIDV]) \((\d+)\) ([^:]*): ").ok());

const TRUNCATED: &[u8; 2] = b"||";

/// Split a device-style prefix off `fragment`, returning level, tag, and
/// the remaining text.
pub fn split_prefix(fragment: &str) -> Option<(Level, &str, &str)> {
    let re = PREFIX.as_ref()?;
    let caps = re.captures(fragment)?;
    let level = caps.get(1)?.as_str().chars().next().map(Level::from_letter)?;
    let tag = caps.get(3)?.as_str();
    let rest = &fragment[caps.get(0)?.end()..];
    Some((level, tag, rest))
}

/// Append `text` to `data`, capping at [`MAX_PAYLOAD`]. A cut line ends
/// with `||`.
pub(crate) fn append_capped(data: &mut Vec<u8>, text: &[u8]) {
    let free = MAX_PAYLOAD.saturating_sub(data.len());
    if text.len() <= free {
        data.extend_from_slice(text);
        return;
    }
    data.extend_from_slice(&text[..free]);
    let end = data.len();
    data[end - TRUNCATED.len()..].copy_from_slice(TRUNCATED);
}

/// Strip trailing newlines and replace anything outside printable ASCII.
fn sanitize(data: &mut Vec<u8>) {
    while data.last() == Some(&b'\n') {
        data.pop();
    }
    for b in data.iter_mut() {
        if !(0x20..=0x7e).contains(b) {
            *b = b'.';
        }
    }
}

#[derive(Debug)]
struct PendingLine {
    level: Level,
    tag: Tag,
    data: Vec<u8>,
}

/// Per-producer line reassembly.
#[derive(Debug, Default)]
pub struct LineAssembler {
    core_id: u8,
    pending: HashMap<String, PendingLine>,
}

impl LineAssembler {
    pub fn new(core_id: u8) -> Self {
        Self { core_id, pending: HashMap::new() }
    }

    /// Feed one fragment from `producer`. Returns a record when the
    /// producer's line is complete.
    ///
    /// Level and tag come from the most recent prefix seen for the producer
    /// (info and the producer name until one arrives).
    pub fn write(&mut self, producer: &str, fragment: &str) -> Option<LogRecord> {
        let line = self.pending.entry(producer.to_owned()).or_insert_with(|| PendingLine {
            level: Level::Info,
            tag: Tag::new(producer),
            data: Vec::new(),
        });

        let text = match split_prefix(fragment) {
            Some((level, tag, rest)) => {
                line.level = level;
                line.tag = Tag::new(tag);
                line.data.clear();
                rest
            }
            None => fragment,
        };
        append_capped(&mut line.data, text.as_bytes());

        let complete = line.data.last() == Some(&b'\n')
            || line.data.len() >= MAX_PAYLOAD - TRUNCATED.len();
        if !complete {
            return None;
        }

        let mut data = std::mem::take(&mut line.data);
        sanitize(&mut data);
        if data.is_empty() {
            return None;
        }
        let mut record = LogRecord::new(line.level, "", Bytes::from(data))
            .with_task(producer)
            .with_core(self.core_id);
        record.tag = line.tag;
        Some(record)
    }

    /// Bytes waiting for a newline from `producer`.
    pub fn pending_len(&self, producer: &str) -> usize {
        self.pending.get(producer).map_or(0, |line| line.data.len())
    }
}

thread_local! {
    static IN_CAPTURE: Cell<bool> = const { Cell::new(false) };
}

/// `tracing` layer that copies the process's own events into the sinks.
///
/// Events emitted while a capture is already running on the same thread are
/// skipped, so a sink that logs cannot feed itself.
pub struct CaptureLayer {
    dispatcher: Arc<Dispatcher>,
    core_id: u8,
    max_level: Level,
}

impl CaptureLayer {
    pub fn new(dispatcher: Arc<Dispatcher>, core_id: u8) -> Self {
        Self { dispatcher, core_id, max_level: Level::Info }
    }

    /// Most verbose level copied into the sinks (default info).
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    fn record_for(&self, event: &Event<'_>) -> Option<LogRecord> {
        let meta = event.metadata();
        let level = level_of(meta.level());
        if level > self.max_level {
            return None;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let mut data = Vec::with_capacity(visitor.text.len().min(MAX_PAYLOAD));
        append_capped(&mut data, visitor.text.as_bytes());
        sanitize(&mut data);
        if data.is_empty() {
            return None;
        }
        Some(LogRecord::new(level, meta.target(), Bytes::from(data)).with_core(self.core_id))
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if IN_CAPTURE.with(|flag| flag.replace(true)) {
            return;
        }
        if let Some(record) = self.record_for(event) {
            self.dispatcher.dispatch(&record);
        }
        IN_CAPTURE.with(|flag| flag.set(false));
    }
}

fn level_of(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::INFO => Level::Info,
        tracing::Level::DEBUG => Level::Debug,
        _ => Level::Verbose,
    }
}

/// Renders `message` followed by ` key=value` for every other field.
#[derive(Default)]
struct MessageVisitor {
    text: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.text.insert_str(0, value);
        } else {
            let _ = write!(self.text, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.text.insert_str(0, &format!("{value:?}"));
        } else {
            let _ = write!(self.text, " {}={value:?}", field.name());
        }
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
