// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human and JSON renderings of log records.

use std::io::Write;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use crate::record::{Level, LogRecord, Tag, TaskName};
use crate::sink::LogSink;

const RESET: &str = "\x1b[0m";

/// Timestamps past these are shown in seconds rather than milliseconds.
const PLAIN_SECONDS_AFTER: u64 = 10_000_000;
const COLOR_SECONDS_AFTER: u64 = 100_000_000;

fn scaled(timestamp_ms: u64, threshold: u64) -> u64 {
    if timestamp_ms > threshold {
        timestamp_ms / 1000
    } else {
        timestamp_ms
    }
}

/// `E 0 (1234  )       main_task           wifi: payload`
pub fn format_plain(record: &LogRecord) -> String {
    format!(
        "{} {} ({:<6}) {:>15}{:>20}: {}",
        record.level.letter(),
        record.core_id,
        scaled(record.timestamp_ms, PLAIN_SECONDS_AFTER),
        record.task,
        record.tag,
        record.payload_str(),
    )
}

/// Escape sequence and letter for a level. `None` renders like info.
fn color_of(level: Level) -> (&'static str, char) {
    match level {
        Level::Error => ("\x1b[0;31m", 'E'),
        Level::Warn => ("\x1b[0;33m", 'W'),
        Level::Debug => ("", 'D'),
        Level::Verbose => ("", 'V'),
        Level::Info | Level::None => ("\x1b[0;32m", 'I'),
    }
}

/// ANSI-coloured line with a wider tag column and a trailing reset.
pub fn format_color(record: &LogRecord) -> String {
    let (color, letter) = color_of(record.level);
    format!(
        "{color}{letter} {} ({:<6}) {:>15}{:>24}: {} {RESET}",
        record.core_id,
        scaled(record.timestamp_ms, COLOR_SECONDS_AFTER),
        record.task,
        record.tag,
        record.payload_str(),
    )
}

/// Serializable view of a record for `--json` output.
#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub sequence: u32,
    pub level: Level,
    pub core: u8,
    pub timestamp_ms: u64,
    pub task: &'a TaskName,
    pub tag: &'a Tag,
    pub message: std::borrow::Cow<'a, str>,
}

impl<'a> From<&'a LogRecord> for RecordView<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            sequence: record.sequence,
            level: record.level,
            core: record.core_id,
            timestamp_ms: record.timestamp_ms,
            task: &record.task,
            tag: &record.tag,
            message: record.payload_str(),
        }
    }
}

/// Sink that prints every record to a shared writer.
///
/// If the writer stays locked for longer than the timeout the record is not
/// printed.
pub struct ConsoleSink<W> {
    out: Mutex<W>,
    color: bool,
    lock_timeout: Duration,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out: Mutex::new(out), color, lock_timeout: Duration::from_millis(250) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn accept(&self, record: &LogRecord) {
        let line = if self.color { format_color(record) } else { format_plain(record) };
        let Some(mut out) = self.out.try_lock_for(self.lock_timeout) else {
            return;
        };
        let _ = writeln!(out, "{line}").and_then(|()| out.flush());
    }
}

#[cfg(test)]
#[path = "print_tests.rs"]
mod tests;
