// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log record model and the fixed-size header stored in front of every
//! payload in the ring.
//!
//! Header layout (64 bytes, little-endian):
//!
//! ```text
//!  0..4   sequence      u32
//!  4      core_id       u8
//!  5      level         u8
//!  6..8   payload_len   u16
//!  8..16  timestamp_ms  u64
//! 16..32  task          [u8; 16], zero padded
//! 32..64  tag           [u8; 32], zero padded
//! ```

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Largest payload a single record may carry.
pub const MAX_PAYLOAD: usize = 256;
pub const TASK_NAME_LEN: usize = 16;
pub const TAG_LEN: usize = 32;
pub const HEADER_LEN: usize = 16 + TASK_NAME_LEN + TAG_LEN;

/// Severity, numbered like the device logging levels.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    None = 0,
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Verbose = 5,
}

impl Level {
    /// Decode a stored level. Unknown values are treated as verbose.
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::None,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            _ => Self::Verbose,
        }
    }

    /// Decode the single-letter prefix used in device log lines.
    pub fn from_letter(c: char) -> Self {
        match c {
            'N' => Self::None,
            'E' => Self::Error,
            'W' => Self::Warn,
            'I' => Self::Info,
            'D' => Self::Debug,
            _ => Self::Verbose,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::None => 'N',
            Self::Error => 'E',
            Self::Warn => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
            Self::Verbose => 'V',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Verbose => "verbose",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = anyhow::Error;

    /// Accepts a level name, its numeric value, or its letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "none" | "n" | "0" => Ok(Self::None),
            "error" | "e" | "1" => Ok(Self::Error),
            "warn" | "warning" | "w" | "2" => Ok(Self::Warn),
            "info" | "i" | "3" => Ok(Self::Info),
            "debug" | "d" | "4" => Ok(Self::Debug),
            "verbose" | "v" | "5" => Ok(Self::Verbose),
            other => anyhow::bail!("invalid log level: {other}"),
        }
    }
}

/// Zero-padded fixed-width name. Longer input is cut at a UTF-8 boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedName<const N: usize> {
    bytes: [u8; N],
}

pub type TaskName = FixedName<TASK_NAME_LEN>;
pub type Tag = FixedName<TAG_LEN>;

impl<const N: usize> FixedName<N> {
    pub fn new(s: &str) -> Self {
        let mut end = s.len().min(N);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        Self::from_bytes(&s.as_bytes()[..end])
    }

    /// Copy raw bytes, stopping at `N` bytes or the first NUL.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut bytes = [0u8; N];
        let len = raw.iter().take(N).position(|&b| b == 0).unwrap_or(raw.len().min(N));
        bytes[..len].copy_from_slice(&raw[..len]);
        Self { bytes }
    }

    /// The name without padding.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        &self.bytes[..len]
    }

    /// The padded on-wire form.
    pub fn raw(&self) -> &[u8; N] {
        &self.bytes
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }
}

impl<const N: usize> Default for FixedName<N> {
    fn default() -> Self {
        Self { bytes: [0u8; N] }
    }
}

impl<const N: usize> fmt::Display for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.as_str())
    }
}

impl<const N: usize> fmt::Debug for FixedName<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> From<&str> for FixedName<N> {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<const N: usize> Serialize for FixedName<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One logical log entry.
///
/// `sequence` is 0 until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub sequence: u32,
    pub core_id: u8,
    pub level: Level,
    pub timestamp_ms: u64,
    pub task: TaskName,
    pub tag: Tag,
    pub payload: Bytes,
}

impl LogRecord {
    /// Build a record stamped with the current time and thread name.
    pub fn new(level: Level, tag: &str, payload: impl Into<Bytes>) -> Self {
        let task = std::thread::current().name().map(TaskName::new).unwrap_or_default();
        Self {
            sequence: 0,
            core_id: 0,
            level,
            timestamp_ms: now_ms(),
            task,
            tag: Tag::new(tag),
            payload: payload.into(),
        }
    }

    pub fn with_task(mut self, task: &str) -> Self {
        self.task = TaskName::new(task);
        self
    }

    pub fn with_core(mut self, core_id: u8) -> Self {
        self.core_id = core_id;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Header plus payload size once stored.
    pub fn framed_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }
}

/// Fixed-size frame header preceding each payload in the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub sequence: u32,
    pub core_id: u8,
    pub level: Level,
    pub payload_len: u16,
    pub timestamp_ms: u64,
    pub task: TaskName,
    pub tag: Tag,
}

impl RecordHeader {
    /// Header for `record` stored under `sequence`. The caller guarantees
    /// the payload fits in a `u16`.
    pub fn for_record(record: &LogRecord, sequence: u32) -> Self {
        Self {
            sequence,
            core_id: record.core_id,
            level: record.level,
            payload_len: record.payload.len().min(u16::MAX as usize) as u16,
            timestamp_ms: record.timestamp_ms,
            task: record.task,
            tag: record.tag,
        }
    }

    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.payload_len as usize
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.sequence.to_le_bytes());
        out[4] = self.core_id;
        out[5] = self.level as u8;
        out[6..8].copy_from_slice(&self.payload_len.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp_ms.to_le_bytes());
        out[16..16 + TASK_NAME_LEN].copy_from_slice(self.task.raw());
        out[16 + TASK_NAME_LEN..HEADER_LEN].copy_from_slice(self.tag.raw());
        out
    }

    /// Decode from a buffer holding at least [`HEADER_LEN`] bytes.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..HEADER_LEN)?;
        let mut seq = [0u8; 4];
        seq.copy_from_slice(&buf[0..4]);
        let mut len = [0u8; 2];
        len.copy_from_slice(&buf[6..8]);
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&buf[8..16]);
        Some(Self {
            sequence: u32::from_le_bytes(seq),
            core_id: buf[4],
            level: Level::from_u8(buf[5]),
            payload_len: u16::from_le_bytes(len),
            timestamp_ms: u64::from_le_bytes(ts),
            task: TaskName::from_bytes(&buf[16..16 + TASK_NAME_LEN]),
            tag: Tag::from_bytes(&buf[16 + TASK_NAME_LEN..HEADER_LEN]),
        })
    }

    /// Decode a header that may straddle the end of the ring. Only a split
    /// header is copied.
    pub fn decode_split(head: &[u8], tail: &[u8]) -> Option<Self> {
        if head.len() >= HEADER_LEN {
            return Self::decode(head);
        }
        if head.len() + tail.len() < HEADER_LEN {
            return None;
        }
        let mut buf = [0u8; HEADER_LEN];
        buf[..head.len()].copy_from_slice(head);
        buf[head.len()..].copy_from_slice(&tail[..HEADER_LEN - head.len()]);
        Self::decode(&buf)
    }

    pub fn into_record(self, payload: Bytes) -> LogRecord {
        LogRecord {
            sequence: self.sequence,
            core_id: self.core_id,
            level: self.level,
            timestamp_ms: self.timestamp_ms,
            task: self.task,
            tag: self.tag,
            payload,
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
