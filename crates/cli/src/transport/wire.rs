// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logstream datagram codec.
//!
//! Layout (little-endian, unpadded):
//!
//! ```text
//! version u8 | core u8 | level u8 | task [u8; 16] | tag [u8; 32]
//! | timestamp_ms u64 | payload_len u32 | payload
//! ```

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::record::{Level, LogRecord, Tag, TaskName, MAX_PAYLOAD, TAG_LEN, TASK_NAME_LEN};

pub const VERSION: u8 = 1;
/// Datagrams are cut to this size before sending.
pub const MAX_DATAGRAM: usize = 1400;
pub const WIRE_HEADER_LEN: usize = 3 + TASK_NAME_LEN + TAG_LEN + 8 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    TooShort { len: usize },
    UnsupportedVersion(u8),
    EmptyPayload,
}

impl WireError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "TOO_SHORT",
            Self::UnsupportedVersion(_) => "UNSUPPORTED_VERSION",
            Self::EmptyPayload => "EMPTY_PAYLOAD",
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => {
                write!(f, "{}: {len} bytes, header needs {WIRE_HEADER_LEN}", self.as_str())
            }
            Self::UnsupportedVersion(v) => write!(f, "{}: version {v}", self.as_str()),
            Self::EmptyPayload => write!(f, "{}: datagram carries no payload", self.as_str()),
        }
    }
}

impl std::error::Error for WireError {}

pub fn encode(record: &LogRecord) -> Bytes {
    let mut buf = BytesMut::with_capacity(WIRE_HEADER_LEN + record.payload.len());
    buf.put_u8(VERSION);
    buf.put_u8(record.core_id);
    buf.put_u8(record.level as u8);
    buf.put_slice(record.task.raw());
    buf.put_slice(record.tag.raw());
    buf.put_u64_le(record.timestamp_ms);
    buf.put_u32_le(u32::try_from(record.payload.len()).unwrap_or(u32::MAX));
    buf.put_slice(&record.payload);
    buf.truncate(MAX_DATAGRAM);
    buf.freeze()
}

/// Decode one datagram. The payload is clamped to the bytes actually
/// received and to [`MAX_PAYLOAD`]; the record carries no sequence yet.
pub fn decode(datagram: &[u8]) -> Result<LogRecord, WireError> {
    if datagram.len() < WIRE_HEADER_LEN {
        return Err(WireError::TooShort { len: datagram.len() });
    }
    let mut cur = datagram;
    let version = cur.get_u8();
    if version != VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    let core_id = cur.get_u8();
    let level = Level::from_u8(cur.get_u8());
    let task = TaskName::from_bytes(&cur[..TASK_NAME_LEN]);
    cur.advance(TASK_NAME_LEN);
    let tag = Tag::from_bytes(&cur[..TAG_LEN]);
    cur.advance(TAG_LEN);
    let timestamp_ms = cur.get_u64_le();
    let declared = cur.get_u32_le() as usize;

    let len = declared.min(cur.len()).min(MAX_PAYLOAD);
    if len == 0 {
        return Err(WireError::EmptyPayload);
    }
    Ok(LogRecord {
        sequence: 0,
        core_id,
        level,
        timestamp_ms,
        task,
        tag,
        payload: Bytes::copy_from_slice(&cur[..len]),
    })
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
