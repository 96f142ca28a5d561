// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ring-backed log record store.
//!
//! Each record is framed as `[RecordHeader][payload]` inside one
//! [`RingBuffer`]. When a new frame does not fit, whole frames are evicted
//! from the front until it does. Consumers either drain with
//! [`LogStore::pull`] or scan forward with [`LogStore::peek`], passing back
//! the last sequence they saw.
//!
//! All state sits behind one mutex taken with a bounded timeout. A push that
//! cannot get the lock in time fails with [`StoreError::Busy`]; reads that
//! time out report nothing available.

use std::fmt;
use std::time::Duration;

use bytes::BytesMut;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, error, trace};

use crate::error::StoreError;
use crate::record::{LogRecord, RecordHeader, HEADER_LEN, MAX_PAYLOAD};
use crate::ring::RingBuffer;
use crate::sink::LogSink;

/// Tuning for a [`LogStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Arena size in bytes, headers included.
    pub capacity: usize,
    /// How long an operation waits for the store lock.
    pub lock_timeout: Duration,
    /// Remember where the last peeked record starts so a forward scan does
    /// not restart from the oldest record on every call.
    pub cursor_cache: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { capacity: 16 * 1024, lock_timeout: Duration::from_millis(250), cursor_cache: true }
    }
}

/// Snapshot of store occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub capacity_bytes: usize,
    pub used_bytes: usize,
    pub record_count: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Log buffer max size: {} bytes.", self.capacity_bytes)?;
        writeln!(f, "Log buffer current size: {} bytes.", self.used_bytes)?;
        writeln!(f, "Log buffer current size: {} entries.", self.record_count)
    }
}

/// Byte offset (from the oldest stored byte) at which `sequence` begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanCursor {
    sequence: u32,
    offset: usize,
}

#[derive(Debug)]
struct Inner {
    ring: RingBuffer,
    next_sequence: u32,
    cursor: Option<ScanCursor>,
}

/// Fixed-capacity, thread-safe store of framed log records.
#[derive(Debug)]
pub struct LogStore {
    inner: Mutex<Inner>,
    capacity: usize,
    lock_timeout: Duration,
    cursor_cache: bool,
}

impl LogStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: RingBuffer::new(config.capacity),
                next_sequence: 1,
                cursor: None,
            }),
            capacity: config.capacity,
            lock_timeout: config.lock_timeout,
            cursor_cache: config.cursor_cache,
        }
    }

    /// Store with the default timeout and cache settings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(StoreConfig { capacity, ..StoreConfig::default() })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> Option<MutexGuard<'_, Inner>> {
        self.inner.try_lock_for(self.lock_timeout)
    }

    /// Hold the store lock until the guard drops.
    #[cfg(test)]
    pub(crate) fn hold_lock(&self) -> impl Sized + '_ {
        self.inner.lock()
    }

    /// Append a record, evicting the oldest records as needed. Returns the
    /// sequence number assigned to it.
    pub fn push(&self, record: &LogRecord) -> Result<u32, StoreError> {
        let len = record.payload.len();
        if len == 0 {
            return Err(StoreError::EmptyPayload);
        }
        if len > MAX_PAYLOAD {
            return Err(StoreError::PayloadTooLarge { len, max: MAX_PAYLOAD });
        }
        let framed = record.framed_len();
        if framed > self.capacity {
            return Err(StoreError::TooLarge { framed, capacity: self.capacity });
        }

        let Some(mut inner) = self.lock() else {
            return Err(StoreError::Busy);
        };
        let sequence = inner.next_sequence();
        let evicted = inner.make_room(framed)?;

        let header = RecordHeader::for_record(record, sequence).encode();
        if inner.ring.push(&header) != HEADER_LEN {
            return Err(StoreError::Invariant(format!("header write for {sequence} truncated")));
        }
        if inner.ring.push(&record.payload) != len {
            return Err(StoreError::Invariant(format!("payload write for {sequence} truncated")));
        }
        drop(inner);

        if evicted > 0 {
            debug!(sequence, evicted, "evicted oldest log records");
        }
        Ok(sequence)
    }

    /// Remove and return the oldest record.
    pub fn pull(&self) -> Result<Option<LogRecord>, StoreError> {
        let Some(mut inner) = self.lock() else {
            return Ok(None);
        };
        inner.pull()
    }

    /// Return the oldest record whose sequence is greater than `cursor`
    /// without removing it. Start a scan from 0 and pass back each returned
    /// sequence to walk every stored record once.
    pub fn peek(&self, cursor: u32) -> Result<Option<LogRecord>, StoreError> {
        let Some(mut inner) = self.lock() else {
            return Ok(None);
        };
        inner.peek(cursor, self.cursor_cache)
    }

    /// Count stored frames. Walks the whole buffer, so keep it off hot paths.
    pub fn stats(&self) -> Option<StoreStats> {
        let inner = self.lock()?;
        let mut stats =
            StoreStats { capacity_bytes: self.capacity, used_bytes: 0, record_count: 0 };
        loop {
            let (head, tail) = inner.ring.peek_pair(stats.used_bytes, HEADER_LEN);
            let Some(header) = RecordHeader::decode_split(head, tail) else {
                break;
            };
            stats.used_bytes += header.frame_len();
            stats.record_count += 1;
        }
        Some(stats)
    }

    /// Drop every stored record. Returns `false` if the lock timed out.
    pub fn clear(&self) -> bool {
        let Some(mut inner) = self.lock() else {
            return false;
        };
        inner.ring.clear(false);
        inner.cursor = None;
        true
    }
}

impl Inner {
    /// Sequence 0 is never handed out so a scan from 0 sees every record.
    fn next_sequence(&mut self) -> u32 {
        let sequence = self.next_sequence;
        self.next_sequence = sequence.wrapping_add(1).max(1);
        sequence
    }

    /// Evict whole frames from the front until `framed` bytes are free.
    fn make_room(&mut self, framed: usize) -> Result<usize, StoreError> {
        let mut evicted = 0;
        while self.ring.free_bytes() < framed {
            let (head, tail) = self.ring.pull_ptr_pair();
            let Some(header) = RecordHeader::decode_split(head, tail) else {
                return Err(StoreError::Invariant(format!(
                    "{} bytes stored without a frame header",
                    self.ring.used()
                )));
            };
            self.ring.pull_ptr_commit(header.frame_len())?;
            evicted += 1;
        }
        if evicted > 0 {
            self.cursor = None;
        }
        Ok(evicted)
    }

    fn pull(&mut self) -> Result<Option<LogRecord>, StoreError> {
        let mut raw = [0u8; HEADER_LEN];
        let n = self.ring.pull(&mut raw);
        if n == 0 {
            return Ok(None);
        }
        let header = RecordHeader::decode(&raw[..n])
            .ok_or_else(|| StoreError::Invariant(format!("truncated header of {n} bytes")))?;
        check_payload_len(&header)?;

        let len = header.payload_len as usize;
        let mut payload = BytesMut::zeroed(len);
        if self.ring.pull(&mut payload) != len {
            return Err(StoreError::Invariant(format!(
                "payload of record {} truncated",
                header.sequence
            )));
        }
        self.cursor = None;
        Ok(Some(header.into_record(payload.freeze())))
    }

    fn peek(&mut self, cursor: u32, use_cache: bool) -> Result<Option<LogRecord>, StoreError> {
        let mut offset = match self.cursor {
            Some(c) if use_cache && c.sequence == cursor => c.offset,
            _ => 0,
        };

        loop {
            let (head, tail) = self.ring.peek_pair(offset, HEADER_LEN);
            let available = head.len() + tail.len();
            if available == 0 {
                return Ok(None);
            }
            let Some(header) = RecordHeader::decode_split(head, tail) else {
                return Err(StoreError::Invariant(format!(
                    "truncated header of {available} bytes at offset {offset}"
                )));
            };
            check_payload_len(&header)?;

            if use_cache {
                self.cursor = Some(ScanCursor { sequence: header.sequence, offset });
            }

            if header.sequence > cursor {
                let len = header.payload_len as usize;
                let (head, tail) = self.ring.peek_pair(offset + HEADER_LEN, len);
                if head.len() + tail.len() != len {
                    return Err(StoreError::Invariant(format!(
                        "payload of record {} truncated",
                        header.sequence
                    )));
                }
                let mut payload = BytesMut::with_capacity(len);
                payload.extend_from_slice(head);
                payload.extend_from_slice(tail);
                return Ok(Some(header.into_record(payload.freeze())));
            }
            offset += header.frame_len();
        }
    }
}

fn check_payload_len(header: &RecordHeader) -> Result<(), StoreError> {
    let len = header.payload_len as usize;
    if len == 0 || len > MAX_PAYLOAD {
        return Err(StoreError::Invariant(format!(
            "record {} declares payload of {len} bytes",
            header.sequence
        )));
    }
    Ok(())
}

impl LogSink for LogStore {
    fn name(&self) -> &str {
        "buffer"
    }

    fn accept(&self, record: &LogRecord) {
        match self.push(record) {
            Ok(_) => {}
            Err(e) if e.is_invariant() => {
                error!("log store corrupted: {e}");
                std::process::abort();
            }
            Err(e) => trace!("log record dropped: {e}"),
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
