// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::RingError;

/// Fixed-capacity circular byte buffer.
///
/// Bytes are appended after the last used byte and consumed from `read_pos`.
/// Any logical run may cross the physical end of the arena, so every read
/// and write splits into at most two copies.
///
/// An optional marker caps how many of the used bytes are visible to
/// readers. It is set to the current `used` count by [`RingBuffer::mark`],
/// shrinks as bytes are consumed, and clears itself once exhausted. Bytes
/// pushed after the mark stay invisible until then.
#[derive(Debug)]
pub struct RingBuffer {
    buf: Vec<u8>,
    read_pos: usize,
    used: usize,
    marker: Option<usize>,
}

impl RingBuffer {
    /// Create an empty ring buffer over an arena of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self { buf: vec![0u8; capacity], read_pos: 0, used: 0, marker: None }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn free_bytes(&self) -> usize {
        self.capacity() - self.used
    }

    /// Bytes readers may currently see: all used bytes, or the marker's
    /// remaining budget when one is set.
    pub fn visible(&self) -> usize {
        match self.marker {
            Some(left) => left.min(self.used),
            None => self.used,
        }
    }

    /// Physical index of the byte `offset` positions after `read_pos`.
    fn wrap(&self, offset: usize) -> usize {
        let pos = self.read_pos + offset;
        if pos >= self.capacity() {
            pos - self.capacity()
        } else {
            pos
        }
    }

    fn write_pos(&self) -> usize {
        self.wrap(self.used)
    }

    /// Copy as much of `data` as fits. Returns the number of bytes written;
    /// anything past the free space is silently dropped.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.free_bytes());
        if n == 0 {
            return 0;
        }
        let start = self.write_pos();
        let first = n.min(self.capacity() - start);
        self.buf[start..start + first].copy_from_slice(&data[..first]);
        self.buf[..n - first].copy_from_slice(&data[first..n]);
        self.used += n;
        n
    }

    /// Write `data` only if all of it fits. Returns `data.len()` on success
    /// and 0 otherwise.
    pub fn push_all(&mut self, data: &[u8]) -> usize {
        if self.free_bytes() < data.len() {
            return 0;
        }
        let mut written = 0;
        while written < data.len() {
            let dst = self.push_ptr();
            if dst.is_empty() {
                return written;
            }
            let n = dst.len().min(data.len() - written);
            dst[..n].copy_from_slice(&data[written..written + n]);
            if self.push_ptr_commit(n).is_err() {
                return written;
            }
            written += n;
        }
        written
    }

    /// Borrow up to `len` visible bytes starting `offset` bytes after the
    /// read position, as a contiguous head and a wrapped tail.
    pub fn peek_pair(&self, offset: usize, len: usize) -> (&[u8], &[u8]) {
        let visible = self.visible();
        if offset >= visible {
            return (&[], &[]);
        }
        let len = len.min(visible - offset);
        let start = self.wrap(offset);
        let first = len.min(self.capacity() - start);
        (&self.buf[start..start + first], &self.buf[..len - first])
    }

    /// Copy visible bytes starting at `offset` into `out` without consuming
    /// them. Returns 0 when `offset` is past the visible data.
    pub fn peek(&self, out: &mut [u8], offset: usize) -> usize {
        let (head, tail) = self.peek_pair(offset, out.len());
        out[..head.len()].copy_from_slice(head);
        out[head.len()..head.len() + tail.len()].copy_from_slice(tail);
        head.len() + tail.len()
    }

    /// Copy visible bytes into `out` and consume them.
    pub fn pull(&mut self, out: &mut [u8]) -> usize {
        let n = self.peek(out, 0);
        self.consume(n);
        n
    }

    /// Borrow the contiguous visible run at the read position. The run stops
    /// at the physical end of the arena.
    pub fn pull_ptr(&self) -> &[u8] {
        self.peek_pair(0, self.visible()).0
    }

    /// Borrow every visible byte as up to two slices in logical order.
    pub fn pull_ptr_pair(&self) -> (&[u8], &[u8]) {
        self.peek_pair(0, self.visible())
    }

    /// Consume `n` bytes that were read in place.
    pub fn pull_ptr_commit(&mut self, n: usize) -> Result<(), RingError> {
        if n > self.used {
            return Err(RingError::PullOvercommit { requested: n, used: self.used });
        }
        self.consume(n);
        Ok(())
    }

    /// Borrow the next writable contiguous run. Bytes written here become
    /// part of the buffer only after [`RingBuffer::push_ptr_commit`].
    pub fn push_ptr(&mut self) -> &mut [u8] {
        let start = self.write_pos();
        let len = (self.capacity() - start).min(self.free_bytes());
        &mut self.buf[start..start + len]
    }

    /// Account for `n` bytes written through [`RingBuffer::push_ptr`].
    pub fn push_ptr_commit(&mut self, n: usize) -> Result<(), RingError> {
        if self.used + n > self.capacity() {
            return Err(RingError::PushOvercommit { requested: n, free: self.free_bytes() });
        }
        self.used += n;
        Ok(())
    }

    fn consume(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        self.read_pos = self.wrap(n);
        self.used -= n;
        if let Some(left) = self.marker {
            self.marker = left.checked_sub(n).filter(|&l| l > 0);
        }
    }

    /// Snapshot the bytes written so far. Returns `false` if a marker is
    /// already outstanding. Marking an empty buffer leaves nothing to
    /// consume, so no marker remains afterwards.
    pub fn mark(&mut self) -> bool {
        if self.marker.is_some() {
            return false;
        }
        if self.used > 0 {
            self.marker = Some(self.used);
        }
        true
    }

    pub fn unmark(&mut self) {
        self.marker = None;
    }

    pub fn is_marked(&self) -> bool {
        self.marker.is_some()
    }

    /// Bytes left before the marker is exhausted.
    pub fn marker_remaining(&self) -> Option<usize> {
        self.marker
    }

    /// Drop buffered bytes.
    ///
    /// With `keep_marker` and an outstanding marker, only the snapshot bytes
    /// are dropped and everything pushed after the mark becomes the new
    /// content. Otherwise the buffer is emptied and the marker discarded.
    pub fn clear(&mut self, keep_marker: bool) {
        match self.marker {
            Some(left) if keep_marker => {
                self.consume(left.min(self.used));
                self.marker = None;
            }
            _ => {
                self.read_pos = 0;
                self.used = 0;
                self.marker = None;
            }
        }
    }
}

#[cfg(test)]
#[path = "ring_tests.rs"]
mod tests;
