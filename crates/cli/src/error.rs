// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Misuse of the zero-copy commit calls on a [`crate::ring::RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    /// More bytes committed as consumed than the buffer holds.
    PullOvercommit { requested: usize, used: usize },
    /// More bytes committed as written than the buffer has free.
    PushOvercommit { requested: usize, free: usize },
}

impl RingError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullOvercommit { .. } => "PULL_OVERCOMMIT",
            Self::PushOvercommit { .. } => "PUSH_OVERCOMMIT",
        }
    }
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PullOvercommit { requested, used } => {
                write!(f, "{}: pulled {requested} bytes with {used} in use", self.as_str())
            }
            Self::PushOvercommit { requested, free } => {
                write!(f, "{}: pushed {requested} bytes with {free} free", self.as_str())
            }
        }
    }
}

impl std::error::Error for RingError {}

/// Errors from [`crate::store::LogStore`].
///
/// Everything except [`StoreError::Invariant`] is an expected runtime
/// outcome. `Invariant` means the store's own framing is broken and the
/// process cannot continue safely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store lock could not be taken within the configured timeout.
    Busy,
    /// Records must carry at least one payload byte.
    EmptyPayload,
    /// Payload longer than [`crate::record::MAX_PAYLOAD`].
    PayloadTooLarge { len: usize, max: usize },
    /// Header plus payload exceeds the whole arena.
    TooLarge { framed: usize, capacity: usize },
    /// Internal framing violation.
    Invariant(String),
}

impl StoreError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "BUSY",
            Self::EmptyPayload => "EMPTY_PAYLOAD",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::TooLarge { .. } => "TOO_LARGE",
            Self::Invariant(_) => "INVARIANT",
        }
    }

    /// True when the error indicates corrupted store state.
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("BUSY: store lock timed out"),
            Self::EmptyPayload => f.write_str("EMPTY_PAYLOAD: record has no payload"),
            Self::PayloadTooLarge { len, max } => {
                write!(f, "PAYLOAD_TOO_LARGE: {len} bytes exceeds {max}")
            }
            Self::TooLarge { framed, capacity } => {
                write!(f, "TOO_LARGE: frame of {framed} bytes exceeds capacity {capacity}")
            }
            Self::Invariant(detail) => write!(f, "INVARIANT: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<RingError> for StoreError {
    fn from(e: RingError) -> Self {
        Self::Invariant(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
