// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    busy = { StoreError::Busy, "BUSY" },
    empty = { StoreError::EmptyPayload, "EMPTY_PAYLOAD" },
    payload = { StoreError::PayloadTooLarge { len: 300, max: 256 }, "PAYLOAD_TOO_LARGE" },
    too_large = { StoreError::TooLarge { framed: 90, capacity: 64 }, "TOO_LARGE" },
    invariant = { StoreError::Invariant("bad frame".into()), "INVARIANT" },
)]
fn store_error_codes(err: StoreError, code: &str) {
    assert_eq!(err.as_str(), code);
    assert!(err.to_string().starts_with(code));
}

#[test]
fn only_invariant_is_fatal() {
    assert!(StoreError::Invariant("x".into()).is_invariant());
    assert!(!StoreError::Busy.is_invariant());
    assert!(!StoreError::TooLarge { framed: 1, capacity: 0 }.is_invariant());
}

#[test]
fn ring_error_becomes_invariant() {
    let err: StoreError = RingError::PullOvercommit { requested: 9, used: 3 }.into();
    assert!(err.is_invariant());
    assert!(err.to_string().contains("pulled 9 bytes with 3 in use"));
}
