// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal syslog datagrams: `<level>message`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::record::LogRecord;

/// Largest syslog datagram sent.
pub const MAX_SYSLOG: usize = 256;

/// The priority field carries the record's numeric level, not a full
/// facility/severity pair.
pub fn encode(record: &LogRecord) -> Bytes {
    let prefix = format!("<{}>", record.level as u8);
    let mut buf = BytesMut::with_capacity(MAX_SYSLOG);
    buf.put_slice(prefix.as_bytes());
    buf.put_slice(&record.payload);
    buf.truncate(MAX_SYSLOG);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use crate::record::{Level, LogRecord};

    use super::{encode, MAX_SYSLOG};

    #[yare::parameterized(
        error   = { Level::Error, "<1>boom" },
        info    = { Level::Info, "<3>boom" },
        verbose = { Level::Verbose, "<5>boom" },
    )]
    fn priority_prefix(level: Level, expected: &str) {
        let bytes = encode(&LogRecord::new(level, "t", "boom"));
        assert_eq!(&bytes[..], expected.as_bytes());
    }

    #[test]
    fn long_messages_truncated() {
        let bytes = encode(&LogRecord::new(Level::Info, "t", vec![b'a'; 400]));
        assert_eq!(bytes.len(), MAX_SYSLOG);
        assert!(bytes.starts_with(b"<3>aaa"));
    }
}
