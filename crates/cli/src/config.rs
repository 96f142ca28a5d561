// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::record::{Level, HEADER_LEN, MAX_PAYLOAD};
use crate::store::StoreConfig;

/// In-memory log ring with a console, UDP ingest, and forwarding.
#[derive(Debug, Parser)]
#[command(name = "logring", version, about)]
pub struct Config {
    /// Log store size in bytes, record headers included.
    #[arg(long, env = "LOGRING_CAPACITY", default_value = "16384")]
    pub capacity: usize,

    /// How long store operations wait for the store lock, in milliseconds.
    #[arg(long, env = "LOGRING_LOCK_TIMEOUT_MS", default_value = "250")]
    pub lock_timeout_ms: u64,

    /// Receive logstream datagrams on this address.
    #[arg(long, env = "LOGRING_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Forward every record as logstream datagrams to this address.
    #[arg(long, env = "LOGRING_FORWARD")]
    pub forward: Option<SocketAddr>,

    /// Forward every record as syslog datagrams to this address.
    #[arg(long, env = "LOGRING_SYSLOG")]
    pub syslog: Option<SocketAddr>,

    /// Print every record to stdout as it arrives.
    #[arg(long, env = "LOGRING_ECHO")]
    pub echo: bool,

    /// Do not read console commands from stdin; run until interrupted.
    #[arg(long, env = "LOGRING_NO_CONSOLE")]
    pub no_console: bool,

    /// Core id stamped on records produced by this process.
    #[arg(long, env = "LOGRING_CORE_ID", default_value = "0")]
    pub core_id: u8,

    /// Most verbose level of this process's own events copied into the store
    /// (none, error, warn, info, debug, verbose).
    #[arg(long, env = "LOGRING_CAPTURE_LEVEL", default_value = "info")]
    pub capture_level: String,

    /// Log format (json or text).
    #[arg(long, env = "LOGRING_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOGRING_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        let smallest = HEADER_LEN + MAX_PAYLOAD;
        if self.capacity < smallest {
            anyhow::bail!("--capacity must be at least {smallest} bytes to hold one full record");
        }
        if self.lock_timeout_ms == 0 {
            anyhow::bail!("--lock-timeout-ms must be greater than zero");
        }
        if !matches!(self.log_format.as_str(), "json" | "text") {
            anyhow::bail!("invalid log format: {}", self.log_format);
        }
        self.capture_level()?;
        if self.no_console && self.listen.is_none() {
            anyhow::bail!("--no-console needs --listen, otherwise nothing can produce records");
        }
        Ok(())
    }

    pub fn capture_level(&self) -> anyhow::Result<Level> {
        self.capture_level.parse()
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            capacity: self.capacity,
            lock_timeout: self.lock_timeout(),
            ..StoreConfig::default()
        }
    }

    /// Build a minimal `Config` for tests.
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            capacity: 4096,
            lock_timeout_ms: 50,
            listen: None,
            forward: None,
            syslog: None,
            echo: false,
            no_console: false,
            core_id: 0,
            capture_level: "info".into(),
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
