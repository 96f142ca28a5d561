// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwarding records to a remote collector over UDP.
//!
//! [`UdpForwarder::accept`] runs on the producer's thread, so it only
//! encodes and queues. A tokio task owns the socket and does the sending.
//! When the queue is full the datagram is dropped and counted.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::transport::{syslog, wire};

/// Datagrams waiting for the sender task.
const QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardFormat {
    /// Binary logstream datagrams, readable by [`crate::transport::server`].
    Stream,
    Syslog,
}

impl ForwardFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Syslog => "syslog",
        }
    }

    fn encode(&self, record: &LogRecord) -> Bytes {
        match self {
            Self::Stream => wire::encode(record),
            Self::Syslog => syslog::encode(record),
        }
    }
}

pub struct UdpForwarder {
    name: String,
    format: ForwardFormat,
    tx: mpsc::Sender<Bytes>,
    dropped: AtomicU64,
}

impl UdpForwarder {
    /// Bind a local socket aimed at `target` and spawn the sender task. The
    /// task exits when `shutdown` is cancelled or the forwarder is dropped.
    pub async fn start(
        target: SocketAddr,
        format: ForwardFormat,
        shutdown: CancellationToken,
    ) -> anyhow::Result<(Arc<Self>, JoinHandle<()>)> {
        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;
        info!(%target, format = format.as_str(), "forwarding logs");

        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let handle = tokio::spawn(send_loop(socket, rx, shutdown));
        let forwarder = Arc::new(Self {
            name: format!("{}:{target}", format.as_str()),
            format,
            tx,
            dropped: AtomicU64::new(0),
        });
        Ok((forwarder, handle))
    }

    /// Datagrams discarded because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl LogSink for UdpForwarder {
    fn name(&self) -> &str {
        &self.name
    }

    fn accept(&self, record: &LogRecord) {
        if self.tx.try_send(self.format.encode(record)).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

async fn send_loop(socket: UdpSocket, mut rx: mpsc::Receiver<Bytes>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            datagram = rx.recv() => {
                let Some(datagram) = datagram else {
                    break;
                };
                // Stays at debug, below what the capture layer copies into sinks.
                if let Err(e) = socket.send(&datagram).await {
                    debug!("log forward failed: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
