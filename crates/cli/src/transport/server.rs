// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Receiving logstream datagrams from remote producers.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::sink::Dispatcher;
use crate::transport::wire;

pub async fn bind(addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = UdpSocket::bind(addr).await?;
    info!("log stream listening on {}", socket.local_addr()?);
    Ok(socket)
}

/// Decode every datagram arriving on `socket` and dispatch it, until
/// `shutdown` is cancelled. Malformed datagrams are logged and dropped.
pub async fn run(socket: UdpSocket, dispatcher: Arc<Dispatcher>, shutdown: CancellationToken) {
    let mut buf = vec![0u8; wire::MAX_DATAGRAM];
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => {
                match received {
                    Ok((n, peer)) => receive(&dispatcher, &buf[..n], peer),
                    Err(e) => warn!("log stream recv failed: {e}"),
                }
            }
        }
    }
}

fn receive(dispatcher: &Dispatcher, datagram: &[u8], peer: SocketAddr) {
    match wire::decode(datagram) {
        Ok(record) => dispatcher.dispatch(&record),
        Err(e) => warn!(%peer, "dropping log datagram: {e}"),
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
