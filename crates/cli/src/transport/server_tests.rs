// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::record::Level;
use crate::sink::{Dispatcher, LogSink};
use crate::test_support::{record, MemorySink};
use crate::transport::wire;

use super::{bind, run};

/// Poll `sink` until it holds `n` records or a few seconds pass.
async fn wait_for(sink: &MemorySink, n: usize) -> anyhow::Result<()> {
    for _ in 0..200 {
        if sink.records().len() >= n {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("timed out waiting for {n} records, have {}", sink.records().len())
}

#[tokio::test]
async fn valid_datagrams_are_dispatched_and_bad_ones_dropped() -> anyhow::Result<()> {
    let socket = bind("127.0.0.1:0".parse()?).await?;
    let addr = socket.local_addr()?;
    let sink = MemorySink::new("mem");
    let dispatcher = Arc::new(Dispatcher::new());
    dispatcher.register(Arc::clone(&sink) as Arc<dyn LogSink>)?;

    let shutdown = CancellationToken::new();
    let server = tokio::spawn(run(socket, Arc::clone(&dispatcher), shutdown.clone()));

    let client = UdpSocket::bind("127.0.0.1:0").await?;
    client.send_to(b"garbage", addr).await?;
    let mut wrong_version = wire::encode(&record(Level::Info, "t", "v2")).to_vec();
    wrong_version[0] = 9;
    client.send_to(&wrong_version, addr).await?;
    client.send_to(&wire::encode(&record(Level::Error, "remote", "hello")), addr).await?;

    wait_for(&sink, 1).await?;
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload_str(), "hello");
    assert_eq!(records[0].tag.as_str(), "remote");
    assert_eq!(records[0].level, Level::Error);

    shutdown.cancel();
    server.await?;
    Ok(())
}

#[tokio::test]
async fn stops_on_cancel() -> anyhow::Result<()> {
    let socket = bind("127.0.0.1:0".parse()?).await?;
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    tokio::time::timeout(
        Duration::from_secs(5),
        run(socket, Arc::new(Dispatcher::new()), shutdown),
    )
    .await?;
    Ok(())
}
