// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A forwarder on one node feeding the logstream server of another.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use logring::record::{Level, LogRecord};
use logring::sink::LogSink;
use logring::store::LogStore;
use logring::test_support::{scan, StoreBuilder};
use logring::transport::{server, ForwardFormat, UdpForwarder};

async fn wait_for_records(store: &LogStore, n: usize) -> anyhow::Result<Vec<LogRecord>> {
    for _ in 0..300 {
        let records = scan(store)?;
        if records.len() >= n {
            return Ok(records);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("collector never received {n} records")
}

#[tokio::test]
async fn records_arrive_at_remote_store() -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    // Collector node.
    let (remote_store, remote_dispatcher) = StoreBuilder::new().build_with_dispatcher()?;
    let socket = server::bind("127.0.0.1:0".parse()?).await?;
    let remote_addr = socket.local_addr()?;
    let server_task =
        tokio::spawn(server::run(socket, Arc::clone(&remote_dispatcher), shutdown.clone()));

    // Producing node: local store plus a forwarder.
    let (local_store, local_dispatcher) = StoreBuilder::new().build_with_dispatcher()?;
    let (forwarder, forward_task) =
        UdpForwarder::start(remote_addr, ForwardFormat::Stream, shutdown.clone()).await?;
    local_dispatcher.register(Arc::clone(&forwarder) as Arc<dyn LogSink>)?;

    for (level, text) in [(Level::Info, "boot"), (Level::Warn, "low heap"), (Level::Error, "panic")] {
        let record = LogRecord::new(level, "node-a", text).with_task("main").with_core(1);
        local_dispatcher.dispatch(&record);
    }

    let received = wait_for_records(&remote_store, 3).await?;
    let local = scan(&local_store)?;
    assert_eq!(local.len(), 3);
    for (sent, got) in local.iter().zip(&received) {
        assert_eq!(got.payload, sent.payload);
        assert_eq!(got.level, sent.level);
        assert_eq!(got.tag, sent.tag);
        assert_eq!(got.task, sent.task);
        assert_eq!(got.core_id, sent.core_id);
        assert_eq!(got.timestamp_ms, sent.timestamp_ms);
    }
    // The collector numbers records itself.
    assert_eq!(received.iter().map(|r| r.sequence).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(forwarder.dropped(), 0);

    shutdown.cancel();
    server_task.await?;
    forward_task.await?;
    Ok(())
}
