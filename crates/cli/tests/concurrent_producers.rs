// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Many threads pushing into one store while another scans it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use logring::record::{Level, LogRecord};
use logring::store::{LogStore, StoreConfig};
use logring::test_support::{drain, scan};

const PRODUCERS: usize = 8;
const PER_PRODUCER: usize = 300;

fn store(capacity: usize) -> Arc<LogStore> {
    Arc::new(LogStore::new(StoreConfig {
        capacity,
        lock_timeout: Duration::from_secs(5),
        cursor_cache: true,
    }))
}

fn spawn_producers(store: &Arc<LogStore>) -> Vec<thread::JoinHandle<anyhow::Result<()>>> {
    (0..PRODUCERS)
        .map(|p| {
            let store = Arc::clone(store);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let record = LogRecord::new(Level::Info, "load", format!("{p}:{i}"))
                        .with_task(&format!("producer{p}"));
                    store.push(&record)?;
                }
                Ok(())
            })
        })
        .collect()
}

fn join_all(handles: Vec<thread::JoinHandle<anyhow::Result<()>>>) -> anyhow::Result<()> {
    for handle in handles {
        handle.join().map_err(|_| anyhow::anyhow!("producer panicked"))??;
    }
    Ok(())
}

/// Split `"p:i"` payloads.
fn origin(record: &LogRecord) -> anyhow::Result<(usize, usize)> {
    let text = record.payload_str();
    let (p, i) = text.split_once(':').ok_or_else(|| anyhow::anyhow!("bad payload {text}"))?;
    Ok((p.parse()?, i.parse()?))
}

#[test]
fn every_record_kept_when_capacity_allows() -> anyhow::Result<()> {
    let store = store(1 << 20);
    join_all(spawn_producers(&store))?;

    let records = drain(&store)?;
    assert_eq!(records.len(), PRODUCERS * PER_PRODUCER);
    assert!(records.windows(2).all(|w| w[0].sequence < w[1].sequence));

    // Each producer's records come out in the order it pushed them.
    let mut next: HashMap<usize, usize> = HashMap::new();
    for record in &records {
        let (p, i) = origin(record)?;
        let expected = next.entry(p).or_insert(0);
        assert_eq!(i, *expected, "producer {p} out of order");
        *expected += 1;
    }
    Ok(())
}

#[test]
fn scanning_while_evicting_stays_consistent() -> anyhow::Result<()> {
    let capacity = 4096;
    let store = store(capacity);
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || -> anyhow::Result<usize> {
            let mut scans = 0;
            while !done.load(Ordering::Relaxed) {
                let records = scan(&store)?;
                anyhow::ensure!(
                    records.windows(2).all(|w| w[0].sequence < w[1].sequence),
                    "scan went backwards"
                );
                if let Some(stats) = store.stats() {
                    anyhow::ensure!(stats.used_bytes <= capacity, "store overflowed");
                }
                scans += 1;
            }
            Ok(scans)
        })
    };

    let result = join_all(spawn_producers(&store));
    done.store(true, Ordering::Relaxed);
    result?;
    let scans = reader.join().map_err(|_| anyhow::anyhow!("reader panicked"))??;
    assert!(scans > 0);

    // Only the newest records survive, and the very last push is among them.
    let records = drain(&store)?;
    assert!(!records.is_empty());
    assert!(records.len() < PRODUCERS * PER_PRODUCER);
    let last = records.iter().map(|r| r.sequence).max();
    assert_eq!(last, Some((PRODUCERS * PER_PRODUCER) as u32));
    Ok(())
}
