// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::record::{Level, MAX_PAYLOAD};
use crate::sink::Dispatcher;
use crate::test_support::{scan, StoreBuilder};

use super::{Console, PRODUCER};

fn console() -> anyhow::Result<(Console, Arc<crate::store::LogStore>)> {
    let (store, dispatcher) = StoreBuilder::new().build_with_dispatcher()?;
    Ok((Console::new(Arc::clone(&store), dispatcher, 3), store))
}

fn exec(console: &mut Console, line: &str) -> anyhow::Result<String> {
    let mut out = Vec::new();
    console.execute(line, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn log_command_adds_record() -> anyhow::Result<()> {
    let (mut console, store) = console()?;
    exec(&mut console, "log wifi warn lost   beacon")?;
    let records = scan(&store)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag.as_str(), "wifi");
    assert_eq!(records[0].level, Level::Warn);
    assert_eq!(records[0].task.as_str(), PRODUCER);
    assert_eq!(records[0].core_id, 3);
    assert_eq!(records[0].payload_str(), "lost beacon");
    Ok(())
}

#[test]
fn long_log_message_is_truncated_not_dropped() -> anyhow::Result<()> {
    let (mut console, store) = console()?;
    let out = exec(&mut console, &format!("log net info {}", "x".repeat(300)))?;
    assert!(out.is_empty(), "{out}");
    let records = scan(&store)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].payload.len(), MAX_PAYLOAD);
    assert!(records[0].payload.ends_with(b"||"));
    assert!(records[0].payload[..MAX_PAYLOAD - 2].iter().all(|&b| b == b'x'));
    Ok(())
}

#[yare::parameterized(
    no_args    = { "log", "usage" },
    no_message = { "log wifi warn", "usage" },
    bad_level  = { "log wifi loud hello", "invalid log level" },
)]
fn log_command_errors(line: &str, expected: &str) {
    let store = StoreBuilder::new().build();
    let mut console = Console::new(store, Arc::new(Dispatcher::new()), 0);
    crate::assert_err_contains!(exec(&mut console, line), expected);
}

#[test]
fn dmesg_prints_buffer() -> anyhow::Result<()> {
    let (mut console, _store) = console()?;
    exec(&mut console, "log a i first")?;
    exec(&mut console, "log b e second")?;
    let text = exec(&mut console, "dmesg")?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("I 3 ") && lines[0].ends_with("a: first"));
    assert!(lines[1].starts_with("E 3 ") && lines[1].ends_with("b: second"));
    Ok(())
}

#[test]
fn dmesg_flags_are_passed_through() -> anyhow::Result<()> {
    let (mut console, store) = console()?;
    exec(&mut console, "log a i first")?;
    let stats = exec(&mut console, "dmesg -s")?;
    assert!(stats.contains("1 entries"));
    exec(&mut console, "dmesg -p")?;
    assert!(scan(&store)?.is_empty());
    Ok(())
}

#[test]
fn dmesg_bad_flag_prints_usage() -> anyhow::Result<()> {
    let (mut console, _store) = console()?;
    let text = exec(&mut console, "dmesg --bogus")?;
    assert!(text.contains("--bogus"), "{text}");
    Ok(())
}

#[test]
fn plain_text_is_captured() -> anyhow::Result<()> {
    let (mut console, store) = console()?;
    exec(&mut console, "hello there")?;
    exec(&mut console, "E (12) boot: failed to mount")?;
    let records = scan(&store)?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level, Level::Info);
    assert_eq!(records[0].tag.as_str(), PRODUCER);
    assert_eq!(records[0].payload_str(), "hello there");
    assert_eq!(records[1].level, Level::Error);
    assert_eq!(records[1].tag.as_str(), "boot");
    assert_eq!(records[1].payload_str(), "failed to mount");
    Ok(())
}

#[test]
fn help_and_blank_lines() -> anyhow::Result<()> {
    let (mut console, store) = console()?;
    assert!(exec(&mut console, "help")?.contains("dmesg"));
    assert_eq!(exec(&mut console, "   ")?, "");
    assert!(scan(&store)?.is_empty());
    Ok(())
}

#[tokio::test]
async fn run_reads_until_eof_and_reports_errors() -> anyhow::Result<()> {
    let (console, store) = console()?;
    let input: &[u8] = b"log t i one\nlog t nope two\n\ndmesg\n";
    let mut out = Vec::new();
    console.run(input, &mut out, CancellationToken::new()).await?;

    let text = String::from_utf8(out)?;
    assert!(text.contains("error: invalid log level: nope"), "{text}");
    assert!(text.lines().any(|l| l.ends_with("t: one")), "{text}");
    assert_eq!(scan(&store)?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn run_stops_on_cancel() -> anyhow::Result<()> {
    let (console, _store) = console()?;
    let (_writer, reader) = tokio::io::duplex(64);
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let mut out = Vec::new();
    console.run(tokio::io::BufReader::new(reader), &mut out, shutdown).await?;
    Ok(())
}
