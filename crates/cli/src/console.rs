// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented operator console.

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::capture::{append_capped, LineAssembler};
use crate::dmesg::{self, DmesgArgs};
use crate::record::{Level, LogRecord};
use crate::sink::Dispatcher;
use crate::store::LogStore;

/// Producer name for text typed at the console.
pub const PRODUCER: &str = "console";

const HELP: &str = "\
commands:
  dmesg [-c] [-o] [-p] [-s] [--json]   print the log buffer (dmesg --help for details)
  log <tag> <level> <message>          add a record
  help                                 show this text
any other line is stored as an info record from the console
";

pub struct Console {
    store: Arc<LogStore>,
    dispatcher: Arc<Dispatcher>,
    assembler: LineAssembler,
    core_id: u8,
}

impl Console {
    pub fn new(store: Arc<LogStore>, dispatcher: Arc<Dispatcher>, core_id: u8) -> Self {
        Self { store, dispatcher, assembler: LineAssembler::new(core_id), core_id }
    }

    /// Run one console line.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first().copied() {
            None => Ok(()),
            Some("dmesg") => {
                let args = match DmesgArgs::try_parse_from(words.iter().copied()) {
                    Ok(args) => args,
                    Err(e) => {
                        write!(out, "{}", e.render())?;
                        return Ok(());
                    }
                };
                dmesg::run(&self.store, &args, out)?;
                Ok(())
            }
            Some("log") => {
                let [_, tag, level, message @ ..] = words.as_slice() else {
                    anyhow::bail!("usage: log <tag> <level> <message>");
                };
                if message.is_empty() {
                    anyhow::bail!("usage: log <tag> <level> <message>");
                }
                let level: Level = level.parse()?;
                let mut payload = Vec::new();
                append_capped(&mut payload, message.join(" ").as_bytes());
                let record = LogRecord::new(level, tag, payload)
                    .with_task(PRODUCER)
                    .with_core(self.core_id);
                self.dispatcher.dispatch(&record);
                Ok(())
            }
            Some("help") => {
                out.write_all(HELP.as_bytes())?;
                Ok(())
            }
            Some(_) => {
                if let Some(record) = self.assembler.write(PRODUCER, &format!("{line}\n")) {
                    self.dispatcher.dispatch(&record);
                }
                Ok(())
            }
        }
    }

    /// Execute lines from `input` until it ends or `shutdown` is cancelled.
    /// Command errors are reported on `out` and do not stop the loop.
    pub async fn run<R>(
        mut self,
        input: R,
        out: &mut impl Write,
        shutdown: CancellationToken,
    ) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => break,
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                debug!("console input closed");
                break;
            };
            if let Err(e) = self.execute(&line, out) {
                writeln!(out, "error: {e:#}")?;
            }
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod tests;
