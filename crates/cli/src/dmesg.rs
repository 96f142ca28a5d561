// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `dmesg` console command: inspect the log store.

use std::io::Write;

use clap::Parser;

use crate::print::{format_color, format_plain, RecordView};
use crate::record::LogRecord;
use crate::store::LogStore;

/// Print the log buffer.
#[derive(Debug, Default, Clone, Parser)]
#[command(name = "dmesg")]
pub struct DmesgArgs {
    /// Clear the buffer while printing it.
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Colour the output.
    #[arg(short = 'o', long)]
    pub color: bool,

    /// Empty the buffer without printing.
    #[arg(short = 'p', long)]
    pub purge: bool,

    /// Print buffer occupancy.
    #[arg(short = 's', long)]
    pub stats: bool,

    /// One JSON object per record.
    #[arg(long, conflicts_with = "color")]
    pub json: bool,
}

/// Run `dmesg` against `store`, writing to `out`. Returns how many records
/// were printed.
///
/// `--purge` wins over `--stats`, which wins over `--clear`. Without flags
/// the buffer is printed oldest first and left untouched.
pub fn run(store: &LogStore, args: &DmesgArgs, out: &mut impl Write) -> anyhow::Result<usize> {
    if args.purge {
        if !store.clear() {
            anyhow::bail!("log store busy");
        }
        return Ok(0);
    }

    if args.stats {
        let stats = store.stats().ok_or_else(|| anyhow::anyhow!("log store busy"))?;
        write!(out, "{stats}")?;
        return Ok(0);
    }

    let mut printed = 0;
    if args.clear {
        while let Some(record) = store.pull()? {
            print_record(out, args, &record)?;
            printed += 1;
        }
    } else {
        let mut cursor = 0;
        while let Some(record) = store.peek(cursor)? {
            cursor = record.sequence;
            print_record(out, args, &record)?;
            printed += 1;
        }
    }
    out.flush()?;
    Ok(printed)
}

fn print_record(out: &mut impl Write, args: &DmesgArgs, record: &LogRecord) -> anyhow::Result<()> {
    if args.json {
        serde_json::to_writer(&mut *out, &RecordView::from(record))?;
        writeln!(out)?;
    } else if args.color {
        writeln!(out, "{}", format_color(record))?;
    } else {
        writeln!(out, "{}", format_plain(record))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "dmesg_tests.rs"]
mod tests;
