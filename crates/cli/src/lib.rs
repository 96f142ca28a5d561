// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod capture;
pub mod config;
pub mod console;
pub mod dmesg;
pub mod error;
pub mod print;
pub mod record;
pub mod ring;
pub mod sink;
pub mod store;
pub mod test_support;
pub mod transport;
