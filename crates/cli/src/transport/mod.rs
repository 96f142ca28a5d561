// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Moving log records between processes over UDP.
//!
//! - [`wire`]: the binary logstream datagram.
//! - [`syslog`]: minimal `<level>message` datagrams.
//! - [`forward`]: a sink that ships records to a remote collector.
//! - [`server`]: receives logstream datagrams and dispatches them locally.

pub mod forward;
pub mod server;
pub mod syslog;
pub mod wire;

pub use forward::{ForwardFormat, UdpForwarder};
