// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use clap::Parser;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use logring::capture::CaptureLayer;
use logring::config::Config;
use logring::console::Console;
use logring::print::ConsoleSink;
use logring::sink::{Dispatcher, LogSink};
use logring::store::LogStore;
use logring::transport::{server, ForwardFormat, UdpForwarder};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    let dispatcher = Arc::new(Dispatcher::new());
    init_tracing(&config, Arc::clone(&dispatcher));

    // Exit explicitly: a pending stdin read would otherwise hold the runtime open.
    match run(config, dispatcher).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config, dispatcher: Arc<Dispatcher>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter, Layer};

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let capture = CaptureLayer::new(dispatcher, config.core_id)
        .with_max_level(config.capture_level().unwrap_or_default());
    let registry = tracing_subscriber::registry().with(capture);

    // Our own diagnostics go to stderr so stdout stays the console.
    match config.log_format.as_str() {
        "json" => {
            let output = fmt::layer().json().with_writer(std::io::stderr).with_filter(filter);
            registry.with(output).init();
        }
        _ => {
            let output = fmt::layer().with_writer(std::io::stderr).with_filter(filter);
            registry.with(output).init();
        }
    }
}

async fn run(config: Config, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    let store = Arc::new(LogStore::new(config.store_config()));
    dispatcher.register(Arc::clone(&store) as Arc<dyn LogSink>)?;

    if config.echo {
        dispatcher.register(Arc::new(ConsoleSink::new(std::io::stdout(), true)))?;
    }

    for (target, format) in [
        (config.forward, ForwardFormat::Stream),
        (config.syslog, ForwardFormat::Syslog),
    ] {
        let Some(target) = target else {
            continue;
        };
        let (forwarder, handle) = UdpForwarder::start(target, format, shutdown.clone()).await?;
        dispatcher.register(forwarder)?;
        tasks.push(handle);
    }

    if let Some(addr) = config.listen {
        let socket = server::bind(addr).await?;
        tasks.push(tokio::spawn(server::run(socket, Arc::clone(&dispatcher), shutdown.clone())));
    }

    {
        let sd = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received SIGINT");
                sd.cancel();
            }
        });
    }

    info!(capacity = store.capacity(), sinks = ?dispatcher.names(), "log store ready");

    if config.no_console {
        shutdown.cancelled().await;
    } else {
        let console = Console::new(Arc::clone(&store), Arc::clone(&dispatcher), config.core_id);
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        console.run(input, &mut std::io::stdout(), shutdown.clone()).await?;
    }

    shutdown.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            error!("task failed: {e}");
        }
    }
    Ok(())
}
