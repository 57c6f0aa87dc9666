// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! Main cognito-local executable.
//!
//! Serves the emulated user pool API until interrupted.

use clap::Parser;
use color_eyre::eyre::{Report, Result};
use eyre::WrapErr;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};

use cognito_local::config::Config;
use cognito_local::server;
use cognito_local::services::Services;

/// Local emulator of the Cognito user pool API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the stores are written to. Overrides the config file.
    #[arg(long)]
    data_directory: Option<PathBuf>,

    /// Port to listen on. Overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    pub verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter = Targets::new().with_default(match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    });

    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(log_layer).init();

    let mut cfg = Config::new(args.config)?;
    if let Some(data_directory) = args.data_directory {
        cfg.storage.data_directory = data_directory;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    let services = Services::from_config(&cfg)
        .await
        .wrap_err("Initializing the services failed")?;
    let app = server::app(Arc::new(services));

    let address = format!("{}:{}", cfg.server.hostname, cfg.server.port);
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Binding {address} failed"))?;
    info!(
        "Cognito Local running on http://{address}, data in {}",
        cfg.storage.data_directory.display()
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stopped");
    Ok(())
}

/// Install shutdown and interrupt signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .inspect_err(|e| error!("failed to install Ctrl+C handler: {e}"))
            .ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) = signal::unix::signal(signal::unix::SignalKind::terminate())
            .inspect_err(|e| error!("failed to install signal handler: {e}"))
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
