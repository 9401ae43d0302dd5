// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

mod cli;

use std::process;
use std::sync::Arc;

use clap::CommandFactory;
use clap::Parser;
use rustls::crypto::aws_lc_rs;

use pf_api_common::config::AppConfigBuilder;
use pf_api_common::state::State;
use pf_api_common::telemetry::{error, info, setup_logging};
use pf_api_server::server::{create_router, create_tls_config, serve, shutdown_signal};

use crate::cli::{CliArgs, Commands};

#[tokio::main]
async fn main() {
    // Install the default aws_lc_rs crypto provider
    let _ = aws_lc_rs::default_provider().install_default();

    let args = CliArgs::parse();

    setup_logging();

    match &args.cmd {
        Some(Commands::Serve { config }) => {
            info!(
                event = "Starting",
                version = env!("CARGO_PKG_VERSION"),
            );

            // Load configuration
            let mut builder = AppConfigBuilder::default();
            if let Some(path) = config {
                builder.with_file(path);
            }
            let config = builder.with_env().build().unwrap_or_else(|e| {
                error!(
                    event = "Error",
                    error = %e,
                );
                process::exit(1);
            });

            // Base Kubernetes configuration; per-request clients swap in the
            // caller's bearer token
            let kube_config = kube::Config::infer().await.unwrap_or_else(|e| {
                error!(
                    event = "Error",
                    error = %e,
                );
                process::exit(1);
            });

            let state = Arc::new(State::new(config.clone(), kube_config));

            let addr = format!("{}:{}", config.api.host, config.api.port);
            let tls_config = if config.api.tls.enabled {
                Some(
                    create_tls_config(
                        config.api.tls.cert_file.to_string(),
                        config.api.tls.key_file.to_string(),
                    )
                    .await,
                )
            } else {
                None
            };
            let router = create_router(state.clone());

            let handle = axum_server::Handle::new();
            tokio::spawn(shutdown_signal(handle.clone()));

            // Run API server
            info!(event = "Listening", address = addr.as_str());
            serve(addr, router, tls_config, handle)
                .await
                .unwrap_or_else(|e| {
                    error!(
                        event = "Error",
                        error = %e,
                    );
                    process::exit(1);
                });

            info!(event = "Stopped");
        }
        None => {
            let mut cmd = CliArgs::command();
            cmd.print_help().unwrap();
            process::exit(1);
        }
    }
}
