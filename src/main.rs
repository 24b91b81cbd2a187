// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Roamwalk CLI entrypoint.
//!
//! Serves MCP over stdio by default. `--http-port <port>` serves streamable HTTP at
//! `http://127.0.0.1:<port>/mcp` instead. `--demo` swaps the Roam graph for a built-in sample.

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing_subscriber::{fmt, EnvFilter};

use roamwalk::config::{Cli, GraphSource, Transport};
use roamwalk::hierarchy::HierarchyService;
use roamwalk::mcp::RoamwalkMcp;

fn main() {
    // stdout carries the MCP protocol in stdio mode.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roamwalk=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let config = Cli::parse().into_config()?;
        let graph = config.graph()?;
        let scheduler = config.build_scheduler();

        match &config.source {
            GraphSource::Demo => tracing::info!("serving the built-in demo graph"),
            GraphSource::Roam { graph, base_url, .. } => {
                tracing::info!(graph = %graph, base_url = %base_url, "serving Roam graph")
            }
        }
        tracing::info!(
            max_concurrent = config.quota.max_concurrent,
            reservoir = config.quota.reservoir,
            refill_secs = config.quota.refill_interval.as_secs(),
            "request quota"
        );

        let mcp = RoamwalkMcp::new(HierarchyService::new(graph, scheduler, config.settings));
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        match config.transport {
            Transport::Stdio => runtime.block_on(mcp.serve_stdio())?,
            Transport::Http { port } => runtime.block_on(serve_http(mcp, port))?,
        }
        Ok(())
    })();

    if let Err(err) = result {
        tracing::error!(error = %err, "roamwalk failed");
        eprintln!("roamwalk: {err}");
        std::process::exit(1);
    }
}

async fn serve_http(mcp: RoamwalkMcp, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "serving MCP over streamable HTTP at /mcp");

    let config =
        StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let shutdown_token = config.cancellation_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

    let router = Router::new().nest_service("/mcp", mcp_service);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
                () = shutdown_token.cancelled() => {}
            }
        })
        .await?;
    Ok(())
}
