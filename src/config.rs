// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Command line and environment configuration.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::graph::{Graph, GraphError, MemoryGraph, RoamGraph, DEFAULT_BASE_URL};
use crate::hierarchy::TraversalSettings;
use crate::render::PageLimits;
use crate::schedule::{BackoffPolicy, QuotaConfig, Scheduler};
use crate::tree::Strategy;

/// MCP server that walks Roam Research block hierarchies.
#[derive(Parser, Debug, Clone)]
#[command(name = "roamwalk", version)]
#[command(about = "MCP server that walks Roam Research block hierarchies")]
pub struct Cli {
    /// Roam graph name
    #[arg(long, env = "ROAM_GRAPH_NAME")]
    pub graph: Option<String>,

    /// Roam API token
    #[arg(long, env = "ROAM_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the Roam backend API
    #[arg(long, env = "ROAM_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Serve a built-in in-memory sample graph instead of a Roam graph
    #[arg(long)]
    pub demo: bool,

    /// Serve MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` instead of stdio
    /// (0 = ephemeral)
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Remote calls allowed in flight at once
    #[arg(long, default_value_t = 1)]
    pub max_concurrent: usize,

    /// Minimum gap between two remote calls, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub min_spacing_ms: u64,

    /// Remote calls allowed per refill window
    #[arg(long, default_value_t = 50)]
    pub reservoir: u32,

    /// Length of the refill window, in seconds
    #[arg(long, default_value_t = 60)]
    pub refill_secs: u64,

    /// First retry delay after a rate-limit error, in milliseconds (doubles per retry)
    #[arg(long, default_value_t = 2000)]
    pub backoff_base_ms: u64,

    /// Attempts per remote call, the first one included
    #[arg(long, default_value_t = 6)]
    pub max_attempts: u32,

    /// How subtrees and ancestor chains are queried
    #[arg(long, value_enum, default_value_t = Strategy::Nested)]
    pub strategy: Strategy,

    /// Outlines larger than this many bytes are split into parts (0 = never split)
    #[arg(long, default_value_t = 5_000)]
    pub part_size: usize,

    /// Unsplit outlines larger than this many bytes are truncated
    #[arg(long, default_value_t = 50_000)]
    pub hard_cap: usize,

    /// Leave `((uid))` block references as written
    #[arg(long)]
    pub no_resolve_refs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("a graph name is required (--graph or ROAM_GRAPH_NAME), or pass --demo")]
    MissingGraph,
    #[error("an API token is required (--token or ROAM_API_TOKEN), or pass --demo")]
    MissingToken,
    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphSource {
    Demo,
    Roam { base_url: String, graph: String, token: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http { port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: GraphSource,
    pub transport: Transport,
    pub quota: QuotaConfig,
    pub backoff: BackoffPolicy,
    pub settings: TraversalSettings,
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        for (name, value) in [
            ("--max-concurrent", self.max_concurrent as u64),
            ("--reservoir", u64::from(self.reservoir)),
            ("--refill-secs", self.refill_secs),
            ("--max-attempts", u64::from(self.max_attempts)),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { name });
            }
        }

        let source = if self.demo {
            GraphSource::Demo
        } else {
            let graph = non_empty(self.graph).ok_or(ConfigError::MissingGraph)?;
            let token = non_empty(self.token).ok_or(ConfigError::MissingToken)?;
            let base_url = self.base_url.trim().to_owned();
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl(base_url));
            }
            GraphSource::Roam { base_url, graph, token }
        };

        let transport = match self.http_port {
            Some(port) => Transport::Http { port },
            None => Transport::Stdio,
        };

        Ok(Config {
            source,
            transport,
            quota: QuotaConfig {
                max_concurrent: self.max_concurrent,
                min_spacing: Duration::from_millis(self.min_spacing_ms),
                reservoir: self.reservoir,
                refill_interval: Duration::from_secs(self.refill_secs),
            },
            backoff: BackoffPolicy::new(Duration::from_millis(self.backoff_base_ms), self.max_attempts),
            settings: TraversalSettings {
                strategy: self.strategy,
                limits: PageLimits { part_size: self.part_size, hard_cap: self.hard_cap },
                resolve_refs: !self.no_resolve_refs,
            },
        })
    }
}

impl Config {
    /// Builds a fresh quota. Call it once per process and hand out [`Scheduler::scoped`]
    /// handles; a second scheduler would pace its calls independently of the first.
    pub fn build_scheduler(&self) -> Scheduler {
        Scheduler::new(self.quota, self.backoff)
    }

    pub fn graph(&self) -> Result<Arc<dyn Graph>, GraphError> {
        Ok(match &self.source {
            GraphSource::Demo => Arc::new(MemoryGraph::demo()),
            GraphSource::Roam { base_url, graph, token } => {
                Arc::new(RoamGraph::new(base_url, graph, token.as_str())?)
            }
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}
