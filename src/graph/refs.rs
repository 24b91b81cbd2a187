// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Block-reference resolution (`((uid))` → referenced block text).

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::{Captures, Regex};

use super::{Graph, GraphError};
use crate::schedule::{RetryError, Scheduler};

/// Nested references are expanded at most this many levels deep.
pub const MAX_REF_DEPTH: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to resolve block references: {0}")]
    Remote(#[from] RetryError<GraphError>),
}

/// Text transform applied to each block's content before it is rendered.
#[async_trait]
pub trait ResolveRefs: Send + Sync {
    async fn resolve(&self, content: &str) -> Result<String, ResolveError>;
}

/// Leaves content untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

#[async_trait]
impl ResolveRefs for PlainText {
    async fn resolve(&self, content: &str) -> Result<String, ResolveError> {
        Ok(content.to_owned())
    }
}

fn block_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(\(([A-Za-z0-9_-]+)\)\)").expect("block ref pattern is valid"))
}

/// Replaces `((uid))` with the referenced block's text, one batched query per nesting level.
///
/// Unknown uids stay as written.
#[derive(Clone)]
pub struct BlockRefResolver {
    graph: Arc<dyn Graph>,
    scheduler: Scheduler,
}

impl BlockRefResolver {
    pub fn new(graph: Arc<dyn Graph>, scheduler: Scheduler) -> Self {
        Self { graph, scheduler }
    }
}

#[async_trait]
impl ResolveRefs for BlockRefResolver {
    async fn resolve(&self, content: &str) -> Result<String, ResolveError> {
        let pattern = block_ref_pattern();
        let mut text = content.to_owned();
        let mut missing = BTreeSet::new();

        for _ in 0..MAX_REF_DEPTH {
            let wanted = pattern
                .captures_iter(&text)
                .map(|caps| caps[1].to_owned())
                .filter(|uid| !missing.contains(uid))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect::<Vec<_>>();
            if wanted.is_empty() {
                break;
            }

            let found: HashMap<String, String> = self
                .scheduler
                .schedule(|| self.graph.block_strings(&wanted))
                .await?
                .into_iter()
                .collect();
            missing.extend(wanted.iter().filter(|uid| !found.contains_key(*uid)).cloned());
            if found.is_empty() {
                break;
            }

            text = pattern
                .replace_all(&text, |caps: &Captures<'_>| match found.get(&caps[1]) {
                    Some(resolved) => resolved.clone(),
                    None => caps[0].to_owned(),
                })
                .into_owned();
        }

        Ok(text)
    }
}
