// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Hierarchy lookups: request validation, traversal dispatch and response shaping.
//!
//! [`HierarchyService::search_hierarchy`] never fails; every error becomes a
//! `success: false` response with a descriptive message.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::graph::{BlockRefResolver, Graph, PlainText, ResolveRefs};
use crate::render::{paginate, render_outline, PageLimits};
use crate::schedule::Scheduler;
use crate::tree::{clamp_depth, CanonicalTree, Strategy, TraversalError, TreeFetcher};

/// Depth used by [`HierarchyService::fetch_block_with_children`] when none is given.
pub const DEFAULT_FETCH_DEPTH: usize = 4;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HierarchyRequest {
    /// Walk down from this block (descendants).
    #[serde(default)]
    pub parent_uid: Option<String>,
    /// Walk up from this block (ancestors).
    #[serde(default)]
    pub child_uid: Option<String>,
    /// Only accept the anchor when it lives on this page (title or page uid).
    #[serde(default)]
    pub page_title_uid: Option<String>,
    /// Levels to traverse (default 1, at most 10).
    #[serde(default)]
    pub max_depth: Option<i64>,
    /// 1-based part of a split result (default 1, clamped into range).
    #[serde(default)]
    pub part: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HierarchyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_parts: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_part: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_blocks_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
    pub message: String,
}

impl HierarchyResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            total_parts: None,
            current_part: None,
            total_blocks_found: None,
            matches: Some(Vec::new()),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalSettings {
    pub strategy: Strategy,
    pub limits: PageLimits,
    /// Inline `((uid))` references before rendering.
    pub resolve_refs: bool,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self { strategy: Strategy::default(), limits: PageLimits::default(), resolve_refs: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Descendants,
    Ancestors,
}

#[derive(Clone)]
pub struct HierarchyService {
    graph: Arc<dyn Graph>,
    scheduler: Scheduler,
    resolver: Arc<dyn ResolveRefs>,
    settings: TraversalSettings,
}

impl HierarchyService {
    /// Reference resolution runs on its own scope of `scheduler`, under the same quota.
    pub fn new(graph: Arc<dyn Graph>, scheduler: Scheduler, settings: TraversalSettings) -> Self {
        let resolver: Arc<dyn ResolveRefs> = if settings.resolve_refs {
            Arc::new(BlockRefResolver::new(Arc::clone(&graph), scheduler.scoped("refs")))
        } else {
            Arc::new(PlainText)
        };
        Self { graph, scheduler, resolver, settings }
    }

    pub fn settings(&self) -> &TraversalSettings {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub async fn search_hierarchy(&self, request: HierarchyRequest) -> HierarchyResponse {
        match self.try_search(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "hierarchy search failed");
                HierarchyResponse::failure(err.to_string())
            }
        }
    }

    /// Subtree of `uid` as a tree, `depth` defaulting to [`DEFAULT_FETCH_DEPTH`].
    pub async fn fetch_block_with_children(
        &self,
        uid: &str,
        depth: Option<i64>,
    ) -> Result<CanonicalTree, HierarchyError> {
        let uid = uid.trim();
        if uid.is_empty() {
            return Err(HierarchyError::InvalidRequest("block_uid must not be empty".to_owned()));
        }
        let depth = depth.map_or(DEFAULT_FETCH_DEPTH, depth_from_request);
        Ok(self.fetcher().descendants(uid, depth).await?)
    }

    async fn try_search(
        &self,
        request: &HierarchyRequest,
    ) -> Result<HierarchyResponse, HierarchyError> {
        let (direction, uid) = anchor_of(request)?;
        let depth = request.max_depth.map_or(1, depth_from_request);
        let part = request.part.map_or(1, |part| usize::try_from(part.max(1)).unwrap_or(1));
        let fetcher = self.fetcher();

        if let Some(page) = non_empty(request.page_title_uid.as_deref()) {
            fetcher.ensure_on_page(uid, page).await?;
        }

        let tree = match direction {
            Direction::Descendants => fetcher.descendants(uid, depth).await?,
            Direction::Ancestors => fetcher.ancestors(uid, depth).await?,
        };

        let outline = render_outline(&tree);
        let page = paginate(&outline, part, self.settings.limits);
        let blocks = tree.len();
        let relation = match direction {
            Direction::Descendants => "descendants",
            Direction::Ancestors => "ancestors",
        };

        let mut message = format!(
            "Found {blocks} block{} ({relation} of {uid}, depth {})",
            if blocks == 1 { "" } else { "s" },
            clamp_depth(depth)
        );
        let (total_parts, current_part) = if page.is_split() {
            message.push_str(&format!(
                "; showing part {} of {}, request other parts with `part`",
                page.current_part, page.total_parts
            ));
            (Some(page.total_parts), Some(page.current_part))
        } else {
            (None, None)
        };

        Ok(HierarchyResponse {
            success: true,
            content: Some(page.text),
            total_parts,
            current_part,
            total_blocks_found: Some(blocks),
            matches: None,
            message,
        })
    }

    fn fetcher(&self) -> TreeFetcher<'_> {
        TreeFetcher::new(&*self.graph, &self.scheduler, &*self.resolver, self.settings.strategy)
    }
}

fn anchor_of(request: &HierarchyRequest) -> Result<(Direction, &str), HierarchyError> {
    match (non_empty(request.parent_uid.as_deref()), non_empty(request.child_uid.as_deref())) {
        (Some(uid), None) => Ok((Direction::Descendants, uid)),
        (None, Some(uid)) => Ok((Direction::Ancestors, uid)),
        (None, None) => Err(HierarchyError::InvalidRequest(
            "either parent_uid or child_uid must be provided".to_owned(),
        )),
        (Some(_), Some(_)) => Err(HierarchyError::InvalidRequest(
            "provide only one of parent_uid or child_uid".to_owned(),
        )),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn depth_from_request(depth: i64) -> usize {
    clamp_depth(usize::try_from(depth.max(1)).unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests;
