// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use super::{normalize, CanonicalTree};
use crate::graph::{Block, BlockRow, Graph, GraphError, ResolveError, ResolveRefs};
use crate::schedule::{RetryError, Scheduler};

/// Hard upper bound on traversal depth, whatever the caller asks for.
pub const MAX_DEPTH_CEILING: usize = 10;

pub fn clamp_depth(requested: usize) -> usize {
    requested.clamp(1, MAX_DEPTH_CEILING)
}

/// How subtrees and ancestor chains are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Strategy {
    /// One nested pull (descendants) or one ancestor-rule query, falling back to
    /// `level-by-level` when that query fails.
    #[default]
    Nested,
    /// One query per tree level (descendants) or per parent hop (ancestors).
    LevelByLevel,
}

#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    #[error("{0}")]
    NotFound(String),
    #[error("remote query failed: {0}")]
    Remote(GraphError),
    #[error("remote store kept rejecting requests after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: GraphError },
    #[error(transparent)]
    Collaborator(#[from] ResolveError),
}

impl From<RetryError<GraphError>> for TraversalError {
    fn from(err: RetryError<GraphError>) -> Self {
        match err {
            RetryError::Fatal(err) => Self::Remote(err),
            RetryError::Exhausted { attempts, last } => Self::RetriesExhausted { attempts, last },
        }
    }
}

/// Issues the queries of one traversal. Every call goes through `scheduler`.
pub struct TreeFetcher<'a> {
    graph: &'a dyn Graph,
    scheduler: &'a Scheduler,
    resolver: &'a dyn ResolveRefs,
    strategy: Strategy,
}

impl<'a> TreeFetcher<'a> {
    pub fn new(
        graph: &'a dyn Graph,
        scheduler: &'a Scheduler,
        resolver: &'a dyn ResolveRefs,
        strategy: Strategy,
    ) -> Self {
        Self { graph, scheduler, resolver, strategy }
    }

    /// `uid` and its subtree down to `max_depth` (clamped to [`MAX_DEPTH_CEILING`]).
    pub async fn descendants(
        &self,
        uid: &str,
        max_depth: usize,
    ) -> Result<CanonicalTree, TraversalError> {
        let depth = clamp_depth(max_depth);
        let anchor = self.anchor(uid).await?;

        let rows = match self.strategy {
            Strategy::LevelByLevel => self.rows_by_level(uid, depth).await?,
            Strategy::Nested => match self.rows_by_pull(uid, depth).await {
                Ok(Some(rows)) => rows,
                Ok(None) => {
                    tracing::debug!(uid, "nested pull returned nothing; querying level by level");
                    self.rows_by_level(uid, depth).await?
                }
                Err(err @ TraversalError::RetriesExhausted { .. }) => return Err(err),
                Err(err) => {
                    tracing::warn!(uid, error = %err, "nested pull failed; querying level by level");
                    self.rows_by_level(uid, depth).await?
                }
            },
        };

        let rows = self.resolve_rows(rows).await?;
        let tree = normalize::from_rows(anchor, rows, depth);
        tracing::debug!(uid, depth, blocks = tree.len(), "descendants fetched");
        Ok(tree)
    }

    /// Chain of up to `max_depth - 1` ancestors of `uid`, farthest first, ending with `uid`.
    pub async fn ancestors(
        &self,
        uid: &str,
        max_depth: usize,
    ) -> Result<CanonicalTree, TraversalError> {
        let depth = clamp_depth(max_depth);
        let anchor = self.anchor(uid).await?;
        let limit = depth - 1;

        let chain = if limit == 0 {
            Vec::new()
        } else {
            match self.strategy {
                Strategy::LevelByLevel => self.walk_up(uid, limit).await?,
                Strategy::Nested => match self.ancestors_by_rule(uid, limit).await {
                    Ok(chain) => chain,
                    Err(err @ TraversalError::RetriesExhausted { .. }) => return Err(err),
                    Err(err) => {
                        tracing::warn!(uid, error = %err, "ancestor query failed; walking parents");
                        self.walk_up(uid, limit).await?
                    }
                },
            }
        };

        let mut resolved = Vec::with_capacity(chain.len());
        for block in chain {
            resolved.push(self.resolve_block(block).await?);
        }
        let tree = normalize::from_chain(anchor, resolved);
        tracing::debug!(uid, depth, blocks = tree.len(), "ancestors fetched");
        Ok(tree)
    }

    /// Fails with `NotFound` unless `page_ref` names a page (title or uid) that holds `uid`.
    pub async fn ensure_on_page(&self, uid: &str, page_ref: &str) -> Result<(), TraversalError> {
        let page_uid = self
            .scheduler
            .schedule(|| self.graph.find_page(page_ref))
            .await?
            .ok_or_else(|| TraversalError::NotFound(format!("page {page_ref} not found")))?;
        let owner = self.scheduler.schedule(|| self.graph.page_of(uid)).await?;
        if owner.as_deref() != Some(page_uid.as_str()) {
            return Err(TraversalError::NotFound(format!(
                "block {uid} not found on page {page_ref}"
            )));
        }
        Ok(())
    }

    async fn anchor(&self, uid: &str) -> Result<Block, TraversalError> {
        let block = self
            .scheduler
            .schedule(|| self.graph.block(uid))
            .await?
            .ok_or_else(|| TraversalError::NotFound(format!("block {uid} not found")))?;
        self.resolve_block(block).await
    }

    async fn rows_by_pull(
        &self,
        uid: &str,
        depth: usize,
    ) -> Result<Option<Vec<BlockRow>>, TraversalError> {
        let pulled = self.scheduler.schedule(|| self.graph.pull_tree(uid, depth)).await?;
        Ok(pulled.as_ref().map(normalize::nested_rows))
    }

    async fn rows_by_level(&self, uid: &str, depth: usize) -> Result<Vec<BlockRow>, TraversalError> {
        let mut rows = Vec::new();
        let mut seen = HashSet::from([uid.to_owned()]);
        let mut frontier = vec![uid.to_owned()];

        for _ in 0..depth {
            if frontier.is_empty() {
                break;
            }
            let level = self.scheduler.schedule(|| self.graph.children_of(&frontier)).await?;
            frontier = Vec::with_capacity(level.len());
            for row in level {
                if seen.insert(row.uid.clone()) {
                    frontier.push(row.uid.clone());
                    rows.push(row);
                }
            }
        }

        Ok(rows)
    }

    async fn walk_up(&self, uid: &str, limit: usize) -> Result<Vec<Block>, TraversalError> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([uid.to_owned()]);
        let mut current = uid.to_owned();

        while chain.len() < limit {
            let parent = self.scheduler.schedule(|| self.graph.parent_of(&current)).await?;
            let Some(parent) = parent else {
                break;
            };
            if !seen.insert(parent.uid.clone()) {
                break;
            }
            current = parent.uid.clone();
            chain.push(parent);
        }

        Ok(chain)
    }

    async fn ancestors_by_rule(&self, uid: &str, limit: usize) -> Result<Vec<Block>, TraversalError> {
        let mut rows = self.scheduler.schedule(|| self.graph.ancestors(uid)).await?;
        rows.sort_by_key(|row| row.distance);

        let mut seen = HashSet::from([uid.to_owned()]);
        Ok(rows
            .into_iter()
            .map(|row| row.block)
            .filter(|block| seen.insert(block.uid.clone()))
            .take(limit)
            .collect())
    }

    async fn resolve_block(&self, mut block: Block) -> Result<Block, TraversalError> {
        block.content = self.resolver.resolve(&block.content).await?;
        Ok(block)
    }

    async fn resolve_rows(&self, rows: Vec<BlockRow>) -> Result<Vec<BlockRow>, TraversalError> {
        let mut resolved = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.content = self.resolver.resolve(&row.content).await?;
            resolved.push(row);
        }
        Ok(resolved)
    }
}
