// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Query surface of the remote block graph.
//!
//! [`Graph`] is the seam between the tree engine and a store. Each method issues exactly one
//! query, so callers can wrap every call in [`crate::schedule::Scheduler::schedule`].
//! [`RoamGraph`] talks to the hosted Roam backend; [`MemoryGraph`] backs tests and `--demo`.

mod memory;
pub mod refs;
mod roam;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemoryGraph;
pub use refs::{BlockRefResolver, PlainText, ResolveError, ResolveRefs};
pub use roam::{RoamGraph, DEFAULT_BASE_URL};

use crate::schedule::{is_quota_message, Classify, Disposition};

/// A block as fetched for one traversal. Never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub uid: String,
    pub content: String,
    pub order: i64,
}

/// One flat row of a children query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub uid: String,
    pub content: String,
    pub order: Option<i64>,
    pub parent_uid: Option<String>,
}

impl BlockRow {
    pub fn into_block(self) -> Block {
        Block { uid: self.uid, content: self.content, order: self.order.unwrap_or(0) }
    }
}

/// An ancestor candidate; `distance` is 1 for the direct parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorRow {
    pub block: Block,
    pub distance: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A non-success HTTP status; `body` is the backend's `message` when it sent one.
    #[error("remote store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request to remote store failed: {0}")]
    Transport(String),
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("{0}")]
    Unavailable(String),
}

impl GraphError {
    /// Whether the backend rejected the call for exceeding its request quota.
    pub fn is_quota(&self) -> bool {
        match self {
            Self::Status { status, body } => *status == 429 || is_quota_message(body),
            Self::Unavailable(message) => is_quota_message(message),
            Self::Transport(_) | Self::Decode(_) => false,
        }
    }
}

impl Classify for GraphError {
    fn disposition(&self) -> Disposition {
        if self.is_quota() {
            Disposition::Retryable
        } else {
            Disposition::Fatal
        }
    }
}

impl From<reqwest::Error> for GraphError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[async_trait]
pub trait Graph: Send + Sync {
    /// The block with `uid`; `None` when it does not exist or is a page.
    async fn block(&self, uid: &str) -> Result<Option<Block>, GraphError>;

    /// Direct children of every uid in `parent_uids`, in any order.
    async fn children_of(&self, parent_uids: &[String]) -> Result<Vec<BlockRow>, GraphError>;

    /// A nested pull of `uid` with `:block/children` recursion bounded by `depth`.
    async fn pull_tree(&self, uid: &str, depth: usize)
        -> Result<Option<serde_json::Value>, GraphError>;

    /// The parent block of `uid`. Pages are not blocks, so top-level blocks have no parent.
    async fn parent_of(&self, uid: &str) -> Result<Option<Block>, GraphError>;

    /// Every ancestor block of `uid` with its distance, in any order.
    async fn ancestors(&self, uid: &str) -> Result<Vec<AncestorRow>, GraphError>;

    /// Page uid for a page title or a page uid.
    async fn find_page(&self, title_or_uid: &str) -> Result<Option<String>, GraphError>;

    /// Uid of the page that `uid` lives on.
    async fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError>;

    /// `(uid, content)` for each uid that exists.
    async fn block_strings(&self, uids: &[String]) -> Result<Vec<(String, String)>, GraphError>;
}
