// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{AncestorRow, Block, BlockRow, Graph, GraphError};

#[derive(Debug, Clone)]
struct StoredBlock {
    content: String,
    order: i64,
    parent: String,
    page: String,
}

/// In-process graph with the same query semantics as the hosted store.
///
/// Children are returned in insertion order, not by `order`, like the backend does. Failures
/// queued with [`MemoryGraph::fail_next`] are returned by the next calls, one per call.
#[derive(Debug)]
pub struct MemoryGraph {
    pages: BTreeMap<String, String>,
    blocks: HashMap<String, StoredBlock>,
    children: HashMap<String, Vec<String>>,
    pull_failure: Option<GraphError>,
    failures: Mutex<VecDeque<GraphError>>,
    calls: AtomicUsize,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self {
            pages: BTreeMap::new(),
            blocks: HashMap::new(),
            children: HashMap::new(),
            pull_failure: None,
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page(mut self, uid: &str, title: &str) -> Self {
        self.pages.insert(uid.to_owned(), title.to_owned());
        self
    }

    /// Adds a block under a page or block. Unknown parents act as their own page.
    pub fn with_block(mut self, parent_uid: &str, uid: &str, content: &str, order: i64) -> Self {
        let page = match self.blocks.get(parent_uid) {
            Some(parent) => parent.page.clone(),
            None => parent_uid.to_owned(),
        };
        self.blocks.insert(
            uid.to_owned(),
            StoredBlock {
                content: content.to_owned(),
                order,
                parent: parent_uid.to_owned(),
                page,
            },
        );
        self.children.entry(parent_uid.to_owned()).or_default().push(uid.to_owned());
        self
    }

    /// Makes [`Graph::pull_tree`] fail, like a backend without nested pull support.
    pub fn without_nested_pull(self) -> Self {
        self.with_pull_failure(GraphError::Unavailable("nested pull is not supported".to_owned()))
    }

    /// Makes every [`Graph::pull_tree`] call fail with `err`.
    pub fn with_pull_failure(mut self, err: GraphError) -> Self {
        self.pull_failure = Some(err);
        self
    }

    pub fn fail_next(&self, err: GraphError) {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner).push_back(err);
    }

    /// Number of queries answered so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A small sample page for `--demo` mode.
    pub fn demo() -> Self {
        Self::new()
            .with_page("demo-page", "Roamwalk Demo")
            .with_block("demo-page", "intro", "Roamwalk walks Roam block trees", 0)
            .with_block("intro", "scheduler", "Every query goes through one scheduler", 1)
            .with_block("intro", "engine", "The tree engine renders outlines", 0)
            .with_block("engine", "pages", "Large outlines are split into parts", 0)
            .with_block("engine", "refs", "Block refs like ((scheduler)) are inlined", 1)
            .with_block("scheduler", "quota", "50 requests per minute, paced and retried", 0)
            .with_block("demo-page", "outro", "Try roam_search_hierarchy with parent_uid=intro", 1)
    }

    fn answer(&self) -> Result<(), GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().unwrap_or_else(PoisonError::into_inner).pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn stored(&self, uid: &str) -> Option<Block> {
        self.blocks.get(uid).map(|stored| Block {
            uid: uid.to_owned(),
            content: stored.content.clone(),
            order: stored.order,
        })
    }

    fn pull(&self, uid: &str, depth: usize) -> Value {
        let mut node = json!({ ":block/uid": uid });
        if let Some(stored) = self.blocks.get(uid) {
            node[":block/string"] = json!(stored.content);
            node[":block/order"] = json!(stored.order);
        }
        if depth > 0 {
            let children = self
                .children
                .get(uid)
                .into_iter()
                .flatten()
                .map(|child| self.pull(child, depth - 1))
                .collect::<Vec<_>>();
            if !children.is_empty() {
                node[":block/children"] = Value::Array(children);
            }
        }
        node
    }
}

#[async_trait]
impl Graph for MemoryGraph {
    async fn block(&self, uid: &str) -> Result<Option<Block>, GraphError> {
        self.answer()?;
        Ok(self.stored(uid))
    }

    async fn children_of(&self, parent_uids: &[String]) -> Result<Vec<BlockRow>, GraphError> {
        self.answer()?;
        let mut rows = Vec::new();
        for parent_uid in parent_uids {
            for child in self.children.get(parent_uid).into_iter().flatten() {
                if let Some(block) = self.stored(child) {
                    rows.push(BlockRow {
                        uid: block.uid,
                        content: block.content,
                        order: Some(block.order),
                        parent_uid: Some(parent_uid.clone()),
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn pull_tree(&self, uid: &str, depth: usize) -> Result<Option<Value>, GraphError> {
        self.answer()?;
        if let Some(err) = &self.pull_failure {
            return Err(err.clone());
        }
        if !self.blocks.contains_key(uid) {
            return Ok(None);
        }
        Ok(Some(self.pull(uid, depth)))
    }

    async fn parent_of(&self, uid: &str) -> Result<Option<Block>, GraphError> {
        self.answer()?;
        Ok(self.blocks.get(uid).and_then(|stored| self.stored(&stored.parent)))
    }

    async fn ancestors(&self, uid: &str) -> Result<Vec<AncestorRow>, GraphError> {
        self.answer()?;
        let mut rows = Vec::new();
        let mut current = uid;
        let mut distance = 0u32;
        while let Some(stored) = self.blocks.get(current) {
            let Some(parent) = self.stored(&stored.parent) else {
                break;
            };
            distance += 1;
            current = &stored.parent;
            rows.push(AncestorRow { block: parent, distance });
            if distance as usize > self.blocks.len() {
                break;
            }
        }
        // The backend returns a set; make sure callers do not depend on order.
        rows.reverse();
        Ok(rows)
    }

    async fn find_page(&self, title_or_uid: &str) -> Result<Option<String>, GraphError> {
        self.answer()?;
        if self.pages.contains_key(title_or_uid) {
            return Ok(Some(title_or_uid.to_owned()));
        }
        Ok(self
            .pages
            .iter()
            .find(|(_, title)| title.as_str() == title_or_uid)
            .map(|(uid, _)| uid.clone()))
    }

    async fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        self.answer()?;
        Ok(self.blocks.get(uid).map(|stored| stored.page.clone()))
    }

    async fn block_strings(&self, uids: &[String]) -> Result<Vec<(String, String)>, GraphError> {
        self.answer()?;
        Ok(uids
            .iter()
            .filter_map(|uid| self.blocks.get(uid).map(|stored| (uid.clone(), stored.content.clone())))
            .collect())
    }
}
