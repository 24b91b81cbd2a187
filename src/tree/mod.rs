// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canonical block trees.
//!
//! A [`CanonicalTree`] is an arena: nodes live in one `Vec`, parent→children edges are indices.
//! A `uid` is placed at most once per tree, which keeps every tree acyclic.

mod fetch;
pub mod normalize;

pub use fetch::{clamp_depth, Strategy, TraversalError, TreeFetcher, MAX_DEPTH_CEILING};

use crate::graph::Block;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    uid: String,
    content: String,
    order: i64,
    depth: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    /// Distance from the root (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTree {
    nodes: Vec<TreeNode>,
}

impl CanonicalTree {
    pub(crate) fn with_root(block: Block) -> Self {
        Self {
            nodes: vec![TreeNode {
                uid: block.uid,
                content: block.content,
                order: block.order,
                depth: 0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, block: Block) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(TreeNode {
            uid: block.uid,
            content: block.content,
            order: block.order,
            depth,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Number of blocks in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    /// Node ids in pre-order: each parent before its children, siblings in stored order.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }
}
