// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Query results → [`CanonicalTree`].
//!
//! Siblings are ordered by `(order, fetch index)`: the position at which a row arrived breaks
//! ties between equal `order` values, so the same input always yields the same tree.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use super::CanonicalTree;
use crate::graph::{Block, BlockRow};

/// Builds a tree below `anchor` from flat rows.
///
/// Rows whose parent is the anchor, absent, or not among the rows hang off the root. Nodes
/// deeper than `max_depth` and repeated uids are dropped.
pub fn from_rows(anchor: Block, rows: Vec<BlockRow>, max_depth: usize) -> CanonicalTree {
    let anchor_uid = anchor.uid.clone();
    let known = rows.iter().map(|row| row.uid.clone()).collect::<HashSet<_>>();

    let mut groups: HashMap<String, Vec<(usize, BlockRow)>> = HashMap::new();
    for (idx, row) in rows.into_iter().enumerate() {
        let parent = match row.parent_uid.as_deref() {
            Some(parent) if parent != anchor_uid && known.contains(parent) => parent.to_owned(),
            _ => anchor_uid.clone(),
        };
        groups.entry(parent).or_default().push((idx, row));
    }

    let mut tree = CanonicalTree::with_root(anchor);
    let mut placed = HashSet::from([anchor_uid.clone()]);
    let mut queue = VecDeque::from([(tree.root(), anchor_uid)]);

    while let Some((parent_id, parent_uid)) = queue.pop_front() {
        if tree.node(parent_id).depth() >= max_depth {
            continue;
        }
        let Some(mut siblings) = groups.remove(&parent_uid) else {
            continue;
        };
        siblings.sort_by_key(|(idx, row)| (row.order.unwrap_or(0), *idx));

        for (_, row) in siblings {
            if !placed.insert(row.uid.clone()) {
                continue;
            }
            let uid = row.uid.clone();
            let id = tree.push_child(parent_id, row.into_block());
            queue.push_back((id, uid));
        }
    }

    tree
}

/// Flattens a nested pull result into rows, keeping each node's parent.
///
/// Accepts namespaced (`:block/uid`) and bare (`uid`) keys. Children without a uid are
/// skipped; a missing string becomes empty and a missing order stays `None` (sorted as 0).
pub fn nested_rows(pulled: &Value) -> Vec<BlockRow> {
    let mut rows = Vec::new();
    let root_uid = text_field(pulled, "uid").unwrap_or_default();
    collect_children(pulled, &root_uid, &mut rows);
    rows
}

/// [`from_rows`] over [`nested_rows`].
pub fn from_nested(anchor: Block, pulled: &Value, max_depth: usize) -> CanonicalTree {
    from_rows(anchor, nested_rows(pulled), max_depth)
}

/// A vertical chain: farthest ancestor at the root, `anchor` as the deepest node.
pub fn from_chain(anchor: Block, ancestors_nearest_first: Vec<Block>) -> CanonicalTree {
    let mut chain = ancestors_nearest_first.into_iter().rev();
    let Some(top) = chain.next() else {
        return CanonicalTree::with_root(anchor);
    };

    let mut tree = CanonicalTree::with_root(top);
    let mut tail = tree.root();
    for block in chain.chain(std::iter::once(anchor)) {
        tail = tree.push_child(tail, block);
    }
    tree
}

fn collect_children(node: &Value, parent_uid: &str, rows: &mut Vec<BlockRow>) {
    let Some(children) = field(node, "children").and_then(Value::as_array) else {
        return;
    };
    for child in children {
        let Some(uid) = text_field(child, "uid") else {
            continue;
        };
        rows.push(BlockRow {
            uid: uid.clone(),
            content: text_field(child, "string").unwrap_or_default(),
            order: field(child, "order").and_then(Value::as_i64),
            parent_uid: Some(parent_uid.to_owned()),
        });
        collect_children(child, &uid, rows);
    }
}

fn field<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    node.get(format!(":block/{name}")).or_else(|| node.get(name))
}

fn text_field(node: &Value, name: &str) -> Option<String> {
    field(node, name).and_then(Value::as_str).map(str::to_owned)
}
