// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// MCP server helper functions:
/// tree-to-JSON mapping and hierarchy error conversion.
fn block_tree_node(tree: &CanonicalTree, id: NodeId) -> BlockTreeNode {
    let node = tree.node(id);
    BlockTreeNode {
        uid: node.uid().to_owned(),
        string: node.content().to_owned(),
        order: node.order(),
        children: node.children().iter().map(|&child| block_tree_node(tree, child)).collect(),
    }
}

fn hierarchy_error_data(err: HierarchyError, block_uid: &str) -> ErrorData {
    let data = Some(serde_json::json!({ "block_uid": block_uid }));
    match err {
        HierarchyError::InvalidRequest(message) => ErrorData::invalid_params(message, data),
        HierarchyError::Traversal(TraversalError::NotFound(message)) => {
            ErrorData::resource_not_found(message, data)
        }
        HierarchyError::Traversal(err) => ErrorData::internal_error(err.to_string(), data),
    }
}
