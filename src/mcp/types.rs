// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchBlockParams {
    /// Uid of the block to fetch.
    pub block_uid: String,
    /// Levels of children to include (default 4, at most 10).
    #[serde(default)]
    pub depth: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BlockTreeNode {
    pub uid: String,
    pub string: String,
    pub order: i64,
    pub children: Vec<BlockTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchBlockResponse {
    pub block: BlockTreeNode,
    pub total_blocks_found: u64,
}
