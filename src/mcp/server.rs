// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};

use crate::hierarchy::{HierarchyError, HierarchyRequest, HierarchyResponse, HierarchyService};
use crate::tree::{CanonicalTree, NodeId, TraversalError};

use super::types::*;

#[derive(Clone)]
pub struct RoamwalkMcp {
    service: HierarchyService,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RoamwalkMcp {
    pub fn new(service: HierarchyService) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    pub fn service(&self) -> &HierarchyService {
        &self.service
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Walk a block hierarchy and return it as an indented outline. Give `parent_uid` for
    /// descendants or `child_uid` for ancestors (exactly one), optionally `page_title_uid` to
    /// require the block to live on that page, `max_depth` (default 1, at most 10) and `part`
    /// (1-based) when the result reports `total_parts`. Failures come back as
    /// `success: false` with a message.
    #[tool(name = "roam_search_hierarchy")]
    async fn roam_search_hierarchy(
        &self,
        params: Parameters<HierarchyRequest>,
    ) -> Result<Json<HierarchyResponse>, ErrorData> {
        Ok(Json(self.service.search_hierarchy(params.0).await))
    }

    /// Fetch a block with its children as nested JSON (`depth` levels, default 4, at most 10);
    /// prefer `roam_search_hierarchy` for large subtrees.
    #[tool(name = "roam_fetch_block_with_children")]
    async fn roam_fetch_block_with_children(
        &self,
        params: Parameters<FetchBlockParams>,
    ) -> Result<Json<FetchBlockResponse>, ErrorData> {
        let FetchBlockParams { block_uid, depth } = params.0;
        let tree = self
            .service
            .fetch_block_with_children(&block_uid, depth)
            .await
            .map_err(|err| hierarchy_error_data(err, &block_uid))?;

        Ok(Json(FetchBlockResponse {
            block: block_tree_node(&tree, tree.root()),
            total_blocks_found: tree.len() as u64,
        }))
    }
}

#[tool_handler]
impl ServerHandler for RoamwalkMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Roamwalk Roam Research hierarchy server (tools: roam_search_hierarchy, roam_fetch_block_with_children). Requests are rate limited and retried on quota errors; large outlines are split into parts."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Tree mapping and error conversion helpers for MCP tool handlers.
include!("server/helpers.rs");
