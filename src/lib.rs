// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Roamwalk: Roam Research hierarchy walker (scheduler + tree engine + MCP).
//!
//! Every remote query goes through one shared [`schedule::Scheduler`]; the tree engine walks
//! descendants or ancestors of a block, normalizes the rows into an arena tree and renders
//! paginated outline text for MCP clients.

pub mod config;
pub mod graph;
pub mod hierarchy;
pub mod mcp;
pub mod render;
pub mod schedule;
pub mod tree;
