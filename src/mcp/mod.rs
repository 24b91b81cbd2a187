// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! Exposes the hierarchy service as tools; every graph query still goes through the one
//! scheduler owned by the service.

mod server;
mod types;

pub use server::RoamwalkMcp;
pub use types::{BlockTreeNode, FetchBlockParams, FetchBlockResponse};
