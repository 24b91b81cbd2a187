// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Outline text for block trees.
//!
//! Every node renders as one `"<2*depth spaces>- <content>\n"` line, parents before children.
//! Oversized outlines are split into parts by [`paginate`].

use crate::tree::CanonicalTree;

mod paginate;

pub use paginate::{paginate, split_parts, PageLimits, PaginatedResult, TRUNCATION_MARKER};

pub fn render_outline(tree: &CanonicalTree) -> String {
    let mut out = String::new();
    for id in tree.depth_first() {
        let node = tree.node(id);
        for _ in 0..node.depth() {
            out.push_str("  ");
        }
        out.push_str("- ");
        out.push_str(node.content());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests;
