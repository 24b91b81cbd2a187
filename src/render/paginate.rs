// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Appended to text cut at [`PageLimits::hard_cap`].
pub const TRUNCATION_MARKER: &str = "\n... [truncated]";

pub const DEFAULT_PART_SIZE: usize = 5_000;
pub const DEFAULT_HARD_CAP: usize = 50_000;

/// Sizes are in bytes; cuts never split a UTF-8 sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Texts longer than this are split into parts. `0` disables splitting.
    pub part_size: usize,
    /// Unsplit texts longer than this are truncated. Only reachable when `part_size` is `0` or
    /// larger than `hard_cap`, since any text over `part_size` is split first.
    pub hard_cap: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { part_size: DEFAULT_PART_SIZE, hard_cap: DEFAULT_HARD_CAP }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatedResult {
    pub text: String,
    pub total_parts: usize,
    /// 1-based.
    pub current_part: usize,
}

impl PaginatedResult {
    pub fn is_split(&self) -> bool {
        self.total_parts > 1
    }
}

/// Splits `text` into parts of at most `ceiling` bytes.
///
/// Each cut lands after the last `\n` of the window when that newline falls in the trailing
/// 20% of the window; otherwise the window is cut hard. Joining the parts yields `text`.
pub fn split_parts(text: &str, ceiling: usize) -> Vec<&str> {
    let ceiling = ceiling.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.len() > ceiling {
        let mut end = floor_char_boundary(rest, ceiling);
        if end == 0 {
            // a single char wider than the ceiling
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let window = &rest[..end];
        let cut = match window.rfind('\n') {
            Some(newline) if newline + 1 >= end - end / 5 => newline + 1,
            _ => end,
        };
        parts.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    if !rest.is_empty() || parts.is_empty() {
        parts.push(rest);
    }
    parts
}

/// Picks part `part` (1-based, clamped into range) of `text`.
pub fn paginate(text: &str, part: usize, limits: PageLimits) -> PaginatedResult {
    if limits.part_size > 0 && text.len() > limits.part_size {
        let parts = split_parts(text, limits.part_size);
        let current_part = part.clamp(1, parts.len());
        return PaginatedResult {
            text: parts[current_part - 1].to_owned(),
            total_parts: parts.len(),
            current_part,
        };
    }

    let text = if text.len() > limits.hard_cap {
        let mut cut = text[..floor_char_boundary(text, limits.hard_cap)].to_owned();
        cut.push_str(TRUNCATION_MARKER);
        tracing::debug!(len = text.len(), cap = limits.hard_cap, "outline truncated");
        cut
    } else {
        text.to_owned()
    };
    PaginatedResult { text, total_parts: 1, current_part: 1 }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    (0..=index).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}
