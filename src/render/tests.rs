// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::*;
use crate::graph::Block;

fn block(uid: &str, content: &str) -> Block {
    Block { uid: uid.to_owned(), content: content.to_owned(), order: 0 }
}

fn small_tree() -> CanonicalTree {
    let mut tree = CanonicalTree::with_root(block("root", "Root"));
    let a = tree.push_child(tree.root(), block("a", "A"));
    tree.push_child(a, block("a1", "A1"));
    tree.push_child(tree.root(), block("b", "B"));
    tree
}

/// A root plus `children` direct children; every rendered line is exactly 100 bytes.
fn wide_tree(children: usize) -> CanonicalTree {
    let mut tree = CanonicalTree::with_root(block("root", &"r".repeat(97)));
    for idx in 0..children {
        tree.push_child(tree.root(), block(&format!("c{idx}"), &"c".repeat(95)));
    }
    tree
}

#[test]
fn outline_indents_two_spaces_per_level() {
    assert_eq!(render_outline(&small_tree()), "- Root\n  - A\n    - A1\n  - B\n");
}

#[test]
fn single_node_renders_one_line() {
    let tree = CanonicalTree::with_root(block("solo", "Only me"));
    assert_eq!(render_outline(&tree), "- Only me\n");
}

#[test]
fn rendering_is_idempotent() {
    let tree = wide_tree(30);
    assert_eq!(render_outline(&tree), render_outline(&tree));
}

#[test]
fn twelve_thousand_bytes_split_into_three_parts() {
    let text = render_outline(&wide_tree(119));
    assert_eq!(text.len(), 12_000);

    let parts = split_parts(&text, 5_000);
    assert_eq!(parts.len(), 3);
    assert!(parts.iter().all(|part| part.ends_with('\n')));
    assert_eq!(parts.concat(), text);

    let page = paginate(&text, 2, PageLimits::default());
    assert_eq!(page.total_parts, 3);
    assert_eq!(page.current_part, 2);
    assert_eq!(page.text, parts[1]);
}

#[rstest]
#[case(17)]
#[case(64)]
#[case(250)]
#[case(999)]
fn parts_concatenate_back_to_the_outline(#[case] ceiling: usize) {
    let mut tree = small_tree();
    for idx in 0..40 {
        let content = format!("line {idx} {}", "x".repeat(idx * 7 % 53));
        tree.push_child(tree.root(), block(&format!("n{idx}"), &content));
    }
    let text = render_outline(&tree);

    let parts = split_parts(&text, ceiling);
    assert!(parts.len() > 1);
    assert!(parts.iter().all(|part| part.len() <= ceiling && !part.is_empty()));
    assert_eq!(parts.concat(), text);
}

#[test]
fn newline_outside_the_trailing_window_forces_a_hard_cut() {
    let text = format!("ab\n{}", "z".repeat(20));
    let parts = split_parts(&text, 10);
    assert_eq!(parts[0], format!("ab\n{}", "z".repeat(7)));
    assert_eq!(parts.concat(), text);
}

#[test]
fn newline_inside_the_trailing_window_ends_the_part() {
    let text = format!("{}\n{}", "a".repeat(8), "b".repeat(8));
    let parts = split_parts(&text, 10);
    assert_eq!(parts, vec![format!("{}\n", "a".repeat(8)), "b".repeat(8)]);
}

#[test]
fn multibyte_text_is_cut_on_char_boundaries() {
    let text = "äöü€".repeat(10);
    let parts = split_parts(&text, 5);
    assert!(parts.iter().all(|part| !part.is_empty() && part.len() <= 5));
    assert_eq!(parts.concat(), text);

    // a ceiling narrower than one char still makes progress
    assert_eq!(split_parts("€€", 1), vec!["€", "€"]);
}

#[test]
fn short_and_empty_texts_are_one_part() {
    assert_eq!(split_parts("", 10), vec![""]);
    assert_eq!(split_parts("- a\n", 10), vec!["- a\n"]);

    let page = paginate("- a\n", 3, PageLimits::default());
    assert_eq!(page, PaginatedResult { text: "- a\n".to_owned(), total_parts: 1, current_part: 1 });
    assert!(!page.is_split());
}

#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(3, 3)]
#[case(4, 3)]
#[case(usize::MAX, 3)]
fn part_index_is_clamped(#[case] requested: usize, #[case] expected: usize) {
    let text = render_outline(&wide_tree(119));
    let page = paginate(&text, requested, PageLimits::default());
    assert_eq!(page.current_part, expected);
    assert!(page.is_split());
}

#[test]
fn unsplit_text_over_the_hard_cap_is_truncated() {
    let text = render_outline(&wide_tree(9));
    let limits = PageLimits { part_size: 0, hard_cap: 250 };

    let page = paginate(&text, 1, limits);
    assert_eq!(page.total_parts, 1);
    assert_eq!(page.text, format!("{}{TRUNCATION_MARKER}", &text[..250]));
}

#[test]
fn truncation_respects_char_boundaries() {
    let limits = PageLimits { part_size: 0, hard_cap: 3 };
    let page = paginate("ééé", 1, limits);
    assert_eq!(page.text, format!("é{TRUNCATION_MARKER}"));
}

#[test]
fn hard_cap_only_bites_below_the_part_size() {
    let text = render_outline(&wide_tree(9));
    assert!(text.len() > 250);

    let split = paginate(&text, 1, PageLimits { part_size: 200, hard_cap: 250 });
    assert!(split.is_split());
    assert!(!split.text.contains(TRUNCATION_MARKER));

    let capped = paginate(&text, 1, PageLimits { part_size: 10_000, hard_cap: 250 });
    assert_eq!(capped.total_parts, 1);
    assert!(capped.text.ends_with(TRUNCATION_MARKER));
}
