// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::graph::{GraphError, MemoryGraph};
use crate::schedule::{BackoffPolicy, QuotaConfig};

fn scheduler() -> Scheduler {
    Scheduler::new(
        QuotaConfig { min_spacing: Duration::ZERO, ..QuotaConfig::default() },
        BackoffPolicy::new(Duration::from_millis(10), 2),
    )
}

fn graph() -> MemoryGraph {
    MemoryGraph::new()
        .with_page("page", "Notes")
        .with_page("other-page", "Elsewhere")
        .with_block("page", "root", "Root", 0)
        .with_block("root", "two", "Two", 2)
        .with_block("root", "one", "One", 1)
        .with_block("one", "nested", "Nested", 0)
        .with_block("page", "top", "Top level", 1)
        .with_block("page", "quote", "See ((one))", 2)
}

fn service_with(graph: Arc<MemoryGraph>, settings: TraversalSettings) -> HierarchyService {
    HierarchyService::new(graph, scheduler(), settings)
}

fn service() -> HierarchyService {
    service_with(Arc::new(graph()), TraversalSettings::default())
}

fn descendants_of(uid: &str, max_depth: i64) -> HierarchyRequest {
    HierarchyRequest {
        parent_uid: Some(uid.to_owned()),
        max_depth: Some(max_depth),
        ..HierarchyRequest::default()
    }
}

fn ancestors_of(uid: &str, max_depth: i64) -> HierarchyRequest {
    HierarchyRequest {
        child_uid: Some(uid.to_owned()),
        max_depth: Some(max_depth),
        ..HierarchyRequest::default()
    }
}

#[tokio::test(start_paused = true)]
async fn block_without_parent_is_a_single_line() {
    let response = service().search_hierarchy(ancestors_of("top", 3)).await;

    assert!(response.success, "{}", response.message);
    assert_eq!(response.content.as_deref(), Some("- Top level\n"));
    assert_eq!(response.total_blocks_found, Some(1));
    assert_eq!(response.total_parts, None);
    assert_eq!(response.current_part, None);
}

#[tokio::test(start_paused = true)]
async fn children_render_in_order_under_the_root() {
    let response = service().search_hierarchy(descendants_of("root", 2)).await;

    assert!(response.success, "{}", response.message);
    assert_eq!(response.content.as_deref(), Some("- Root\n  - One\n    - Nested\n  - Two\n"));
    assert_eq!(response.total_blocks_found, Some(4));
    assert!(response.message.starts_with("Found 4 blocks"), "{}", response.message);
}

#[tokio::test(start_paused = true)]
async fn depth_defaults_to_one() {
    let request = HierarchyRequest { parent_uid: Some("root".to_owned()), ..Default::default() };
    let response = service().search_hierarchy(request).await;
    assert_eq!(response.content.as_deref(), Some("- Root\n  - One\n  - Two\n"));
}

#[tokio::test(start_paused = true)]
async fn ancestors_render_farthest_first() {
    let response = service().search_hierarchy(ancestors_of("nested", 5)).await;
    assert_eq!(response.content.as_deref(), Some("- Root\n  - One\n    - Nested\n"));
    assert_eq!(response.total_blocks_found, Some(3));
}

#[rstest]
#[case(HierarchyRequest::default(), "either parent_uid or child_uid")]
#[case(
    HierarchyRequest {
        parent_uid: Some("  ".to_owned()),
        child_uid: Some(String::new()),
        ..HierarchyRequest::default()
    },
    "either parent_uid or child_uid"
)]
#[case(
    HierarchyRequest {
        parent_uid: Some("root".to_owned()),
        child_uid: Some("top".to_owned()),
        ..HierarchyRequest::default()
    },
    "only one of"
)]
#[tokio::test(start_paused = true)]
async fn anchors_are_validated(#[case] request: HierarchyRequest, #[case] expected: &str) {
    let graph = Arc::new(graph());
    let response = service_with(Arc::clone(&graph), TraversalSettings::default())
        .search_hierarchy(request)
        .await;

    assert!(!response.success);
    assert_eq!(response.matches, Some(Vec::new()));
    assert!(response.message.contains(expected), "{}", response.message);
    assert_eq!(graph.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn failures_serialize_to_the_failure_shape() {
    let response = service().search_hierarchy(descendants_of("ghost", 1)).await;

    assert_eq!(
        serde_json::to_value(&response).expect("serialize"),
        json!({ "success": false, "matches": [], "message": "block ghost not found" })
    );
}

#[rstest]
#[case("Notes", true)]
#[case("page", true)]
#[case("Elsewhere", false)]
#[case("Missing", false)]
#[tokio::test(start_paused = true)]
async fn page_scope_restricts_the_anchor(#[case] page: &str, #[case] found: bool) {
    let request =
        HierarchyRequest { page_title_uid: Some(page.to_owned()), ..descendants_of("one", 1) };
    let response = service().search_hierarchy(request).await;
    assert_eq!(response.success, found, "{}", response.message);
}

#[tokio::test(start_paused = true)]
async fn block_refs_are_inlined_unless_disabled() {
    let resolved = service().search_hierarchy(ancestors_of("quote", 1)).await;
    assert_eq!(resolved.content.as_deref(), Some("- See One\n"));

    let settings = TraversalSettings { resolve_refs: false, ..TraversalSettings::default() };
    let plain = service_with(Arc::new(graph()), settings)
        .search_hierarchy(ancestors_of("quote", 1))
        .await;
    assert_eq!(plain.content.as_deref(), Some("- See ((one))\n"));
}

#[rstest]
#[case(Some(1), 1)]
#[case(Some(2), 2)]
#[case(Some(99), 3)]
#[case(Some(-4), 1)]
#[case(None, 1)]
#[tokio::test(start_paused = true)]
async fn oversized_outlines_are_split(#[case] part: Option<i64>, #[case] expected: usize) {
    // "- Root\n  - One\n    - Nested\n  - Two\n": 7 + 8 + 13 + 8 bytes
    let settings = TraversalSettings {
        limits: PageLimits { part_size: 15, ..PageLimits::default() },
        ..TraversalSettings::default()
    };
    let service = service_with(Arc::new(graph()), settings);
    let request = HierarchyRequest { part, ..descendants_of("root", 2) };

    let response = service.search_hierarchy(request).await;
    assert!(response.success, "{}", response.message);
    assert_eq!(response.total_parts, Some(3));
    assert_eq!(response.current_part, Some(expected));
    assert_eq!(response.total_blocks_found, Some(4));
    assert!(response.message.contains(&format!("part {expected} of 3")), "{}", response.message);

    let part_text = ["- Root\n  - One\n", "    - Nested\n", "  - Two\n"][expected - 1];
    assert_eq!(response.content.as_deref(), Some(part_text));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_are_reported_not_raised() {
    let graph = Arc::new(graph());
    let service = service_with(Arc::clone(&graph), TraversalSettings::default());
    for _ in 0..2 {
        graph.fail_next(GraphError::Status {
            status: 429,
            body: "Too many requests".to_owned(),
        });
    }

    let response = service.search_hierarchy(descendants_of("root", 1)).await;
    assert!(!response.success);
    assert!(response.message.contains("after 2 attempts"), "{}", response.message);
}

#[tokio::test(start_paused = true)]
async fn fetch_with_children_defaults_to_four_levels() {
    let mut graph = MemoryGraph::new().with_page("page", "Chain");
    let mut parent = "page".to_owned();
    for level in 0..7 {
        let uid = format!("n{level}");
        graph = graph.with_block(&parent, &uid, &format!("level {level}"), 0);
        parent = uid;
    }
    let service = service_with(Arc::new(graph), TraversalSettings::default());

    let tree = service.fetch_block_with_children("n0", None).await.expect("tree");
    assert_eq!(tree.len(), DEFAULT_FETCH_DEPTH + 1);
    assert_eq!(tree.max_depth(), DEFAULT_FETCH_DEPTH);

    let shallow = service.fetch_block_with_children("n0", Some(1)).await.expect("tree");
    assert_eq!(shallow.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_with_children_reports_typed_errors() {
    let service = service();

    let err = service.fetch_block_with_children(" ", None).await.expect_err("empty uid");
    assert!(matches!(err, HierarchyError::InvalidRequest(_)));

    let err = service.fetch_block_with_children("ghost", None).await.expect_err("missing");
    assert!(matches!(err, HierarchyError::Traversal(TraversalError::NotFound(_))));
}

#[test]
fn requests_accept_missing_fields() {
    let request: HierarchyRequest =
        serde_json::from_value(json!({ "child_uid": "abc" })).expect("request");
    assert_eq!(request.child_uid.as_deref(), Some("abc"));
    assert_eq!(request.max_depth, None);
    assert_eq!(request.part, None);
}
