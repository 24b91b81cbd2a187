// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Roamwalk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Roamwalk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use roamwalk::graph::MemoryGraph;
use roamwalk::hierarchy::{HierarchyRequest, HierarchyService, TraversalSettings};
use roamwalk::render::PageLimits;
use roamwalk::schedule::{BackoffPolicy, QuotaConfig, Scheduler};
use roamwalk::tree::Strategy;

/// A page with one root block, 60 children and 2 grandchildren each; every line is 100 bytes.
fn large_graph() -> MemoryGraph {
    let mut graph =
        MemoryGraph::new().with_page("page", "Large").with_block("page", "root", &"r".repeat(97), 0);
    for child in 0..60 {
        let uid = format!("c{child:02}");
        // reversed orders: the outline must come back sorted
        graph = graph.with_block("root", &uid, &format!("{uid}{}", "c".repeat(92)), 60 - child);
        for leaf in 0..2 {
            let leaf_uid = format!("{uid}-{leaf}");
            graph = graph.with_block(&uid, &leaf_uid, &format!("{leaf_uid}{}", "l".repeat(88)), leaf);
        }
    }
    graph
}

fn service(graph: Arc<MemoryGraph>, settings: TraversalSettings) -> HierarchyService {
    HierarchyService::new(graph, Scheduler::new(QuotaConfig::default(), BackoffPolicy::default()), settings)
}

fn request(part: i64) -> HierarchyRequest {
    HierarchyRequest {
        parent_uid: Some("root".to_owned()),
        page_title_uid: Some("Large".to_owned()),
        max_depth: Some(2),
        part: Some(part),
        ..HierarchyRequest::default()
    }
}

#[tokio::test(start_paused = true)]
async fn parts_reassemble_the_full_outline() {
    let graph = Arc::new(large_graph());
    let unsplit = TraversalSettings {
        limits: PageLimits { part_size: 0, ..PageLimits::default() },
        ..TraversalSettings::default()
    };
    let full = service(Arc::clone(&graph), unsplit).search_hierarchy(request(1)).await;
    let full_text = full.content.expect("content");
    assert_eq!(full.total_blocks_found, Some(181));
    assert_eq!(full_text.len(), 18_100);

    let paged = service(Arc::clone(&graph), TraversalSettings::default());
    let first = paged.search_hierarchy(request(1)).await;
    let total = first.total_parts.expect("split");
    assert_eq!(total, 4);

    let mut joined = String::new();
    for part in 1..=total {
        let response = paged.search_hierarchy(request(part as i64)).await;
        assert_eq!(response.current_part, Some(part));
        assert_eq!(response.total_blocks_found, Some(181));
        let text = response.content.expect("content");
        assert!(text.ends_with('\n'));
        joined.push_str(&text);
    }
    assert_eq!(joined, full_text);

    let lines = full_text.lines().take(4).map(|line| &line[..9]).collect::<Vec<_>>();
    assert_eq!(lines, vec!["- rrrrrrr", "  - c59cc", "    - c59", "    - c59"]);
}

#[tokio::test(start_paused = true)]
async fn both_strategies_render_the_same_outline() {
    let graph = Arc::new(large_graph());
    let mut outlines = Vec::new();
    for strategy in [Strategy::Nested, Strategy::LevelByLevel] {
        let settings = TraversalSettings {
            strategy,
            limits: PageLimits { part_size: 0, ..PageLimits::default() },
            ..TraversalSettings::default()
        };
        let response = service(Arc::clone(&graph), settings).search_hierarchy(request(1)).await;
        assert!(response.success, "{}", response.message);
        outlines.push(response.content.expect("content"));
    }
    assert_eq!(outlines[0], outlines[1]);
}

#[tokio::test(start_paused = true)]
async fn concurrent_searches_share_one_paced_quota() {
    let graph = Arc::new(large_graph());
    let service = service(graph.clone(), TraversalSettings::default());
    let other = service.clone();

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        service.search_hierarchy(request(1)),
        other.search_hierarchy(HierarchyRequest {
            child_uid: Some("c07-1".to_owned()),
            max_depth: Some(3),
            ..HierarchyRequest::default()
        }),
    );
    assert!(a.success && b.success);
    assert_eq!(b.content.as_deref().map(|text| text.lines().count()), Some(3));

    // every query is spaced at least 200ms from the previous one
    let calls = graph.calls() as u32;
    assert!(calls >= 5, "{calls}");
    assert!(started.elapsed() >= Duration::from_millis(200) * (calls - 1));
}
