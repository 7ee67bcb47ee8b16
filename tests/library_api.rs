//! Integration tests for the neon-graph library API.

use chrono::{TimeZone, Utc};
use neon_graph::model::{NodeGroup, NodeKind};
use neon_graph::{
    BuildOptions, ClusterOptions, DateBucketizer, Granularity, GraphBuilder, GraphOptions,
    GraphView, NeonError, NodeId, Row, build_graph, build_graph_from_path, parse_rows,
};
use petgraph::algo::connected_components;
use std::collections::HashSet;
use std::path::Path;

fn rows(json: &str) -> Vec<Row> {
    parse_rows(json).unwrap()
}

fn options(use_node_clusters: bool, hide: bool) -> BuildOptions {
    BuildOptions {
        clustering: ClusterOptions {
            use_node_clusters,
            hide_nodes_with_zero_or_one_link: hide,
        },
        ..BuildOptions::default()
    }
}

fn ids(graph: &GraphView) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id().as_str()).collect()
}

#[test]
fn test_repeated_rows_merge_into_one_node() {
    let graph = build_graph(
        &rows(r#"[{"id": "a"}, {"id": "a"}, {"id": "a"}]"#),
        options(false, false),
    );

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].node().size, 3);
    assert_eq!(graph.stats.rows, 3);
}

#[test]
fn test_self_reference_never_links() {
    let graph = build_graph(
        &rows(r#"[{"id": "a", "links": ["a", "b"]}]"#),
        options(false, false),
    );

    assert_eq!(graph.links.len(), 1);
    assert!(graph.links.iter().all(|l| l.source != l.target));
}

#[test]
fn test_earliest_date_wins() {
    let graph = build_graph(
        &rows(
            r#"[
                {"id": "a", "date": "2024-03-01"},
                {"id": "a", "date": "2024-01-15"},
                {"id": "a"}
            ]"#,
        ),
        options(false, false),
    );

    let expected = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    assert_eq!(graph.nodes[0].date(), Some(expected));
}

#[test]
fn test_leaves_fold_into_one_cluster() {
    let graph = build_graph(
        &rows(
            r#"[
                {"id": "A", "links": "B"},
                {"id": "A", "links": "C"},
                {"id": "B"},
                {"id": "C"}
            ]"#,
        ),
        BuildOptions::default(),
    );

    assert_eq!(graph.cluster_count(), 1);
    let cluster = graph.nodes.iter().find_map(|n| n.as_cluster()).unwrap();
    let members: HashSet<_> = cluster.members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(members, HashSet::from(["B", "C"]));

    assert_eq!(graph.links.len(), 1);
    let link = &graph.links[0];
    assert_eq!(graph.nodes[link.source].kind(), NodeKind::Cluster);
    assert_eq!(graph.nodes[link.target].id().as_str(), "A");
    assert_eq!(link.size, 2);
}

#[test]
fn test_single_shared_leaf_is_not_clustered() {
    let graph = build_graph(
        &rows(
            r#"[
                {"id": "A", "links": ["B", "C"]},
                {"id": "B"},
                {"id": "C", "links": ["D", "E"]}
            ]"#,
        ),
        BuildOptions::default(),
    );

    assert_eq!(graph.cluster_count(), 0);
    assert!(ids(&graph).contains(&"B"));
}

#[test]
fn test_mutual_links_share_one_edge_and_network() {
    let graph = build_graph(
        &rows(r#"[{"id": "A", "links": ["B"]}, {"id": "B", "links": ["A"]}]"#),
        BuildOptions::default(),
    );

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.links.len(), 1);
    let a = graph.network_of(&NodeId::from("A")).unwrap();
    let b = graph.network_of(&NodeId::from("B")).unwrap();
    assert_ne!(a, 0);
    assert_eq!(a, b);
    assert_eq!(graph.links[0].size, 2);
}

#[test]
fn test_hidden_isolated_node_leaves_empty_graph() {
    let graph = build_graph(&rows(r#"[{"id": "lonely"}]"#), options(true, true));

    assert!(graph.is_empty());
    assert!(graph.links.is_empty());
    assert_eq!(graph.stats.hidden_nodes, 1);
}

#[test]
fn test_networks_match_connected_components() {
    let graph = build_graph(
        &rows(
            r#"[
                {"id": "x", "links": "y"},
                {"id": "z", "links": "w"},
                {"id": "w", "links": "y"},
                {"id": "p", "links": "q"}
            ]"#,
        ),
        BuildOptions::default(),
    );

    for link in &graph.links {
        let source = graph.nodes[link.source].network();
        assert_eq!(source, graph.nodes[link.target].network());
        assert_eq!(source, link.network);
    }

    let labels: HashSet<_> = graph.nodes.iter().map(|n| n.network()).collect();
    assert!(!labels.contains(&0));
    assert_eq!(labels.len(), connected_components(&graph.to_digraph()));
    assert_eq!(labels.len(), 2);
}

#[test]
fn test_two_date_groups_split_buckets() {
    let bucketizer = DateBucketizer::new(
        Granularity::Day,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    );
    let graph = GraphBuilder::default().with_bucketizer(bucketizer).build(&rows(
        r#"[
            {"id": "a", "links": "b", "date": "2024-01-01"},
            {"id": "c", "links": "d", "date": "2024-01-02"}
        ]"#,
    ));

    let nodes = graph.node_buckets.as_ref().unwrap();
    assert_eq!(nodes.counts(), &[2, 4]);
    let links = graph.link_buckets.as_ref().unwrap();
    assert_eq!(links.counts(), &[1, 2]);
}

#[test]
fn test_bucket_counts_never_decrease() {
    let graph = GraphBuilder::new(options(false, false))
        .with_fitted_timeline(Granularity::Month)
        .build(&rows(
            r#"[
                {"id": "a", "links": "b", "date": "2024-01-10"},
                {"id": "c", "links": "d", "date": "2024-04-02"},
                {"id": "e", "date": "2024-04-20"},
                {"id": "f", "links": "a", "date": "2024-09-30"},
                {"id": "g"}
            ]"#,
        ));

    for index in [&graph.node_buckets, &graph.link_buckets] {
        let index = index.as_ref().unwrap();
        assert_eq!(index.num_buckets(), 9);
        assert!(index.counts().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(index.counts().last().copied(), Some(index.total()));
    }
}

#[test]
fn test_build_from_path_reads_config() {
    let dir = tempfile::tempdir().unwrap();
    let rows_path = dir.path().join("rows.json");
    std::fs::write(
        &rows_path,
        r#"[{"key": "a", "to": ["b", "c"]}, {"key": "b"}, {"key": "c"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join(".neon-graph.toml"),
        "[fields]\nnode_id = \"key\"\nlinked_node = \"to\"\n\n[clustering]\nuse_node_clusters = false\n",
    )
    .unwrap();

    let graph = build_graph_from_path(&rows_path, GraphOptions::default()).unwrap();
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.links.len(), 2);

    let clustered = build_graph_from_path(
        &rows_path,
        GraphOptions {
            use_node_clusters: Some(true),
            ..GraphOptions::default()
        },
    )
    .unwrap();
    assert_eq!(clustered.cluster_count(), 1);
}

#[test]
fn test_build_from_path_with_granularity() {
    let dir = tempfile::tempdir().unwrap();
    let rows_path = dir.path().join("rows.json");
    std::fs::write(
        &rows_path,
        r#"[{"id": "a", "links": "b", "date": "2023-05-01"}, {"id": "c", "links": "d", "date": "2024-02-01"}]"#,
    )
    .unwrap();

    let graph = build_graph_from_path(
        &rows_path,
        GraphOptions {
            granularity: Some(Granularity::Year),
            ..GraphOptions::default()
        },
    )
    .unwrap();

    assert_eq!(graph.node_buckets.unwrap().counts(), &[2, 4]);
}

#[test]
fn test_build_from_invalid_path() {
    let result = build_graph_from_path(Path::new("/nonexistent/rows.json"), GraphOptions::default());

    match result {
        Err(NeonError::PathNotFound(_)) => {}
        Err(e) => panic!("Expected PathNotFound error, got: {:?}", e),
        Ok(_) => panic!("Expected error for invalid path"),
    }
}

#[test]
fn test_link_only_leaves_stay_standalone() {
    let graph = build_graph(
        &rows(r#"[{"id": "A", "links": "B"}, {"id": "A", "links": "C"}]"#),
        BuildOptions::default(),
    );

    assert_eq!(graph.cluster_count(), 0);
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.links.len(), 2);
    for id in ["B", "C"] {
        let node = graph.nodes.iter().find(|n| n.id().as_str() == id).unwrap();
        assert_eq!(node.kind(), NodeKind::Node);
        assert_eq!(node.node().group, NodeGroup::Missing);
    }
}
