use crate::graph::{BuildStats, GraphView};
use crate::model::{ClusterNode, GraphNode, IndexLink, NetworkId, Node};
use crate::output::OutputFormatter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// D3 force-layout JSON: links address nodes by array position.
pub struct JsonOutput {
    pub pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonGraph<'a> {
    nodes: Vec<JsonNode<'a>>,
    links: Vec<JsonLink<'a>>,
    node_networks: BTreeMap<&'a str, NetworkId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_buckets_to_node_indices: Option<&'a [usize]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_buckets_to_link_indices: Option<&'a [usize]>,
    stats: JsonStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    id: &'a str,
    key: String,
    #[serde(rename = "type")]
    kind: String,
    group: String,
    name: &'a str,
    date: Option<DateTime<Utc>>,
    size: usize,
    network: NetworkId,
    number_of_targets: usize,
    number_of_sources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<JsonNode<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_buckets_to_node_indices: Option<&'a [usize]>,
}

#[derive(Serialize)]
struct JsonLink<'a> {
    source: usize,
    target: usize,
    size: usize,
    network: NetworkId,
    key: &'a str,
    date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStats {
    rows: usize,
    skipped_rows: usize,
    clustered_nodes: usize,
    hidden_nodes: usize,
    dropped_links: usize,
    networks: usize,
}

fn json_node(node: &Node) -> JsonNode<'_> {
    JsonNode {
        id: node.id.as_str(),
        key: node.key(),
        kind: node.kind.to_string(),
        group: node.group.to_string(),
        name: &node.name,
        date: node.date,
        size: node.size,
        network: node.network,
        number_of_targets: node.number_of_targets,
        number_of_sources: node.number_of_sources,
        nodes: None,
        date_buckets_to_node_indices: None,
    }
}

fn json_cluster(cluster: &ClusterNode) -> JsonNode<'_> {
    JsonNode {
        nodes: Some(cluster.members.iter().map(json_node).collect()),
        date_buckets_to_node_indices: cluster
            .date_buckets_to_node_indices
            .as_ref()
            .map(|index| index.counts()),
        ..json_node(&cluster.node)
    }
}

fn json_link(link: &IndexLink) -> JsonLink<'_> {
    JsonLink {
        source: link.source,
        target: link.target,
        size: link.size,
        network: link.network,
        key: &link.key,
        date: link.date,
    }
}

fn json_stats(stats: &BuildStats, graph: &GraphView) -> JsonStats {
    JsonStats {
        rows: stats.rows,
        skipped_rows: stats.skipped_rows,
        clustered_nodes: stats.clustered_nodes,
        hidden_nodes: stats.hidden_nodes,
        dropped_links: stats.dropped_links,
        networks: graph.network_sizes().keys().filter(|n| **n != 0).count(),
    }
}

impl OutputFormatter for JsonOutput {
    fn format<W: Write>(&self, graph: &GraphView, writer: &mut W) -> std::io::Result<()> {
        let json_graph = JsonGraph {
            nodes: graph
                .nodes
                .iter()
                .map(|n| match n {
                    GraphNode::Standalone(node) => json_node(node),
                    GraphNode::Cluster(cluster) => json_cluster(cluster),
                })
                .collect(),
            links: graph.links.iter().map(json_link).collect(),
            node_networks: graph
                .node_networks
                .iter()
                .map(|(id, network)| (id.as_str(), *network))
                .collect(),
            date_buckets_to_node_indices: graph.node_buckets.as_ref().map(|b| b.counts()),
            date_buckets_to_link_indices: graph.link_buckets.as_ref().map(|b| b.counts()),
            stats: json_stats(&graph.stats, graph),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&json_graph)
        } else {
            serde_json::to_string(&json_graph)
        }
        .map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)
    }
}
