use crate::graph::GraphView;
use crate::model::{GraphNode, UNASSIGNED_NETWORK};
use crate::output::OutputFormatter;
use std::io::Write;

/// Human-readable summary of a built graph.
pub struct MarkdownOutput {
    pub title: String,
    /// Bucket to report playback counts for, if any.
    pub bucket: Option<usize>,
}

impl MarkdownOutput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bucket: None,
        }
    }

    pub fn with_bucket(mut self, bucket: Option<usize>) -> Self {
        self.bucket = bucket;
        self
    }
}

impl OutputFormatter for MarkdownOutput {
    fn format<W: Write>(&self, graph: &GraphView, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# Network Graph: {}\n", self.title)?;

        if graph.is_empty() {
            writeln!(writer, "No nodes to display.")?;
            return Ok(());
        }

        let stats = &graph.stats;
        writeln!(writer, "## Summary\n")?;
        writeln!(writer, "- Rows: {} ({} skipped)", stats.rows, stats.skipped_rows)?;
        writeln!(writer, "- Nodes: {}", graph.nodes.len())?;
        writeln!(writer, "- Links: {}", graph.links.len())?;
        writeln!(writer, "- Clusters: {}", graph.cluster_count())?;
        writeln!(
            writer,
            "- Clustered nodes: {}, hidden nodes: {}",
            stats.clustered_nodes, stats.hidden_nodes
        )?;
        if stats.dropped_links > 0 {
            writeln!(writer, "- Links to removed nodes: {}", stats.dropped_links)?;
        }

        writeln!(writer, "\n## Networks\n")?;
        writeln!(writer, "| Network | Nodes |")?;
        writeln!(writer, "|---------|-------|")?;
        for (network, count) in graph.network_sizes() {
            let label = if network == UNASSIGNED_NETWORK {
                "unlinked".to_string()
            } else {
                network.to_string()
            };
            writeln!(writer, "| {} | {} |", label, count)?;
        }

        let clusters: Vec<_> = graph.nodes.iter().filter_map(GraphNode::as_cluster).collect();
        if !clusters.is_empty() {
            writeln!(writer, "\n## Clusters\n")?;
            for cluster in clusters {
                let members: Vec<_> = cluster
                    .members
                    .iter()
                    .take(5)
                    .map(|m| format!("`{}`", m.name))
                    .collect();
                let more = cluster.members.len().saturating_sub(5);
                let suffix = if more > 0 {
                    format!(" and {} more", more)
                } else {
                    String::new()
                };
                writeln!(
                    writer,
                    "- `{}` (network {}): {}{}",
                    cluster.node.key(),
                    cluster.node.network,
                    members.join(", "),
                    suffix
                )?;
            }
        }

        if let (Some(nodes), Some(links)) = (&graph.node_buckets, &graph.link_buckets) {
            writeln!(writer, "\n## Timeline\n")?;
            writeln!(writer, "| Bucket | Nodes | Links |")?;
            writeln!(writer, "|--------|-------|-------|")?;
            for (bucket, (n, l)) in nodes.counts().iter().zip(links.counts()).enumerate() {
                let marker = if self.bucket == Some(bucket) { " ←" } else { "" };
                writeln!(writer, "| {}{} | {} | {} |", bucket, marker, n, l)?;
            }
        }

        Ok(())
    }
}
