use super::view::GraphView;
use crate::model::{GraphNode, IndexLink};

/// What a playback position reveals of the date-sorted node and link arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFrame {
    pub bucket: Option<usize>,
    pub nodes: usize,
    pub links: usize,
}

impl GraphView {
    /// Moves playback to `bucket` (`None` shows everything) and updates how
    /// many members each cluster shows.
    pub fn select_date_bucket(&mut self, bucket: Option<usize>) -> PlaybackFrame {
        for node in &mut self.nodes {
            if let GraphNode::Cluster(cluster) = node {
                cluster.nodes_for_selected_date_bucket = match &cluster.date_buckets_to_node_indices
                {
                    Some(index) => index.revealed(bucket),
                    None => cluster.members.len(),
                };
            }
        }

        PlaybackFrame {
            bucket,
            nodes: self
                .node_buckets
                .as_ref()
                .map_or(self.nodes.len(), |index| index.revealed(bucket)),
            links: self
                .link_buckets
                .as_ref()
                .map_or(self.links.len(), |index| index.revealed(bucket)),
        }
    }

    pub fn visible_nodes(&self, frame: &PlaybackFrame) -> &[GraphNode] {
        &self.nodes[..frame.nodes.min(self.nodes.len())]
    }

    /// Revealed links whose endpoints are both revealed.
    pub fn visible_links<'a>(
        &'a self,
        frame: &PlaybackFrame,
    ) -> impl Iterator<Item = &'a IndexLink> + 'a {
        let nodes = frame.nodes;
        self.links[..frame.links.min(self.links.len())]
            .iter()
            .filter(move |l| l.source < nodes && l.target < nodes)
    }

    /// Copy of the graph holding only what `frame` reveals. Cluster members
    /// are cut to the current selection, and every bucket table is
    /// re-expressed over the entries the copy keeps.
    pub fn frame_view(&self, frame: &PlaybackFrame) -> GraphView {
        let nodes: Vec<GraphNode> = self
            .visible_nodes(frame)
            .iter()
            .map(|node| match node {
                GraphNode::Cluster(cluster) => {
                    let mut cluster = cluster.clone();
                    cluster.members.truncate(cluster.nodes_for_selected_date_bucket);
                    let kept = cluster.members.len();
                    cluster.date_buckets_to_node_indices = cluster
                        .date_buckets_to_node_indices
                        .map(|index| index.restricted(|c| c.min(kept)));
                    GraphNode::Cluster(cluster)
                }
                standalone => standalone.clone(),
            })
            .collect();

        let node_networks = nodes
            .iter()
            .flat_map(|n| n.data_nodes())
            .filter_map(|n| {
                self.node_networks
                    .get(&n.id)
                    .map(|network| (n.id.clone(), *network))
            })
            .collect();

        // kept_before[i]: visible links among the first i links.
        let revealed = frame.links.min(self.links.len());
        let mut kept_before = Vec::with_capacity(self.links.len() + 1);
        kept_before.push(0);
        for (i, link) in self.links.iter().enumerate() {
            let visible = i < revealed && link.source < frame.nodes && link.target < frame.nodes;
            let last = kept_before[i];
            kept_before.push(last + usize::from(visible));
        }
        let kept_links = |c: usize| kept_before[c.min(self.links.len())];
        let kept_nodes = nodes.len();

        GraphView {
            links: self.visible_links(frame).cloned().collect(),
            nodes,
            node_networks,
            node_buckets: self
                .node_buckets
                .as_ref()
                .map(|index| index.restricted(|c| c.min(kept_nodes))),
            link_buckets: self
                .link_buckets
                .as_ref()
                .map(|index| index.restricted(kept_links)),
            stats: self.stats.clone(),
        }
    }
}
