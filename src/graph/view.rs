use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::buckets::DateBucketIndex;
use super::context::BuildStats;
use crate::model::{GraphNode, IndexLink, NetworkId, NodeId, UNASSIGNED_NETWORK};

/// Finished graph handed to rendering and playback.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<IndexLink>,
    /// Network of every data node, cluster members included.
    pub node_networks: HashMap<NodeId, NetworkId>,
    pub node_buckets: Option<DateBucketIndex>,
    pub link_buckets: Option<DateBucketIndex>,
    pub stats: BuildStats,
}

impl GraphView {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.as_cluster().is_some()).count()
    }

    pub fn network_of(&self, id: &NodeId) -> Option<NetworkId> {
        self.node_networks.get(id).copied()
    }

    /// Networks containing any of `ids`. Unlabeled nodes contribute nothing.
    pub fn networks_of<'a, I>(&self, ids: I) -> HashSet<NetworkId>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        ids.into_iter()
            .filter_map(|id| self.network_of(id))
            .filter(|n| *n != UNASSIGNED_NETWORK)
            .collect()
    }

    /// Positions of the nodes belonging to any of `networks`.
    pub fn nodes_in_networks(&self, networks: &HashSet<NetworkId>) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| networks.contains(&n.network()))
            .map(|(i, _)| i)
            .collect()
    }

    /// Data nodes per network, cluster members counted individually.
    pub fn network_sizes(&self) -> BTreeMap<NetworkId, usize> {
        let mut sizes = BTreeMap::new();
        for network in self.node_networks.values() {
            *sizes.entry(*network).or_insert(0) += 1;
        }
        sizes
    }

    /// Exports the graph with node keys as weights and link sizes on edges.
    pub fn to_digraph(&self) -> DiGraph<String, usize> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.links.len());
        let indices: Vec<NodeIndex> = self
            .nodes
            .iter()
            .map(|n| graph.add_node(n.key()))
            .collect();
        for link in &self.links {
            graph.add_edge(indices[link.source], indices[link.target], link.size);
        }
        graph
    }
}
