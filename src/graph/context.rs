use std::collections::HashMap;

use crate::model::{NetworkId, NodeId};

/// Settings that decide which low-degree nodes are clustered or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterOptions {
    pub use_node_clusters: bool,
    pub hide_nodes_with_zero_or_one_link: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            use_node_clusters: true,
            hide_nodes_with_zero_or_one_link: false,
        }
    }
}

/// Counts gathered while building, reported alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub rows: usize,
    pub skipped_rows: usize,
    pub clustered_nodes: usize,
    pub hidden_nodes: usize,
    pub dropped_links: usize,
    pub networks_created: usize,
    pub networks_merged: usize,
}

/// Mutable state threaded through one rebuild of the graph.
///
/// A fresh context is created per build, so cluster and network ids start
/// over every time.
#[derive(Debug, Clone)]
pub struct GraphBuildContext {
    pub options: ClusterOptions,
    pub stats: BuildStats,
    next_cluster_id: u64,
    next_network_id: NetworkId,
    /// Network ids registered before the labeling walk (zero-degree nodes).
    pub(crate) preassigned_networks: HashMap<NodeId, NetworkId>,
}

impl GraphBuildContext {
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            options,
            stats: BuildStats::default(),
            next_cluster_id: 1,
            next_network_id: 1,
            preassigned_networks: HashMap::new(),
        }
    }

    pub(crate) fn next_cluster_id(&mut self) -> NodeId {
        let id = self.next_cluster_id;
        self.next_cluster_id += 1;
        NodeId::new(id.to_string())
    }

    pub(crate) fn next_network_id(&mut self) -> NetworkId {
        let id = self.next_network_id;
        self.next_network_id += 1;
        self.stats.networks_created += 1;
        id
    }
}
