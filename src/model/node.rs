use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::DateBucketIndex;

/// Connected-component label. `0` means unassigned.
pub type NetworkId = u32;

pub const UNASSIGNED_NETWORK: NetworkId = 0;

/// Natural key of a node as found in the source records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Node,
    Cluster,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Node => write!(f, "node"),
            NodeKind::Cluster => write!(f, "cluster"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Default,
    Cluster,
    /// Referenced only as a link endpoint, never seen as a row of its own.
    Missing,
}

impl fmt::Display for NodeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeGroup::Default => write!(f, "default"),
            NodeGroup::Cluster => write!(f, "cluster"),
            NodeGroup::Missing => write!(f, "missing"),
        }
    }
}

/// Typed reference to a node, unique across data nodes and clusters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub id: NodeId,
}

impl NodeRef {
    pub fn node(id: NodeId) -> Self {
        Self {
            kind: NodeKind::Node,
            id,
        }
    }

    pub fn cluster(id: NodeId) -> Self {
        Self {
            kind: NodeKind::Cluster,
            id,
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub group: NodeGroup,
    pub name: String,
    /// Earliest date among every merged occurrence.
    pub date: Option<DateTime<Utc>>,
    /// Number of source rows with this node as their primary id.
    pub size: usize,
    pub network: NetworkId,
    pub number_of_targets: usize,
    pub number_of_sources: usize,
}

impl Node {
    /// A data node as first seen. Starts out `Missing` until a row names it.
    pub fn new(id: NodeId, name: Option<&str>, date: Option<DateTime<Utc>>) -> Self {
        let name = name.map(str::to_string).unwrap_or_else(|| id.0.clone());
        Self {
            id,
            kind: NodeKind::Node,
            group: NodeGroup::Missing,
            name,
            date,
            size: 0,
            network: UNASSIGNED_NETWORK,
            number_of_targets: 0,
            number_of_sources: 0,
        }
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            kind: self.kind,
            id: self.id.clone(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.kind, self.id)
    }

    pub fn merge_date(&mut self, date: Option<DateTime<Utc>>) {
        self.date = earliest(self.date, date);
    }

    /// Marks the node as observed in a row of its own. Never demotes.
    pub fn observe_row(&mut self, name: Option<&str>) {
        if self.group == NodeGroup::Missing {
            self.group = NodeGroup::Default;
            if let Some(name) = name {
                self.name = name.to_string();
            }
        }
    }
}

/// Synthetic node standing in for low-degree nodes collapsed together.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterNode {
    pub node: Node,
    pub members: Vec<Node>,
    pub date_buckets_to_node_indices: Option<DateBucketIndex>,
    /// How many members are revealed for the selected date bucket.
    pub nodes_for_selected_date_bucket: usize,
}

impl ClusterNode {
    pub fn new(id: NodeId, first: Node) -> Self {
        let node = Node {
            id,
            kind: NodeKind::Cluster,
            group: NodeGroup::Cluster,
            name: String::new(),
            date: first.date,
            size: first.size,
            network: UNASSIGNED_NETWORK,
            number_of_targets: 0,
            number_of_sources: 0,
        };
        Self {
            node,
            members: vec![first],
            date_buckets_to_node_indices: None,
            nodes_for_selected_date_bucket: 1,
        }
    }

    pub fn absorb(&mut self, member: Node) {
        self.node.size += member.size;
        self.node.merge_date(member.date);
        self.members.push(member);
        self.nodes_for_selected_date_bucket = self.members.len();
    }

    pub fn visible_members(&self) -> &[Node] {
        let end = self.nodes_for_selected_date_bucket.min(self.members.len());
        &self.members[..end]
    }
}

/// A node in the finished graph: either a data node or a cluster of them.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Standalone(Node),
    Cluster(ClusterNode),
}

impl GraphNode {
    pub fn node(&self) -> &Node {
        match self {
            GraphNode::Standalone(node) => node,
            GraphNode::Cluster(cluster) => &cluster.node,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.node().id
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.node().date
    }

    pub fn network(&self) -> NetworkId {
        self.node().network
    }

    pub fn key(&self) -> String {
        self.node().key()
    }

    pub fn node_ref(&self) -> NodeRef {
        self.node().node_ref()
    }

    pub fn as_cluster(&self) -> Option<&ClusterNode> {
        match self {
            GraphNode::Cluster(cluster) => Some(cluster),
            GraphNode::Standalone(_) => None,
        }
    }

    /// Labels the node and, for clusters, every member with the same network.
    pub fn set_network(&mut self, network: NetworkId) {
        match self {
            GraphNode::Standalone(node) => node.network = network,
            GraphNode::Cluster(cluster) => {
                cluster.node.network = network;
                for member in &mut cluster.members {
                    member.network = network;
                }
            }
        }
    }

    /// Data nodes represented by this entry: itself, or the cluster's members.
    pub fn data_nodes(&self) -> &[Node] {
        match self {
            GraphNode::Standalone(node) => std::slice::from_ref(node),
            GraphNode::Cluster(cluster) => &cluster.members,
        }
    }
}

/// Earliest-date-wins merge: the lesser of two dates, else whichever exists.
pub fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
