mod link;
mod node;
mod row;

pub use link::{IndexLink, Link, link_key};
pub use node::{
    ClusterNode, GraphNode, NetworkId, Node, NodeGroup, NodeId, NodeKind, NodeRef,
    UNASSIGNED_NETWORK, earliest,
};
pub use row::{Row, RowFields};
