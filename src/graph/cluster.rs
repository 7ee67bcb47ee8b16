use std::collections::{HashMap, HashSet};

use super::context::{ClusterOptions, GraphBuildContext};
use super::ingest::{Adjacency, Ingested};
use crate::model::{
    ClusterNode, GraphNode, Link, Node, NodeGroup, NodeId, NodeRef, UNASSIGNED_NETWORK,
};

/// Id of the single cluster collecting nodes without any link.
pub const UNLINKED_CLUSTER_ID: &str = "0";

/// Node and link set after clustering. Links may still reference nodes that
/// were absorbed or hidden; those are dropped when the graph is finalized.
#[derive(Debug, Clone, Default)]
pub struct Clustered {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<Link>,
}

/// Which end of the cluster link the anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorSide {
    /// Members point at the anchor: cluster → anchor.
    Target,
    /// The anchor points at the members: anchor → cluster.
    Source,
}

#[derive(Default)]
struct Clusters {
    built: Vec<ClusterNode>,
    link_of: Vec<usize>,
    by_target: HashMap<NodeId, usize>,
    by_source: HashMap<NodeId, usize>,
}

impl Clusters {
    fn find(&self, side: AnchorSide, anchor: &NodeId) -> Option<usize> {
        match side {
            AnchorSide::Target => self.by_target.get(anchor).copied(),
            AnchorSide::Source => self.by_source.get(anchor).copied(),
        }
    }

    /// Puts `node` into the cluster around `anchor`, creating the cluster and
    /// its single anchor link on first use.
    fn add(
        &mut self,
        ctx: &mut GraphBuildContext,
        links: &mut Vec<Link>,
        side: AnchorSide,
        anchor: NodeId,
        node: Node,
    ) {
        ctx.stats.clustered_nodes += 1;

        if let Some(index) = self.find(side, &anchor) {
            links[self.link_of[index]].merge_date(node.date);
            self.built[index].absorb(node);
            return;
        }

        let cluster = ClusterNode::new(ctx.next_cluster_id(), node);
        let cluster_ref = cluster.node.node_ref();
        let anchor_ref = NodeRef::node(anchor.clone());
        let link = match side {
            AnchorSide::Target => Link::new(cluster_ref, anchor_ref, cluster.node.date),
            AnchorSide::Source => Link::new(anchor_ref, cluster_ref, cluster.node.date),
        };

        let index = self.built.len();
        match side {
            AnchorSide::Target => self.by_target.insert(anchor, index),
            AnchorSide::Source => self.by_source.insert(anchor, index),
        };
        self.link_of.push(links.len());
        links.push(link);
        self.built.push(cluster);
    }
}

/// Whether clustering around `anchor` would group at least two leaves.
///
/// `map` lists the anchor's neighbors on the side being clustered and
/// `reverse_map` the opposite direction. A neighbor counts as a leaf when its
/// only link is the one to the anchor and it was seen as a row of its own.
pub fn should_cluster(
    options: &ClusterOptions,
    anchor: &NodeId,
    map: &Adjacency,
    reverse_map: &Adjacency,
    missing: &HashSet<NodeId>,
) -> bool {
    if !options.use_node_clusters {
        return false;
    }

    let neighbors = map.neighbors(anchor);
    if neighbors.len() <= 1 {
        return false;
    }

    let leaves = neighbors
        .iter()
        .filter(|id| reverse_map.degree(id) == 1 && map.degree(id) == 0 && !missing.contains(*id))
        .count();
    leaves > 1
}

/// Decides per node whether to keep it, fold it into a cluster or hide it.
pub fn cluster(ctx: &mut GraphBuildContext, ingested: Ingested) -> Clustered {
    let Ingested {
        nodes,
        mut links,
        sources_to_targets,
        targets_to_sources,
        node_ids,
        ..
    } = ingested;

    let options = ctx.options;
    let hide = options.hide_nodes_with_zero_or_one_link;
    let missing: HashSet<NodeId> = nodes
        .iter()
        .filter(|n| n.group == NodeGroup::Missing)
        .map(|n| n.id.clone())
        .collect();

    let mut kept = Vec::with_capacity(nodes.len());
    let mut clusters = Clusters::default();
    let mut unlinked: Option<ClusterNode> = None;

    for mut node in nodes {
        let targets = sources_to_targets.degree(&node.id);
        let sources = targets_to_sources.degree(&node.id);
        node.number_of_targets = targets;
        node.number_of_sources = sources;

        if node.group == NodeGroup::Missing
            || targets > 1
            || sources > 1
            || (targets == 1 && sources == 1)
        {
            kept.push(GraphNode::Standalone(node));
        } else if targets == 1 {
            let anchor = sources_to_targets.neighbors(&node.id)[0].clone();
            if should_cluster(
                &options,
                &anchor,
                &targets_to_sources,
                &sources_to_targets,
                &missing,
            ) {
                clusters.add(ctx, &mut links, AnchorSide::Target, anchor, node);
            } else if hide && targets_to_sources.degree(&anchor) == 1 && node_ids.contains(&anchor)
            {
                ctx.stats.hidden_nodes += 1;
            } else {
                kept.push(GraphNode::Standalone(node));
            }
        } else if sources == 1 {
            let anchor = targets_to_sources.neighbors(&node.id)[0].clone();
            if should_cluster(
                &options,
                &anchor,
                &sources_to_targets,
                &targets_to_sources,
                &missing,
            ) {
                clusters.add(ctx, &mut links, AnchorSide::Source, anchor, node);
            } else if hide && sources_to_targets.degree(&anchor) == 1 && node_ids.contains(&anchor)
            {
                ctx.stats.hidden_nodes += 1;
            } else {
                kept.push(GraphNode::Standalone(node));
            }
        } else if hide {
            ctx.stats.hidden_nodes += 1;
        } else if options.use_node_clusters {
            ctx.stats.clustered_nodes += 1;
            match unlinked.as_mut() {
                Some(cluster) => cluster.absorb(node),
                None => unlinked = Some(ClusterNode::new(NodeId::from(UNLINKED_CLUSTER_ID), node)),
            }
        } else {
            ctx.preassigned_networks
                .insert(node.id.clone(), UNASSIGNED_NETWORK);
            kept.push(GraphNode::Standalone(node));
        }
    }

    kept.extend(clusters.built.into_iter().map(GraphNode::Cluster));
    if let Some(cluster) = unlinked {
        kept.push(GraphNode::Cluster(cluster));
    }

    tracing::debug!(
        nodes = kept.len(),
        clustered = ctx.stats.clustered_nodes,
        hidden = ctx.stats.hidden_nodes,
        "clustered graph"
    );

    Clustered { nodes: kept, links }
}
