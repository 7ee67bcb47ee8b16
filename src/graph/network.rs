use std::collections::HashMap;

use super::context::GraphBuildContext;
use super::ingest::LinkSizeTable;
use crate::model::{
    GraphNode, IndexLink, Link, NetworkId, NodeId, NodeKind, NodeRef, UNASSIGNED_NETWORK,
    link_key,
};

/// Converts links to index form and labels every node with its network.
///
/// Links are walked once in order. A link between two unlabeled nodes opens
/// a new network, a link touching one labeled node extends that network, and
/// a link joining two different networks relabels the target's network to
/// the source's everywhere it was already used. Links whose endpoints are no
/// longer in `nodes` are dropped.
pub fn finalize(
    ctx: &mut GraphBuildContext,
    nodes: &mut [GraphNode],
    links: &[Link],
    sizes: &LinkSizeTable,
) -> Vec<IndexLink> {
    let positions: HashMap<NodeRef, usize> = nodes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, n)| (n.node_ref(), i))
        .collect();

    let mut networks: Vec<NetworkId> = nodes.iter().map(GraphNode::network).collect();
    let mut index_links: Vec<IndexLink> = Vec::with_capacity(links.len());

    for link in links {
        let (Some(&source), Some(&target)) =
            (positions.get(&link.source), positions.get(&link.target))
        else {
            ctx.stats.dropped_links += 1;
            continue;
        };

        match (networks[source], networks[target]) {
            (UNASSIGNED_NETWORK, UNASSIGNED_NETWORK) => {
                let id = ctx.next_network_id();
                networks[source] = id;
                networks[target] = id;
            }
            (id, UNASSIGNED_NETWORK) => networks[target] = id,
            (UNASSIGNED_NETWORK, id) => networks[source] = id,
            (kept, replaced) if kept != replaced => {
                ctx.stats.networks_merged += 1;
                for network in networks.iter_mut().filter(|n| **n == replaced) {
                    *network = kept;
                }
                for done in index_links.iter_mut().filter(|l| l.network == replaced) {
                    done.network = kept;
                }
            }
            _ => {}
        }

        index_links.push(IndexLink {
            source,
            target,
            size: link_size(&nodes[source], &nodes[target], sizes),
            network: networks[source],
            key: link_key(&nodes[source].key(), &nodes[target].key()),
            date: link.date,
        });
    }

    for (node, network) in nodes.iter_mut().zip(networks) {
        node.set_network(network);
    }

    tracing::debug!(
        links = index_links.len(),
        dropped = ctx.stats.dropped_links,
        networks = ctx.stats.networks_created,
        merged = ctx.stats.networks_merged,
        "labeled networks"
    );

    index_links
}

/// Occurrences behind a finalized link.
///
/// A cluster endpoint adds the counts between each of its members and the
/// other endpoint. When both ends are clusters only the source's members are
/// counted.
pub fn link_size(source: &GraphNode, target: &GraphNode, sizes: &LinkSizeTable) -> usize {
    let mut size = 0;
    if source.kind() == NodeKind::Node && target.kind() == NodeKind::Node {
        size += sizes.get(source.id(), target.id());
    }

    if let GraphNode::Cluster(cluster) = source {
        size += cluster
            .members
            .iter()
            .map(|m| sizes.get(&m.id, target.id()))
            .sum::<usize>();
    } else if let GraphNode::Cluster(cluster) = target {
        size += cluster
            .members
            .iter()
            .map(|m| sizes.get(source.id(), &m.id))
            .sum::<usize>();
    }

    size
}

/// Data node id → network id, covering cluster members and the nodes given
/// a network before the walk.
pub fn node_networks(
    ctx: &GraphBuildContext,
    nodes: &[GraphNode],
) -> HashMap<NodeId, NetworkId> {
    let mut map = ctx.preassigned_networks.clone();
    for node in nodes {
        let network = node.network();
        for data_node in node.data_nodes() {
            map.insert(data_node.id.clone(), network);
        }
    }
    map
}
