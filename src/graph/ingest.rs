use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::model::{Link, Node, NodeId, NodeRef, Row, RowFields};

/// Append-only, deduplicated adjacency lists keyed by node id.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    lists: HashMap<NodeId, Vec<NodeId>>,
}

impl Adjacency {
    pub fn insert(&mut self, from: &NodeId, to: &NodeId) {
        let list = self.lists.entry(from.clone()).or_default();
        if !list.contains(to) {
            list.push(to.clone());
        }
    }

    pub fn neighbors(&self, id: &NodeId) -> &[NodeId] {
        self.lists.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.neighbors(id).len()
    }
}

/// Occurrence counts per source → target pair.
#[derive(Debug, Clone, Default)]
pub struct LinkSizeTable {
    counts: HashMap<NodeId, HashMap<NodeId, usize>>,
}

impl LinkSizeTable {
    pub fn increment(&mut self, source: &NodeId, target: &NodeId) {
        *self
            .counts
            .entry(source.clone())
            .or_default()
            .entry(target.clone())
            .or_insert(0) += 1;
    }

    pub fn get(&self, source: &NodeId, target: &NodeId) -> usize {
        self.counts
            .get(source)
            .and_then(|targets| targets.get(target))
            .copied()
            .unwrap_or(0)
    }
}

/// Deduplicated nodes and links plus the maps clustering works from.
#[derive(Debug, Clone, Default)]
pub struct Ingested {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub sources_to_targets: Adjacency,
    pub targets_to_sources: Adjacency,
    /// Ids seen as the primary id of at least one row.
    pub node_ids: HashSet<NodeId>,
    pub link_sizes: LinkSizeTable,
    pub skipped_rows: usize,
}

#[derive(Default)]
struct Ingester {
    out: Ingested,
    node_index: HashMap<NodeId, usize>,
    link_index: HashMap<NodeId, HashMap<NodeId, usize>>,
}

/// Builds unique nodes and links from flat result rows.
///
/// Each row with a node id yields (or grows) that node. Every id in the
/// row's link field yields a link pointing from the linked node to the
/// row's node. Self references are ignored.
pub fn ingest(rows: &[Row], fields: &RowFields) -> Ingested {
    let mut ingester = Ingester::default();
    for row in rows {
        ingester.add_row(row, fields);
    }

    let out = ingester.out;
    tracing::debug!(
        rows = rows.len(),
        skipped = out.skipped_rows,
        nodes = out.nodes.len(),
        links = out.links.len(),
        "ingested rows"
    );
    out
}

impl Ingester {
    fn add_row(&mut self, row: &Row, fields: &RowFields) {
        let Some(node_id) = fields.node_id(row) else {
            self.out.skipped_rows += 1;
            return;
        };

        let name = fields.name(row);
        let date = fields.date(row);

        let index = self.upsert_node(&node_id, name.as_deref(), date, 1);
        self.out.nodes[index].observe_row(name.as_deref());
        self.out.node_ids.insert(node_id.clone());

        let linked_names = fields.linked_names(row);
        for (position, linked_id) in fields.linked_ids(row).into_iter().enumerate() {
            let Some(linked_id) = linked_id else {
                continue;
            };
            if linked_id == node_id {
                continue;
            }

            let linked_name = linked_names.get(position).cloned().flatten();
            self.upsert_node(&linked_id, linked_name.as_deref(), date, 0);
            self.upsert_link(&linked_id, &node_id, date);
        }
    }

    fn upsert_node(
        &mut self,
        id: &NodeId,
        name: Option<&str>,
        date: Option<DateTime<Utc>>,
        increment: usize,
    ) -> usize {
        let index = match self.node_index.get(id) {
            Some(&index) => {
                self.out.nodes[index].merge_date(date);
                index
            }
            None => {
                let index = self.out.nodes.len();
                self.out.nodes.push(Node::new(id.clone(), name, date));
                self.node_index.insert(id.clone(), index);
                index
            }
        };
        self.out.nodes[index].size += increment;
        index
    }

    fn find_link(&self, source: &NodeId, target: &NodeId) -> Option<usize> {
        self.link_index
            .get(source)
            .and_then(|targets| targets.get(target))
            .copied()
    }

    fn upsert_link(&mut self, source: &NodeId, target: &NodeId, date: Option<DateTime<Utc>>) {
        self.out.sources_to_targets.insert(source, target);
        self.out.targets_to_sources.insert(target, source);

        // A pair is linked once; the first observed orientation is kept.
        let existing = self
            .find_link(source, target)
            .or_else(|| self.find_link(target, source));

        match existing {
            Some(index) => {
                let link = &mut self.out.links[index];
                link.merge_date(date);
                let (s, t) = (link.source.id.clone(), link.target.id.clone());
                self.out.link_sizes.increment(&s, &t);
            }
            None => {
                let index = self.out.links.len();
                self.out.links.push(Link::new(
                    NodeRef::node(source.clone()),
                    NodeRef::node(target.clone()),
                    date,
                ));
                self.link_index
                    .entry(source.clone())
                    .or_default()
                    .insert(target.clone(), index);
                self.out.link_sizes.increment(source, target);
            }
        }
    }
}
