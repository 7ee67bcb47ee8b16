use chrono::{DateTime, Utc};

use super::node::{NetworkId, NodeRef, earliest};

/// Directed edge between two node references, prior to finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: NodeRef,
    pub target: NodeRef,
    pub date: Option<DateTime<Utc>>,
}

impl Link {
    pub fn new(source: NodeRef, target: NodeRef, date: Option<DateTime<Utc>>) -> Self {
        Self {
            source,
            target,
            date,
        }
    }

    pub fn merge_date(&mut self, date: Option<DateTime<Utc>>) {
        self.date = earliest(self.date, date);
    }
}

/// Finalized link addressing its endpoints by position in the node array.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLink {
    pub source: usize,
    pub target: usize,
    /// Occurrences across merges, including cluster member contributions.
    pub size: usize,
    pub network: NetworkId,
    pub key: String,
    pub date: Option<DateTime<Utc>>,
}

pub fn link_key(source_key: &str, target_key: &str) -> String {
    format!("{}->{}", source_key, target_key)
}
