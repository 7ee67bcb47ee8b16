//! Field extraction from flat query result records.
//!
//! Records are plain JSON objects. Field values that are missing or malformed
//! are treated as absent rather than rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use super::node::NodeId;

pub type Row = Map<String, Value>;

/// Names of the record keys the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub node_id: String,
    pub name: Option<String>,
    pub linked_node: Option<String>,
    pub linked_name: Option<String>,
    pub date: Option<String>,
    pub text: Option<String>,
}

impl Default for RowFields {
    fn default() -> Self {
        Self {
            node_id: "id".to_string(),
            name: Some("name".to_string()),
            linked_node: Some("links".to_string()),
            linked_name: Some("linkNames".to_string()),
            date: Some("date".to_string()),
            text: None,
        }
    }
}

impl RowFields {
    pub fn node_id(&self, row: &Row) -> Option<NodeId> {
        row.get(&self.node_id).and_then(scalar_text).map(NodeId::from)
    }

    pub fn name(&self, row: &Row) -> Option<String> {
        self.field(row, self.name.as_deref()).and_then(scalar_text)
    }

    pub fn date(&self, row: &Row) -> Option<DateTime<Utc>> {
        self.field(row, self.date.as_deref()).and_then(parse_date)
    }

    /// Linked ids in field order. Empty entries stay as `None` so that
    /// positions line up with [`RowFields::linked_names`].
    pub fn linked_ids(&self, row: &Row) -> Vec<Option<NodeId>> {
        match self.field(row, self.linked_node.as_deref()) {
            Some(value) => as_list(value)
                .into_iter()
                .map(|v| scalar_text(v).map(NodeId::from))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn linked_names(&self, row: &Row) -> Vec<Option<String>> {
        match self.field(row, self.linked_name.as_deref()) {
            Some(value) => as_list(value).into_iter().map(scalar_text).collect(),
            None => Vec::new(),
        }
    }

    /// Drops the free-text field, which the graph never reads.
    pub fn strip_text_field(&self, row: &mut Row) {
        if let Some(text) = &self.text {
            row.remove(text);
        }
    }

    fn field<'a>(&self, row: &'a Row, key: Option<&str>) -> Option<&'a Value> {
        key.and_then(|k| row.get(k))
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let parsed = match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        tracing::debug!(value = %value, "ignoring unparsable date");
    }
    parsed
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
