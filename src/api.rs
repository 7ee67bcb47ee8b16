//! Library API for neon-graph.
//!
//! The pipeline itself never fails: malformed values are treated as absent
//! and an empty graph means "no data". The functions here add the fallible
//! edges around it, loading rows and configuration from disk.
//!
//! # Example
//!
//! ```no_run
//! use neon_graph::{GraphOptions, build_graph_from_path};
//! use std::path::Path;
//!
//! let graph = build_graph_from_path(Path::new("rows.json"), GraphOptions::default())?;
//! println!("{} nodes, {} links", graph.nodes.len(), graph.links.len());
//! # Ok::<(), neon_graph::NeonError>(())
//! ```

use crate::config::{Config, ConfigError, TimelineConfig};
use crate::fs::{FileSystem, default_fs};
use crate::graph::{
    BuildOptions, DateBucketizer, Granularity, GraphBuilder, GraphView, Timeline,
};
use crate::model::{Row, RowFields};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading input for a graph build.
#[derive(Debug, Error)]
pub enum NeonError {
    /// The rows file could not be found.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error while reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The rows file is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The rows file is JSON but not an array of records.
    #[error("Expected a JSON array of records, found {0}")]
    InvalidRows(String),
}

/// Overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    /// Explicit config file. Defaults to `.neon-graph.toml` next to the rows.
    pub config: Option<PathBuf>,

    pub use_node_clusters: Option<bool>,

    pub hide_nodes_with_zero_or_one_link: Option<bool>,

    /// Enables date buckets with this granularity, fitted to the data unless
    /// the config file fixes the range.
    pub granularity: Option<Granularity>,
}

impl GraphOptions {
    /// Applies the overrides that are set on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(enabled) = self.use_node_clusters {
            config.clustering.use_node_clusters = enabled;
        }
        if let Some(hide) = self.hide_nodes_with_zero_or_one_link {
            config.clustering.hide_nodes_with_zero_or_one_link = hide;
        }
        if let Some(granularity) = self.granularity {
            match config.timeline.as_mut() {
                Some(timeline) => timeline.granularity = granularity,
                None => {
                    config.timeline = Some(TimelineConfig {
                        granularity,
                        start: None,
                        end: None,
                    })
                }
            }
        }
    }
}

/// Builds a graph from rows already in memory.
pub fn build_graph(rows: &[Row], options: BuildOptions) -> GraphView {
    GraphBuilder::new(options).build(rows)
}

/// Parses a JSON array of records. Entries that are not objects are skipped.
pub fn parse_rows(json: &str) -> Result<Vec<Row>, NeonError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                other => {
                    tracing::debug!(value = %other, "skipping non-object row");
                    None
                }
            })
            .collect()),
        other => Err(NeonError::InvalidRows(json_kind(&other).to_string())),
    }
}

/// Reads rows from `path` and drops the configured text field from each.
pub fn load_rows(
    path: &Path,
    fields: &RowFields,
    fs: &dyn FileSystem,
) -> Result<Vec<Row>, NeonError> {
    if !fs.exists(path) {
        return Err(NeonError::PathNotFound(path.to_path_buf()));
    }
    let mut rows = parse_rows(&fs.read_to_string(path)?)?;
    for row in &mut rows {
        fields.strip_text_field(row);
    }
    Ok(rows)
}

/// Resolves the configuration for a rows file, then applies `options`.
pub fn resolve_config(rows_path: &Path, options: &GraphOptions) -> Result<Config, NeonError> {
    let mut config = match &options.config {
        Some(path) => Config::load_file(path)?,
        None => {
            let dir = rows_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Config::load(dir)?
        }
    };

    options.apply_to(&mut config);
    Ok(config)
}

/// Creates a builder from a resolved configuration. A timeline with both ends
/// set uses fixed buckets; otherwise buckets are fitted per build.
pub fn builder_for(config: &Config) -> GraphBuilder {
    let timeline = config.timeline.as_ref().map(|t| match (t.start, t.end) {
        (Some(start), Some(end)) => {
            Timeline::Fixed(Box::new(DateBucketizer::new(t.granularity, start, end)))
        }
        _ => Timeline::Fit(t.granularity),
    });
    GraphBuilder::new(config.build_options()).with_timeline(timeline)
}

/// Loads rows and configuration from disk and builds the graph.
pub fn build_graph_from_path(path: &Path, options: GraphOptions) -> Result<GraphView, NeonError> {
    build_graph_with_fs(path, &options, default_fs())
}

pub fn build_graph_with_fs(
    path: &Path,
    options: &GraphOptions,
    fs: &dyn FileSystem,
) -> Result<GraphView, NeonError> {
    let config = resolve_config(path, options)?;
    let rows = load_rows(path, &config.fields, fs)?;
    Ok(builder_for(&config).build(&rows))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
