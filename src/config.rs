use crate::graph::{BuildOptions, ClusterOptions, Granularity};
use crate::model::RowFields;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".neon-graph.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub fields: RowFields,
    pub clustering: ClusterOptions,
    pub timeline: Option<TimelineConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineConfig {
    pub granularity: Granularity,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    fields: Option<RawFields>,
    clustering: Option<RawClustering>,
    timeline: Option<RawTimeline>,
}

#[derive(Debug, Deserialize)]
struct RawFields {
    node_id: Option<String>,
    name: Option<String>,
    linked_node: Option<String>,
    linked_name: Option<String>,
    date: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawClustering {
    use_node_clusters: Option<bool>,
    hide_nodes_with_zero_or_one_link: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawTimeline {
    granularity: Option<Granularity>,
    start: Option<String>,
    end: Option<String>,
}

impl Config {
    /// Loads `.neon-graph.toml` from `dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_file(&config_path)
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = RowFields::default();

        let fields = match raw.fields {
            // An explicitly configured table only reads the keys it names.
            Some(f) => RowFields {
                node_id: f.node_id.unwrap_or(defaults.node_id),
                name: f.name,
                linked_node: f.linked_node,
                linked_name: f.linked_name,
                date: f.date,
                text: f.text,
            },
            None => defaults,
        };

        let clustering = match raw.clustering {
            Some(c) => {
                let base = ClusterOptions::default();
                ClusterOptions {
                    use_node_clusters: c.use_node_clusters.unwrap_or(base.use_node_clusters),
                    hide_nodes_with_zero_or_one_link: c
                        .hide_nodes_with_zero_or_one_link
                        .unwrap_or(base.hide_nodes_with_zero_or_one_link),
                }
            }
            None => ClusterOptions::default(),
        };

        let timeline = match raw.timeline {
            Some(t) => Some(TimelineConfig {
                granularity: t.granularity.unwrap_or_default(),
                start: t.start.as_deref().map(parse_config_date).transpose()?,
                end: t.end.as_deref().map(parse_config_date).transpose()?,
            }),
            None => None,
        };

        Ok(Self {
            fields,
            clustering,
            timeline,
        })
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            fields: self.fields.clone(),
            clustering: self.clustering,
        }
    }
}

fn parse_config_date(s: &str) -> Result<DateTime<Utc>, ConfigError> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ConfigError::Invalid(format!("unrecognized date '{}'", s)))
}

/// Starter configuration written by `neon-graph init`.
pub fn generate_config_template() -> String {
    r#"# neon-graph configuration

[fields]
# Record key holding each row's node id (required)
node_id = "id"
# Display name of the row's node
name = "name"
# Ids the row's node is linked from (scalar or array)
linked_node = "links"
# Names for the linked ids, aligned by position
linked_name = "linkNames"
# Date used for ordering and playback
date = "date"
# Free-text field dropped before building
# text = "text"

[clustering]
use_node_clusters = true
hide_nodes_with_zero_or_one_link = false

# [timeline]
# granularity = "day"   # day | month | year
# start = "2024-01-01"  # fitted to the data when omitted
# end = "2024-12-31"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_template_parses() {
        let config = Config::parse(&generate_config_template()).unwrap();
        assert_eq!(config.fields.node_id, "id");
        assert_eq!(config.fields.linked_node.as_deref(), Some("links"));
        assert_eq!(config.fields.text, None);
        assert!(config.clustering.use_node_clusters);
        assert!(config.timeline.is_none());
    }

    #[test]
    fn test_partial_fields_table() {
        let config = Config::parse(
            r#"
            [fields]
            node_id = "user"
            linked_node = "mentions"
            "#,
        )
        .unwrap();

        assert_eq!(config.fields.node_id, "user");
        assert_eq!(config.fields.linked_node.as_deref(), Some("mentions"));
        assert_eq!(config.fields.name, None);
    }

    #[test]
    fn test_timeline_section() {
        let config = Config::parse(
            r#"
            [clustering]
            hide_nodes_with_zero_or_one_link = true

            [timeline]
            granularity = "month"
            start = "2024-01-01"
            "#,
        )
        .unwrap();

        assert!(config.clustering.hide_nodes_with_zero_or_one_link);
        assert!(config.clustering.use_node_clusters);
        let timeline = config.timeline.unwrap();
        assert_eq!(timeline.granularity, Granularity::Month);
        assert_eq!(
            timeline.start,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(timeline.end, None);
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Config::parse("[timeline]\nstart = \"soon\"\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_toml_rejected() {
        let result = Config::parse("[fields\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[clustering]\nuse_node_clusters = false\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(!config.clustering.use_node_clusters);
    }
}
