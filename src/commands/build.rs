use crate::api::{builder_for, load_rows};
use crate::cli::{BuildArgs, OutputFormat};
use crate::fs::{FileSystem, default_fs};
use crate::graph::GraphView;
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter};
use crate::style;
use std::io::{self, Write};

use super::CommandContext;

pub fn cmd_build(args: BuildArgs) -> i32 {
    cmd_build_with_fs(args, default_fs())
}

pub fn cmd_build_with_fs(args: BuildArgs, fs: &dyn FileSystem) -> i32 {
    let ctx = match CommandContext::new(&args, fs) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let rows = match load_rows(&ctx.rows, &ctx.config.fields, fs) {
        Ok(rows) => rows,
        Err(e) => {
            style::error(&format!("Could not read rows: {}", e));
            return 1;
        }
    };

    let mut graph = builder_for(&ctx.config).build(&rows);
    tracing::debug!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        clusters = graph.cluster_count(),
        "graph built"
    );

    if graph.is_empty() {
        style::warning("No nodes to display.");
    }

    if let Some(bucket) = args.bucket {
        graph = select_bucket(graph, bucket);
    }

    let mut buffer = Vec::new();
    let format_result = match args.format {
        OutputFormat::Json => JsonOutput::new().format(&graph, &mut buffer),
        OutputFormat::Markdown => {
            let title = ctx
                .rows
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "rows".to_string());
            MarkdownOutput::new(title)
                .with_bucket(args.bucket)
                .format(&graph, &mut buffer)
        }
    };

    if let Err(e) = format_result {
        style::error(&format!("Failed to format output: {}", e));
        return 1;
    }

    let output_str = String::from_utf8_lossy(&buffer);
    let write_result = match &args.output {
        Some(output_path) => fs.write(output_path, &output_str).map(|()| {
            style::success(&format!("Wrote graph to {}", style::path(output_path)));
            if args.verbose {
                style::section("Graph");
                eprintln!("{}", style::metric("nodes", graph.nodes.len()));
                eprintln!("{}", style::metric("links", graph.links.len()));
                eprintln!("{}", style::metric("clusters", graph.cluster_count()));
            }
        }),
        None => write!(io::stdout(), "{}", output_str),
    };

    if let Err(e) = write_result {
        style::error(&format!("Failed to write output: {}", e));
        return 1;
    }

    0
}

fn select_bucket(mut graph: GraphView, bucket: usize) -> GraphView {
    let Some(buckets) = graph.node_buckets.as_ref().map(|b| b.num_buckets()) else {
        style::warning("--bucket has no effect without a timeline; showing everything.");
        style::hint("pass --granularity or add a [timeline] table to the config");
        return graph;
    };

    if bucket >= buckets {
        style::warning(&format!(
            "Bucket {} is past the last bucket ({}); showing everything.",
            bucket,
            buckets.saturating_sub(1)
        ));
    }

    let frame = graph.select_date_bucket(Some(bucket));
    graph.frame_view(&frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;
    use crate::graph::Granularity;
    use std::path::{Path, PathBuf};

    const ROWS: &str = r#"[
        {"id": "a", "links": ["b", "c"]},
        {"id": "b", "date": "2024-01-02"},
        {"id": "c", "date": "2024-01-03"}
    ]"#;

    fn args(output: &str) -> BuildArgs {
        BuildArgs {
            rows: PathBuf::from("/neon-test/rows.json"),
            output: Some(PathBuf::from(output)),
            ..BuildArgs::default()
        }
    }

    #[test]
    fn test_build_writes_json() {
        let fs = MockFs::with_files([(Path::new("/neon-test/rows.json"), ROWS)]);

        assert_eq!(cmd_build_with_fs(args("/neon-test/graph.json"), &fs), 0);

        let written = fs.get(Path::new("/neon-test/graph.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["links"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_build_without_clusters() {
        let fs = MockFs::with_files([(Path::new("/neon-test/rows.json"), ROWS)]);
        let args = BuildArgs {
            no_clusters: true,
            ..args("/neon-test/graph.json")
        };

        assert_eq!(cmd_build_with_fs(args, &fs), 0);

        let written = fs.get(Path::new("/neon-test/graph.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_build_bucket_limits_output() {
        let fs = MockFs::with_files([(Path::new("/neon-test/rows.json"), ROWS)]);
        let args = BuildArgs {
            granularity: Some(Granularity::Day),
            bucket: Some(0),
            ..args("/neon-test/graph.json")
        };

        assert_eq!(cmd_build_with_fs(args, &fs), 0);

        let written = fs.get(Path::new("/neon-test/graph.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 2);
        let cluster = nodes.iter().find(|n| n["type"] == "cluster").unwrap();
        let members = cluster["nodes"].as_array().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["id"], "b");
        assert_eq!(value["links"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_build_markdown() {
        let fs = MockFs::with_files([(Path::new("/neon-test/rows.json"), ROWS)]);
        let args = BuildArgs {
            format: OutputFormat::Markdown,
            ..args("/neon-test/graph.md")
        };

        assert_eq!(cmd_build_with_fs(args, &fs), 0);

        let written = fs.get(Path::new("/neon-test/graph.md")).unwrap();
        assert!(written.starts_with("# Network Graph: rows"));
    }

    #[test]
    fn test_build_missing_rows() {
        let fs = MockFs::default();
        assert_eq!(cmd_build_with_fs(args("/neon-test/graph.json"), &fs), 1);
    }

    #[test]
    fn test_build_rejects_non_array() {
        let fs = MockFs::with_files([(Path::new("/neon-test/rows.json"), r#"{"id": "a"}"#)]);
        assert_eq!(cmd_build_with_fs(args("/neon-test/graph.json"), &fs), 1);
        assert!(fs.get(Path::new("/neon-test/graph.json")).is_none());
    }
}
