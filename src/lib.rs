pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod graph;
pub mod model;
pub mod output;
pub mod style;

pub use api::{
    GraphOptions, NeonError, build_graph, build_graph_from_path, builder_for, load_rows,
    parse_rows, resolve_config,
};
pub use cli::Cli;
pub use commands::{cmd_build, cmd_init};
pub use config::{Config, ConfigError};
pub use graph::{
    BuildOptions, BuildStats, Bucketizer, ClusterOptions, DateBucketIndex, DateBucketizer,
    Granularity, GraphBuilder, GraphView, PlaybackFrame, Timeline,
};
pub use model::{GraphNode, IndexLink, NetworkId, Node, NodeId, Row, RowFields};
