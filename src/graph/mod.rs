//! Network graph pipeline: ingest rows, cluster leaves, label networks and
//! index everything by date bucket for playback.

mod bucketizer;
mod buckets;
mod builder;
mod cluster;
mod context;
mod ingest;
mod network;
mod playback;
mod view;

pub use bucketizer::{Bucketizer, DateBucketizer, Granularity, zero_out_date};
pub use buckets::{DateBucketIndex, sort_by_date};
pub use builder::{BuildOptions, GraphBuilder, Timeline};
pub use cluster::{Clustered, UNLINKED_CLUSTER_ID, cluster, should_cluster};
pub use context::{BuildStats, ClusterOptions, GraphBuildContext};
pub use ingest::{Adjacency, Ingested, LinkSizeTable, ingest};
pub use network::{finalize, link_size, node_networks};
pub use playback::PlaybackFrame;
pub use view::GraphView;
