use super::bucketizer::{Bucketizer, DateBucketizer, Granularity};
use super::buckets::{DateBucketIndex, sort_by_date};
use super::cluster::{Clustered, cluster};
use super::context::{ClusterOptions, GraphBuildContext};
use super::ingest::ingest;
use super::network::{finalize, node_networks};
use super::view::GraphView;
use crate::model::{GraphNode, Row, RowFields};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub fields: RowFields,
    pub clustering: ClusterOptions,
}

/// Where the date buckets for playback come from.
pub enum Timeline {
    /// A caller-supplied bucketizer, reused for every build.
    Fixed(Box<dyn Bucketizer>),
    /// Calendar buckets fitted to the dates present in each build.
    Fit(Granularity),
}

/// Turns result rows into a renderable graph, one full rebuild per call.
pub struct GraphBuilder {
    options: BuildOptions,
    timeline: Option<Timeline>,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            timeline: None,
        }
    }

    pub fn with_bucketizer(mut self, bucketizer: impl Bucketizer + 'static) -> Self {
        self.timeline = Some(Timeline::Fixed(Box::new(bucketizer)));
        self
    }

    pub fn with_fitted_timeline(mut self, granularity: Granularity) -> Self {
        self.timeline = Some(Timeline::Fit(granularity));
        self
    }

    pub fn with_timeline(mut self, timeline: Option<Timeline>) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn build(&self, rows: &[Row]) -> GraphView {
        let mut ctx = GraphBuildContext::new(self.options.clustering);
        ctx.stats.rows = rows.len();

        let mut ingested = ingest(rows, &self.options.fields);
        ctx.stats.skipped_rows = ingested.skipped_rows;
        let sizes = std::mem::take(&mut ingested.link_sizes);

        let Clustered {
            mut nodes,
            mut links,
        } = cluster(&mut ctx, ingested);

        sort_by_date(&mut nodes, GraphNode::date);
        sort_by_date(&mut links, |l| l.date);
        for node in &mut nodes {
            if let GraphNode::Cluster(cluster) = node {
                sort_by_date(&mut cluster.members, |m| m.date);
            }
        }

        let links = finalize(&mut ctx, &mut nodes, &links, &sizes);
        let networks = node_networks(&ctx, &nodes);

        let fitted: Option<DateBucketizer>;
        let bucketizer: Option<&dyn Bucketizer> = match &self.timeline {
            Some(Timeline::Fixed(bucketizer)) => Some(bucketizer.as_ref()),
            Some(Timeline::Fit(granularity)) => {
                let dates = nodes
                    .iter()
                    .flat_map(|n| n.data_nodes())
                    .filter_map(|n| n.date)
                    .chain(links.iter().filter_map(|l| l.date));
                fitted = DateBucketizer::spanning(*granularity, dates);
                if let Some(b) = &fitted {
                    tracing::debug!(
                        granularity = %b.granularity(),
                        start = %b.start_date(),
                        buckets = b.num_buckets(),
                        "fitted timeline"
                    );
                }
                fitted.as_ref().map(|b| b as &dyn Bucketizer)
            }
            None => None,
        };

        let mut node_buckets = None;
        let mut link_buckets = None;
        if let Some(bucketizer) = bucketizer {
            for node in &mut nodes {
                if let GraphNode::Cluster(cluster) = node {
                    cluster.date_buckets_to_node_indices = Some(DateBucketIndex::build(
                        &cluster.members,
                        |m| m.date,
                        bucketizer,
                    ));
                }
            }
            node_buckets = Some(DateBucketIndex::build(&nodes, GraphNode::date, bucketizer));
            link_buckets = Some(DateBucketIndex::build(&links, |l| l.date, bucketizer));
        }

        tracing::debug!(
            nodes = nodes.len(),
            links = links.len(),
            buckets = node_buckets.as_ref().map_or(0, DateBucketIndex::num_buckets),
            "built graph"
        );

        GraphView {
            nodes,
            links,
            node_networks: networks,
            node_buckets,
            link_buckets,
            stats: ctx.stats,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}
