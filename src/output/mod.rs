mod json;
mod markdown;

pub use json::JsonOutput;
pub use markdown::MarkdownOutput;

use crate::graph::GraphView;
use std::io::Write;

pub trait OutputFormatter {
    fn format<W: Write>(&self, graph: &GraphView, writer: &mut W) -> std::io::Result<()>;
}
