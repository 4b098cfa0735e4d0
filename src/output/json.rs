//! JSON site map export

use super::traits::{OutputFormat, OutputResult, TreeExporter};
use super::tree::SiteMapNode;

/// Pretty-printed JSON exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl TreeExporter for JsonExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render(&self, tree: &SiteMapNode) -> OutputResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(tree)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn parse(&self, bytes: &[u8]) -> OutputResult<SiteMapNode> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
