//! Output module for presenting crawl results
//!
//! This module handles:
//! - Rebuilding the site tree from the result store
//! - Printing the tree and crawl statistics to the console
//! - Exporting the tree as JSON or XML

mod json;
mod printer;
pub mod stats;
mod traits;
mod tree;
mod xml;

pub use json::JsonExporter;
pub use printer::{format_site_tree, print_site_tree};
pub use stats::{format_statistics, print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputFormat, OutputResult, TreeExporter};
pub use tree::{build_site_tree, SiteMapNode};
pub use xml::XmlExporter;

use crate::config::OutputConfig;
use crate::crawler::CrawlOutcome;
use crate::MapperError;
use std::path::Path;
use tracing::info;

/// Export files requested by the output configuration
pub fn export_targets(options: &OutputConfig) -> Vec<(OutputFormat, &Path)> {
    [
        (OutputFormat::Json, options.json_path.as_deref()),
        (OutputFormat::Xml, options.xml_path.as_deref()),
    ]
    .into_iter()
    .filter_map(|(format, path)| path.map(|path| (format, path)))
    .collect()
}

/// Rebuilds the site tree of a finished crawl and writes the requested exports
///
/// Children are sorted by URL when `sort_children` is set.
///
/// # Returns
///
/// * `Ok(SiteMapNode)` - The tree that was exported
/// * `Err(MapperError::Tree)` - The results have no single root page
/// * `Err(MapperError::Output)` - An export could not be written
pub fn publish_site_map(
    outcome: &CrawlOutcome,
    options: &OutputConfig,
) -> Result<SiteMapNode, MapperError> {
    let mut tree = outcome.site_tree()?;
    if options.sort_children {
        tree.sort_children();
    }
    for (format, path) in export_targets(options) {
        export_site_map(&tree, format, path)?;
    }
    Ok(tree)
}

/// Writes the site tree to `path` in the given format
///
/// # Returns
///
/// * `Ok(())` - File written
/// * `Err(OutputError)` - Serialization or IO failed
pub fn export_site_map(tree: &SiteMapNode, format: OutputFormat, path: &Path) -> OutputResult<()> {
    format.exporter().write_to(tree, path)?;
    info!(
        "Wrote {} site map ({} pages) to {}",
        format,
        tree.node_count(),
        path.display()
    );
    Ok(())
}

/// Reads a site tree previously written by [`export_site_map`]
pub fn load_site_map(format: OutputFormat, path: &Path) -> OutputResult<SiteMapNode> {
    let bytes = std::fs::read(path)?;
    format.exporter().parse(&bytes)
}
