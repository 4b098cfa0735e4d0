//! Site tree reconstruction
//!
//! Turns the flat, depth-bucketed crawl results into a rooted hierarchy.

use crate::state::{CrawlResultStore, PageRecord};
use crate::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One page in the site map
///
/// Field names are stable across the JSON and XML exports.
/// `response_time` is encoded as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMapNode {
    pub url: String,
    pub status_code: u16,
    #[serde(default)]
    pub children: Vec<SiteMapNode>,
    #[serde(with = "duration_millis")]
    pub response_time: Duration,
}

impl SiteMapNode {
    fn leaf(record: &PageRecord) -> Self {
        Self {
            url: record.url.clone(),
            status_code: record.status_code,
            children: Vec::new(),
            response_time: record.response_time,
        }
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SiteMapNode::node_count).sum::<usize>()
    }

    /// Depth of the deepest node below this one (a leaf has height 0)
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Finds a node by URL in this subtree
    pub fn find(&self, url: &str) -> Option<&SiteMapNode> {
        if self.url == url {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(url))
    }

    /// Recursively orders children by URL
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.url.cmp(&b.url));
        for child in &mut self.children {
            child.sort_children();
        }
    }
}

/// Builds the site tree from a finished crawl's results
///
/// Every record below depth 0 is indexed under its parent URL, then the tree
/// is assembled from the single depth-0 record. Children keep the order in
/// which their records were stored, i.e. fetch-completion order.
///
/// # Errors
///
/// * `TreeError::MissingRoot` - depth 0 is empty
/// * `TreeError::AmbiguousRoot` - depth 0 holds more than one record
pub fn build_site_tree(store: &CrawlResultStore) -> Result<SiteMapNode, TreeError> {
    let root = match store.at_depth(0) {
        [] => return Err(TreeError::MissingRoot),
        [root] => root,
        roots => return Err(TreeError::AmbiguousRoot { count: roots.len() }),
    };

    let mut children_of: HashMap<&str, Vec<&PageRecord>> = HashMap::new();
    for record in store.iter().filter(|record| !record.is_root()) {
        if let Some(parent) = record.parent_url.as_deref() {
            children_of.entry(parent).or_default().push(record);
        }
    }

    Ok(assemble(root, &children_of))
}

fn assemble(record: &PageRecord, children_of: &HashMap<&str, Vec<&PageRecord>>) -> SiteMapNode {
    let mut node = SiteMapNode::leaf(record);
    if let Some(children) = children_of.get(record.url.as_str()) {
        node.children = children
            .iter()
            // Parents are always one level up; anything else cannot be a child
            .filter(|child| child.depth == record.depth + 1)
            .map(|child| assemble(child, children_of))
            .collect();
    }
    node
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
