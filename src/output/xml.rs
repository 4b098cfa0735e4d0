//! XML site map export
//!
//! The tree is written under a `<sitemap>` root element. Each child page is a
//! repeated `<children>` element carrying the same fields as the root.

use super::traits::{OutputError, OutputFormat, OutputResult, TreeExporter};
use super::tree::SiteMapNode;
use quick_xml::se::Serializer;
use serde::Serialize;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ROOT_ELEMENT: &str = "sitemap";

/// Indented XML exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlExporter;

impl TreeExporter for XmlExporter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Xml
    }

    fn render(&self, tree: &SiteMapNode) -> OutputResult<Vec<u8>> {
        let mut document = String::from(XML_DECLARATION);
        let mut serializer = Serializer::with_root(&mut document, Some(ROOT_ELEMENT))
            .map_err(|e| OutputError::Xml(e.to_string()))?;
        serializer.indent(' ', 2);
        tree.serialize(serializer)
            .map_err(|e| OutputError::Xml(e.to_string()))?;
        document.push('\n');
        Ok(document.into_bytes())
    }

    fn parse(&self, bytes: &[u8]) -> OutputResult<SiteMapNode> {
        let text = String::from_utf8(bytes.to_vec())?;
        quick_xml::de::from_str(&text).map_err(|e| OutputError::Xml(e.to_string()))
    }
}
