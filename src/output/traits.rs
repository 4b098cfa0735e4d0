//! Exporter trait and types
//!
//! This module defines the trait interface for site map exporters and the
//! formats the crate can write.

use super::tree::SiteMapNode;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// File formats a site map can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl OutputFormat {
    /// Returns the exporter for this format
    pub fn exporter(self) -> Box<dyn TreeExporter> {
        match self {
            OutputFormat::Json => Box::new(super::json::JsonExporter),
            OutputFormat::Xml => Box::new(super::xml::XmlExporter),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Xml => write!(f, "XML"),
        }
    }
}

/// Trait for site map exporters
///
/// Exporters turn a [`SiteMapNode`] tree into bytes and back. Writing to a
/// file is provided on top of [`TreeExporter::render`].
pub trait TreeExporter: Send + Sync {
    /// The format this exporter produces
    fn format(&self) -> OutputFormat;

    /// Serializes the whole tree
    fn render(&self, tree: &SiteMapNode) -> OutputResult<Vec<u8>>;

    /// Deserializes a tree previously produced by [`TreeExporter::render`]
    fn parse(&self, bytes: &[u8]) -> OutputResult<SiteMapNode>;

    /// Writes the rendered tree to `path`, replacing any existing file
    ///
    /// The document is rendered fully before the file is created, so a
    /// serialization failure leaves no partial file behind.
    fn write_to(&self, tree: &SiteMapNode, path: &Path) -> OutputResult<()> {
        let bytes = self.render(tree)?;
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}
