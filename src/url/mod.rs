//! URL handling module for Site-Mapper
//!
//! This module provides URL normalization, domain extraction and the
//! same-host test that decides which links a crawl may follow.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_host, strip_host};
pub use normalize::normalize_url;
