//! Runtime configuration for documents and the query worker pool

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest offset or limit a caller can request, 2^31 - 1.
pub const MAX_PAGE_SIZE: usize = (1 << 31) - 1;

/// Worker pool and pagination settings of a [`crate::Document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum number of queries executing on the blocking pool at once
    pub max_concurrent_queries: usize,
    /// Limits above this value are clamped; offsets are only capped at [`MAX_PAGE_SIZE`]
    pub max_page_size: usize,
    /// Limit applied by `search_terms` when the caller gives none
    pub default_terms_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_concurrent_queries: 8, max_page_size: MAX_PAGE_SIZE, default_terms_limit: 100 }
    }
}

impl QueryConfig {
    /// Loads a JSON config file. Missing fields take their default value.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: QueryConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero-sized pools and pages.
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_queries == 0 {
            return Err(Error::Config("max_concurrent_queries must be at least 1".to_string()));
        }
        if self.max_page_size == 0 {
            return Err(Error::Config("max_page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
