//! # hdt-query
//!
//! Query layer over a dictionary-encoded RDF triple index. Every subject, predicate
//! and object is stored as an integer ID per role; this crate answers string-level
//! questions against that ID space:
//!
//! - triple pattern search with wildcards, offset/limit pagination and cardinality
//!   (exact or estimated),
//! - substring search over literal objects,
//! - prefix autocompletion of terms and enumeration of the predicates linking a
//!   subject to an object.
//!
//! Queries run on a bounded pool of blocking workers and complete exactly once with a
//! result or an error.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hdt_query::{Document, Limit, MemoryIndex, Page, QueryConfig, TriplePattern};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> hdt_query::Result<()> {
//! let mut builder = MemoryIndex::builder();
//! builder.add("ex:a", "ex:knows", "ex:b").add("ex:a", "ex:knows", "ex:c");
//! let document = Document::new(Arc::new(builder.build()), QueryConfig::default());
//!
//! let page = document
//!     .search_triples(TriplePattern::new("ex:a", "ex:knows", ""), Page::new(0, Limit::At(1)))
//!     .await?;
//! assert_eq!(page.triples.len(), 1);
//! assert_eq!(page.total_count, 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]

/// Core data structures and literal syntax handling
pub mod core;

/// Triple index interface, in-memory implementation and shared handle
pub mod index;

/// Pattern resolution, pagination, term translation and search
pub mod query;

/// Bounded asynchronous execution of queries
pub mod execution;

/// Caller-facing document API
pub mod api;

/// HTTP endpoints
pub mod http;

pub mod config;
pub mod error;

// Re-export commonly used types
pub use crate::api::Document;
pub use crate::config::QueryConfig;
pub use crate::core::{
    Features, Limit, LiteralQuery, LiteralResult, Page, Role, SearchResult, TermsQuery, Triple,
    TriplePattern,
};
pub use crate::error::{Error, Result};
pub use crate::execution::QueryDispatcher;
pub use crate::index::{MemoryIndex, TripleIndex};
