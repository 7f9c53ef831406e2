//! Caller-facing API: an open document and its asynchronous query methods.

pub mod document;

pub use document::Document;
