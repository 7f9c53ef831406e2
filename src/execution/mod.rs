//! Query Execution Module
//!
//! Queries are synchronous walks over the index. This module moves them off the
//! caller's async context onto a bounded pool of blocking workers and delivers each
//! outcome once, as a future or through a callback.

pub mod dispatcher;

pub use dispatcher::QueryDispatcher;
