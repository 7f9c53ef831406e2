//! Closable, shared reference to an open index.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::index::TripleIndex;

/// Shared, closable reference to an open index.
///
/// Queries call [`IndexHandle::acquire`] once and keep the returned `Arc` for their
/// whole run, so closing never frees memory under a running query. Closing also
/// raises a flag that running queries poll through [`IndexHandle::ensure_open`]
/// between index steps.
#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    index: RwLock<Option<Arc<dyn TripleIndex>>>,
    closed: AtomicBool,
}

impl IndexHandle {
    /// Open handle over `index`.
    pub fn new(index: Arc<dyn TripleIndex>) -> Self {
        IndexHandle {
            inner: Arc::new(HandleInner {
                index: RwLock::new(Some(index)),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// The index, for the duration of one query. Fails once closed.
    pub fn acquire(&self) -> Result<Arc<dyn TripleIndex>> {
        self.ensure_open()?;
        let guard = self
            .inner
            .index
            .read()
            .map_err(|e| Error::Index(format!("Failed to acquire index lock: {}", e)))?;
        guard.as_ref().map(Arc::clone).ok_or(Error::Closed)
    }

    /// Fails with [`Error::Closed`] once the handle is closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Marks the handle closed and drops its reference to the index. Returns false if
    /// it was already closed.
    pub fn close(&self) -> Result<bool> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        let mut guard = self
            .inner
            .index
            .write()
            .map_err(|e| Error::Index(format!("Failed to acquire index lock: {}", e)))?;
        guard.take();
        Ok(true)
    }
}
