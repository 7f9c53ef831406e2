//! [`Document`]: an open index plus the worker pool its queries run on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::QueryConfig;
use crate::core::{
    Features, LiteralQuery, LiteralResult, Page, SearchResult, TermsQuery, TriplePattern,
};
use crate::error::{Error, Result};
use crate::execution::QueryDispatcher;
use crate::index::{IndexHandle, MemoryIndex, TripleIndex};
use crate::query::{self, QueryContext};

/// An open triple index together with the worker pool its queries run on.
///
/// Every query method returns a future that resolves once, with either the full result
/// or an error. The `*_with` variants deliver the same outcome to a callback instead.
///
/// # Example
///
/// ```ignore
/// let document = Document::open("data/store.idx", QueryConfig::default()).await?;
/// let page = document
///     .search_triples(TriplePattern::new("ex:a", "ex:knows", ""), Page::new(0, Limit::At(10)))
///     .await?;
/// println!("{} of {} matches", page.triples.len(), page.total_count);
/// ```
pub struct Document {
    handle: IndexHandle,
    dispatcher: QueryDispatcher,
    config: QueryConfig,
    features: Features,
    source: Option<PathBuf>,
}

impl Document {
    /// Wraps an index with its own worker pool sized from `config`.
    pub fn new(index: Arc<dyn TripleIndex>, config: QueryConfig) -> Self {
        let dispatcher = QueryDispatcher::new(config.max_concurrent_queries);
        Self::with_dispatcher(index, config, dispatcher)
    }

    /// Wraps an index using a worker pool shared with other documents.
    pub fn with_dispatcher(
        index: Arc<dyn TripleIndex>,
        config: QueryConfig,
        dispatcher: QueryDispatcher,
    ) -> Self {
        let features = Features {
            search_triples: true,
            count_triples: true,
            search_literals: index.features().literal_search,
            search_terms: true,
        };
        Document { handle: IndexHandle::new(index), dispatcher, config, features, source: None }
    }

    /// Loads an index snapshot written by [`MemoryIndex::save_to_file`].
    pub async fn open(path: impl AsRef<Path>, config: QueryConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            return Err(Error::InvalidFilename(path.display().to_string()));
        }
        config.validate()?;

        let dispatcher = QueryDispatcher::new(config.max_concurrent_queries);
        let load_path = path.clone();
        let index = dispatcher.run(move || MemoryIndex::load_from_file(&load_path)).await?;
        info!(path = %path.display(), triples = index.triple_count(), "opened document");

        let mut document = Self::with_dispatcher(Arc::new(index), config, dispatcher);
        document.source = Some(path);
        Ok(document)
    }

    /// Operations this document can serve.
    pub fn features(&self) -> Features {
        self.features
    }

    /// Configuration the document was opened with.
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// File the document was opened from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether [`Document::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Closes the document. Queries still running fail with [`Error::Closed`] at their
    /// next index step; later queries fail immediately. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        if self.handle.close()? {
            let in_flight = self.dispatcher.in_flight();
            if in_flight > 0 {
                warn!(in_flight, "closed document with queries still running");
            } else {
                info!("closed document");
            }
        }
        Ok(())
    }

    /// One page of triples matching `pattern`, with the cardinality of the full match set.
    pub async fn search_triples(&self, pattern: TriplePattern, page: Page) -> Result<SearchResult> {
        self.handle.ensure_open()?;
        let page = page.clamp(self.config.max_page_size);
        debug!(?pattern, ?page, "search triples");
        let handle = self.handle.clone();
        self.dispatcher
            .run(move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::search_triples(&ctx, &pattern, page)
            })
            .await
    }

    /// Cardinality of `pattern` without any rows.
    pub async fn count_triples(&self, pattern: TriplePattern) -> Result<SearchResult> {
        self.search_triples(pattern, Page::count_only()).await
    }

    /// Literals whose value contains `literal_query.substring`, deduplicated and paginated.
    pub async fn search_literals(&self, literal_query: LiteralQuery) -> Result<LiteralResult> {
        self.handle.ensure_open()?;
        let literal_query = self.clamp_literal_query(literal_query);
        let handle = self.handle.clone();
        self.dispatcher
            .run(move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::search_literals(&ctx, &literal_query)
            })
            .await
    }

    /// Prefix autocompletion or the predicates next to a subject and/or object.
    pub async fn search_terms(&self, terms_query: TermsQuery) -> Result<Vec<String>> {
        self.handle.ensure_open()?;
        let mut terms_query = terms_query;
        terms_query.limit = terms_query.limit.min(self.config.max_page_size);
        let handle = self.handle.clone();
        self.dispatcher
            .run(move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::search_terms(&ctx, &terms_query)
            })
            .await
    }

    /// Predicates linking `subject` to `object`; either may be empty.
    pub async fn distinct_predicates(
        &self,
        subject: &str,
        object: &str,
        limit: usize,
    ) -> Result<Vec<String>> {
        self.handle.ensure_open()?;
        let (subject, object) = (subject.to_string(), object.to_string());
        let limit = limit.min(self.config.max_page_size);
        let handle = self.handle.clone();
        self.dispatcher
            .run(move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::distinct_predicates(&ctx, &subject, &object, limit)
            })
            .await
    }

    /// Callback variant of [`Document::search_triples`].
    pub fn search_triples_with<C>(&self, pattern: TriplePattern, page: Page, on_complete: C)
    where
        C: FnOnce(Result<SearchResult>) + Send + 'static,
    {
        let page = page.clamp(self.config.max_page_size);
        let handle = self.handle.clone();
        self.dispatcher.submit(
            move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::search_triples(&ctx, &pattern, page)
            },
            on_complete,
        );
    }

    /// Callback variant of [`Document::search_literals`].
    pub fn search_literals_with<C>(&self, literal_query: LiteralQuery, on_complete: C)
    where
        C: FnOnce(Result<LiteralResult>) + Send + 'static,
    {
        let literal_query = self.clamp_literal_query(literal_query);
        let handle = self.handle.clone();
        self.dispatcher.submit(
            move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::search_literals(&ctx, &literal_query)
            },
            on_complete,
        );
    }

    /// Callback variant of [`Document::distinct_predicates`].
    pub fn distinct_predicates_with<C>(&self, subject: &str, object: &str, limit: usize, on_complete: C)
    where
        C: FnOnce(Result<Vec<String>>) + Send + 'static,
    {
        let (subject, object) = (subject.to_string(), object.to_string());
        let limit = limit.min(self.config.max_page_size);
        let handle = self.handle.clone();
        self.dispatcher.submit(
            move || {
                let ctx = QueryContext::acquire(&handle)?;
                query::distinct_predicates(&ctx, &subject, &object, limit)
            },
            on_complete,
        );
    }

    fn clamp_literal_query(&self, mut literal_query: LiteralQuery) -> LiteralQuery {
        literal_query.page = literal_query.page.clamp(self.config.max_page_size);
        literal_query
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        let _ = self.handle.close();
    }
}
