//! HTTP API Server for hdt-query
//!
//! Exposes the document's query operations as JSON endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::Document;
use crate::core::{
    Features, Limit, LiteralQuery, LiteralResult, Page, Role, SearchResult, TermsQuery,
    TriplePattern,
};
use crate::error::Error;

/// Query string of `/api/triples` and `/api/count`
#[derive(Debug, Deserialize)]
pub struct TriplesParams {
    /// Subject term, empty for any.
    #[serde(default)]
    pub subject: String,
    /// Predicate term, empty for any.
    #[serde(default)]
    pub predicate: String,
    /// Object term, empty for any.
    #[serde(default)]
    pub object: String,
    /// Matches to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of rows, unbounded when absent.
    pub limit: Option<usize>,
}

/// Query string of `/api/literals`
#[derive(Debug, Deserialize)]
pub struct LiteralsParams {
    /// Substring to search for.
    #[serde(default)]
    pub q: String,
    /// Literals to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of literals, unbounded when absent.
    pub limit: Option<usize>,
}

/// Query string of `/api/terms`
#[derive(Debug, Deserialize)]
pub struct TermsParams {
    /// `subject`, `predicate` or `object`.
    pub position: Option<String>,
    /// Autocompletion prefix.
    #[serde(default)]
    pub prefix: String,
    /// Subject constraint.
    pub subject: Option<String>,
    /// Object constraint.
    pub object: Option<String>,
    /// Maximum number of terms.
    pub limit: Option<usize>,
}

/// Body of `/api/terms`.
#[derive(Debug, Serialize)]
pub struct TermsResponse {
    /// Matching terms.
    pub terms: Vec<String>,
}

/// Body of `/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `closed`.
    pub status: String,
    /// Whether the document is closed.
    pub closed: bool,
    /// Operations the document serves.
    pub features: Features,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Shared application state
pub struct AppState {
    /// The served document.
    pub document: Arc<Document>,
}

/// Custom error type for API errors
pub struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Closed => StatusCode::GONE,
            Error::Unsupported(_) | Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse { error: self.0.to_string() });
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

/// Create the HTTP router with all routes
pub fn create_server(document: Arc<Document>) -> Router {
    let state = Arc::new(AppState { document });

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/triples", get(search_triples))
        .route("/api/count", get(count_triples))
        .route("/api/literals", get(search_literals))
        .route("/api/terms", get(search_terms))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let closed = state.document.is_closed();
    Json(HealthResponse {
        status: if closed { "closed" } else { "ok" }.to_string(),
        closed,
        features: state.document.features(),
    })
}

/// GET /api/triples - One page of triples matching a pattern
async fn search_triples(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TriplesParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let pattern = TriplePattern::new(&params.subject, &params.predicate, &params.object);
    let page = Page::new(params.offset, Limit::from(params.limit));
    Ok(Json(state.document.search_triples(pattern, page).await?))
}

/// GET /api/count - Cardinality of a pattern
async fn count_triples(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TriplesParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let pattern = TriplePattern::new(&params.subject, &params.predicate, &params.object);
    Ok(Json(state.document.count_triples(pattern).await?))
}

/// GET /api/literals - Literals containing a substring
async fn search_literals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LiteralsParams>,
) -> Result<Json<LiteralResult>, ApiError> {
    let query = LiteralQuery::new(&params.q, Page::new(params.offset, Limit::from(params.limit)));
    Ok(Json(state.document.search_literals(query).await?))
}

/// GET /api/terms - Prefix autocompletion or distinct predicates
async fn search_terms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TermsParams>,
) -> Result<Json<TermsResponse>, ApiError> {
    let position = params.position.as_deref().and_then(Role::parse).ok_or_else(|| {
        Error::InvalidArgument(
            "Invalid position argument. Expected subject, predicate or object.".to_string(),
        )
    })?;
    let query = TermsQuery {
        position,
        prefix: params.prefix,
        subject: params.subject,
        object: params.object,
        limit: params.limit.unwrap_or(state.document.config().default_terms_limit),
    };
    let terms = state.document.search_terms(query).await?;
    Ok(Json(TermsResponse { terms }))
}

/// Start the HTTP server
pub async fn start_server(addr: &str, document: Arc<Document>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(document);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("hdt-query HTTP API listening on http://{}", addr);
    info!("  GET /api/triples   - Search triples by pattern");
    info!("  GET /api/count     - Count triples matching a pattern");
    info!("  GET /api/literals  - Search literals by substring");
    info!("  GET /api/terms     - Autocomplete terms or list predicates");
    info!("  GET /health        - Health check");

    axum::serve(listener, app).await?;

    Ok(())
}
