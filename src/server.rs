//! HTTP API server.
//!
//! Serves article listings, details, rankings, PDFs and the chat assistant
//! as JSON over HTTP.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/articles` | Paginated listing; `israndom=true` returns a random sample |
//! | `GET`  | `/articles/keywords` | Most frequent keywords |
//! | `GET`  | `/articles/counts-by-year` | Article count per publication year |
//! | `GET`  | `/articles/trending` | One trending article per recent year |
//! | `GET`  | `/articles/{id}` | Article detail |
//! | `GET`  | `/articles/{id}/similar` | Keyword-similar articles |
//! | `GET`  | `/articles/pdf/{file_name}` | Article PDF |
//! | `POST` | `/articles/chatbot` | Ask a question about one article |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "article not found: 12" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `chat_disabled` (400),
//! `llm_error` (502), `internal` (500). Malformed query strings, path
//! segments and JSON bodies are reported as `bad_request`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser frontends on
//! other ports can call the API.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use article_atlas_core::error::validate_limit;
use article_atlas_core::models::{KeywordCount, YearCount};
use article_atlas_core::store::ArticleStore;
use article_atlas_core::trending::TrendingParams;
use article_atlas_core::RankError;

use crate::articles::{self, ArticleDetail, ArticleListItem, PaginatedArticles};
use crate::chat::{self, ChatError};
use crate::config::Config;
use crate::db;
use crate::pdf::{self, PdfError, MIME_PDF};
use crate::ranking::{self, TrendingItem};
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Arc<dyn ArticleStore>,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn ArticleStore>) -> Self {
        Self { config, store }
    }
}

/// Starts the HTTP server backed by the configured SQLite database.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store: Arc<dyn ArticleStore> = Arc::new(SqliteStore::new(pool));
    run_server_with_store(config, store).await
}

/// Starts the HTTP server over an arbitrary [`ArticleStore`].
pub async fn run_server_with_store(
    config: &Config,
    store: Arc<dyn ArticleStore>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = AppState::new(Arc::new(config.clone()), store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(bind = %bind_addr, "server started");
    println!("Article API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router with all routes and the CORS layer.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/articles", get(handle_list))
        .route("/articles/", get(handle_list))
        .route("/articles/keywords", get(handle_keywords))
        .route("/articles/counts-by-year", get(handle_counts_by_year))
        .route("/articles/trending", get(handle_trending))
        .route("/articles/chatbot", post(handle_chat))
        .route("/articles/chatbot/", post(handle_chat))
        .route("/articles/pdf/{file_name}", get(handle_pdf))
        .route("/articles/{id}", get(handle_get))
        .route("/articles/{id}/similar", get(handle_similar))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: message.into(),
    }
}

impl From<RankError> for AppError {
    fn from(e: RankError) -> Self {
        match e {
            RankError::NotFound(_) => not_found(e.to_string()),
            RankError::InvalidParameter(_) => bad_request(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(rank) = e.downcast_ref::<RankError>() {
            return rank.clone().into();
        }
        error!(error = %e, "request failed");
        internal(e.to_string())
    }
}

impl From<PdfError> for AppError {
    fn from(e: PdfError) -> Self {
        match e {
            PdfError::InvalidName(_) => bad_request(e.to_string()),
            PdfError::NotFound(_) => not_found(e.to_string()),
            PdfError::Io { .. } | PdfError::Extraction(_) => internal(e.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => bad_request(e.to_string()),
            ChatError::ArticleNotFound(_) | ChatError::PdfMissing { .. } => {
                not_found(e.to_string())
            }
            ChatError::Disabled => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "chat_disabled",
                message: e.to_string(),
            },
            ChatError::Llm(_) => AppError {
                status: StatusCode::BAD_GATEWAY,
                code: "llm_error",
                message: e.to_string(),
            },
            ChatError::Extraction { .. } | ChatError::Store(_) => internal(e.to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        bad_request(e.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        bad_request(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        bad_request(e.body_text())
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /articles ============

#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<i64>,
    page_size: Option<i64>,
    query: Option<String>,
    #[serde(default)]
    israndom: bool,
    limit: Option<usize>,
}

/// Handler for `GET /articles`.
///
/// With `israndom=true` the response holds a random sample of `limit`
/// articles (default `[ranking].random_limit`) and `total` is the corpus
/// size.
async fn handle_list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<PaginatedArticles>, AppError> {
    let Query(q) = query?;
    let preview = state.config.listing.abstract_preview_chars;

    if q.israndom {
        let limit = q.limit.unwrap_or(state.config.ranking.random_limit);
        validate_limit("limit", limit)?;
        let page_size = i64::try_from(limit)
            .map_err(|_| bad_request(format!("limit out of range: {}", limit)))?;
        let sample = ranking::random_articles(state.store.as_ref(), limit, preview).await?;
        return Ok(Json(PaginatedArticles {
            items: sample.items,
            total: sample.total as i64,
            page: 1,
            page_size,
        }));
    }

    let page = articles::list_articles(
        state.store.as_ref(),
        &state.config.listing,
        q.page.unwrap_or(1),
        q.page_size.unwrap_or(state.config.listing.default_page_size),
        q.query.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

// ============ GET /articles/keywords ============

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn handle_keywords(
    State(state): State<AppState>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<KeywordCount>>, AppError> {
    let Query(q) = query?;
    let limit = q.limit.unwrap_or(state.config.ranking.keyword_limit);
    validate_limit("limit", limit)?;
    Ok(Json(ranking::keywords(state.store.as_ref(), limit).await?))
}

// ============ GET /articles/counts-by-year ============

async fn handle_counts_by_year(
    State(state): State<AppState>,
) -> Result<Json<Vec<YearCount>>, AppError> {
    Ok(Json(ranking::year_counts(state.store.as_ref()).await?))
}

// ============ GET /articles/trending ============

#[derive(Debug, Deserialize)]
struct TrendingQuery {
    years: Option<usize>,
    min_citations: Option<i64>,
    min_percentile: Option<f64>,
}

async fn handle_trending(
    State(state): State<AppState>,
    query: Result<Query<TrendingQuery>, QueryRejection>,
) -> Result<Json<Vec<TrendingItem>>, AppError> {
    let Query(q) = query?;
    let defaults = state.config.ranking.trending_params();
    let params = TrendingParams {
        years: q.years.unwrap_or(defaults.years),
        min_citations: q.min_citations.unwrap_or(defaults.min_citations),
        min_percentile: q.min_percentile.unwrap_or(defaults.min_percentile),
    };
    params.validate()?;
    let entries = ranking::trending_articles(
        state.store.as_ref(),
        &params,
        state.config.listing.abstract_preview_chars,
    )
    .await?;
    Ok(Json(entries))
}

// ============ GET /articles/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ArticleDetail>, AppError> {
    let Path(id) = path?;
    match state.store.fetch_by_id(id).await? {
        Some(a) => Ok(Json(a.into())),
        None => Err(not_found(format!("article not found: {}", id))),
    }
}

// ============ GET /articles/{id}/similar ============

async fn handle_similar(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> Result<Json<Vec<ArticleListItem>>, AppError> {
    let Path(id) = path?;
    let Query(q) = query?;
    let limit = q.limit.unwrap_or(state.config.ranking.similar_limit);
    validate_limit("limit", limit)?;
    let items = ranking::similar_articles(
        state.store.as_ref(),
        id,
        limit,
        state.config.listing.abstract_preview_chars,
    )
    .await?;
    Ok(Json(items))
}

// ============ GET /articles/pdf/{file_name} ============

async fn handle_pdf(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = pdf::read_pdf(&state.config.storage.pdf_dir, &file_name).await?;
    let disposition = format!("inline; filename=\"{}\"", file_name);
    Ok((
        [
            (header::CONTENT_TYPE, MIME_PDF.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ============ POST /articles/chatbot ============

#[derive(Debug, Deserialize)]
struct ChatRequest {
    article_id: i64,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

async fn handle_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = body?;
    let reply = chat::chat(
        &state.config,
        state.store.as_ref(),
        req.article_id,
        &req.message,
    )
    .await?;
    Ok(Json(ChatResponse { reply }))
}
