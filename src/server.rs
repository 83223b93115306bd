//! HTTP API server.
//!
//! Exposes upload, graph generation, and semantic search as a JSON API.
//! Authentication is handled in front of this service; the authenticated
//! user id arrives in the `x-knowmap-user` header and becomes the document
//! owner.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/upload` | Multipart upload, field `file` |
//! | `POST` | `/documents` | JSON upload `{source_name, text}` |
//! | `GET`  | `/documents` | List stored documents |
//! | `GET`  | `/generate_graph` | Entity co-occurrence graph, `?format=json\|dot` |
//! | `POST` | `/search` | Ranked results for `{query, limit?}` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid input: query is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `dimension_mismatch` (400), `internal` (500).
//! A provider that returns vectors of the wrong length is a server fault and
//! maps to `internal`; `dimension_mismatch` is reserved for records the index
//! refuses at insert time.
//!
//! Request bodies up to `server.max_upload_bytes` are accepted; only the
//! first 5000 characters of normalized text are stored.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        DefaultBodyLimit, Multipart, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use knowmap_core::ingest::ingest;
use knowmap_core::models::{
    DocumentSummary, IngestRequest, SearchRequest, SearchResult, UPLOAD_PREVIEW_CHARS,
};
use knowmap_core::normalize::truncate_chars;
use knowmap_core::search::{generate_graph, search};

use crate::config::Config;
use crate::documents::list_documents;
use crate::graph::{render_graph, GraphFormat};
use crate::services::Services;

/// Header carrying the authenticated user id.
pub const OWNER_HEADER: &str = "x-knowmap-user";

/// Build the application router over shared services.
pub fn router(services: Arc<Services>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(services.config.server.max_upload_bytes);

    Router::new()
        .route("/health", get(handle_health))
        .route("/upload", post(handle_upload))
        .route("/documents", post(handle_create_document).get(handle_list_documents))
        .route("/generate_graph", get(handle_generate_graph))
        .route("/search", post(handle_search))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(services)
}

/// Start the HTTP server on `config.server.bind`.
///
/// Providers are created once here; a local embedding model is loaded
/// before the listener opens.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let services = Arc::new(Services::open(config).await?);
    let app = router(services);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "knowmap server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<knowmap_core::Error> for AppError {
    fn from(err: knowmap_core::Error) -> Self {
        use knowmap_core::Error;

        match err {
            Error::Input(_) => bad_request(err.to_string()),
            Error::DimensionMismatch { .. } | Error::MissingEmbedding | Error::MalformedEmbedding => {
                AppError {
                    status: StatusCode::BAD_REQUEST,
                    code: "dimension_mismatch".to_string(),
                    message: err.to_string(),
                }
            }
            Error::ProviderDimensions { .. }
            | Error::Embedding(_)
            | Error::Extraction(_)
            | Error::Storage(_) => {
                tracing::error!(error = %err, "request failed");
                internal(err.to_string())
            }
        }
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

// ============ Uploads ============

/// Response body for `POST /upload` and `POST /documents`.
#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub msg: String,
    pub id: String,
    pub source_name: String,
    pub entity_count: usize,
    /// First 1000 characters of the normalized text.
    pub preview: String,
}

fn owner_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
}

async fn ingest_upload(
    services: &Services,
    owner: Option<String>,
    source_name: Option<String>,
    text: Option<String>,
) -> Result<Json<UploadResponse>, AppError> {
    let req = IngestRequest::from_parts(owner, source_name, text)?;
    let record = ingest(
        services.store.as_ref(),
        services.extractor.as_ref(),
        services.embedder.as_ref(),
        req,
    )
    .await?;

    Ok(Json(UploadResponse {
        msg: "File uploaded successfully".to_string(),
        preview: truncate_chars(&record.normalized_text, UPLOAD_PREVIEW_CHARS).to_string(),
        entity_count: record.entities.len(),
        id: record.id,
        source_name: record.source_name,
    }))
}

/// Handler for `POST /upload` (multipart, field `file`).
///
/// The part's filename becomes the source name; the bytes are decoded as
/// UTF-8 with invalid sequences replaced.
async fn handle_upload(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let owner = owner_from(&headers);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let source_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read file part: {}", e)))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        return ingest_upload(&services, owner, source_name, Some(text)).await;
    }

    Err(bad_request("no file part"))
}

#[derive(Deserialize)]
struct CreateDocumentRequest {
    source_name: Option<String>,
    text: Option<String>,
}

/// Handler for `POST /documents` (JSON upload).
async fn handle_create_document(
    State(services): State<Arc<Services>>,
    headers: HeaderMap,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(body) = body.map_err(|e| bad_request(e.body_text()))?;
    ingest_upload(&services, owner_from(&headers), body.source_name, body.text).await
}

// ============ GET /documents ============

async fn handle_list_documents(
    State(services): State<Arc<Services>>,
) -> Result<Json<Vec<DocumentSummary>>, AppError> {
    list_documents(services.store.as_ref())
        .await
        .map(Json)
        .map_err(|e| internal(format!("{:#}", e)))
}

// ============ GET /generate_graph ============

#[derive(Deserialize)]
struct GraphParams {
    #[serde(default)]
    format: GraphFormat,
}

async fn handle_generate_graph(
    State(services): State<Arc<Services>>,
    params: Result<Query<GraphParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let graph = generate_graph(services.store.as_ref()).await?;

    match params.format {
        GraphFormat::Json => Ok(Json(graph).into_response()),
        GraphFormat::Dot => {
            let body = render_graph(&graph, GraphFormat::Dot).map_err(|e| internal(e.to_string()))?;
            Ok(([(header::CONTENT_TYPE, "text/vnd.graphviz")], body).into_response())
        }
    }
}

// ============ POST /search ============

async fn handle_search(
    State(services): State<Arc<Services>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let Json(req) = body.map_err(|e| bad_request(e.body_text()))?;
    let results = search(
        services.store.as_ref(),
        services.embedder.as_ref(),
        &req,
        services.top_k(),
    )
    .await?;
    Ok(Json(results))
}
