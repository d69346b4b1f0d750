use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use fetcher::{EncodingSource, FetchConfig, FetchError, Fetcher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use wordfreq_core::{chart_options, ChartKind, TokenCount, DEFAULT_TOP_K};

pub mod pipeline;
pub mod render;

use pipeline::{analyze, Analysis};
use render::FormState;

const MAX_TOP_K: usize = 100;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub fetch: FetchConfig,
    pub top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { fetch: FetchConfig::default(), top_k: DEFAULT_TOP_K }
    }
}

#[derive(Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    /// Kept as text so a cleared form field (`k=`) falls back to the default.
    #[serde(default)]
    pub k: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub url: String,
    pub kind: ChartKind,
    pub encoding: &'static str,
    pub encoding_source: EncodingSource,
    pub distinct_tokens: usize,
    pub counted_tokens: u64,
    pub top: Vec<TokenCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageReport>>,
    pub took_s: f64,
}

#[derive(Serialize)]
pub struct ImageReport {
    pub url: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub fetcher: Fetcher,
    pub top_k: usize,
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    let fetcher = Fetcher::new(config.fetch)?;
    let app_state = AppState { fetcher, top_k: config.top_k.clamp(1, MAX_TOP_K) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(index_handler))
        .route("/analyze", get(analyze_page_handler))
        .route("/api/analyze", get(analyze_api_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    Ok(app)
}

/// Validated query: a URL (possibly blank), a chart kind and a clamped k.
struct Request {
    url: String,
    kind: ChartKind,
    k: usize,
}

impl Request {
    fn from_params(params: AnalyzeParams, default_k: usize) -> Result<Self, String> {
        let kind = match params.kind.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse::<ChartKind>().map_err(|e| e.to_string())?,
            None => ChartKind::Bar,
        };
        let k = params
            .k
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(default_k)
            .clamp(1, MAX_TOP_K);
        let url = params.url.unwrap_or_default().trim().to_string();
        Ok(Self { url, kind, k })
    }

    fn form(&self) -> FormState<'_> {
        FormState { url: &self.url, kind: self.kind, k: self.k }
    }

    async fn run(&self, fetcher: &Fetcher) -> Result<Analysis, FetchError> {
        let span = tracing::info_span!("analyze", url = %self.url, kind = %self.kind, k = self.k);
        let result = analyze(fetcher, &self.url, self.kind, self.k).instrument(span.clone()).await;
        if let Err(err) = &result {
            span.in_scope(|| tracing::warn!(kind = err.kind(), error = %err, "analysis failed"));
        }
        result
    }
}

type PageError = (StatusCode, Html<String>);

fn page(rendered: askama::Result<String>) -> Result<Html<String>, PageError> {
    rendered.map(Html).map_err(|err| {
        tracing::error!(error = %err, "page rendering failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Html("An error occurred while rendering the page.".to_string()))
    })
}

pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let form = FormState { url: "", kind: ChartKind::Bar, k: state.top_k };
    page(render::index_page(&form, None))
}

pub async fn analyze_page_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Html<String>, PageError> {
    let request = match Request::from_params(params, state.top_k) {
        Ok(request) => request,
        Err(msg) => {
            let form = FormState { url: "", kind: ChartKind::Bar, k: state.top_k };
            return Err((StatusCode::BAD_REQUEST, page(render::error_page(&form, &msg))?));
        }
    };
    if request.url.is_empty() {
        return page(render::index_page(&request.form(), Some("Please enter a URL.")));
    }
    match request.run(&state.fetcher).await {
        Ok(analysis) => page(render::analysis_page(&request.form(), &analysis)),
        Err(err) => page(render::error_page(&request.form(), &err.to_string())),
    }
}

pub async fn analyze_api_handler(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeParams>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<Value>)> {
    let start = std::time::Instant::now();
    let request = Request::from_params(params, state.top_k)
        .map_err(|msg| (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg, "kind": "bad_request" }))))?;
    if request.url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "missing `url` parameter", "kind": "bad_request" })),
        ));
    }
    let analysis = request
        .run(&state.fetcher)
        .await
        .map_err(|err| (status_for(&err), Json(serde_json::json!({ "error": err.to_string(), "kind": err.kind() }))))?;

    let images = analysis.images.as_ref().map(|outcomes| {
        outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(image) => ImageReport {
                    url: image.url.clone(),
                    ok: true,
                    content_type: image.content_type.clone(),
                    bytes: Some(image.bytes.len()),
                    error: None,
                },
                Err(err) => ImageReport {
                    url: err.url.clone(),
                    ok: false,
                    content_type: None,
                    bytes: None,
                    error: Some(err.source.to_string()),
                },
            })
            .collect()
    });
    let chart = chart_options(request.kind, &analysis.ranking.top);
    Ok(Json(AnalyzeResponse {
        url: analysis.page.url.to_string(),
        kind: request.kind,
        encoding: analysis.page.encoding,
        encoding_source: analysis.page.encoding_source,
        distinct_tokens: analysis.ranking.table.len(),
        counted_tokens: analysis.ranking.table.total(),
        top: analysis.ranking.top,
        chart,
        images,
        took_s: start.elapsed().as_secs_f64(),
    }))
}

pub fn status_for(err: &FetchError) -> StatusCode {
    match err {
        FetchError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
        FetchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        FetchError::Parse { .. } | FetchError::NotAnImage { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        FetchError::Network { .. } | FetchError::Status { .. } => StatusCode::BAD_GATEWAY,
        FetchError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
