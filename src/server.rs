//! HTTP surface over the retriever
//!
//! Translates query strings into `RecordRequest`s and `RetrievalError`s into
//! status codes with a `{"message": ...}` body.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::data::{all_financial_years, all_states, is_known_state, SortDirection, SortSpec};
use crate::retrieval::{RecordRequest, RetrievalError, Retrieved, Retriever, DEFAULT_LIMIT};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub retriever: Arc<Retriever>,
}

/// Error response with an HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        let status = match err {
            RetrievalError::Validation(_) => StatusCode::BAD_REQUEST,
            RetrievalError::MalformedUpstreamPayload(_) => StatusCode::BAD_GATEWAY,
            RetrievalError::NoCacheAvailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

/// Raw query string for `GET /api/mgnrega`
///
/// Everything arrives as text so that a bad `limit` is reported in the same
/// error shape as every other validation failure.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsParams {
    #[serde(alias = "region")]
    pub state_name: Option<String>,
    #[serde(alias = "period")]
    pub fin_year: Option<String>,
    pub limit: Option<String>,
    pub sort_field: Option<String>,
    #[serde(alias = "sort_direction")]
    pub sort_order: Option<String>,
}

impl TryFrom<RecordsParams> for RecordRequest {
    type Error = RetrievalError;

    fn try_from(params: RecordsParams) -> Result<Self, Self::Error> {
        let limit = match params.limit.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    RetrievalError::Validation(format!(
                        "limit must be a positive integer, got '{}'",
                        raw
                    ))
                })?,
        };

        let mut sort = SortSpec::default();
        if let Some(field) = params.sort_field.filter(|f| !f.is_empty()) {
            sort.field = field;
        }
        if let Some(order) = params.sort_order.as_deref() {
            sort.direction = SortDirection::from_param(order);
        }

        Ok(RecordRequest::new(
            params.state_name.unwrap_or_default(),
            params.fin_year.unwrap_or_default(),
        )
        .with_limit(limit)
        .with_sort(sort))
    }
}

#[derive(Debug, Serialize)]
struct Catalog {
    states: &'static [&'static str],
    financial_years: &'static [&'static str],
}

/// Builds the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/mgnrega", get(fetch_records))
        .route("/api/mgnrega/catalog", get(catalog))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn fetch_records(
    State(state): State<AppState>,
    params: Result<Query<RecordsParams>, QueryRejection>,
) -> Result<Json<Retrieved>, ApiError> {
    let Query(params) = params?;
    let request = RecordRequest::try_from(params)?;
    if !request.region.is_empty() && !is_known_state(&request.region) {
        tracing::debug!(region = %request.region, "Region not in catalog, forwarding anyway");
    }
    let retrieved = state.retriever.retrieve(&request).await?;
    Ok(Json(retrieved))
}

async fn catalog() -> impl IntoResponse {
    Json(Catalog {
        states: all_states(),
        financial_years: all_financial_years(),
    })
}
