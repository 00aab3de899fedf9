mod groups;
mod quote;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use dema_core::AppConfig;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogIndex;
use crate::mailer::MailRelay;
use crate::middleware::{
    enforce_rate_limit, request_id, RateLimitState, RequestId, REQUEST_ID_HEADER,
};

pub use quote::QuoteMailSettings;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogIndex>,
    /// `None` when no relay is configured; quote submissions then fail.
    pub mailer: Option<Arc<MailRelay>>,
    pub quote_mail: Arc<QuoteMailSettings>,
}

impl AppState {
    /// Assemble the state from configuration and a loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured mail relay URL is invalid.
    pub fn from_config(config: &AppConfig, catalog: CatalogIndex) -> anyhow::Result<Self> {
        let mailer = match config.mail_relay_url.as_deref() {
            Some(url) => Some(Arc::new(MailRelay::new(
                url,
                config.mail_relay_token.clone(),
                config.mail_timeout_secs,
            )?)),
            None => {
                tracing::warn!("DEMA_MAIL_RELAY_URL not set; quote requests will be rejected");
                None
            }
        };

        Ok(Self {
            catalog: Arc::new(catalog),
            mailer,
            quote_mail: Arc::new(QuoteMailSettings {
                from: config.mail_from.clone(),
                recipients: config.quote_recipients.clone(),
            }),
        })
    }
}

/// Success envelope: `{data, meta}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn new(data: T, request_id: RequestId) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id.0),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Error envelope: `{error: {code, message}, meta}`. The HTTP status is
/// derived from `code`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let error = ErrorBody {
            code: code.into(),
            message: message.into(),
        };
        Self {
            error,
            meta: ResponseMeta::new(request_id),
        }
    }

    fn status(&self) -> StatusCode {
        status_for(&self.error.code)
    }
}

fn status_for(code: &str) -> StatusCode {
    match code {
        "not_found" => StatusCode::NOT_FOUND,
        "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
        "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// The storefront is served from another origin; it reads and posts only.
fn storefront_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER])
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let catalog = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/product-groups", get(groups::list_groups))
        .route("/api/v1/product-groups/{group_id}", get(groups::get_group))
        .route("/api/v1/facets", get(groups::list_facets))
        .route("/api/v1/suggestions", get(groups::list_suggestions));

    // Only quote submissions trigger outbound mail, so only they are limited.
    let quotes = Router::new()
        .route("/api/v1/quote-request", post(quote::submit_quote))
        .route_layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    catalog
        .merge(quotes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(storefront_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    groups: usize,
    mail_relay: &'static str,
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Health>> {
    let mail_relay = if state.mailer.is_some() {
        "configured"
    } else {
        "not_configured"
    };
    ApiResponse::new(
        Health {
            status: "ok",
            groups: state.catalog.groups().len(),
            mail_relay,
        },
        req_id,
    )
}

#[must_use]
pub fn rate_limit_from_config(config: &AppConfig) -> RateLimitState {
    RateLimitState::per_minute(config.rate_limit_per_minute.max(1))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
