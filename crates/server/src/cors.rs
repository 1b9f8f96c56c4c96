//! Origin allow-list.
//!
//! Two pieces: [`enforce_allowed_origin`] rejects requests from unlisted
//! origins before any handler runs, and [`build_cors`] adds the
//! `Access-Control-Allow-*` headers for the listed ones.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use configs::CorsConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::errors::{JsonApiError, StartupError};

#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: HashSet<String>,
    headers: Vec<HeaderValue>,
}

impl AllowedOrigins {
    /// Every entry must be a concrete origin usable as a header value. `*` is
    /// refused.
    pub fn new<I, S>(origins: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed = Self::default();
        for origin in origins {
            let origin = origin.into();
            if origin.trim() == "*" {
                return Err(StartupError::InvalidConfig(
                    "cors.allowed_origins cannot contain `*`; list origins explicitly".into(),
                ));
            }
            let header = HeaderValue::from_str(&origin).map_err(|_| {
                StartupError::InvalidConfig(format!("cors origin `{origin}` is not a valid header value"))
            })?;
            if allowed.origins.insert(origin) {
                allowed.headers.push(header);
            }
        }
        Ok(allowed)
    }

    pub fn from_config(cfg: &CorsConfig) -> Result<Self, StartupError> {
        Self::new(cfg.allowed_origins.iter().cloned())
    }

    /// Absent origins (same-origin or non-browser clients) are always allowed.
    pub fn permits(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(value) => value.to_str().map(|o| self.origins.contains(o)).unwrap_or(false),
        }
    }
}

pub fn build_cors(origins: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.headers.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Reject requests whose `Origin` is present but not allow-listed.
pub async fn enforce_allowed_origin(
    State(origins): State<Arc<AllowedOrigins>>,
    req: Request,
    next: Next,
) -> Response {
    let origin = req.headers().get(header::ORIGIN);
    if origins.permits(origin) {
        return next.run(req).await;
    }
    warn!(
        origin = ?origin,
        path = %req.uri().path(),
        "request blocked by CORS allow-list"
    );
    JsonApiError::new(StatusCode::FORBIDDEN, "Blocked by CORS").into_response()
}
