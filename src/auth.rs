use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Accepted bearer tokens for the control API
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let keys: HashSet<String> = keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        tracing::info!("API authentication initialized with {} valid key(s)", keys.len());
        Self {
            keys: Arc::new(keys),
        }
    }

    /// Check if an API key is valid
    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Middleware to require authentication for protected endpoints
pub async fn require_auth(
    State(keys): State<ApiKeys>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header.map(|auth| auth.strip_prefix("Bearer ")) {
        Some(Some(key)) => {
            if keys.is_valid(key) {
                Ok(next.run(request).await)
            } else {
                tracing::warn!("Invalid API key attempted");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        Some(None) => {
            tracing::warn!("Invalid Authorization header format (expected Bearer token)");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let keys = ApiKeys::new(vec!["test_key_123".to_string(), " another_key_456 ".to_string()]);
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(keys, require_auth))
    }

    async fn status_for(header: Option<&str>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_api_key_validation() {
        let keys = ApiKeys::new(vec!["test_key_123".to_string(), " another_key_456 ".to_string()]);
        assert!(keys.is_valid("test_key_123"));
        assert!(keys.is_valid("another_key_456"));
        assert!(!keys.is_valid("invalid_key"));
        assert!(!keys.is_valid(""));
    }

    #[tokio::test]
    async fn test_middleware() {
        assert_eq!(status_for(Some("Bearer test_key_123")).await, StatusCode::OK);
        assert_eq!(status_for(Some("Bearer nope")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(Some("Basic test_key_123")).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(None).await, StatusCode::UNAUTHORIZED);
    }
}
