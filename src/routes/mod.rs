//! HTTP route handlers.
//!
//! Two user-facing routes (the landing page and the OAuth callback) plus a
//! liveness probe. Per-route Cache-Control headers: the callback response
//! carries a credential and is marked no-store; the static landing page may
//! be cached briefly.
//!
//! Request tracing is enabled via middleware that generates a unique request
//! ID for each incoming request.

pub mod callback;
pub mod health;
pub mod index;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{CACHE_CONTROL_CALLBACK, CACHE_CONTROL_INDEX, CALLBACK_PATH};
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes and cache headers.
pub fn create_router(state: AppState) -> Router {
    // Callback - never cached, the response embeds an authorization code
    let callback_routes = Router::new()
        .route(CALLBACK_PATH, get(callback::callback))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_CALLBACK),
        ));

    // Landing page - static instructions, short cache
    let index_routes = Router::new().route("/", get(index::index)).layer(
        SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_INDEX),
        ),
    );

    // Health check - no caching, always fresh for liveness probes
    let health_routes = Router::new().route("/health", get(health::health));

    Router::new()
        .merge(callback_routes)
        .merge(index_routes)
        .merge(health_routes)
        .with_state(state)
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::state::Scheme;
    use crate::templates::init_templates;

    fn test_router() -> Router {
        let state = AppState::new(AppConfig::default(), init_templates().unwrap(), Scheme::Https);
        create_router(state)
    }

    // OAuth failure is signalled only in the rendered page, never via the
    // HTTP status. Every classification branch answers 200.
    #[tokio::test]
    async fn callback_returns_200_on_every_branch() {
        for uri in [
            "/oauth_callback?code=abc123&state=xyz",
            "/oauth_callback?error=access_denied",
            "/oauth_callback",
        ] {
            let response = test_router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        }
    }

    #[tokio::test]
    async fn callback_response_is_marked_no_store() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/oauth_callback?code=abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let cache_control = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|value| value.to_str().ok());
        assert_eq!(cache_control, Some(CACHE_CONTROL_CALLBACK));
    }
}
