//! Informational landing page.
//!
//! Shows the callback URL to paste into the OAuth client, derived from the
//! request Host header so the page is correct however the user reached it.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
};
use tracing::instrument;

use crate::config::CALLBACK_PATH;
use crate::error::AppError;
use crate::state::AppState;

/// Externally visible base URL for this request. Falls back to the
/// configured port on localhost when no Host header is present.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("localhost:{}", state.config.http.port));

    format!("{}://{}", state.scheme.as_str(), host)
}

/// Landing page handler.
#[instrument(name = "index::index", skip(state, headers))]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, AppError> {
    let base_url = base_url(&state, &headers);

    let mut context = tera::Context::new();
    context.insert("callback_url", &format!("{}{}", base_url, CALLBACK_PATH));

    let html = state.tera.render("index.html", &context)?;
    Ok(Html(html))
}
