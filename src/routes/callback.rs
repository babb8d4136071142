//! OAuth callback handler.
//!
//! Receives the authorization-code redirect from the provider, classifies it,
//! and renders a confirmation page. Missing or malformed parameters are valid
//! inputs, not errors: they route to the failure branch. The response status
//! is always 200; OAuth failure is signalled only in the rendered page.

use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Placeholder when the provider sends an error without a description.
const DEFAULT_ERROR_DESCRIPTION: &str = "No description provided";

/// Error type shown when the callback carries neither a code nor an error.
const INVALID_REQUEST_ERROR: &str = "Invalid Request";
const INVALID_REQUEST_DESCRIPTION: &str =
    "No authorization code or error parameter found in the callback URL";

/// Characters of the authorization code kept on each end when logging.
const CODE_LOG_KEEP: usize = 10;

/// Query parameters of an authorization-code redirect. All optional; the
/// provider decides which ones it sends.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub state: Option<String>,
}

/// Classified callback outcome handed to the rendering collaborator.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Success {
        code: String,
        state: Option<String>,
    },
    Failure {
        error_type: String,
        description: String,
    },
}

/// Three-way classification of a callback request.
///
/// A non-empty `code` wins and the error fields are ignored; otherwise a
/// non-empty `error` yields a failure with its description; otherwise the
/// request is failed as invalid. Empty strings count as absent, matching
/// how providers send `?code=` on malformed flows.
pub fn classify(query: CallbackQuery) -> Outcome {
    let non_empty = |value: Option<String>| value.filter(|s| !s.is_empty());

    if let Some(code) = non_empty(query.code) {
        return Outcome::Success {
            code,
            state: non_empty(query.state),
        };
    }

    if let Some(error) = non_empty(query.error) {
        return Outcome::Failure {
            error_type: error,
            description: non_empty(query.error_description)
                .unwrap_or_else(|| DEFAULT_ERROR_DESCRIPTION.to_string()),
        };
    }

    Outcome::Failure {
        error_type: INVALID_REQUEST_ERROR.to_string(),
        description: INVALID_REQUEST_DESCRIPTION.to_string(),
    }
}

/// Truncate an authorization code for logging so the full credential never
/// lands in the logs. Short codes are left as-is.
fn redact_code(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    if chars.len() <= 2 * CODE_LOG_KEEP {
        return code.to_string();
    }
    let head: String = chars[..CODE_LOG_KEEP].iter().collect();
    let tail: String = chars[chars.len() - CODE_LOG_KEEP..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Callback handler: classify the query and render the confirmation page.
#[instrument(name = "callback::callback", skip(state, query))]
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, AppError> {
    let outcome = classify(query);

    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mut context = tera::Context::new();
    context.insert("timestamp", &timestamp);

    match &outcome {
        Outcome::Success { code, state: oauth_state } => {
            tracing::info!(code = %redact_code(code), "OAuth callback received");
            context.insert("success", &true);
            context.insert("auth_code", code);
            context.insert("state", oauth_state);
        }
        Outcome::Failure {
            error_type,
            description,
        } => {
            tracing::warn!(error = %error_type, %description, "OAuth callback failed");
            context.insert("success", &false);
            context.insert("error_type", error_type);
            context.insert("error_description", description);
        }
    }

    let html = state.tera.render("callback.html", &context)?;
    Ok(Html(html))
}
