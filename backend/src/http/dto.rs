//! Response bodies of the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::extract::SessionHandle;
use crate::auth::FlashMessage;

/// A rendered page: the template a client should use, its context and the
/// flash messages queued since the last page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub template: &'static str,
    pub context: T,
    pub messages: Vec<FlashMessage>,
}

impl<T: Serialize> PageResponse<T> {
    /// Build a page and drain the session's pending messages into it.
    pub fn render(session: &mut SessionHandle, template: &'static str, context: T) -> Self {
        Self {
            template,
            context,
            messages: session.take_messages(),
        }
    }

    /// Respond with a status other than 200, e.g. a re-rendered invalid form.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for PageResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Query string of the login page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    /// Path to return to after logging in
    #[serde(default)]
    pub next: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the service
    pub version: String,
    /// Repository status
    pub database: String,
}
