//! The 500 page and helpers for sending clients to it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    endpoints,
    html::{error_view, render},
};

/// Get the internal server error page with a generic message.
pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(
        "Sorry, something went wrong.",
        "Try again later or check the server logs.",
    )
}

/// Render the internal server error page with the given `description` and suggested `fix`.
pub fn render_internal_server_error(description: &str, fix: &str) -> Response {
    render(
        StatusCode::INTERNAL_SERVER_ERROR,
        error_view("Error", "500", description, fix),
    )
}

/// Get a response that will redirect the client to the internal server error 500 page.
///
/// **Note**: This redirect is intended to be served as a response to a POST request initiated by HTMX.
/// Route handlers using GET should use `axum::response::Redirect` to redirect via a response.
#[allow(dead_code)]
pub fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
        .into_response()
}
