//! The 404 page shown for routes that do not exist.

use axum::{
    http::StatusCode,
    response::Response,
};

use crate::html::{error_view, render};

/// The fallback route handler for requests that match no other route.
pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

/// Get a response containing the 404 page.
pub fn get_404_not_found_response() -> Response {
    render(
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Whoops! That page doesn't exist.",
            "Check that the URL is correct and try again.",
        ),
    )
}
