//! Helpers for building and validating the `redirect_url` used to resume
//! navigation after logging in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Validate a redirect URL taken from user-controlled input.
///
/// Only local, absolute paths are accepted so that the log-in flow can never
/// bounce a user to another site. Returns the normalized URL, or `None` if
/// the input is not a safe local path.
pub(crate) fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    // Protocol-relative URLs ("//evil.example") would leave the site.
    if !raw_url.starts_with('/') || raw_url.starts_with("//") {
        return None;
    }

    let uri: Uri = raw_url.parse().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    uri.path_and_query()
        .map(|path_and_query| path_and_query.to_string())
}

/// Build the log-in page URL that sends the user back to where they were.
///
/// For htmx requests the current page comes from the `HX-Current-URL` header,
/// otherwise the request's own URI is used. Returns `None` if no safe
/// redirect target can be derived.
pub(crate) fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let is_htmx_request = request.headers().get("HX-Request").is_some();

    let target = if is_htmx_request {
        let current_url = request.headers().get("HX-Current-URL")?.to_str().ok()?;
        let uri: Uri = current_url.parse().ok()?;
        uri.path_and_query()?.to_string()
    } else {
        request
            .uri()
            .path_and_query()
            .map(|path_and_query| path_and_query.to_string())?
    };

    let target = normalize_redirect_url(&target)?;

    build_log_in_redirect_url_from_target(&target)
}

/// Build the log-in page URL with `target` encoded as the `redirect_url` query parameter.
pub(crate) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .ok()
        .map(|query| format!("{}?{}", endpoints::LOG_IN_VIEW, query))
}
