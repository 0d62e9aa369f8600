use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
fn header_str<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Response has no {name} header"))
        .to_str()
        .unwrap_or_else(|error| panic!("{name} header is not ASCII: {error}"))
}

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(header_str(response, "content-type"), content_type);
}

/// Assert htmx is told to load `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(header_str(response, "hx-redirect"), endpoint);
}

/// Assert a plain `303 See Other` redirect to `endpoint`.
#[track_caller]
pub(crate) fn assert_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_str(response, "location"), endpoint);
}
