use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
fn must_get_header<'a>(response: &'a Response<Body>, header_name: &str) -> &'a str {
    response
        .headers()
        .get(header_name)
        .unwrap_or_else(|| panic!("{header_name} header missing"))
        .to_str()
        .expect("header is not visible ASCII")
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(must_get_header(response, "content-type"), content_type);
}

/// Check that htmx is told to load `endpoint` next.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(must_get_header(response, "hx-redirect"), endpoint);
}
