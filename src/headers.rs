use http_client::Request;
use http_types::Url;

/// User agent sent with every submission
const USER_AGENT: &str = concat!("lead-capture/", env!("CARGO_PKG_VERSION"));

/// Add the headers a browser sends for a CORS `fetch` that accepts JSON.
pub fn add_lead_capture_headers(
    request: &mut Request,
    endpoint_url: &Url,
    page_url: &Url,
    content_type: &str,
) {
    let _ = request.insert_header("User-Agent", USER_AGENT);
    let _ = request.insert_header("Accept", "application/json");
    let _ = request.insert_header("Content-Type", content_type);
    let _ = request.insert_header("Origin", page_url.origin().ascii_serialization());
    let _ = request.insert_header("Referer", page_url.as_str());
    let _ = request.insert_header("Sec-Fetch-Dest", "empty");
    let _ = request.insert_header("Sec-Fetch-Mode", "cors");
    // Telling same-site from cross-site needs the public suffix list, so
    // only the origin case is labelled.
    if is_same_origin(endpoint_url, page_url) {
        let _ = request.insert_header("Sec-Fetch-Site", "same-origin");
    }
}

/// Attach the host's cookies only when the endpoint shares the page's
/// origin (`credentials: "same-origin"`).
pub fn add_same_origin_cookies(
    request: &mut Request,
    endpoint_url: &Url,
    page_url: &Url,
    cookie_header: Option<&str>,
) {
    match cookie_header {
        Some(cookies) if !cookies.is_empty() && is_same_origin(endpoint_url, page_url) => {
            let _ = request.insert_header("Cookie", cookies);
        }
        Some(_) => {
            log::debug!("Not sending cookies to cross-origin endpoint {endpoint_url}");
        }
        None => {}
    }
}

pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
