//! Helpers for the `redirect_url` that sends a user back to the page they
//! asked for once they have logged in.

use axum::{extract::Request, http::Uri};
use tracing::{error, warn};

use crate::endpoints;

fn is_safe_redirect_url(redirect_url: &str) -> bool {
    if !redirect_url.starts_with('/') || redirect_url.starts_with("//") {
        return false;
    }

    let path = redirect_url
        .split_once('?')
        .map(|(path, _)| path)
        .unwrap_or(redirect_url);

    // Sending a user back to an auth page after logging in would loop or log them out.
    ![endpoints::LOG_IN_VIEW, endpoints::REGISTER_VIEW, endpoints::LOG_OUT].contains(&path)
}

/// Reduce `raw_url` to a same-site path and query, or `None` if it points
/// to another site or to an auth page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_url(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in page URL that returns the user to the page `request` was for.
///
/// htmx API requests carry the page URL in the `HX-Current-URL` header
/// instead of the request URI.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)?
    } else {
        redirect_target_from_request_uri(request)?
    };

    build_log_in_redirect_url_from_target(&redirect_target)
}

pub(super) fn build_log_in_redirect_url_from_target(redirect_target: &str) -> Option<String> {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(param) => Some(format!("{}?{}", endpoints::LOG_IN_VIEW, param)),
        Err(error) => {
            error!("Could not encode redirect URL {redirect_target}: {error}");
            None
        }
    }
}

fn redirect_target_from_request_uri(request: &Request) -> Option<String> {
    let path_and_query = request.uri().path_and_query()?.as_str();
    normalize_redirect_url(path_and_query)
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .map(|header| header.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if !hx_request {
        warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = match headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Missing HX-Current-URL header for /api request.");
            return None;
        }
    };

    let redirect_url = normalize_hx_current_url(current_url);
    if redirect_url.is_none() {
        warn!("Invalid HX-Current-URL header value: {current_url}");
    }

    redirect_url
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_paths_with_query() {
        assert_eq!(
            normalize_redirect_url("/transactions/new?goal_id=3"),
            Some("/transactions/new?goal_id=3".to_owned())
        );
    }

    #[test]
    fn rejects_other_sites_and_auth_pages() {
        for url in [
            "https://example.com/dashboard",
            "//example.com/dashboard",
            "dashboard",
            endpoints::LOG_IN_VIEW,
            endpoints::REGISTER_VIEW,
            endpoints::LOG_OUT,
        ] {
            assert_eq!(normalize_redirect_url(url), None, "want {url} rejected");
        }
    }

    #[test]
    fn page_request_redirects_back_to_itself() {
        let request = Request::builder()
            .uri("/goals")
            .body(Body::empty())
            .unwrap();

        let got = build_log_in_redirect_url(&request).unwrap();

        assert_eq!(got, format!("{}?redirect_url=%2Fgoals", endpoints::LOG_IN_VIEW));
    }

    #[test]
    fn api_request_uses_current_url_header() {
        let request = Request::builder()
            .uri(endpoints::TRANSACTIONS_API)
            .header("hx-request", "true")
            .header("hx-current-url", "http://localhost:3000/transactions/new")
            .body(Body::empty())
            .unwrap();

        let got = build_log_in_redirect_url(&request).unwrap();

        assert_eq!(
            got,
            format!(
                "{}?redirect_url=%2Ftransactions%2Fnew",
                endpoints::LOG_IN_VIEW
            )
        );
    }

    #[test]
    fn api_request_without_htmx_headers_has_no_target() {
        let request = Request::builder()
            .uri(endpoints::TRANSACTIONS_API)
            .body(Body::empty())
            .unwrap();

        assert_eq!(build_log_in_redirect_url(&request), None);
    }
}
