//! Reconstruct the public base URL (`scheme://host[:port]`) of an incoming
//! request, honouring `X-Forwarded-Proto` from a reverse proxy.

use axum::http::{header::HOST, HeaderMap, Uri};
use url::Url;

pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Absolute URL the request was sent to.
///
/// Absolute-form request targets are used as is; otherwise the URL is
/// assembled from the `Host` header over plain http, which is what the
/// listener speaks. A missing or unusable `Host` falls back to `localhost`.
pub fn request_url(uri: &Uri, headers: &HeaderMap) -> Option<Url> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        if let Ok(url) = Url::parse(&uri.to_string()) {
            return Some(url);
        }
    }

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());
    if let Some(url) = host.and_then(|h| Url::parse(&format!("http://{}{}", h, uri.path())).ok()) {
        return Some(url);
    }

    if let Some(h) = host {
        tracing::warn!(host = h, "unusable Host header, using localhost");
    }
    Url::parse(&format!("http://localhost{}", uri.path())).ok()
}

/// Scheme for links back to this service: a present, non-empty
/// `forwarded_proto` wins over the scheme the request arrived on.
pub fn effective_scheme<'a>(request_scheme: &'a str, forwarded_proto: Option<&'a str>) -> &'a str {
    forwarded_proto
        .filter(|p| !p.is_empty())
        .unwrap_or(request_scheme)
}

/// Value of `X-Forwarded-Proto`, if the header is present and readable.
pub fn forwarded_proto(headers: &HeaderMap) -> Option<&str> {
    headers.get(FORWARDED_PROTO).and_then(|v| v.to_str().ok())
}

/// `scheme://host[:port]` for building absolute links back to this service.
///
/// A present, non-empty `forwarded_proto` replaces the request's scheme; an
/// empty one is ignored. The port is kept only when it is not the default
/// port of the scheme the request arrived on.
pub fn base_url(request_url: &Url, forwarded_proto: Option<&str>) -> String {
    let scheme = effective_scheme(request_url.scheme(), forwarded_proto);
    let host = request_url.host_str().unwrap_or("localhost");

    match request_url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_plain_request_keeps_scheme_and_port() {
        let u = url("http://localhost:8080/apptoken/rest/apptoken/141414");
        assert_eq!(base_url(&u, None), "http://localhost:8080");
    }

    #[test]
    fn test_forwarded_proto_overrides_scheme() {
        let u = url("http://localhost:8080/apptoken/rest/apptoken/141414");
        assert_eq!(base_url(&u, Some("https")), "https://localhost:8080");
    }

    #[test]
    fn test_forwarded_proto_matching_scheme_is_not_duplicated() {
        let u = url("https://localhost:8080/apptoken/rest/apptoken/141414");
        let base = base_url(&u, Some("https"));
        assert_eq!(base, "https://localhost:8080");
        assert!(!base.contains("httpshttps"));
    }

    #[test]
    fn test_empty_forwarded_proto_is_ignored() {
        let u = url("http://localhost:8080/x");
        assert_eq!(base_url(&u, Some("")), "http://localhost:8080");
    }

    #[test]
    fn test_default_ports_are_omitted() {
        assert_eq!(base_url(&url("http://example.org:80/x"), None), "http://example.org");
        assert_eq!(base_url(&url("https://example.org:443/x"), None), "https://example.org");
        assert_eq!(
            base_url(&url("http://example.org:80/x"), Some("https")),
            "https://example.org"
        );
    }

    #[test]
    fn test_non_default_port_is_kept() {
        assert_eq!(base_url(&url("https://example.org:8443/x"), None), "https://example.org:8443");
        assert_eq!(base_url(&url("http://example.org:443/x"), None), "http://example.org:443");
    }

    #[test]
    fn test_request_url_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:8080"));
        let uri: Uri = "/apptoken/someUserId/someAppToken".parse().unwrap();

        let u = request_url(&uri, &headers).unwrap();
        assert_eq!(u.as_str(), "http://localhost:8080/apptoken/someUserId/someAppToken");
    }

    #[test]
    fn test_request_url_absolute_form() {
        let uri: Uri = "https://verifier.example.org/apptoken/u/t".parse().unwrap();
        let u = request_url(&uri, &HeaderMap::new()).unwrap();
        assert_eq!(base_url(&u, None), "https://verifier.example.org");
    }

    #[test]
    fn test_request_url_without_host_falls_back_to_localhost() {
        let uri: Uri = "/apptoken/u/t".parse().unwrap();
        let u = request_url(&uri, &HeaderMap::new()).unwrap();
        assert_eq!(base_url(&u, None), "http://localhost");
    }

    #[test]
    fn test_request_url_with_invalid_host_falls_back_to_localhost() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("verifier.example.org:99999"));
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https"));
        let uri: Uri = "/apptoken/u/t".parse().unwrap();

        let u = request_url(&uri, &headers).unwrap();
        assert_eq!(u.as_str(), "http://localhost/apptoken/u/t");
        assert_eq!(base_url(&u, forwarded_proto(&headers)), "https://localhost");
    }

    #[test]
    fn test_effective_scheme() {
        assert_eq!(effective_scheme("http", None), "http");
        assert_eq!(effective_scheme("http", Some("")), "http");
        assert_eq!(effective_scheme("http", Some("https")), "https");
    }

    #[test]
    fn test_forwarded_proto_header_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(forwarded_proto(&headers), None);
        headers.insert("X-Forwarded-Proto", HeaderValue::from_static("https"));
        assert_eq!(forwarded_proto(&headers), Some("https"));
    }
}
