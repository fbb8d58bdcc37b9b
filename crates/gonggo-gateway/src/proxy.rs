use axum::http::HeaderMap;

/// Base URLs the proxy forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstreams {
    /// Document parsing, image processing and question generation.
    pub kintel: String,
    /// Intent, chat and summarization.
    pub models: String,
    /// FAQ answer model and its health endpoint.
    pub faq: String,
}

impl Default for Upstreams {
    fn default() -> Self {
        Self {
            kintel: "http://localhost:51037".into(),
            models: "http://localhost:51036".into(),
            faq: "http://localhost:51038".into(),
        }
    }
}

const KINTEL_PREFIX: &str = "/api/kintel";
const MODELS_PREFIX: &str = "/api/models";

const MODELS_ROUTES: &[&str] = &["/intent", "/chat", "/summarization"];
const FAQ_ROUTES: &[&str] = &["/faq_answer_model", "/health"];

/// Segment-wise prefix match: `/chat` matches `/chat` and `/chat/x`, not `/chatter`.
fn strip_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}{path}")
    }
}

impl Upstreams {
    /// Upstream URL for an incoming path, without the query string.
    pub(crate) fn resolve(&self, path: &str) -> Option<String> {
        if let Some(rest) = strip_segment(path, KINTEL_PREFIX) {
            return Some(join(&self.kintel, rest));
        }
        let rest = strip_segment(path, MODELS_PREFIX)?;
        if FAQ_ROUTES.iter().any(|r| strip_segment(rest, r).is_some()) {
            return Some(join(&self.faq, rest));
        }
        if MODELS_ROUTES.iter().any(|r| strip_segment(rest, r).is_some()) {
            return Some(join(&self.models, rest));
        }
        None
    }
}

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Copy of `headers` without hop-by-hop headers, `host` and `content-length`.
pub(crate) fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(*name);
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header};

    use super::*;

    fn upstreams() -> Upstreams {
        Upstreams {
            kintel: "http://k:1".into(),
            models: "http://m:2/".into(),
            faq: "http://f:3".into(),
        }
    }

    #[test]
    fn kintel_prefix_is_stripped() {
        let u = upstreams();
        assert_eq!(
            u.resolve("/api/kintel/parse-document/").as_deref(),
            Some("http://k:1/parse-document/")
        );
        assert_eq!(u.resolve("/api/kintel").as_deref(), Some("http://k:1/"));
        assert_eq!(u.resolve("/api/kintelx/a"), None);
    }

    #[test]
    fn model_routes_split_between_servers() {
        let u = upstreams();
        assert_eq!(u.resolve("/api/models/intent").as_deref(), Some("http://m:2/intent"));
        assert_eq!(u.resolve("/api/models/chat").as_deref(), Some("http://m:2/chat"));
        assert_eq!(
            u.resolve("/api/models/summarization").as_deref(),
            Some("http://m:2/summarization")
        );
        assert_eq!(
            u.resolve("/api/models/faq_answer_model").as_deref(),
            Some("http://f:3/faq_answer_model")
        );
        assert_eq!(
            u.resolve("/api/models/health/faq_answer_model").as_deref(),
            Some("http://f:3/health/faq_answer_model")
        );
    }

    #[test]
    fn unknown_paths_do_not_resolve() {
        let u = upstreams();
        assert_eq!(u.resolve("/api/models/chatter"), None);
        assert_eq!(u.resolve("/api/models"), None);
        assert_eq!(u.resolve("/index.html"), None);
    }

    #[test]
    fn hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-request-id", HeaderValue::from_static("abc"));

        let out = forwarded_headers(&headers);
        assert_eq!(out.len(), 2);
        assert!(out.contains_key(header::CONTENT_TYPE));
        assert!(out.contains_key("x-request-id"));
    }
}
