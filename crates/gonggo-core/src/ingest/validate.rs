use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static BARE_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9]?\.[a-zA-Z]{2,}$").unwrap()
});

/// Return the URL to fetch when `raw` looks like a link, `None` otherwise.
///
/// Accepted forms: `http(s)://` with a dotted host, a `www.` prefix, or a bare
/// `domain.tld`. The last two are fetched over `https`.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let parsed = Url::parse(trimmed).ok()?;
        return has_dotted_host(&parsed).then(|| trimmed.to_owned());
    }

    if trimmed.starts_with("www.") || BARE_DOMAIN_RE.is_match(trimmed) {
        let candidate = format!("https://{trimmed}");
        let parsed = Url::parse(&candidate).ok()?;
        return has_dotted_host(&parsed).then_some(candidate);
    }

    None
}

#[must_use]
pub fn is_valid_url(raw: &str) -> bool {
    normalize_url(raw).is_some()
}

fn has_dotted_host(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|h| h.contains('.'))
}
