//! URL normalization.
//!
//! The service echoes URLs back in its own format (`https://x.com` comes
//! back as `https://x.com/`, ping targets carry a `ping://` scheme).
//! Everything compared or persisted goes through [`normalize`] first so an
//! unchanged resource never reads as drift.
//!
//! `normalize(k, normalize(k, u)) == normalize(k, u)` for every input,
//! including strings that do not parse as URLs.

use url::{Position, Url};

/// Scheme prefix the service requires on ping targets.
pub const PING_SCHEME: &str = "ping://";

/// Which normalization rules apply to a URL field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    /// HTTP(S) URLs: a bare `/` path is dropped.
    Http,
    /// `host:port` targets: kept verbatim.
    Tcp,
    /// Ping targets: the `ping://` prefix is dropped.
    Ping,
}

/// Canonical form of `value`. Never fails.
pub fn normalize(kind: UrlKind, value: &str) -> String {
    match kind {
        UrlKind::Http => normalize_http(value),
        UrlKind::Tcp => value.to_string(),
        UrlKind::Ping => strip_ping_scheme(value).to_string(),
    }
}

/// Drop a path that is exactly `/`, keeping query and fragment.
///
/// Unparsable input falls back to trimming trailing slashes.
pub fn normalize_http(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    match Url::parse(value) {
        Ok(url) => serialize_without_root_path(&url),
        Err(_) => {
            let trimmed = value.trim_end_matches('/');
            match Url::parse(trimmed) {
                Ok(url) if trimmed != value => serialize_without_root_path(&url),
                _ => trimmed.to_string(),
            }
        }
    }
}

fn serialize_without_root_path(url: &Url) -> String {
    if url.path() == "/" {
        format!("{}{}", &url[..Position::BeforePath], &url[Position::AfterPath..])
    } else {
        url.to_string()
    }
}

/// Remove every leading `ping://`.
pub fn strip_ping_scheme(value: &str) -> &str {
    let mut rest = value;
    while let Some(stripped) = rest.strip_prefix(PING_SCHEME) {
        rest = stripped;
    }
    rest
}

/// Add `ping://` unless already present.
pub fn with_ping_scheme(value: &str) -> String {
    format!("{PING_SCHEME}{}", strip_ping_scheme(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "/",
        "https://example.com",
        "https://example.com/",
        "https://example.com//",
        "https://example.com/health/",
        "https://example.com/?q=1",
        "https://example.com/#top",
        "HTTPS://Example.COM/",
        "http://localhost:8080/",
        "not a url/",
        "not a url///",
        "example.com/",
        "db.example.com:5432",
        "ping://server.example.com",
        "ping://ping://server.example.com",
        "http://[::1/",
        "file:///",
        "mailto:ops@example.com",
    ];

    #[test]
    fn test_trailing_slash_dropped() {
        assert_eq!(normalize_http("https://example.com/"), "https://example.com");
        assert_eq!(normalize_http("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_non_root_path_kept() {
        assert_eq!(normalize_http("https://example.com/health"), "https://example.com/health");
        assert_eq!(normalize_http("https://example.com/health/"), "https://example.com/health/");
    }

    #[test]
    fn test_query_and_fragment_kept() {
        assert_eq!(normalize_http("https://example.com/?q=1"), "https://example.com?q=1");
        assert_eq!(normalize_http("https://example.com/#top"), "https://example.com#top");
    }

    #[test]
    fn test_unparsable_falls_back_to_trim() {
        assert_eq!(normalize_http("not a url/"), "not a url");
        assert_eq!(normalize_http("example.com/"), "example.com");
    }

    #[test]
    fn test_ping_prefix_stripped() {
        assert_eq!(normalize(UrlKind::Ping, "ping://server.example.com"), "server.example.com");
        assert_eq!(normalize(UrlKind::Ping, "server.example.com"), "server.example.com");
        assert_eq!(with_ping_scheme("server.example.com"), "ping://server.example.com");
        assert_eq!(with_ping_scheme("ping://server.example.com"), "ping://server.example.com");
    }

    #[test]
    fn test_tcp_verbatim() {
        assert_eq!(normalize(UrlKind::Tcp, "db.example.com:5432/"), "db.example.com:5432/");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for kind in [UrlKind::Http, UrlKind::Tcp, UrlKind::Ping] {
            for sample in SAMPLES {
                let once = normalize(kind, sample);
                let twice = normalize(kind, &once);
                assert_eq!(once, twice, "{kind:?} not idempotent for {sample:?}");
            }
        }
    }
}
