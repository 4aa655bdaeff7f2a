//! Monitor types.
//!
//! The wire `settings` object is keyed by type tag:
//! `{"https": {"url": "...", ...}}`. HTTPS header maps travel as
//! `"Key: Value"` lines joined by `\n`.

use super::{PayloadReader, PayloadWriter};
use crate::error::{Error, Result};
use crate::normalize::{normalize_http, strip_ping_scheme, with_ping_scheme};
use crate::types::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// `https` monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpsSettings {
    pub url: String,
    /// Left to the service when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    /// Accepted status codes, e.g. `"200-299"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_statuses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_certificate_expiration: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_redirect: Option<bool>,
}

impl HttpsSettings {
    /// Settings with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_method: None,
            http_statuses: None,
            request_headers: None,
            request_body: None,
            response_headers: None,
            response_body: None,
            check_certificate_expiration: None,
            follow_redirect: None,
        }
    }
}

/// `tcp` monitor. `url` is a `host:port` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TcpSettings {
    pub url: String,
}

/// `ping` monitor. `url` is a bare host or IP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PingSettings {
    pub url: String,
}

/// A monitor's check type with its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings", rename_all = "lowercase")]
pub enum MonitorType {
    Https(HttpsSettings),
    Tcp(TcpSettings),
    Ping(PingSettings),
}

impl MonitorType {
    /// Every monitor type tag the codec understands.
    pub const TAGS: [&'static str; 3] = ["https", "tcp", "ping"];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Https(_) => "https",
            Self::Tcp(_) => "tcp",
            Self::Ping(_) => "ping",
        }
    }

    /// Target URL as configured.
    pub fn url(&self) -> &str {
        match self {
            Self::Https(s) => &s.url,
            Self::Tcp(s) => &s.url,
            Self::Ping(s) => &s.url,
        }
    }

    /// Wire payload for this type. Ping targets gain the `ping://` scheme.
    pub fn encode(&self) -> Map<String, Value> {
        let w = PayloadWriter::new();
        match self {
            Self::Https(s) => w
                .str("url", &s.url)
                .opt_str("http_method", s.http_method.as_deref())
                .opt_str("http_statuses", s.http_statuses.as_deref())
                .opt_str(
                    "request_headers",
                    s.request_headers.as_ref().map(encode_headers).as_deref(),
                )
                .opt_str("request_body", s.request_body.as_deref())
                .opt_str(
                    "response_headers",
                    s.response_headers.as_ref().map(encode_headers).as_deref(),
                )
                .opt_str("response_body", s.response_body.as_deref())
                .opt_bool("check_certificate_expiration", s.check_certificate_expiration)
                .opt_bool("follow_redirect", s.follow_redirect),
            Self::Tcp(s) => w.str("url", &s.url),
            Self::Ping(s) => w.str("url", &with_ping_scheme(&s.url)),
        }
        .finish()
    }

    /// Parse the wire payload for `tag`. Ping targets lose the `ping://` scheme.
    pub fn decode(tag: &str, payload: &Value) -> Result<Self> {
        if !Self::TAGS.contains(&tag) {
            return Err(Error::UnsupportedVariant {
                kind: ResourceKind::Monitor,
                tag: tag.to_string(),
            });
        }
        let r = PayloadReader::new(tag, payload)?;
        match tag {
            "https" => Ok(Self::Https(HttpsSettings {
                url: r.required_str("url")?,
                http_method: r.opt_str("http_method")?,
                http_statuses: r.opt_str("http_statuses")?,
                request_headers: r.opt_str("request_headers")?.as_deref().map(decode_headers),
                request_body: r.opt_str("request_body")?,
                response_headers: r.opt_str("response_headers")?.as_deref().map(decode_headers),
                response_body: r.opt_str("response_body")?,
                check_certificate_expiration: r.opt_bool("check_certificate_expiration")?,
                follow_redirect: r.opt_bool("follow_redirect")?,
            })),
            "tcp" => Ok(Self::Tcp(TcpSettings {
                url: r.required_str("url")?,
            })),
            _ => Ok(Self::Ping(PingSettings {
                url: strip_ping_scheme(&r.required_str("url")?).to_string(),
            })),
        }
    }

    /// Wire `settings` object: `{tag: payload}`.
    pub fn to_wire_settings(&self) -> Map<String, Value> {
        let mut settings = Map::new();
        settings.insert(self.tag().to_string(), Value::Object(self.encode()));
        settings
    }

    /// Parse a wire `settings` object. Null entries are ignored; exactly one
    /// type must remain.
    pub fn from_wire_settings(settings: &Map<String, Value>) -> Result<Self> {
        let mut present = settings.iter().filter(|(_, v)| !v.is_null());
        match (present.next(), present.next()) {
            (Some((tag, payload)), None) => Self::decode(tag, payload),
            (None, _) => Err(Error::malformed("settings", "<type>", "must name a monitor type")),
            (Some(_), Some(_)) => Err(Error::malformed(
                "settings",
                "<type>",
                "must name exactly one monitor type",
            )),
        }
    }

    /// Canonical form used for comparison and persistence.
    ///
    /// Normalizes the URL, defaults the HTTPS booleans to `true` and collapses
    /// empty header maps and bodies to absent. `http_method` stays absent.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Self::Https(s) => Self::Https(HttpsSettings {
                url: normalize_http(&s.url),
                http_method: s.http_method.filter(|m| !m.is_empty()),
                http_statuses: s.http_statuses.filter(|v| !v.is_empty()),
                request_headers: canonical_headers(s.request_headers),
                request_body: s.request_body.filter(|v| !v.is_empty()),
                response_headers: canonical_headers(s.response_headers),
                response_body: s.response_body.filter(|v| !v.is_empty()),
                check_certificate_expiration: Some(s.check_certificate_expiration.unwrap_or(true)),
                follow_redirect: Some(s.follow_redirect.unwrap_or(true)),
            }),
            Self::Tcp(s) => Self::Tcp(s),
            Self::Ping(s) => Self::Ping(PingSettings {
                url: strip_ping_scheme(&s.url).to_string(),
            }),
        }
    }

    /// Fill fields the desired configuration leaves to the service with the
    /// values the service chose, so they do not read as drift.
    #[must_use]
    pub fn adopt_server_defaults(self, current: &Self) -> Self {
        match (self, current) {
            (Self::Https(mut desired), Self::Https(current)) => {
                if desired.http_method.is_none() {
                    desired.http_method.clone_from(&current.http_method);
                }
                Self::Https(desired)
            }
            (desired, _) => desired,
        }
    }
}

fn encode_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_headers(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn canonical_headers(headers: Option<BTreeMap<String, String>>) -> Option<BTreeMap<String, String>> {
    headers
        .map(|h| {
            h.into_iter()
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect::<BTreeMap<_, _>>()
        })
        .filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_https() -> HttpsSettings {
        HttpsSettings {
            url: "https://example.com/health".into(),
            http_method: Some("GET".into()),
            http_statuses: Some("200-299".into()),
            request_headers: Some(BTreeMap::from([
                ("Accept".into(), "application/json".into()),
                ("X-Token".into(), "abc:def".into()),
            ])),
            request_body: Some("{}".into()),
            response_headers: Some(BTreeMap::new()),
            response_body: Some("ok".into()),
            check_certificate_expiration: Some(false),
            follow_redirect: None,
        }
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let catalogue = [
            MonitorType::Https(HttpsSettings::new("https://example.com")),
            MonitorType::Https(full_https()),
            MonitorType::Tcp(TcpSettings {
                url: "db.example.com:5432".into(),
            }),
            MonitorType::Ping(PingSettings {
                url: "server.example.com".into(),
            }),
        ];
        for monitor_type in catalogue {
            let wire = Value::Object(monitor_type.encode());
            let decoded = MonitorType::decode(monitor_type.tag(), &wire).unwrap();
            assert_eq!(decoded, monitor_type);
        }
    }

    #[test]
    fn test_ping_scheme_applied_on_encode() {
        let ping = MonitorType::Ping(PingSettings {
            url: "server.example.com".into(),
        });
        assert_eq!(ping.encode()["url"], json!("ping://server.example.com"));

        let decoded =
            MonitorType::decode("ping", &json!({"url": "ping://server.example.com"})).unwrap();
        assert_eq!(decoded.url(), "server.example.com");
    }

    #[test]
    fn test_headers_encoded_as_lines() {
        let wire = MonitorType::Https(full_https()).encode();
        assert_eq!(
            wire["request_headers"],
            json!("Accept: application/json\nX-Token: abc:def")
        );
        assert_eq!(wire["response_headers"], json!(""));
        assert!(wire.get("follow_redirect").is_none());
    }

    #[test]
    fn test_headers_decoded_on_first_colon() {
        let headers = decode_headers("Authorization:  Bearer a:b \nnot a header\n X-Id : 7");
        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer a:b"));
        assert_eq!(headers.get("X-Id").map(String::as_str), Some("7"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_wire_settings_keyed_by_tag() {
        let tcp = MonitorType::Tcp(TcpSettings {
            url: "db:5432".into(),
        });
        let settings = tcp.to_wire_settings();
        assert_eq!(Value::Object(settings.clone()), json!({"tcp": {"url": "db:5432"}}));
        assert_eq!(MonitorType::from_wire_settings(&settings).unwrap(), tcp);
    }

    #[test]
    fn test_wire_settings_ignores_null_entries() {
        let settings = json!({"https": null, "tcp": null, "ping": {"url": "ping://10.0.0.1"}});
        let parsed = MonitorType::from_wire_settings(settings.as_object().unwrap()).unwrap();
        assert_eq!(
            parsed,
            MonitorType::Ping(PingSettings {
                url: "10.0.0.1".into()
            })
        );
    }

    #[test]
    fn test_wire_settings_errors() {
        let empty = Map::new();
        assert!(matches!(
            MonitorType::from_wire_settings(&empty),
            Err(Error::MalformedPayload { .. })
        ));

        let unknown = json!({"dns": {"url": "example.com"}});
        assert!(matches!(
            MonitorType::from_wire_settings(unknown.as_object().unwrap()),
            Err(Error::UnsupportedVariant { kind: ResourceKind::Monitor, .. })
        ));

        let missing_url = json!({"https": {"http_method": "GET"}});
        assert!(matches!(
            MonitorType::from_wire_settings(missing_url.as_object().unwrap()),
            Err(Error::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_canonical_https_defaults() {
        let canonical = MonitorType::Https(HttpsSettings::new("https://example.com/")).canonical();
        match canonical {
            MonitorType::Https(s) => {
                assert_eq!(s.url, "https://example.com");
                assert_eq!(s.http_method, None);
                assert_eq!(s.check_certificate_expiration, Some(true));
                assert_eq!(s.follow_redirect, Some(true));
            }
            other => panic!("Expected https, got {other:?}"),
        }
    }

    #[test]
    fn test_canonical_collapses_empties() {
        match MonitorType::Https(full_https()).canonical() {
            MonitorType::Https(s) => {
                assert_eq!(s.response_headers, None);
                assert_eq!(s.check_certificate_expiration, Some(false));
                assert!(s.request_headers.is_some());
            }
            other => panic!("Expected https, got {other:?}"),
        }
    }

    #[test]
    fn test_canonical_is_idempotent() {
        let samples = [
            MonitorType::Https(full_https()),
            MonitorType::Ping(PingSettings {
                url: "ping://ping://host".into(),
            }),
        ];
        for sample in samples {
            let once = sample.canonical();
            assert_eq!(once.clone().canonical(), once);
        }
    }

    #[test]
    fn test_adopt_server_defaults() {
        let desired = MonitorType::Https(HttpsSettings::new("https://example.com"));
        let mut current = HttpsSettings::new("https://example.com");
        current.http_method = Some("HEAD".into());
        let adopted = desired.adopt_server_defaults(&MonitorType::Https(current));
        match adopted {
            MonitorType::Https(s) => assert_eq!(s.http_method.as_deref(), Some("HEAD")),
            other => panic!("Expected https, got {other:?}"),
        }
    }
}
