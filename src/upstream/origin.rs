//! Upstream origin abstraction.
//!
//! # Responsibilities
//! - Parse and validate an origin base URL (scheme + host required)
//! - Pre-compute the scheme, authority and `Host` header used for forwarding
//! - Map an origin label to its origin
//!
//! # Design Decisions
//! - Built once at startup, never mutated; shared via `Arc`
//! - Only `http` and `https` schemes are accepted
//! - A path on the base URL is ignored: the request path is forwarded verbatim

use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{HeaderValue, Uri};
use url::Url;

use crate::routing::OriginLabel;

/// Error type for origin parsing.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid URL {url:?}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {scheme:?} in {url:?}, expected http or https")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("missing host in {url:?}")]
    MissingHost { url: String },

    #[error("invalid authority {authority:?} in {url:?}")]
    InvalidAuthority { url: String, authority: String },
}

/// A resolved upstream destination.
#[derive(Debug, Clone)]
pub struct Origin {
    label: OriginLabel,
    url: Url,
    scheme: Scheme,
    authority: Authority,
    host_header: HeaderValue,
}

impl Origin {
    /// Parse an origin from its configured base URL.
    pub fn parse(label: OriginLabel, raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|source| OriginError::Malformed {
            url: raw.to_string(),
            source,
        })?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => {
                return Err(OriginError::UnsupportedScheme {
                    url: raw.to_string(),
                    scheme: other.to_string(),
                })
            }
        };

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => {
                return Err(OriginError::MissingHost {
                    url: raw.to_string(),
                })
            }
        };

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let invalid_authority = || OriginError::InvalidAuthority {
            url: raw.to_string(),
            authority: authority.clone(),
        };
        let host_header = HeaderValue::from_str(&authority).map_err(|_| invalid_authority())?;
        let parsed_authority = Authority::try_from(authority.as_str()).map_err(|_| invalid_authority())?;

        if url.path() != "/" {
            tracing::warn!(
                origin = %label,
                path = url.path(),
                "Origin URL path is ignored; request paths are forwarded unchanged"
            );
        }

        Ok(Self {
            label,
            url,
            scheme,
            authority: parsed_authority,
            host_header,
        })
    }

    pub fn label(&self) -> OriginLabel {
        self.label
    }

    /// The configured base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// `host[:port]` as dialed. Also the value of the outbound `Host` header.
    pub fn host(&self) -> &str {
        self.authority.as_str()
    }

    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Point a request target at this origin, keeping its path and query.
    pub fn target_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

/// The configured origins, one per label.
#[derive(Debug, Clone)]
pub struct OriginSet {
    legacy: Origin,
    latest: Option<Origin>,
}

impl OriginSet {
    pub fn new(legacy: Origin, latest: Option<Origin>) -> Self {
        Self { legacy, latest }
    }

    /// Look up the origin for a label. `None` only for `Latest` in a
    /// single-origin deployment.
    pub fn get(&self, label: OriginLabel) -> Option<&Origin> {
        match label {
            OriginLabel::Legacy => Some(&self.legacy),
            OriginLabel::Latest => self.latest.as_ref(),
        }
    }

    pub fn contains(&self, label: OriginLabel) -> bool {
        self.get(label).is_some()
    }

    pub fn legacy(&self) -> &Origin {
        &self.legacy
    }

    pub fn latest(&self) -> Option<&Origin> {
        self.latest.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin() {
        let origin = Origin::parse(OriginLabel::Latest, "https://d9.example.edu").unwrap();

        assert_eq!(origin.label(), OriginLabel::Latest);
        assert_eq!(origin.scheme(), &Scheme::HTTPS);
        assert_eq!(origin.host(), "d9.example.edu");
        assert_eq!(origin.host_header(), "d9.example.edu");
    }

    #[test]
    fn test_parse_origin_with_port() {
        let origin = Origin::parse(OriginLabel::Legacy, "http://127.0.0.1:8081/").unwrap();
        assert_eq!(origin.host(), "127.0.0.1:8081");
        assert_eq!(origin.scheme(), &Scheme::HTTP);
    }

    #[test]
    fn test_parse_origin_errors() {
        assert!(matches!(
            Origin::parse(OriginLabel::Legacy, ""),
            Err(OriginError::Malformed { .. })
        ));
        assert!(matches!(
            Origin::parse(OriginLabel::Legacy, "not a url"),
            Err(OriginError::Malformed { .. })
        ));
        assert!(matches!(
            Origin::parse(OriginLabel::Legacy, "ftp://files.example.edu"),
            Err(OriginError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            Origin::parse(OriginLabel::Legacy, "http://"),
            Err(OriginError::Malformed { .. }) | Err(OriginError::MissingHost { .. })
        ));
    }

    #[test]
    fn test_target_uri_keeps_path_and_query() {
        let origin = Origin::parse(OriginLabel::Legacy, "https://d7.example.edu:8443").unwrap();
        let inbound: Uri = "/news/today?page=2".parse().unwrap();

        let target = origin.target_uri(&inbound).unwrap();
        assert_eq!(target.to_string(), "https://d7.example.edu:8443/news/today?page=2");
    }

    #[test]
    fn test_target_uri_ignores_base_path() {
        let origin = Origin::parse(OriginLabel::Legacy, "http://d7.example.edu/base").unwrap();
        let inbound: Uri = "/misc/drupal.js".parse().unwrap();

        let target = origin.target_uri(&inbound).unwrap();
        assert_eq!(target.to_string(), "http://d7.example.edu/misc/drupal.js");
    }

    #[test]
    fn test_origin_set_lookup() {
        let legacy = Origin::parse(OriginLabel::Legacy, "http://d7.example.edu").unwrap();
        let single = OriginSet::new(legacy.clone(), None);
        assert_eq!(single.get(OriginLabel::Legacy).unwrap().host(), "d7.example.edu");
        assert!(!single.contains(OriginLabel::Latest));

        let latest = Origin::parse(OriginLabel::Latest, "http://d9.example.edu").unwrap();
        let both = OriginSet::new(legacy, Some(latest));
        assert_eq!(both.get(OriginLabel::Latest).unwrap().host(), "d9.example.edu");
    }
}
