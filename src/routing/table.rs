//! Path rule table definitions.
//!
//! A table is plain data: the ordered primary rules, the shared prefixes that
//! defer to the referer, the default label and the optional home-page label.
//! It is loaded from a profile or a rules file and compiled into a
//! [`Router`](super::Router) at startup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic name of an upstream origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginLabel {
    Latest,
    Legacy,
}

impl OriginLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginLabel::Latest => "latest",
            OriginLabel::Legacy => "legacy",
        }
    }
}

impl fmt::Display for OriginLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal path prefix mapped to an origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathRule {
    /// Literal prefix, matched byte-wise against the request path.
    pub prefix: String,

    /// Origin that serves paths under this prefix.
    pub origin: OriginLabel,
}

impl PathRule {
    pub fn new(prefix: impl Into<String>, origin: OriginLabel) -> Self {
        Self {
            prefix: prefix.into(),
            origin,
        }
    }
}

/// Declarative routing table.
///
/// Order of `rules` and `shared` is significant: the first matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteTable {
    /// Origin used when nothing else matches.
    pub default: OriginLabel,

    /// Origin for the home page (`/` and `/?...`), if the table special-cases it.
    #[serde(default)]
    pub home: Option<OriginLabel>,

    /// Primary prefix rules, evaluated in declared order.
    #[serde(default)]
    pub rules: Vec<PathRule>,

    /// Prefixes whose origin is inferred from the referer path.
    #[serde(default)]
    pub shared: Vec<String>,
}

impl RouteTable {
    /// A table with no rules that always resolves to `default`.
    pub fn single(default: OriginLabel) -> Self {
        Self {
            default,
            home: None,
            rules: Vec::new(),
            shared: Vec::new(),
        }
    }

    /// Every label this table can produce.
    pub fn referenced_labels(&self) -> impl Iterator<Item = OriginLabel> + '_ {
        std::iter::once(self.default)
            .chain(self.home)
            .chain(self.rules.iter().map(|r| r.origin))
    }
}
