//! Path matching logic.
//!
//! # Responsibilities
//! - Match a literal path prefix (byte-wise, case-sensitive)
//! - Match the home page (`/` or `/?...`)
//!
//! # Design Decisions
//! - Matchers see path strings only, never query strings or fragments
//! - No normalization: no trailing-slash insertion, no percent-decoding
//! - Empty input never matches a non-empty prefix
//! - No regex to guarantee O(n) matching

/// Trait for matching a request path against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a literal path prefix.
///
/// `/sites/default/files/` does not match `/sites/default/files-d8`, but
/// `/sites/default/files` does. Rule authors pick the boundary explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches the site home page.
///
/// The path is `/` exactly, or starts with `/?` when a caller hands over a
/// request target that still carries its query.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePageMatcher;

impl Matcher for HomePageMatcher {
    fn matches(&self, path: &str) -> bool {
        path == "/" || path.starts_with("/?")
    }
}
