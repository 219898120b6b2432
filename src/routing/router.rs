//! Route lookup.
//!
//! # Responsibilities
//! - Store the compiled rule table
//! - Resolve a (path, referer path) pair to exactly one origin label
//! - Report why a label was chosen, for debug logging
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scans in declared order (tables hold tens of entries)
//! - Total: every input pair yields a label, the default when nothing matches

use crate::routing::matcher::{HomePageMatcher, Matcher, PathPrefixMatcher};
use crate::routing::table::{OriginLabel, RouteTable};

/// Why a request was sent where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchReason<'a> {
    /// The home-page special case fired.
    HomePage,
    /// The request path matched a primary prefix.
    Prefix(&'a str),
    /// The request path matched a shared prefix and the referer path matched
    /// a primary prefix.
    Referer { shared: &'a str, prefix: &'a str },
    /// Nothing matched.
    Default,
}

/// The routing decision for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision<'a> {
    pub label: OriginLabel,
    pub reason: MatchReason<'a>,
}

#[derive(Debug)]
struct CompiledRule {
    matcher: PathPrefixMatcher,
    origin: OriginLabel,
}

/// Compiled, read-only router shared by all request handlers.
#[derive(Debug)]
pub struct Router {
    default: OriginLabel,
    home: Option<(HomePageMatcher, OriginLabel)>,
    rules: Vec<CompiledRule>,
    shared: Vec<PathPrefixMatcher>,
}

impl Router {
    /// Compile a router from a table. Declared order is preserved.
    pub fn new(table: &RouteTable) -> Self {
        Self {
            default: table.default,
            home: table.home.map(|label| (HomePageMatcher, label)),
            rules: table
                .rules
                .iter()
                .map(|rule| CompiledRule {
                    matcher: PathPrefixMatcher::new(rule.prefix.clone()),
                    origin: rule.origin,
                })
                .collect(),
            shared: table
                .shared
                .iter()
                .map(|prefix| PathPrefixMatcher::new(prefix.clone()))
                .collect(),
        }
    }

    /// Resolve the origin for a request path and the referer's path.
    ///
    /// Both arguments are paths only. Pass `""` when there is no usable referer.
    pub fn resolve(&self, path: &str, referer_path: &str) -> OriginLabel {
        self.decide(path, referer_path).label
    }

    /// Same as [`resolve`](Self::resolve), also reporting the matching rule.
    pub fn decide(&self, path: &str, referer_path: &str) -> RouteDecision<'_> {
        if let Some((matcher, label)) = &self.home {
            if matcher.matches(path) {
                return RouteDecision {
                    label: *label,
                    reason: MatchReason::HomePage,
                };
            }
        }

        if let Some(rule) = self.match_primary(path) {
            return RouteDecision {
                label: rule.origin,
                reason: MatchReason::Prefix(rule.matcher.prefix()),
            };
        }

        if let Some(shared) = self.shared.iter().find(|m| m.matches(path)) {
            if let Some(rule) = self.match_primary(referer_path) {
                return RouteDecision {
                    label: rule.origin,
                    reason: MatchReason::Referer {
                        shared: shared.prefix(),
                        prefix: rule.matcher.prefix(),
                    },
                };
            }
        }

        RouteDecision {
            label: self.default,
            reason: MatchReason::Default,
        }
    }

    /// The label used when nothing matches.
    pub fn default_label(&self) -> OriginLabel {
        self.default
    }

    fn match_primary(&self, path: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|rule| rule.matcher.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::profiles::Profile;
    use crate::routing::table::PathRule;
    use std::sync::Arc;

    use OriginLabel::{Latest, Legacy};

    fn latest_biased() -> Router {
        Router::new(&Profile::LatestBiased.route_table())
    }

    fn legacy_biased() -> Router {
        Router::new(&Profile::LegacyBiased.route_table())
    }

    #[test]
    fn test_latest_biased_scenario() {
        let router = latest_biased();

        assert_eq!(router.resolve("/", ""), Latest);
        assert_eq!(router.resolve("/news/today", ""), Latest);
        assert_eq!(router.resolve("/random-page", ""), Legacy);
        assert_eq!(router.resolve("/views/ajax", "/news/today"), Latest);
        assert_eq!(router.resolve("/views/ajax", "/random-page"), Legacy);
    }

    #[test]
    fn test_legacy_biased_scenario() {
        let router = legacy_biased();

        assert_eq!(router.resolve("/faculty-reporting", ""), Legacy);
        assert_eq!(router.resolve("/anything-else", ""), Latest);
        assert_eq!(router.resolve("/views/ajax", "/ilr-press/books"), Legacy);
        assert_eq!(router.resolve("/views/ajax", "/news"), Latest);
    }

    #[test]
    fn test_home_page_any_referer() {
        let router = latest_biased();

        for referer in ["", "/faculty-reporting", "/random-page", "/news"] {
            assert_eq!(router.resolve("/", referer), Latest);
            assert_eq!(router.resolve("/?page=2", referer), Latest);
        }
        assert_eq!(router.decide("/", "").reason, MatchReason::HomePage);
    }

    #[test]
    fn test_home_page_only_when_configured() {
        // Without a home rule `/` falls through to the default.
        let router = legacy_biased();
        assert_eq!(router.resolve("/", ""), Latest);
        assert_eq!(router.decide("/", "").reason, MatchReason::Default);

        let router = Router::new(&RouteTable::single(Legacy));
        assert_eq!(router.resolve("/", ""), Legacy);
    }

    #[test]
    fn test_primary_prefix_ignores_referer() {
        let router = latest_biased();

        for referer in ["", "/random-page", "/news", "garbage"] {
            assert_eq!(router.resolve("/alumni/events", referer), Latest);
        }
        assert_eq!(
            router.decide("/alumni/events", "/random-page").reason,
            MatchReason::Prefix("/alumni")
        );
    }

    #[test]
    fn test_shared_path_with_referer() {
        let router = latest_biased();

        let decision = router.decide("/views/ajax", "/blog/post");
        assert_eq!(decision.label, Latest);
        assert_eq!(
            decision.reason,
            MatchReason::Referer {
                shared: "/views/ajax",
                prefix: "/blog",
            }
        );
    }

    #[test]
    fn test_shared_path_without_referer_falls_back() {
        let router = latest_biased();

        let decision = router.decide("/views/ajax", "");
        assert_eq!(decision.label, Legacy);
        assert_eq!(decision.reason, MatchReason::Default);

        let router = legacy_biased();
        assert_eq!(router.resolve("/views/ajax", ""), Latest);
    }

    #[test]
    fn test_referer_ignored_off_shared_paths() {
        let router = latest_biased();
        assert_eq!(router.resolve("/random-page", "/news"), Legacy);
    }

    #[test]
    fn test_trailing_slash_boundary() {
        let router = legacy_biased();

        assert_eq!(router.resolve("/sites/default/files/photo.jpg", ""), Legacy);
        assert_eq!(router.resolve("/sites/default/files-d8/photo.jpg", ""), Latest);

        let router = latest_biased();
        assert_eq!(router.resolve("/sites/default/files-d8/photo.jpg", ""), Latest);
        assert_eq!(router.resolve("/sites/default/files/photo.jpg", ""), Legacy);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let table = RouteTable {
            default: Legacy,
            home: None,
            rules: vec![
                PathRule::new("/programs", Latest),
                PathRule::new("/programs/archive", Legacy),
            ],
            shared: Vec::new(),
        };
        let router = Router::new(&table);

        assert_eq!(router.resolve("/programs/archive/2019", ""), Latest);

        let reversed = RouteTable {
            rules: table.rules.iter().rev().cloned().collect(),
            ..table
        };
        let router = Router::new(&reversed);
        assert_eq!(router.resolve("/programs/archive/2019", ""), Legacy);
        assert_eq!(router.resolve("/programs/new", ""), Latest);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let router = latest_biased();
        assert_eq!(router.resolve("/NEWS/today", ""), Legacy);
    }

    #[test]
    fn test_single_origin_router() {
        let router = Router::new(&RouteTable::single(Legacy));

        assert_eq!(router.default_label(), Legacy);
        for path in ["/", "/news", "/views/ajax", ""] {
            assert_eq!(router.resolve(path, "/news"), Legacy);
        }
    }

    #[test]
    fn test_resolve_is_deterministic_across_threads() {
        let router = Arc::new(latest_biased());
        let cases = [
            ("/", "", Latest),
            ("/news/today", "", Latest),
            ("/random-page", "", Legacy),
            ("/views/ajax", "/news/today", Latest),
            ("/views/ajax", "/random-page", Legacy),
        ];

        std::thread::scope(|s| {
            for _ in 0..8 {
                let router = Arc::clone(&router);
                s.spawn(move || {
                    for _ in 0..1000 {
                        for (path, referer, expected) in cases {
                            assert_eq!(router.resolve(path, referer), expected);
                        }
                    }
                });
            }
        });
    }
}
