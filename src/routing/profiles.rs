//! Built-in deployment profiles.
//!
//! Each profile is a rule table plus the forwarding-header behavior that went
//! with it. A rules file can replace either part.

use std::fmt;

use clap::ValueEnum;

use crate::config::schema::{ForwardedHostMode, ForwardingConfig};
use crate::routing::table::{OriginLabel, PathRule, RouteTable};

/// Paths always served from the latest deployment.
const LATEST_PATHS: &[&str] = &[
    "/programs/professional-education",
    "/programs/professional-programs",
    "/programs/graduate-degree-programs/blog",
    "/programs/graduate-degree-programs/master-industrial-and-labor-relations-milr",
    "/alumni",
    "/buffalo-co-lab",
    "/cornell-debate",
    "/cjei",
    "/coronavirus",
    "/course",
    "/diversity-equity-and-inclusion",
    "/work-and-coronavirus",
    "/new-york-city",
    "/news",
    "/public-impact",
    "/worker-institute",
    "/scheinman-institute",
    "/scr-summer-school",
    "/current-students",
    "/blog",
    "/ilrie",
    "/ada30",
    "/75",
    "/ithaca-co-lab",
    "/new-conversations-project",
    "/labor-dynamics-institute",
    "/persona",
    "/core",
    "/libraries/union",
    "/themes/custom/union_marketing",
    "/sites/default/files-d8",
    "/system/files/webform",
    "/media/oembed",
    "/modules/contrib",
    "/modules/custom",
];

/// Paths always served from the legacy deployment.
const LEGACY_PATHS: &[&str] = &[
    "/buffalo/about",
    "/conference-center",
    "/eform",
    "/faculty-and-staff-resources",
    "/faculty-reporting",
    "/ilr-in-buffalo",
    "/ilr-press",
    "/misc",
    "/modules/node",
    "/modules/system",
    "/modules/user",
    "/mobilizing-against-inequality",
    "/nyc-conference-center",
    "/privacy-policy",
    "/sitemap.xml",
    "/sites/all/libraries",
    "/sites/all/modules",
    "/sites/all/themes",
    // Keep the trailing slash, or /sites/default/files-d8 matches too.
    "/sites/default/files/",
    "/student-forms",
    "/web-accessibility",
];

/// AJAX endpoints shared by both deployments.
const SHARED_PATHS: &[&str] = &["/views/ajax"];

/// A deployment variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Home page and listed paths go to latest; everything else to legacy.
    LatestBiased,
    /// Listed paths go to legacy; everything else to latest.
    #[default]
    LegacyBiased,
    /// Everything goes to the single legacy origin.
    Passthrough,
}

impl Profile {
    /// The profile's rule table.
    pub fn route_table(&self) -> RouteTable {
        match self {
            Profile::LatestBiased => RouteTable {
                default: OriginLabel::Legacy,
                home: Some(OriginLabel::Latest),
                rules: rules(LATEST_PATHS, OriginLabel::Latest),
                shared: shared(),
            },
            Profile::LegacyBiased => RouteTable {
                default: OriginLabel::Latest,
                home: None,
                rules: rules(LEGACY_PATHS, OriginLabel::Legacy),
                shared: shared(),
            },
            Profile::Passthrough => RouteTable::single(OriginLabel::Legacy),
        }
    }

    /// The profile's forwarding-header behavior.
    pub fn forwarding(&self) -> ForwardingConfig {
        match self {
            Profile::LatestBiased => ForwardingConfig {
                forwarded_host: ForwardedHostMode::Overwrite,
                forwarded_proto: true,
                ..ForwardingConfig::default()
            },
            Profile::LegacyBiased => ForwardingConfig {
                forwarded_host: ForwardedHostMode::Off,
                forwarded_proto: false,
                ..ForwardingConfig::default()
            },
            Profile::Passthrough => ForwardingConfig {
                forwarded_host: ForwardedHostMode::IfAbsent,
                forwarded_proto: true,
                ..ForwardingConfig::default()
            },
        }
    }

    /// Whether `DRUPAL_LATEST_URL` must be set.
    pub fn requires_latest(&self) -> bool {
        !matches!(self, Profile::Passthrough)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Profile::LatestBiased => "latest-biased",
            Profile::LegacyBiased => "legacy-biased",
            Profile::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn rules(prefixes: &[&str], origin: OriginLabel) -> Vec<PathRule> {
    prefixes
        .iter()
        .map(|prefix| PathRule::new(*prefix, origin))
        .collect()
}

fn shared() -> Vec<String> {
    SHARED_PATHS.iter().map(|p| p.to_string()).collect()
}
