//! Route 53 hosted zone reference.

use serde::{Deserialize, Serialize};

use crate::domain::naming;

/// An existing hosted zone, resolved by name at synthesis time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostedZone {
    /// Bare zone ID, e.g. `Z0123456789ABCDEFGHIJ`.
    pub id: String,
    /// Zone name without the trailing dot.
    pub name: String,
}

impl HostedZone {
    /// Build from raw provider values, stripping the `/hostedzone/` prefix
    /// and trailing dot.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: normalize_zone_id(id),
            name: naming::normalize_domain(name),
        }
    }
}

/// `/hostedzone/Z123` → `Z123`.
#[must_use]
pub fn normalize_zone_id(id: &str) -> String {
    id.trim()
        .trim_start_matches("/hostedzone/")
        .to_string()
}

/// Key under which a zone lookup is cached.
///
/// Without a pinned account the key uses `account=default`, shared by every
/// set of credentials.
#[must_use]
pub fn lookup_key(zone_name: &str, account: Option<&str>, region: &str) -> String {
    format!(
        "hosted-zone:account={}:domainName={}:region={region}",
        account.unwrap_or("default"),
        naming::normalize_domain(zone_name),
    )
}
