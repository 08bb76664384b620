use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default ban duration in minutes
pub const DEFAULT_BAN_MINUTES: u32 = 60;

/// Per-channel ban policy configuration.
///
/// Owned by the settings store; mutated only through explicit admin
/// commands and read (copy-on-read) by concurrent resolution pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// TLD/country codes. A ban set normally, an allow set in whitelist mode.
    #[serde(default)]
    pub tlds: HashSet<String>,

    /// Trailing labels that qualify a hostname for whois resolution.
    /// May contain the wildcard "*". Also acts as the exclusion set for
    /// the whitelist-mode top-domain path.
    #[serde(default)]
    pub resolve_domains: HashSet<String>,

    /// Invert the TLD list from a ban set to an allow set
    #[serde(default)]
    pub whitelist: bool,

    /// Ban on the hostname's trailing label without any network lookup
    #[serde(default)]
    pub top_domain_ban: bool,

    /// Resolve hostnames through whois when their trailing label matches
    /// `resolve_domains`
    #[serde(default)]
    pub top_domain_resolve: bool,

    /// Ban duration in minutes
    #[serde(default = "default_ban_minutes")]
    pub ban_minutes: u32,

    /// Allow public (in-channel) lookup commands
    #[serde(default)]
    pub public_commands: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            tlds: HashSet::new(),
            resolve_domains: HashSet::new(),
            whitelist: false,
            top_domain_ban: false,
            top_domain_resolve: false,
            ban_minutes: DEFAULT_BAN_MINUTES,
            public_commands: false,
        }
    }
}

impl ChannelConfig {
    /// Returns true if the TLD list contains `code` (case-insensitive)
    #[must_use]
    pub fn lists_tld(&self, code: &str) -> bool {
        self.tlds.contains(&code.to_ascii_lowercase())
    }

    /// Returns true if `label` matches the resolve-domain patterns,
    /// either exactly or through the wildcard "*"
    #[must_use]
    pub fn resolve_covers(&self, label: &str) -> bool {
        self.resolve_domains.contains("*")
            || self.resolve_domains.contains(&label.to_ascii_lowercase())
    }
}

const fn default_ban_minutes() -> u32 {
    DEFAULT_BAN_MINUTES
}
