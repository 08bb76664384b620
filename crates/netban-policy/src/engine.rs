//! Policy evaluation: top-domain short-circuit, resolved-country test,
//! counter accounting.

use crate::settings::{SettingsStore, OPT_BAN_REASON, OPT_LOG_MODE, OPT_TOP_BAN_REASON};
use crate::template::{render, TemplateVars, DEFAULT_BAN_REASON, DEFAULT_TOP_BAN_REASON};
use netban_core::{ChannelConfig, ResolutionResult, Subject};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a policy evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Ban the host with a rendered reason
    Ban {
        /// Templated, user-visible ban reason
        reason: String,
        /// Ban duration in minutes
        minutes: u32,
    },
    /// The host passed the policy test
    Allow,
    /// The policy path does not apply to this subject
    NoAction,
}

impl Decision {
    /// Returns true for a ban decision
    #[must_use]
    pub const fn is_ban(&self) -> bool {
        matches!(self, Self::Ban { .. })
    }
}

/// Evaluates channel policy and accounts for executed bans
pub struct PolicyEngine {
    settings: Arc<dyn SettingsStore>,
}

impl PolicyEngine {
    /// Create an engine over the settings collaborator
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Top-domain ban path. Hostnames only; never performs a network
    /// lookup and takes precedence over whois/geo resolution.
    ///
    /// Non-whitelist mode bans a trailing label found in the TLD list.
    /// Whitelist mode bans a label that is neither in the list nor covered
    /// by the resolve-domain exclusion set.
    #[must_use]
    pub fn evaluate_top_domain(
        &self,
        config: &ChannelConfig,
        subject: &Subject,
        nick: &str,
        country_name: Option<&str>,
    ) -> Decision {
        if !config.top_domain_ban {
            return Decision::NoAction;
        }
        let Some(label) = subject.trailing_label() else {
            // Numeric subjects have no top domain.
            return Decision::NoAction;
        };

        let banned = if config.whitelist {
            !config.lists_tld(label) && !config.resolve_covers(label)
        } else {
            config.lists_tld(label)
        };
        if !banned {
            return Decision::Allow;
        }

        let template = self
            .settings
            .option(OPT_TOP_BAN_REASON)
            .unwrap_or_else(|| DEFAULT_TOP_BAN_REASON.to_string());
        let reason = render(
            &template,
            &TemplateVars {
                nick,
                tld: label,
                country: country_name.unwrap_or(label),
                domain: &subject.to_string(),
            },
        );
        Decision::Ban {
            reason,
            minutes: config.ban_minutes,
        }
    }

    /// Resolved-country path: test the resolved code against the channel's
    /// TLD list, inverted in whitelist mode.
    #[must_use]
    pub fn evaluate_country(
        &self,
        config: &ChannelConfig,
        resolution: &ResolutionResult,
        subject: &Subject,
        nick: &str,
        country_name: Option<&str>,
    ) -> Decision {
        let code = resolution.country.as_str();
        let banned = if config.whitelist {
            !config.lists_tld(code)
        } else {
            config.lists_tld(code)
        };
        if !banned {
            return Decision::Allow;
        }

        let template = self
            .settings
            .option(OPT_BAN_REASON)
            .unwrap_or_else(|| DEFAULT_BAN_REASON.to_string());
        let reason = render(
            &template,
            &TemplateVars {
                nick,
                tld: code,
                country: country_name.unwrap_or(code),
                domain: &subject.to_string(),
            },
        );
        Decision::Ban {
            reason,
            minutes: config.ban_minutes,
        }
    }

    /// Account for a decision. A ban increments the channel's counter and
    /// returns true (enforce it); in log-only mode the decision is logged
    /// and nothing is enforced or counted.
    pub fn apply(&self, channel: &str, decision: &Decision) -> bool {
        let Decision::Ban { reason, minutes } = decision else {
            return false;
        };

        if self.settings.bool_option(OPT_LOG_MODE) {
            info!(channel, %reason, minutes = *minutes, "log-only mode: ban not enforced");
            return false;
        }

        let count = self.settings.increment_ban_count(channel);
        debug!(channel, count, %reason, "ban executed");
        true
    }
}
