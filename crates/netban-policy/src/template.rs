//! Ban-reason templating with `%placeholder%` substitution.

/// Default reason for resolved-country bans
pub const DEFAULT_BAN_REASON: &str =
    "%nick%: hosts from %country% (%tld%) are not welcome on this channel";

/// Default reason for top-domain bans
pub const DEFAULT_TOP_BAN_REASON: &str =
    "%nick%: the '%tld%' domain is banned on this channel";

/// Values substituted into a reason template
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateVars<'a> {
    /// Nick of the affected user
    pub nick: &'a str,
    /// TLD or country code that triggered the decision
    pub tld: &'a str,
    /// Country display name, when known
    pub country: &'a str,
    /// Full hostname or address of the subject
    pub domain: &'a str,
}

/// Substitute the recognized placeholders into `template`.
/// Unrecognized `%...%` sequences are left as-is.
#[must_use]
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    template
        .replace("%nick%", vars.nick)
        .replace("%tld%", vars.tld)
        .replace("%country%", vars.country)
        .replace("%domain%", vars.domain)
}
