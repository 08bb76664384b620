use crate::types::{GeoRecord, WhoisRecord};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// The subject of a resolution request: a literal address or a hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Literal IP address
    Address(IpAddr),
    /// Hostname requiring DNS resolution before whois
    Hostname(String),
}

impl Subject {
    /// Classify a raw host string as an address or a hostname
    #[must_use]
    pub fn parse(host: &str) -> Self {
        host.parse::<IpAddr>()
            .map_or_else(|_| Self::Hostname(host.to_ascii_lowercase()), Self::Address)
    }

    /// Trailing label of a hostname subject, lowercased.
    /// Addresses have no trailing label.
    #[must_use]
    pub fn trailing_label(&self) -> Option<&str> {
        match self {
            Self::Address(_) => None,
            Self::Hostname(host) => host.rsplit('.').next().filter(|l| !l.is_empty()),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(ip) => write!(f, "{ip}"),
            Self::Hostname(host) => write!(f, "{host}"),
        }
    }
}

/// Which resolution layer produced the country code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// GeoIP HTTP provider
    Geo,
    /// Whois session (direct or via referrals)
    Whois,
    /// Experimental fallback re-query with a NET identifier
    Fallback,
    /// Hardcoded last-resort netmask table
    LastResort,
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geo => write!(f, "geo"),
            Self::Whois => write!(f, "whois"),
            Self::Fallback => write!(f, "fallback"),
            Self::LastResort => write!(f, "last-resort"),
        }
    }
}

/// Raw record backing a resolution, kept for verbose reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum RawRecord {
    /// Whois session record
    Whois(WhoisRecord),
    /// GeoIP lookup record
    Geo(GeoRecord),
    /// No backing record (last-resort table hit)
    #[default]
    None,
}

/// A successfully resolved country, consumed once by the policy engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Lowercase country code
    pub country: String,
    /// Layer that produced the code
    pub source: ResolutionSource,
    /// Backing record, when one exists
    pub record: RawRecord,
}

/// Why a resolution ended without a country and without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoActionReason {
    /// Subject is in private/reserved/unroutable address space
    PrivateOrReservedRange,
    /// Hostname did not qualify for whois resolution on this channel
    ResolveCheckSkipped,
}

/// Outcome of a resolution pipeline
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A country was determined
    Resolved(ResolutionResult),
    /// Definitive "take no action" outcome, not a failure
    NoAction(NoActionReason),
}

/// Returns true for address classes that must never be resolved or banned:
/// private, loopback, link-local, broadcast, documentation, multicast,
/// class E, and the 0.0.0.0/8 block.
#[must_use]
pub fn is_unroutable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_multicast()
                || v4.is_unspecified()
                || v4.octets()[0] == 0
                || v4 >= Ipv4Addr::new(240, 0, 0, 0)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_multicast() || v6.is_unspecified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_parse_address() {
        let subject = Subject::parse("203.0.113.9");
        assert_eq!(subject, Subject::Address("203.0.113.9".parse().unwrap()));
        assert_eq!(subject.trailing_label(), None);
    }

    #[test]
    fn test_subject_parse_hostname_lowercases() {
        let subject = Subject::parse("Mail.Example.RO");
        assert_eq!(subject, Subject::Hostname("mail.example.ro".into()));
        assert_eq!(subject.trailing_label(), Some("ro"));
    }

    #[test]
    fn test_single_label_hostname() {
        let subject = Subject::parse("localhost");
        assert_eq!(subject.trailing_label(), Some("localhost"));
    }

    #[test]
    fn test_unroutable_classes() {
        assert!(is_unroutable("10.1.2.3".parse().unwrap()));
        assert!(is_unroutable("127.0.0.1".parse().unwrap()));
        assert!(is_unroutable("169.254.0.1".parse().unwrap()));
        assert!(is_unroutable("192.168.1.1".parse().unwrap()));
        assert!(is_unroutable("0.1.2.3".parse().unwrap()));
        assert!(is_unroutable("240.0.0.1".parse().unwrap()));
        assert!(!is_unroutable("8.8.8.8".parse().unwrap()));
        assert!(!is_unroutable("193.0.6.139".parse().unwrap()));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ResolutionSource::Geo.to_string(), "geo");
        assert_eq!(ResolutionSource::LastResort.to_string(), "last-resort");
    }
}
