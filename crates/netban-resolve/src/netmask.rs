//! Netmask registry: CIDR prefix to whois server, longest-prefix match.
//!
//! The registry file mixes netmask lines with TLD lines; only lines whose
//! first character is an ASCII digit belong to this table. Overlapping
//! prefixes are expected, the most specific one wins.

use netban_core::{NetbanError, Result};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

/// Sentinel server name for address space with no registry allocation.
/// Never a connect target; matching it aborts resolution.
pub const UNALLOCATED: &str = "unallocated";

/// One CIDR prefix mapped to an authoritative whois server
#[derive(Debug, Clone)]
pub struct NetmaskEntry {
    /// Network address of the prefix
    pub network: Ipv4Addr,
    /// Prefix length in bits (0-32)
    pub prefix_len: u8,
    /// Whois server hostname, or the [`UNALLOCATED`] sentinel
    pub server: String,
}

impl NetmaskEntry {
    /// Returns true if the prefix contains `ip`
    #[must_use]
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        let mask = prefix_mask(self.prefix_len);
        u32::from(ip) & mask == u32::from(self.network) & mask
    }

    /// Returns true if this entry is the unallocated sentinel
    #[must_use]
    pub fn is_unallocated(&self) -> bool {
        self.server == UNALLOCATED
    }

    /// CIDR notation of the prefix
    #[must_use]
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix_len)
    }
}

/// Registry of netmask entries, loaded once at startup and read-only after
#[derive(Debug, Default)]
pub struct NetmaskRegistry {
    entries: Vec<NetmaskEntry>,
}

impl NetmaskRegistry {
    /// Parse registry entries from table text.
    ///
    /// Recognized lines start with a digit: `<CIDR><ws><server>`. Everything
    /// else (TLD lines, comments, blanks) is skipped.
    pub fn from_table(text: &str) -> Result<Self> {
        let mut entries = Vec::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if !line.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(cidr), Some(server)) = (fields.next(), fields.next()) else {
                return Err(NetbanError::Table(format!(
                    "netmask line {} is missing a server field: {line}",
                    number + 1
                )));
            };

            entries.push(parse_entry(cidr, server).ok_or_else(|| {
                NetbanError::Table(format!("bad CIDR on line {}: {cidr}", number + 1))
            })?);
        }

        Ok(Self { entries })
    }

    /// Load the registry from a table file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| NetbanError::Table(format!("failed to read {}: {e}", path.display())))?;
        Self::from_table(&text)
    }

    /// Number of loaded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries were loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most specific entry containing `ip`, or `None` when nothing matches.
    ///
    /// Ties on prefix length keep the first-loaded entry.
    #[must_use]
    pub fn matches(&self, ip: IpAddr) -> Option<&NetmaskEntry> {
        let IpAddr::V4(v4) = ip else {
            // The table format is IPv4 CIDR; v6 subjects match nothing.
            return None;
        };

        let mut best: Option<&NetmaskEntry> = None;
        for entry in &self.entries {
            if entry.contains(v4) && best.map_or(true, |b| entry.prefix_len > b.prefix_len) {
                best = Some(entry);
            }
        }
        best
    }

    /// Like [`matches`](Self::matches), but treats a miss as an error:
    /// allocated address space is expected to be covered.
    pub fn find(&self, ip: IpAddr) -> Result<&NetmaskEntry> {
        self.matches(ip)
            .ok_or_else(|| NetbanError::NetmaskNotFound(ip.to_string()))
    }
}

/// Hardcoded CIDR-to-country pairs consulted only after whois and its
/// fallback re-query have failed to produce a country.
const LAST_RESORT: &[(&str, u8, &str)] = &[
    ("4.0.0.0", 8, "us"),
    ("12.0.0.0", 8, "us"),
    ("17.0.0.0", 8, "us"),
    ("24.0.0.0", 8, "us"),
    ("24.132.0.0", 16, "nl"),
    ("25.0.0.0", 8, "gb"),
    ("43.0.0.0", 8, "jp"),
    ("53.0.0.0", 8, "de"),
    ("133.0.0.0", 8, "jp"),
];

/// Last-resort country for `ip`, longest-prefix match over the hardcoded
/// table. Returns `None` when the address is outside all known blocks.
#[must_use]
pub fn last_resort_country(ip: IpAddr) -> Option<&'static str> {
    let IpAddr::V4(v4) = ip else { return None };

    let mut best: Option<(u8, &'static str)> = None;
    for (network, prefix_len, country) in LAST_RESORT {
        let network: Ipv4Addr = network.parse().ok()?;
        let mask = prefix_mask(*prefix_len);
        if u32::from(v4) & mask == u32::from(network) & mask
            && best.map_or(true, |(len, _)| *prefix_len > len)
        {
            best = Some((*prefix_len, country));
        }
    }
    best.map(|(_, country)| country)
}

const fn prefix_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - prefix_len as u32)
    }
}

fn parse_entry(cidr: &str, server: &str) -> Option<NetmaskEntry> {
    let (network, prefix_len) = cidr.split_once('/')?;
    let network: Ipv4Addr = network.parse().ok()?;
    let prefix_len: u8 = prefix_len.parse().ok()?;
    if prefix_len > 32 {
        return None;
    }
    Some(NetmaskEntry {
        network,
        prefix_len,
        server: server.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
# registry snapshot
193.0.0.0/8     whois.ripe.net
193.247.0.0/16  whois.example.net
202.0.0.0/7     whois.apnic.net
198.18.0.0/15   unallocated
ro              Romania
";

    #[test]
    fn test_longest_prefix_wins() {
        let registry = NetmaskRegistry::from_table(TABLE).unwrap();

        let entry = registry.matches("193.247.1.2".parse().unwrap()).unwrap();
        assert_eq!(entry.server, "whois.example.net");
        assert_eq!(entry.prefix_len, 16);

        let entry = registry.matches("193.1.1.1".parse().unwrap()).unwrap();
        assert_eq!(entry.server, "whois.ripe.net");
    }

    #[test]
    fn test_no_match_is_an_error() {
        let registry = NetmaskRegistry::from_table(TABLE).unwrap();
        let err = registry.find("8.8.8.8".parse().unwrap()).unwrap_err();
        assert!(matches!(err, NetbanError::NetmaskNotFound(_)));
    }

    #[test]
    fn test_tld_lines_are_skipped() {
        let registry = NetmaskRegistry::from_table(TABLE).unwrap();
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_unallocated_sentinel() {
        let registry = NetmaskRegistry::from_table(TABLE).unwrap();
        let entry = registry.matches("198.18.5.5".parse().unwrap()).unwrap();
        assert!(entry.is_unallocated());
        assert_eq!(entry.cidr(), "198.18.0.0/15");
    }

    #[test]
    fn test_tie_break_keeps_first_loaded() {
        let table = "10.0.0.0/8 first.example\n10.0.0.0/8 second.example\n";
        let registry = NetmaskRegistry::from_table(table).unwrap();
        let entry = registry.matches("10.1.2.3".parse().unwrap()).unwrap();
        assert_eq!(entry.server, "first.example");
    }

    #[test]
    fn test_ipv6_matches_nothing() {
        let registry = NetmaskRegistry::from_table(TABLE).unwrap();
        assert!(registry.matches("2001:db8::1".parse().unwrap()).is_none());
    }

    #[test]
    fn test_bad_cidr_is_rejected() {
        let err = NetmaskRegistry::from_table("193.0.0.0/40 whois.ripe.net\n").unwrap_err();
        assert!(matches!(err, NetbanError::Table(_)));
    }

    #[test]
    fn test_last_resort_longest_prefix() {
        assert_eq!(last_resort_country("24.10.0.1".parse().unwrap()), Some("us"));
        assert_eq!(last_resort_country("24.132.9.9".parse().unwrap()), Some("nl"));
        assert_eq!(last_resort_country("8.8.8.8".parse().unwrap()), None);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let mut tmpfile = tempfile::NamedTempFile::new().unwrap();
        write!(tmpfile, "{TABLE}").unwrap();

        let registry = NetmaskRegistry::load(tmpfile.path()).unwrap();
        assert_eq!(registry.len(), 4);
    }
}
