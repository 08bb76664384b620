//! Layered host-to-country resolution for netban.
//!
//! Resolution order: optional GeoIP-primary HTTP lookup, then the netmask
//! registry selects an authoritative whois server and a whois session runs
//! (following referrals, optionally re-querying a captured NET identifier),
//! then the hardcoded last-resort table.

pub mod geo;
pub mod netmask;
pub mod resolver;
pub mod tld;
pub mod whois;

pub use geo::{GeoConfig, GeoLookupClient};
pub use netmask::{last_resort_country, NetmaskEntry, NetmaskRegistry, UNALLOCATED};
pub use resolver::{CountryResolver, ResolverOptions};
pub use tld::TldTable;
pub use whois::{QueryMode, WhoisClient, WhoisConfig, WhoisOutcome, DEFAULT_MAX_HOPS, WHOIS_PORT};
