//! Host-to-country resolution and channel ban policy engine.
//!
//! netban resolves a joining host (IP or hostname) to a country code
//! through a layered strategy (GeoIP HTTP, netmask-selected whois with
//! referral following, experimental NET re-query, last-resort table), then
//! applies per-channel TLD/whitelist policy to decide whether the host is
//! banned, with templated reasons.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use netban::{
//!     ChannelConfig, CountryResolver, Decision, MemorySettings, NetmaskRegistry,
//!     PolicyEngine, QueryMode, Resolution, Subject,
//! };
//!
//! #[tokio::main]
//! async fn main() -> netban::Result<()> {
//!     let registry = Arc::new(NetmaskRegistry::load("netmask.table".as_ref())?);
//!     let resolver = CountryResolver::new(registry);
//!
//!     let settings = Arc::new(MemorySettings::new());
//!     let engine = PolicyEngine::new(settings.clone());
//!
//!     let channel = settings.channel("#chat").unwrap_or_default();
//!     let subject = Subject::parse("203.0.113.9");
//!
//!     // Top-domain path first: no network I/O, takes precedence.
//!     match engine.evaluate_top_domain(&channel, &subject, "bob", None) {
//!         Decision::Ban { reason, minutes } => {
//!             engine.apply("#chat", &Decision::Ban { reason, minutes });
//!             return Ok(());
//!         }
//!         _ => {}
//!     }
//!
//!     if let Resolution::Resolved(result) =
//!         resolver.resolve(&subject, &channel, QueryMode::BanOnly).await?
//!     {
//!         let decision = engine.evaluate_country(&channel, &result, &subject, "bob", None);
//!         engine.apply("#chat", &decision);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

// Re-export core types
pub use netban_core::*;

// Re-export the resolution machinery
pub use netban_resolve::{
    CountryResolver, GeoConfig, GeoLookupClient, NetmaskEntry, NetmaskRegistry, QueryMode,
    ResolverOptions, TldTable, WhoisClient, WhoisConfig, WhoisOutcome,
};

// Re-export policy
pub use netban_policy::{
    Decision, MemorySettings, PolicyEngine, SettingsStore, TemplateVars, GLOBAL_OPTIONS,
};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
