//! Country resolution orchestration: geo-first or whois, fallback re-query,
//! last-resort table.

use crate::geo::GeoLookupClient;
use crate::netmask::{last_resort_country, NetmaskRegistry};
use crate::whois::{QueryMode, WhoisClient, WHOIS_PORT};
use netban_core::{
    is_unroutable, ChannelConfig, NetbanError, NoActionReason, RawRecord, Resolution,
    ResolutionResult, ResolutionSource, Result, Subject,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Global toggles consulted on every resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    /// Try the GeoIP provider before whois (the `geoban` option)
    pub geo_primary: bool,
    /// Enable the experimental NET-identifier re-query (the `fallback`
    /// option)
    pub fallback: bool,
}

/// Resolves a subject host to a country code through the layered strategy
pub struct CountryResolver {
    registry: Arc<NetmaskRegistry>,
    whois: WhoisClient,
    geo: GeoLookupClient,
    options: ResolverOptions,
    dns_timeout: Duration,
    whois_port: u16,
}

impl CountryResolver {
    /// Create a resolver over a loaded netmask registry
    #[must_use]
    pub fn new(registry: Arc<NetmaskRegistry>) -> Self {
        Self {
            registry,
            whois: WhoisClient::new(),
            geo: GeoLookupClient::default(),
            options: ResolverOptions::default(),
            dns_timeout: Duration::from_secs(5),
            whois_port: WHOIS_PORT,
        }
    }

    /// Replace the whois client
    #[must_use]
    pub fn with_whois(mut self, whois: WhoisClient) -> Self {
        self.whois = whois;
        self
    }

    /// Replace the geo client
    #[must_use]
    pub fn with_geo(mut self, geo: GeoLookupClient) -> Self {
        self.geo = geo;
        self
    }

    /// Set the global resolution toggles
    #[must_use]
    pub const fn options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the hostname resolution timeout
    #[must_use]
    pub const fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Override the port for initial whois sessions (testing)
    #[must_use]
    pub const fn whois_port(mut self, port: u16) -> Self {
        self.whois_port = port;
        self
    }

    /// Resolve a subject to a country, or a definitive no-action outcome.
    ///
    /// Hostnames only enter the network path when the channel has the
    /// top-domain resolve check enabled and the trailing label matches the
    /// channel's resolve-domain patterns; addresses always qualify.
    pub async fn resolve(
        &self,
        subject: &Subject,
        channel: &ChannelConfig,
        mode: QueryMode,
    ) -> Result<Resolution> {
        let ip = match subject {
            Subject::Address(ip) => *ip,
            Subject::Hostname(host) => {
                let qualifies = subject.trailing_label().is_some_and(|label| {
                    channel.top_domain_resolve && channel.resolve_covers(label)
                });
                if !qualifies {
                    debug!(%host, "hostname not covered by resolve check, skipping");
                    return Ok(Resolution::NoAction(NoActionReason::ResolveCheckSkipped));
                }
                self.resolve_hostname(host).await?
            }
        };

        if is_unroutable(ip) {
            debug!(%ip, "private/reserved address, no action");
            return Ok(Resolution::NoAction(NoActionReason::PrivateOrReservedRange));
        }

        if self.options.geo_primary {
            match self.geo.lookup(&ip.to_string()).await {
                Ok(record) if record.is_ok() => {
                    if record.is_reserved() {
                        return Ok(Resolution::NoAction(
                            NoActionReason::PrivateOrReservedRange,
                        ));
                    }
                    if !record.country_code.is_empty() {
                        return Ok(Resolution::Resolved(ResolutionResult {
                            country: record.country_code.to_ascii_lowercase(),
                            source: ResolutionSource::Geo,
                            record: RawRecord::Geo(record),
                        }));
                    }
                    warn!(%ip, "geo provider returned OK without a country, trying whois");
                }
                Ok(record) => {
                    warn!(%ip, status = %record.status, "geo provider not OK, trying whois");
                }
                Err(e) => {
                    warn!(%ip, error = %e, "geo lookup failed, trying whois");
                }
            }
        }

        self.resolve_whois(ip, mode).await
    }

    /// Netmask registry + whois session, then the last-resort table
    async fn resolve_whois(&self, ip: IpAddr, mode: QueryMode) -> Result<Resolution> {
        let entry = self.registry.find(ip)?;
        if entry.is_unallocated() {
            return Err(NetbanError::UnallocatedNetmask {
                prefix: entry.cidr(),
            });
        }

        let subject = ip.to_string();
        let outcome = self
            .whois
            .query(
                &entry.server,
                self.whois_port,
                &subject,
                mode,
                self.options.fallback,
            )
            .await?;

        if let Some(country) = outcome.record.country.clone() {
            let source = if outcome.used_fallback {
                ResolutionSource::Fallback
            } else {
                ResolutionSource::Whois
            };
            return Ok(Resolution::Resolved(ResolutionResult {
                country,
                source,
                record: RawRecord::Whois(outcome.record),
            }));
        }

        if let Some(country) = last_resort_country(ip) {
            debug!(%ip, country, "last-resort netmask table hit");
            return Ok(Resolution::Resolved(ResolutionResult {
                country: country.to_string(),
                source: ResolutionSource::LastResort,
                record: RawRecord::None,
            }));
        }

        Err(NetbanError::NoCountryFound { subject })
    }

    /// Resolve a hostname to an address, preferring IPv4 (the registry's
    /// table format is IPv4 CIDR)
    async fn resolve_hostname(&self, host: &str) -> Result<IpAddr> {
        let seconds = self.dns_timeout.as_secs();
        let addrs: Vec<SocketAddr> =
            tokio::time::timeout(self.dns_timeout, tokio::net::lookup_host((host, 0u16)))
                .await
                .map_err(|_| NetbanError::TimeoutFailure { seconds })??
                .collect();

        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .map(SocketAddr::ip)
            .ok_or_else(|| {
                NetbanError::Network(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no addresses for {host}"),
                ))
            })
    }
}
