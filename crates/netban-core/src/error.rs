use thiserror::Error;

/// Result type alias for netban operations
pub type Result<T> = std::result::Result<T, NetbanError>;

/// Errors that can occur while resolving a host or evaluating policy
#[derive(Error, Debug)]
pub enum NetbanError {
    /// TCP connection to a whois server failed
    #[error("connection to whois server {server} failed: {detail}")]
    ConnectFailure {
        /// Server we tried to reach
        server: String,
        /// Underlying failure description
        detail: String,
    },

    /// A network operation exceeded its timeout
    #[error("operation timed out after {seconds} seconds")]
    TimeoutFailure {
        /// Configured timeout that was exceeded
        seconds: u64,
    },

    /// A referral line was present but its target could not be parsed
    #[error("unparseable referral line: {0}")]
    ReferralParseFailure(String),

    /// Referral chain exceeded the hop bound
    #[error("referral chain exceeded {hops} hops")]
    ReferralLoopFailure {
        /// Maximum hop count that was exceeded
        hops: u32,
    },

    /// The netmask table maps this prefix to the "unallocated" sentinel
    #[error("netmask {prefix} is unallocated address space")]
    UnallocatedNetmask {
        /// The matched prefix, in CIDR notation
        prefix: String,
    },

    /// No entry in the netmask table covers the address
    #[error("no netmask entry covers {0}")]
    NetmaskNotFound(String),

    /// All resolution layers were exhausted without finding a country
    #[error("could not determine country for {subject}")]
    NoCountryFound {
        /// The IP or NET identifier that was queried
        subject: String,
    },

    /// GeoIP HTTP lookup failed
    #[error("geo lookup failed: {0}")]
    GeoLookupFailure(String),

    /// Bad channel name, unknown option, or invalid option value
    #[error("invalid channel configuration: {0}")]
    InvalidChannelConfig(String),

    /// Failed to load a netmask or TLD table
    #[error("table load error: {0}")]
    Table(String),

    /// Network I/O error
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),
}

impl NetbanError {
    /// Returns true if the error came from the network rather than local data
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailure { .. }
                | Self::TimeoutFailure { .. }
                | Self::GeoLookupFailure(_)
                | Self::Network(_)
        )
    }
}
