//! Whois protocol client: TCP text queries, referral following, record
//! parsing for both RIPE-style and rwhois-style payloads.

use netban_core::{NetbanError, Result, WhoisRecord};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

/// Standard whois port (RFC 3912)
pub const WHOIS_PORT: u16 = 43;

/// Default per-operation network timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default referral hop bound
pub const DEFAULT_MAX_HOPS: u32 = 5;

/// Whois client configuration
#[derive(Debug, Clone)]
pub struct WhoisConfig {
    /// Timeout applied separately to connect and to the response stream
    pub timeout: Duration,
    /// Maximum sessions per query, counting referral and fallback hops
    pub max_hops: u32,
}

impl Default for WhoisConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// How much of the record to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Country code only; skips all descriptive fields
    #[default]
    BanOnly,
    /// Full record for info/geo-style public commands
    Verbose,
}

/// Result of one whois query, after referrals and optional fallback
#[derive(Debug, Clone)]
pub struct WhoisOutcome {
    /// The final session's record (referral hops replace, never merge)
    pub record: WhoisRecord,
    /// True when the country came from the NET-identifier re-query
    pub used_fallback: bool,
    /// Sessions opened, including referral and fallback hops
    pub hops: u32,
}

/// Whois TCP client
#[derive(Debug, Clone, Default)]
pub struct WhoisClient {
    config: WhoisConfig,
}

impl WhoisClient {
    /// Create a client with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with custom configuration
    #[must_use]
    pub const fn with_config(config: WhoisConfig) -> Self {
        Self { config }
    }

    /// Set the network timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the referral hop bound
    #[must_use]
    pub const fn max_hops(mut self, max_hops: u32) -> Self {
        self.config.max_hops = max_hops;
        self
    }

    /// Query `server` for `subject`, following referrals.
    ///
    /// With `fallback` enabled and no country in the final record, a
    /// captured `NET-x-x-x` identifier is re-queried once against the same
    /// original server (same hop budget).
    pub async fn query(
        &self,
        server: &str,
        port: u16,
        subject: &str,
        mode: QueryMode,
        fallback: bool,
    ) -> Result<WhoisOutcome> {
        let mut hops = 0;
        let record = self.follow(server, port, subject, mode, &mut hops).await?;

        if fallback && record.country.is_none() {
            if let Some(net_id) = record.fallback_net.clone() {
                debug!(%net_id, %server, "re-querying with fallback NET identifier");
                let requery = self.follow(server, port, &net_id, mode, &mut hops).await?;
                if requery.country.is_some() {
                    return Ok(WhoisOutcome {
                        record: requery,
                        used_fallback: true,
                        hops,
                    });
                }
            }
        }

        Ok(WhoisOutcome {
            record,
            used_fallback: false,
            hops,
        })
    }

    /// Run sessions until a server answers without a referral.
    ///
    /// One socket at a time: each session's connection is fully closed
    /// before the next hop dials out.
    async fn follow(
        &self,
        server: &str,
        port: u16,
        subject: &str,
        mode: QueryMode,
        hops: &mut u32,
    ) -> Result<WhoisRecord> {
        let mut server = server.to_string();
        let mut port = port;

        loop {
            if *hops >= self.config.max_hops {
                return Err(NetbanError::ReferralLoopFailure {
                    hops: self.config.max_hops,
                });
            }
            *hops += 1;

            let session = self.session(&server, port, subject, mode).await?;
            match session.referral {
                Some((next_server, next_port)) => {
                    debug!(from = %server, to = %next_server, port = next_port, "following whois referral");
                    server = next_server;
                    port = next_port;
                }
                None => {
                    let mut record = session.record;
                    if mode == QueryMode::Verbose {
                        record.finalize();
                    }
                    return Ok(record);
                }
            }
        }
    }

    /// One connection attempt: connect, send the subject, stream the
    /// response until the peer closes or a referral is seen.
    async fn session(
        &self,
        server: &str,
        port: u16,
        subject: &str,
        mode: QueryMode,
    ) -> Result<Session> {
        let seconds = self.config.timeout.as_secs();

        let stream = tokio::time::timeout(self.config.timeout, TcpStream::connect((server, port)))
            .await
            .map_err(|_| NetbanError::TimeoutFailure { seconds })?
            .map_err(|e| NetbanError::ConnectFailure {
                server: server.to_string(),
                detail: e.to_string(),
            })?;
        debug!(%server, port, %subject, "whois session opened");

        tokio::time::timeout(self.config.timeout, stream_record(stream, subject, mode))
            .await
            .map_err(|_| NetbanError::TimeoutFailure { seconds })?
    }
}

struct Session {
    record: WhoisRecord,
    referral: Option<(String, u16)>,
}

async fn stream_record(mut stream: TcpStream, subject: &str, mode: QueryMode) -> Result<Session> {
    stream.write_all(subject.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;

    let mut reader = BufReader::new(stream);
    let mut builder = RecordBuilder::new(mode);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            // Peer closed the stream; the record is complete.
            return Ok(Session {
                record: builder.into_record(),
                referral: None,
            });
        }

        if let Some(referral) = builder.feed(line.trim_end())? {
            // Referral target found: this socket is dropped before the
            // caller opens the next hop.
            return Ok(Session {
                record: builder.into_record(),
                referral: Some(referral),
            });
        }
    }
}

/// Record fields addressable by the parse rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Country,
    NetName,
    MntBy,
    Owner,
    Descr,
    Asn,
    InetNum,
    AbuseMail,
    AbusePhone,
    OrgName,
    Street,
    City,
    State,
    Postal,
}

/// Ban-only rules: country extraction and nothing else.
const BAN_ONLY_RULES: &[(&str, Field)] = &[
    ("country", Field::Country),
    ("country-code", Field::Country),
];

/// Verbose rules, in evaluation order. The first rule whose key matches a
/// line wins that line; each field keeps its first assigned value.
const VERBOSE_RULES: &[(&str, Field)] = &[
    ("country", Field::Country),
    ("country-code", Field::Country),
    ("netname", Field::NetName),
    ("network-name", Field::NetName),
    ("mnt-by", Field::MntBy),
    ("owner", Field::Owner),
    ("descr", Field::Descr),
    ("description", Field::Descr),
    ("origin", Field::Asn),
    ("originas", Field::Asn),
    ("inetnum", Field::InetNum),
    ("netrange", Field::InetNum),
    ("org-name", Field::OrgName),
    ("orgname", Field::OrgName),
    ("street-address", Field::Street),
    ("city", Field::City),
    ("postal-code", Field::Postal),
    ("state-prov", Field::State),
    ("abuse-phone", Field::AbusePhone),
    ("abuse-mailbox", Field::AbuseMail),
    ("abuse-email", Field::AbuseMail),
];

/// Incremental line-stream parser for one whois session
struct RecordBuilder {
    mode: QueryMode,
    record: WhoisRecord,
    descr_open: bool,
    descr_done: bool,
}

impl RecordBuilder {
    const fn new(mode: QueryMode) -> Self {
        Self {
            mode,
            record: WhoisRecord {
                country: None,
                netname: None,
                mnt_by: None,
                owner: None,
                description: Vec::new(),
                asn: None,
                inetnum: None,
                abuse_mail: None,
                abuse_phone: None,
                org_name: None,
                street_address: None,
                city: None,
                state_prov: None,
                postal_code: None,
                fallback_net: None,
            },
            descr_open: false,
            descr_done: false,
        }
    }

    fn into_record(self) -> WhoisRecord {
        self.record
    }

    /// Consume one response line. Returns the referral target when the
    /// line instructs us to re-query elsewhere.
    fn feed(&mut self, raw: &str) -> Result<Option<(String, u16)>> {
        // rwhois payloads prefix record lines with "network:"; strip the
        // marker so both formats parse as flat key: value lines.
        let flat = strip_network_marker(raw);

        let Some((key, value)) = flat.split_once(':') else {
            // Blank or free-form line: ends an open description block.
            self.close_descr();
            self.scan_fallback_net(flat);
            return Ok(None);
        };

        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        if key == "referralserver" {
            return parse_referral(raw, value).map(Some);
        }

        let rules = match self.mode {
            QueryMode::BanOnly => BAN_ONLY_RULES,
            QueryMode::Verbose => VERBOSE_RULES,
        };

        match rules.iter().find(|(k, _)| *k == key) {
            Some((_, Field::Descr)) => self.push_descr(value),
            Some((_, field)) => {
                self.close_descr();
                self.assign(*field, value);
            }
            None => self.close_descr(),
        }

        if self.record.country.is_none() {
            self.scan_fallback_net(flat);
        }
        Ok(None)
    }

    /// First-match-wins assignment for scalar fields
    fn assign(&mut self, field: Field, value: &str) {
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::Country => {
                if self.record.country.is_none() {
                    self.record.country = normalize_country(value);
                }
                return;
            }
            Field::NetName => &mut self.record.netname,
            Field::MntBy => &mut self.record.mnt_by,
            Field::Owner => &mut self.record.owner,
            Field::Asn => &mut self.record.asn,
            Field::InetNum => &mut self.record.inetnum,
            Field::AbuseMail => &mut self.record.abuse_mail,
            Field::AbusePhone => &mut self.record.abuse_phone,
            Field::OrgName => &mut self.record.org_name,
            Field::Street => &mut self.record.street_address,
            Field::City => &mut self.record.city,
            Field::State => &mut self.record.state_prov,
            Field::Postal => &mut self.record.postal_code,
            Field::Descr => return,
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    /// Collect a description line into the first block. Lines beginning
    /// with "=" are decoration and excluded.
    fn push_descr(&mut self, value: &str) {
        if self.descr_done {
            return;
        }
        self.descr_open = true;
        if !value.is_empty() && !value.starts_with('=') {
            self.record.description.push(value.to_string());
        }
    }

    /// A non-description line ends the first description block for good
    fn close_descr(&mut self) {
        if self.descr_open {
            self.descr_open = false;
            self.descr_done = true;
        }
    }

    /// Retain the first `NET-x-x-x` style token seen before any country
    /// line, as the candidate subject for the fallback re-query.
    fn scan_fallback_net(&mut self, line: &str) {
        if self.record.fallback_net.is_some() {
            return;
        }
        let is_word = |c: char| c.is_ascii_alphanumeric() || c == '-';
        for word in line.split(|c: char| !is_word(c)) {
            if let Some(rest) = word.strip_prefix("NET-") {
                if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit() || c == '-') {
                    self.record.fallback_net = Some(word.to_string());
                    return;
                }
            }
        }
    }
}

/// Strip a leading rwhois "network:" marker, case-insensitively
fn strip_network_marker(line: &str) -> &str {
    const MARKER: &str = "network:";
    if line.len() >= MARKER.len() && line[..MARKER.len()].eq_ignore_ascii_case(MARKER) {
        &line[MARKER.len()..]
    } else {
        line
    }
}

/// Lowercase a country value, rejecting anything that is not a bare
/// 2-6 letter code
fn normalize_country(value: &str) -> Option<String> {
    let code = value.split_whitespace().next()?;
    if (2..=6).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_lowercase())
    } else {
        None
    }
}

/// Parse a `whois://host[:port]` referral target
fn parse_referral(raw: &str, value: &str) -> Result<(String, u16)> {
    let fail = || NetbanError::ReferralParseFailure(raw.to_string());

    let target = Url::parse(value).map_err(|_| fail())?;
    if !matches!(target.scheme(), "whois" | "rwhois") {
        return Err(fail());
    }
    let host = target.host_str().ok_or_else(fail)?.to_string();
    Ok((host, target.port().unwrap_or(WHOIS_PORT)))
}
