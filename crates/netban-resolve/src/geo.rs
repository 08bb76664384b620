//! GeoIP HTTP lookup: one GET per subject, tolerant pseudo-XML parsing.

use netban_core::{GeoRecord, NetbanError, Result};
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::debug;

/// Default provider endpoint
const DEFAULT_BASE_URL: &str = "http://api.hostip.info/";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// GeoIP client configuration
#[derive(Debug, Clone)]
pub struct GeoConfig {
    /// Provider base URL; the subject is appended as `?ip=<ip>`
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// GeoIP HTTP lookup client
#[derive(Debug, Clone)]
pub struct GeoLookupClient {
    http: HttpClient,
    base_url: String,
}

impl Default for GeoLookupClient {
    fn default() -> Self {
        Self::new(GeoConfig::default())
    }
}

impl GeoLookupClient {
    /// Create a client for the configured provider
    #[must_use]
    pub fn new(config: GeoConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: config.base_url,
        }
    }

    /// Look up the geo record for one address.
    ///
    /// Missing tags degrade to empty fields; transport failures and
    /// non-success HTTP statuses are [`NetbanError::GeoLookupFailure`].
    pub async fn lookup(&self, ip: &str) -> Result<GeoRecord> {
        let url = format!("{}?ip={}", self.base_url, ip);
        debug!(url = %url, "geo lookup");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| NetbanError::GeoLookupFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetbanError::GeoLookupFailure(format!(
                "provider returned HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetbanError::GeoLookupFailure(e.to_string()))?;

        let record = parse_geo_body(&body);
        if record.status.eq_ignore_ascii_case("error") {
            return Err(NetbanError::GeoLookupFailure(format!(
                "provider reported error status for {ip}"
            )));
        }

        Ok(record)
    }
}

/// Extract the known tags from the provider's pseudo-XML payload.
/// Tag names match case-insensitively; an absent tag leaves its field empty.
fn parse_geo_body(body: &str) -> GeoRecord {
    GeoRecord {
        status: extract_tag(body, "Status"),
        ip: extract_tag(body, "Ip"),
        country_code: extract_tag(body, "CountryCode"),
        country_name: extract_tag(body, "CountryName"),
        region_code: extract_tag(body, "RegionCode"),
        region_name: extract_tag(body, "RegionName"),
        city: extract_tag(body, "City"),
        zip_postal_code: extract_tag(body, "ZipPostalCode"),
        latitude: extract_tag(body, "Latitude"),
        longitude: extract_tag(body, "Longitude"),
    }
}

/// Case-insensitive `<Tag>value</...>` extraction
fn extract_tag(body: &str, tag: &str) -> String {
    let haystack = body.to_ascii_lowercase();
    let open = format!("<{}>", tag.to_ascii_lowercase());

    let Some(start) = haystack.find(&open).map(|i| i + open.len()) else {
        return String::new();
    };
    let end = haystack[start..].find("</").map_or(body.len(), |i| start + i);

    body[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BODY: &str = "\
<Response>\
<Status>OK</Status>\
<Ip>193.231.236.1</Ip>\
<CountryCode>RO</CountryCode>\
<CountryName>Romania</CountryName>\
<City>Bucharest</City>\
</Response>";

    #[test]
    fn test_tag_extraction_is_case_insensitive() {
        assert_eq!(extract_tag(BODY, "countrycode"), "RO");
        assert_eq!(extract_tag(BODY, "CITY"), "Bucharest");
    }

    #[test]
    fn test_missing_tag_yields_empty_field() {
        let record = parse_geo_body(BODY);
        assert_eq!(record.status, "OK");
        assert_eq!(record.country_code, "RO");
        assert_eq!(record.latitude, "");
        assert_eq!(record.zip_postal_code, "");
    }

    #[tokio::test]
    async fn test_lookup_parses_provider_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("ip", "193.231.236.1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&server)
            .await;

        let client = GeoLookupClient::new(GeoConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(1),
        });

        let record = client.lookup("193.231.236.1").await.unwrap();
        assert!(record.is_ok());
        assert_eq!(record.country_code, "RO");
        assert_eq!(record.country_name, "Romania");
        assert!(!record.is_reserved());
    }

    #[tokio::test]
    async fn test_reserved_range_is_flagged() {
        let server = MockServer::start().await;
        let body = "<Status>OK</Status><CountryName>Reserved</CountryName>";
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = GeoLookupClient::new(GeoConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(1),
        });

        let record = client.lookup("10.0.0.1").await.unwrap();
        assert!(record.is_ok());
        assert!(record.is_reserved());
    }

    #[tokio::test]
    async fn test_http_failure_short_circuits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GeoLookupClient::new(GeoConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(1),
        });

        let err = client.lookup("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, NetbanError::GeoLookupFailure(_)));
    }

    #[tokio::test]
    async fn test_error_status_in_payload_short_circuits() {
        let server = MockServer::start().await;
        let body = "<Status>ERROR</Status>";
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = GeoLookupClient::new(GeoConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(1),
        });

        let err = client.lookup("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, NetbanError::GeoLookupFailure(_)));
    }
}
