use serde::{Deserialize, Serialize};

/// Payload status reported by the geo provider for a successful lookup
pub const GEO_STATUS_OK: &str = "OK";

/// Country name the provider reports for private/reserved address space
pub const GEO_RESERVED: &str = "Reserved";

/// One GeoIP lookup result.
///
/// Fields mirror the provider's pseudo-XML tags; a tag missing from the
/// response leaves the field empty rather than failing the parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// Provider status ("OK" on success)
    #[serde(default)]
    pub status: String,

    /// Echoed subject address
    #[serde(default)]
    pub ip: String,

    /// Two-letter country code
    #[serde(default)]
    pub country_code: String,

    /// Full country name; "Reserved" marks private/reserved space
    #[serde(default)]
    pub country_name: String,

    /// Region/state code
    #[serde(default)]
    pub region_code: String,

    /// Region/state name
    #[serde(default)]
    pub region_name: String,

    /// City name
    #[serde(default)]
    pub city: String,

    /// ZIP or postal code
    #[serde(default)]
    pub zip_postal_code: String,

    /// Latitude
    #[serde(default)]
    pub latitude: String,

    /// Longitude
    #[serde(default)]
    pub longitude: String,
}

impl GeoRecord {
    /// Returns true if the provider reported a successful lookup
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case(GEO_STATUS_OK)
    }

    /// Returns true if the subject falls in reserved/private address space.
    ///
    /// Reserved addresses must never produce a ban decision, regardless of
    /// the reported status.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.country_name.eq_ignore_ascii_case(GEO_RESERVED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_check_is_case_insensitive() {
        let record = GeoRecord {
            status: "ok".into(),
            ..GeoRecord::default()
        };
        assert!(record.is_ok());
    }

    #[test]
    fn test_reserved_detection() {
        let record = GeoRecord {
            status: "OK".into(),
            country_name: "Reserved".into(),
            ..GeoRecord::default()
        };
        assert!(record.is_ok());
        assert!(record.is_reserved());
    }
}
