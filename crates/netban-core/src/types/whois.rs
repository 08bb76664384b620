use serde::{Deserialize, Serialize};

/// A parsed whois response for one session.
///
/// Built incrementally while streaming response lines; on a referral hop the
/// record is replaced with the referred server's record, never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Two-to-six letter country code, lowercased. First match wins.
    #[serde(default)]
    pub country: Option<String>,

    /// Network name (netname / network-name)
    #[serde(default)]
    pub netname: Option<String>,

    /// Maintainer (mnt-by)
    #[serde(default)]
    pub mnt_by: Option<String>,

    /// Owner / org contact
    #[serde(default)]
    pub owner: Option<String>,

    /// Description block, one entry per descr line
    #[serde(default)]
    pub description: Vec<String>,

    /// Origin AS
    #[serde(default)]
    pub asn: Option<String>,

    /// Address range (inetnum / NetRange)
    #[serde(default)]
    pub inetnum: Option<String>,

    /// Abuse contact mailbox
    #[serde(default)]
    pub abuse_mail: Option<String>,

    /// Abuse contact phone
    #[serde(default)]
    pub abuse_phone: Option<String>,

    /// Organization name, used when synthesizing a description
    #[serde(default)]
    pub org_name: Option<String>,

    /// Street address
    #[serde(default)]
    pub street_address: Option<String>,

    /// City
    #[serde(default)]
    pub city: Option<String>,

    /// State or province
    #[serde(default)]
    pub state_prov: Option<String>,

    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,

    /// `NET-x-x-x` style identifier seen before any country line.
    /// Candidate subject for the experimental fallback re-query.
    #[serde(default)]
    pub fallback_net: Option<String>,
}

impl WhoisRecord {
    /// Returns true if a country code has been extracted
    #[must_use]
    pub const fn has_country(&self) -> bool {
        self.country.is_some()
    }

    /// Finalize a verbose-mode record after the stream has closed.
    ///
    /// Appends the abuse phone to the abuse mailbox when both are present,
    /// and synthesizes a description from the address fields (falling back
    /// to the owner) when no descr lines were collected.
    pub fn finalize(&mut self) {
        if let (Some(mail), Some(phone)) = (&self.abuse_mail, &self.abuse_phone) {
            self.abuse_mail = Some(format!("{mail} {phone}"));
        }

        if self.description.is_empty() {
            let parts: Vec<&str> = [
                self.org_name.as_deref(),
                self.street_address.as_deref(),
                self.city.as_deref(),
                self.state_prov.as_deref(),
                self.postal_code.as_deref(),
                self.country.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect();

            if parts.is_empty() {
                if let Some(owner) = &self.owner {
                    self.description.push(owner.clone());
                }
            } else {
                self.description.push(parts.join(", "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_appends_abuse_phone() {
        let mut record = WhoisRecord {
            abuse_mail: Some("abuse@example.net".into()),
            abuse_phone: Some("+1-555-0100".into()),
            ..WhoisRecord::default()
        };
        record.finalize();
        assert_eq!(record.abuse_mail.as_deref(), Some("abuse@example.net +1-555-0100"));
    }

    #[test]
    fn test_finalize_synthesizes_description() {
        let mut record = WhoisRecord {
            org_name: Some("Example Networks".into()),
            city: Some("Reykjavik".into()),
            country: Some("is".into()),
            ..WhoisRecord::default()
        };
        record.finalize();
        assert_eq!(record.description, vec!["Example Networks, Reykjavik, is"]);
    }

    #[test]
    fn test_finalize_falls_back_to_owner() {
        let mut record = WhoisRecord {
            owner: Some("Example LLC".into()),
            ..WhoisRecord::default()
        };
        record.finalize();
        assert_eq!(record.description, vec!["Example LLC"]);
    }

    #[test]
    fn test_finalize_keeps_collected_description() {
        let mut record = WhoisRecord {
            description: vec!["existing line".into()],
            org_name: Some("ignored".into()),
            ..WhoisRecord::default()
        };
        record.finalize();
        assert_eq!(record.description, vec!["existing line"]);
    }
}
