//! TLD-to-country-name table.
//!
//! Shares a file with the netmask table: lines whose first character is an
//! ASCII letter are TLD lines, `<tld><ws><country name>`. Used to expand
//! `%country%` in ban reasons and by the public info commands.

use netban_core::{NetbanError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Lookup table from a 2-6 letter TLD/country code to a display name
#[derive(Debug, Default)]
pub struct TldTable {
    names: HashMap<String, String>,
}

impl TldTable {
    /// Parse TLD entries from table text, skipping netmask lines
    pub fn from_table(text: &str) -> Result<Self> {
        let mut names = HashMap::new();

        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if !line.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                continue;
            }

            let Some((tld, name)) = line.split_once(char::is_whitespace) else {
                return Err(NetbanError::Table(format!(
                    "TLD line {} is missing a country name: {line}",
                    number + 1
                )));
            };

            if !(2..=6).contains(&tld.len()) {
                return Err(NetbanError::Table(format!(
                    "TLD on line {} must be 2-6 characters: {tld}",
                    number + 1
                )));
            }

            names.insert(tld.to_ascii_lowercase(), name.trim().to_string());
        }

        Ok(Self { names })
    }

    /// Load the table from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| NetbanError::Table(format!("failed to read {}: {e}", path.display())))?;
        Self::from_table(&text)
    }

    /// Country display name for a TLD code (case-insensitive)
    #[must_use]
    pub fn get(&self, tld: &str) -> Option<&str> {
        self.names.get(&tld.to_ascii_lowercase()).map(String::as_str)
    }

    /// Number of loaded entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no entries were loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
