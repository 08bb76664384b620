//! Settings store collaborator boundary.
//!
//! The core only needs reads, global option get/set, and counter
//! increments; persistence is the embedder's responsibility.
//! [`MemorySettings`] is the reference implementation used by tests and
//! single-process embedders.

use netban_core::{ChannelConfig, NetbanError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Custom ban reason template for the resolved-country path
pub const OPT_BAN_REASON: &str = "banreason";
/// Custom ban reason template for the top-domain path
pub const OPT_TOP_BAN_REASON: &str = "bantopreason";
/// Answer lookup commands sent by private message
pub const OPT_MSG_CMDS: &str = "msgcmds";
/// Consult the GeoIP provider before whois
pub const OPT_GEO_BAN: &str = "geoban";
/// Log ban decisions without enforcing them
pub const OPT_LOG_MODE: &str = "logmode";
/// Enable the experimental NET-identifier re-query
pub const OPT_FALLBACK: &str = "fallback";

/// All recognized global option keys
pub const GLOBAL_OPTIONS: &[&str] = &[
    OPT_BAN_REASON,
    OPT_TOP_BAN_REASON,
    OPT_MSG_CMDS,
    OPT_GEO_BAN,
    OPT_LOG_MODE,
    OPT_FALLBACK,
];

/// Options whose values must be booleans
const BOOL_OPTIONS: &[&str] = &[OPT_MSG_CMDS, OPT_GEO_BAN, OPT_LOG_MODE, OPT_FALLBACK];

/// Read/increment interface the policy engine requires from the external
/// settings collaborator
pub trait SettingsStore: Send + Sync {
    /// Copy-on-read channel configuration
    fn channel(&self, name: &str) -> Option<ChannelConfig>;

    /// Replace a channel's configuration
    fn set_channel(&self, name: &str, config: ChannelConfig) -> Result<()>;

    /// Raw global option value
    fn option(&self, key: &str) -> Option<String>;

    /// Set a global option, validating key and value.
    /// Rejections leave the store unchanged.
    fn set_option(&self, key: &str, value: &str) -> Result<()>;

    /// Atomically increment a channel's ban counter, returning the new value
    fn increment_ban_count(&self, channel: &str) -> u64;

    /// Current ban counter for a channel
    fn ban_count(&self, channel: &str) -> u64;

    /// Boolean view of an option; unset and non-boolean read as false
    fn bool_option(&self, key: &str) -> bool {
        self.option(key)
            .is_some_and(|v| matches!(v.as_str(), "1" | "on" | "true" | "yes"))
    }
}

/// In-memory settings store with atomic ban counters
#[derive(Default)]
pub struct MemorySettings {
    channels: RwLock<HashMap<String, ChannelConfig>>,
    options: RwLock<HashMap<String, String>>,
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
}

impl MemorySettings {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn channel(&self, name: &str) -> Option<ChannelConfig> {
        self.channels
            .read()
            .expect("settings lock poisoned")
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    fn set_channel(&self, name: &str, config: ChannelConfig) -> Result<()> {
        if name.is_empty() {
            return Err(NetbanError::InvalidChannelConfig(
                "channel name must not be empty".into(),
            ));
        }
        self.channels
            .write()
            .expect("settings lock poisoned")
            .insert(name.to_ascii_lowercase(), config);
        Ok(())
    }

    fn option(&self, key: &str) -> Option<String> {
        self.options
            .read()
            .expect("settings lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_option(&self, key: &str, value: &str) -> Result<()> {
        if !GLOBAL_OPTIONS.contains(&key) {
            return Err(NetbanError::InvalidChannelConfig(format!(
                "unknown option: {key}"
            )));
        }

        let value = if BOOL_OPTIONS.contains(&key) {
            match value {
                "1" | "on" | "true" | "yes" => "1".to_string(),
                "0" | "off" | "false" | "no" => "0".to_string(),
                other => {
                    return Err(NetbanError::InvalidChannelConfig(format!(
                        "option {key} needs a boolean value, got: {other}"
                    )));
                }
            }
        } else {
            value.to_string()
        };

        self.options
            .write()
            .expect("settings lock poisoned")
            .insert(key.to_string(), value);
        Ok(())
    }

    fn increment_ban_count(&self, channel: &str) -> u64 {
        let existing = self
            .counters
            .read()
            .expect("settings lock poisoned")
            .get(channel)
            .cloned();

        let counter = existing.unwrap_or_else(|| {
            self.counters
                .write()
                .expect("settings lock poisoned")
                .entry(channel.to_string())
                .or_insert_with(|| Arc::new(AtomicU64::new(0)))
                .clone()
        });

        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn ban_count(&self, channel: &str) -> u64 {
        self.counters
            .read()
            .expect("settings lock poisoned")
            .get(channel)
            .map_or(0, |c| c.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_is_copy_on_read() {
        let store = MemorySettings::new();
        let mut config = ChannelConfig::default();
        config.tlds.insert("ro".into());
        store.set_channel("#test", config).unwrap();

        let mut copy = store.channel("#test").unwrap();
        copy.tlds.insert("cn".into());

        // The store is unaffected by mutations of the copy.
        assert_eq!(store.channel("#test").unwrap().tlds.len(), 1);
    }

    #[test]
    fn test_channel_names_are_case_insensitive() {
        let store = MemorySettings::new();
        store.set_channel("#Test", ChannelConfig::default()).unwrap();
        assert!(store.channel("#test").is_some());
        assert!(store.channel("#TEST").is_some());
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let store = MemorySettings::new();
        let err = store.set_option("nosuchoption", "1").unwrap_err();
        assert!(matches!(err, NetbanError::InvalidChannelConfig(_)));
    }

    #[test]
    fn test_bool_option_normalization() {
        let store = MemorySettings::new();
        store.set_option(OPT_GEO_BAN, "on").unwrap();
        assert_eq!(store.option(OPT_GEO_BAN).as_deref(), Some("1"));
        assert!(store.bool_option(OPT_GEO_BAN));

        store.set_option(OPT_GEO_BAN, "off").unwrap();
        assert!(!store.bool_option(OPT_GEO_BAN));
    }

    #[test]
    fn test_bad_bool_value_leaves_store_unchanged() {
        let store = MemorySettings::new();
        store.set_option(OPT_LOG_MODE, "1").unwrap();
        let err = store.set_option(OPT_LOG_MODE, "maybe").unwrap_err();
        assert!(matches!(err, NetbanError::InvalidChannelConfig(_)));
        assert!(store.bool_option(OPT_LOG_MODE));
    }

    #[test]
    fn test_string_option_roundtrip() {
        let store = MemorySettings::new();
        store.set_option(OPT_BAN_REASON, "%nick% go away").unwrap();
        assert_eq!(store.option(OPT_BAN_REASON).as_deref(), Some("%nick% go away"));
    }

    #[test]
    fn test_ban_counter_increments() {
        let store = MemorySettings::new();
        assert_eq!(store.ban_count("#test"), 0);
        assert_eq!(store.increment_ban_count("#test"), 1);
        assert_eq!(store.increment_ban_count("#test"), 2);
        assert_eq!(store.ban_count("#test"), 2);
        assert_eq!(store.ban_count("#other"), 0);
    }

    #[test]
    fn test_concurrent_increments_lose_no_updates() {
        let store = Arc::new(MemorySettings::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    store.increment_ban_count("#busy");
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.ban_count("#busy"), 800);
    }
}
