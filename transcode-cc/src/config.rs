//! Decoder configuration.

use serde::{Deserialize, Serialize};

/// Closed caption decoder configuration.
///
/// The host builds this value; nothing is read from files or the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Decode field 1 (and possibly field 2) line-21 data.
    pub legacy_enabled: bool,
    /// Decode DTVCC packet data.
    pub dtvcc_enabled: bool,
    /// Decode field 2 data as field 1 while no DTVCC packet has been seen.
    pub field2_fallback: bool,
    /// Clear the last row instead of scrolling when a window runs out of rows.
    pub no_rollup: bool,
    /// DTVCC services to interpret (None = all).
    pub services: Option<Vec<u8>>,
    /// Legacy data channel (1 or 2) that produces output (None = both).
    pub legacy_channel: Option<u8>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            legacy_enabled: true,
            dtvcc_enabled: true,
            field2_fallback: true,
            no_rollup: false,
            services: None,
            legacy_channel: None,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable line-21 decoding.
    pub fn with_legacy(mut self, enabled: bool) -> Self {
        self.legacy_enabled = enabled;
        self
    }

    /// Enable or disable DTVCC decoding.
    pub fn with_dtvcc(mut self, enabled: bool) -> Self {
        self.dtvcc_enabled = enabled;
        self
    }

    /// Set the field 2 fallback rule.
    pub fn with_field2_fallback(mut self, enabled: bool) -> Self {
        self.field2_fallback = enabled;
        self
    }

    /// Set the "no rollup" window mode.
    pub fn with_no_rollup(mut self, no_rollup: bool) -> Self {
        self.no_rollup = no_rollup;
        self
    }

    /// Restrict DTVCC decoding to the given services.
    pub fn with_services(mut self, services: impl Into<Vec<u8>>) -> Self {
        self.services = Some(services.into());
        self
    }

    /// Restrict legacy output to one data channel.
    pub fn with_legacy_channel(mut self, channel: u8) -> Self {
        self.legacy_channel = Some(channel);
        self
    }

    /// Whether a DTVCC service should be interpreted.
    pub fn wants_service(&self, service: u8) -> bool {
        self.services
            .as_ref()
            .map_or(true, |services| services.contains(&service))
    }

    /// Whether a legacy data channel (1 or 2) should produce output.
    pub fn wants_legacy_channel(&self, channel: u8) -> bool {
        self.legacy_channel.map_or(true, |c| c == channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert!(config.legacy_enabled);
        assert!(config.dtvcc_enabled);
        assert!(config.field2_fallback);
        assert!(!config.no_rollup);
        assert!(config.wants_service(1));
        assert!(config.wants_service(63));
        assert!(config.wants_legacy_channel(2));
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::new()
            .with_services(vec![1, 2])
            .with_legacy_channel(1)
            .with_no_rollup(true);
        assert!(config.wants_service(2));
        assert!(!config.wants_service(3));
        assert!(config.wants_legacy_channel(1));
        assert!(!config.wants_legacy_channel(2));
        assert!(config.no_rollup);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: DecoderConfig = serde_json::from_str(r#"{"no_rollup": true}"#).unwrap();
        assert!(config.no_rollup);
        assert!(config.legacy_enabled);
        assert_eq!(config.services, None);
    }
}
