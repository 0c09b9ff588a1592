//! Presence hub tuning

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound for the per-connection outbound queue.
pub const MAX_OUTBOUND_BUFFER: usize = 4096;

/// Hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Events queued per connection before new ones are dropped
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,

    /// Write presence changes through to the user store
    #[serde(default = "default_mirror_presence")]
    pub mirror_presence: bool,
}

impl HubConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_OUTBOUND_BUFFER).contains(&self.outbound_buffer) {
            return Err(ValidationError::InvalidOutboundBuffer {
                max: MAX_OUTBOUND_BUFFER,
            });
        }
        Ok(())
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
            mirror_presence: default_mirror_presence(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_mirror_presence() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_config_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.outbound_buffer, 64);
        assert!(config.mirror_presence);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_buffer_bounds() {
        for outbound_buffer in [0, MAX_OUTBOUND_BUFFER + 1] {
            let config = HubConfig {
                outbound_buffer,
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
