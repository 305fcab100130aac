//! Real-time delivery configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::websocket::ConnectionSettings;

use super::error::ValidationError;

/// Largest mailbox a single connection may be given.
pub const MAX_MAILBOX_CAPACITY: usize = 65_536;

/// Per-connection tuning for the notification WebSocket.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RealtimeConfig {
    /// Payloads buffered per connection before it is evicted as too slow
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Seconds without any inbound frame before a connection is dropped
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Seconds a single write may take
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Queued payloads written together with the current one
    #[serde(default = "default_max_coalesce")]
    pub max_coalesce: usize,

    /// Pending pong replies buffered per connection
    #[serde(default = "default_control_capacity")]
    pub control_capacity: usize,
}

impl RealtimeConfig {
    /// Builds connection settings. Pings go out at 90% of the read timeout
    /// so a healthy peer always answers before the deadline.
    pub fn connection_settings(&self) -> ConnectionSettings {
        let read_timeout = Duration::from_secs(self.read_timeout_secs);
        ConnectionSettings {
            mailbox_capacity: self.mailbox_capacity,
            read_timeout,
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            ping_interval: read_timeout * 9 / 10,
            max_coalesce: self.max_coalesce,
            control_capacity: self.control_capacity,
        }
    }

    /// Validate real-time configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAX_MAILBOX_CAPACITY {
            return Err(ValidationError::InvalidMailboxCapacity(MAX_MAILBOX_CAPACITY));
        }
        if self.control_capacity == 0 {
            return Err(ValidationError::InvalidControlCapacity);
        }
        if !(2..=3600).contains(&self.read_timeout_secs) {
            return Err(ValidationError::InvalidReadTimeout);
        }
        if self.write_timeout_secs == 0 || self.write_timeout_secs >= self.read_timeout_secs {
            return Err(ValidationError::InvalidWriteTimeout);
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            read_timeout_secs: default_read_timeout(),
            write_timeout_secs: default_write_timeout(),
            max_coalesce: default_max_coalesce(),
            control_capacity: default_control_capacity(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    256
}

fn default_read_timeout() -> u64 {
    60
}

fn default_write_timeout() -> u64 {
    10
}

fn default_max_coalesce() -> usize {
    32
}

fn default_control_capacity() -> usize {
    16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_connection_defaults() {
        let settings = RealtimeConfig::default().connection_settings();
        assert_eq!(settings, ConnectionSettings::default());
    }

    #[test]
    fn test_ping_interval_is_ninety_percent_of_read_timeout() {
        let config = RealtimeConfig {
            read_timeout_secs: 30,
            write_timeout_secs: 5,
            ..Default::default()
        };
        assert_eq!(config.connection_settings().ping_interval, Duration::from_secs(27));
    }

    #[test]
    fn test_validation_mailbox_bounds() {
        let config = RealtimeConfig {
            mailbox_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RealtimeConfig {
            mailbox_capacity: MAX_MAILBOX_CAPACITY + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RealtimeConfig {
            mailbox_capacity: MAX_MAILBOX_CAPACITY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_write_must_undercut_read() {
        let config = RealtimeConfig {
            read_timeout_secs: 10,
            write_timeout_secs: 10,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWriteTimeout));
    }

    #[test]
    fn test_validation_zero_control_capacity() {
        let config = RealtimeConfig {
            control_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidControlCapacity));
    }
}
