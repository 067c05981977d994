//! Bus error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when talking to the bus.
#[derive(Debug, Error)]
pub enum BusError {
  #[error("D-Bus error: {0}")]
  Dbus(#[from] zbus::Error),

  #[error("Invalid configuration: {0}")]
  Config(#[from] ConfigError),

  #[error("Unexpected body for {name}: {reason}")]
  UnexpectedBody { name: String, reason: String },

  #[error("Disconnected")]
  Disconnected,
}
