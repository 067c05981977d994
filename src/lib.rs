//! Addressing and payload normalization for MPRIS media players on D-Bus.

pub mod config;
pub mod mpris;

pub use config::{BridgeConfig, BusKind, ConfigError, Subscription};
pub use mpris::{
  as_f64, as_i64, names, BusError, MprisBus, MprisSignal, PlaybackStatus, QualifiedName,
};
