//! MPRIS over D-Bus - addressing and payload normalization.
//!
//! Architecture:
//! - `name.rs` - interface + member names and match rule construction
//! - `names.rs` - the table of every endpoint the bridge addresses
//! - `numeric.rs` - coercion of loosely typed numeric payloads
//! - `protocol.rs` - decoding of subscribed signals
//! - `bus.rs` - async bus connection built on zbus

mod bus;
mod error;
mod name;
pub mod names;
pub mod numeric;
mod protocol;

pub use bus::MprisBus;
pub use error::BusError;
pub use name::QualifiedName;
pub use numeric::{as_f64, as_i64};
pub use protocol::{MprisSignal, PlaybackStatus};
