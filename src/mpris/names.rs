//! Every D-Bus endpoint the bridge addresses.
//!
//! Other modules must go through these constants instead of spelling
//! interface or member strings themselves.

use super::name::QualifiedName;

pub const DBUS_INTERFACE: &str = "org.freedesktop.DBus";
pub const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";
pub const MPRIS_INTERFACE: &str = "org.mpris.MediaPlayer2.Player";

/// Well-known name and object path of the bus daemon.
pub const DBUS_DESTINATION: &str = "org.freedesktop.DBus";
pub const DBUS_PATH: &str = "/org/freedesktop/DBus";

/// Object path every MPRIS player exports.
pub const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";

/// Players own a well-known name starting with this prefix.
pub const MPRIS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2.";

// dbus methods
pub const METHOD_NAME_HAS_OWNER: QualifiedName = QualifiedName::new(DBUS_INTERFACE, "NameHasOwner");
pub const METHOD_GET_NAME_OWNER: QualifiedName = QualifiedName::new(DBUS_INTERFACE, "GetNameOwner");
pub const METHOD_ADD_MATCH: QualifiedName = QualifiedName::new(DBUS_INTERFACE, "AddMatch");
pub const METHOD_REMOVE_MATCH: QualifiedName = QualifiedName::new(DBUS_INTERFACE, "RemoveMatch");
pub const METHOD_GET_PROPERTY: QualifiedName = QualifiedName::new(PROPERTIES_INTERFACE, "Get");

// mpris methods
pub const MPRIS_PLAY: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Play");
pub const MPRIS_PAUSE: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Pause");
pub const MPRIS_PLAY_PAUSE: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "PlayPause");
pub const MPRIS_STOP: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Stop");
pub const MPRIS_NEXT: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Next");
pub const MPRIS_PREVIOUS: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Previous");
pub const MPRIS_SEEK: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Seek");

// mpris properties
pub const MPRIS_RATE: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Rate");
pub const MPRIS_POSITION: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Position");
pub const MPRIS_SHUFFLE: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Shuffle");
pub const MPRIS_STATUS: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "PlaybackStatus");
pub const MPRIS_METADATA: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Metadata");

// Signals used for receiving updates about the media player.
pub const SIGNAL_SEEKED: QualifiedName = QualifiedName::new(MPRIS_INTERFACE, "Seeked");
pub const SIGNAL_NAME_OWNER_CHANGED: QualifiedName =
  QualifiedName::new(DBUS_INTERFACE, "NameOwnerChanged");
pub const SIGNAL_PROPERTIES_CHANGED: QualifiedName =
  QualifiedName::new(PROPERTIES_INTERFACE, "PropertiesChanged");

/// What an endpoint is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  BusMethod,
  PlayerMethod,
  PlayerProperty,
  Signal,
}

/// The whole table, for lookups by dotted name.
pub const ALL: &[(QualifiedName, Role)] = &[
  (METHOD_NAME_HAS_OWNER, Role::BusMethod),
  (METHOD_GET_NAME_OWNER, Role::BusMethod),
  (METHOD_ADD_MATCH, Role::BusMethod),
  (METHOD_REMOVE_MATCH, Role::BusMethod),
  (METHOD_GET_PROPERTY, Role::BusMethod),
  (MPRIS_PLAY, Role::PlayerMethod),
  (MPRIS_PAUSE, Role::PlayerMethod),
  (MPRIS_PLAY_PAUSE, Role::PlayerMethod),
  (MPRIS_STOP, Role::PlayerMethod),
  (MPRIS_NEXT, Role::PlayerMethod),
  (MPRIS_PREVIOUS, Role::PlayerMethod),
  (MPRIS_SEEK, Role::PlayerMethod),
  (MPRIS_RATE, Role::PlayerProperty),
  (MPRIS_POSITION, Role::PlayerProperty),
  (MPRIS_SHUFFLE, Role::PlayerProperty),
  (MPRIS_STATUS, Role::PlayerProperty),
  (MPRIS_METADATA, Role::PlayerProperty),
  (SIGNAL_SEEKED, Role::Signal),
  (SIGNAL_NAME_OWNER_CHANGED, Role::Signal),
  (SIGNAL_PROPERTIES_CHANGED, Role::Signal),
];

/// Resolve a dotted name such as `org.mpris.MediaPlayer2.Player.Play`.
pub fn lookup(dotted: &str) -> Option<(QualifiedName, Role)> {
  let (interface, member) = dotted.rsplit_once('.')?;
  ALL
    .iter()
    .copied()
    .find(|(name, _)| name.interface == interface && name.member == member)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_table_has_unique_addresses() {
    let mut seen = HashSet::new();
    for (name, _) in ALL {
      assert!(seen.insert(*name), "duplicate entry {}", name);
    }
  }

  #[test]
  fn test_table_entries_are_well_formed() {
    for (name, _) in ALL {
      assert!(!name.interface.is_empty());
      assert!(!name.member.is_empty());
      assert!(!name.member.contains('.'));
    }
  }

  #[test]
  fn test_lookup_round_trips_every_entry() {
    for (name, role) in ALL {
      assert_eq!(lookup(&name.to_string()), Some((*name, *role)));
    }
  }

  #[test]
  fn test_lookup_unknown() {
    assert_eq!(lookup("org.mpris.MediaPlayer2.Player.Volume"), None);
    assert_eq!(lookup("NoDots"), None);
  }

  #[test]
  fn test_roles() {
    assert_eq!(lookup("org.freedesktop.DBus.AddMatch").map(|e| e.1), Some(Role::BusMethod));
    assert_eq!(
      lookup("org.freedesktop.DBus.Properties.PropertiesChanged").map(|e| e.1),
      Some(Role::Signal)
    );
    assert_eq!(
      lookup("org.mpris.MediaPlayer2.Player.PlaybackStatus").map(|e| e.1),
      Some(Role::PlayerProperty)
    );
  }
}
