//! Decoding of the signals the bridge subscribes to.
//!
//! Reference: https://specifications.freedesktop.org/mpris-spec/latest/

use std::collections::HashMap;
use std::str::FromStr;

use zbus::message::Body;
use zbus::zvariant::{OwnedValue, Value};
use zbus::Message;

use super::error::BusError;
use super::name::QualifiedName;
use super::names;
use super::numeric::{as_f64, as_i64};

/// Playback state reported by the `PlaybackStatus` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
  Playing,
  Paused,
  Stopped,
}

impl FromStr for PlaybackStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Playing" => Ok(PlaybackStatus::Playing),
      "Paused" => Ok(PlaybackStatus::Paused),
      "Stopped" => Ok(PlaybackStatus::Stopped),
      other => Err(format!("unknown playback status: {}", other)),
    }
  }
}

/// A signal received from the bus.
#[derive(Debug, PartialEq)]
pub enum MprisSignal {
  /// The player jumped to a new position (microseconds).
  Seeked { position: i64 },
  /// A bus name changed owner. Empty owners mean "none".
  NameOwnerChanged {
    name: String,
    old_owner: String,
    new_owner: String,
  },
  /// Properties of `interface` changed.
  PropertiesChanged {
    interface: String,
    changed: HashMap<String, OwnedValue>,
    invalidated: Vec<String>,
  },
}

impl MprisSignal {
  /// Decode a message. Returns `Ok(None)` for traffic that is not one of
  /// the subscribed signals.
  pub fn parse(msg: &Message) -> Result<Option<Self>, BusError> {
    let header = msg.header();
    let body = msg.body();

    if names::SIGNAL_SEEKED.matches(&header) {
      let position =
        read_number(&body).ok_or_else(|| unexpected(&names::SIGNAL_SEEKED, "not a number"))?;
      return Ok(Some(MprisSignal::Seeked { position }));
    }

    if names::SIGNAL_NAME_OWNER_CHANGED.matches(&header) {
      let (name, old_owner, new_owner): (String, String, String) = body
        .deserialize()
        .map_err(|e| unexpected(&names::SIGNAL_NAME_OWNER_CHANGED, e))?;
      return Ok(Some(MprisSignal::NameOwnerChanged {
        name,
        old_owner,
        new_owner,
      }));
    }

    if names::SIGNAL_PROPERTIES_CHANGED.matches(&header) {
      let (interface, changed, invalidated): (String, HashMap<String, OwnedValue>, Vec<String>) =
        body
          .deserialize()
          .map_err(|e| unexpected(&names::SIGNAL_PROPERTIES_CHANGED, e))?;
      return Ok(Some(MprisSignal::PropertiesChanged {
        interface,
        changed,
        invalidated,
      }));
    }

    Ok(None)
  }

  /// Value of a changed property, if this signal carries it.
  pub fn property(&self, property: &QualifiedName) -> Option<&OwnedValue> {
    match self {
      MprisSignal::PropertiesChanged {
        interface, changed, ..
      } if interface == property.interface => changed.get(property.member),
      _ => None,
    }
  }

  /// New playback position, from either `Seeked` or a `Position` change.
  pub fn position(&self) -> Option<i64> {
    match self {
      MprisSignal::Seeked { position } => Some(*position),
      _ => self.property(&names::MPRIS_POSITION).map(|v| as_i64(v)),
    }
  }

  pub fn rate(&self) -> Option<f64> {
    self.property(&names::MPRIS_RATE).map(|v| as_f64(v))
  }

  pub fn shuffle(&self) -> Option<bool> {
    match &**self.property(&names::MPRIS_SHUFFLE)? {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn playback_status(&self) -> Option<PlaybackStatus> {
    match &**self.property(&names::MPRIS_STATUS)? {
      Value::Str(s) => s.as_str().parse().ok(),
      _ => None,
    }
  }
}

fn unexpected(name: &QualifiedName, reason: impl ToString) -> BusError {
  BusError::UnexpectedBody {
    name: name.to_string(),
    reason: reason.to_string(),
  }
}

/// Read a single numeric body, whatever wire type the sender picked.
fn read_number(body: &Body) -> Option<i64> {
  let value = if let Ok(v) = body.deserialize::<i64>() {
    Value::I64(v)
  } else if let Ok(v) = body.deserialize::<u64>() {
    Value::U64(v)
  } else if let Ok(v) = body.deserialize::<i32>() {
    Value::I32(v)
  } else if let Ok(v) = body.deserialize::<u32>() {
    Value::U32(v)
  } else if let Ok(v) = body.deserialize::<i16>() {
    Value::I16(v)
  } else if let Ok(v) = body.deserialize::<u16>() {
    Value::U16(v)
  } else if let Ok(v) = body.deserialize::<u8>() {
    Value::U8(v)
  } else if let Ok(v) = body.deserialize::<f64>() {
    Value::F64(v)
  } else {
    return body.deserialize::<OwnedValue>().ok().map(|v| as_i64(&v));
  };
  Some(as_i64(&value))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn signal<B>(name: &QualifiedName, body: &B) -> Message
  where
    B: serde::Serialize + zbus::zvariant::DynamicType,
  {
    Message::signal(names::MPRIS_PATH, name.interface, name.member)
      .unwrap()
      .build(body)
      .unwrap()
  }

  fn properties(entries: Vec<(&str, Value<'_>)>) -> Message {
    let changed: HashMap<&str, Value<'_>> = entries.into_iter().collect();
    signal(
      &names::SIGNAL_PROPERTIES_CHANGED,
      &(names::MPRIS_INTERFACE, changed, Vec::<String>::new()),
    )
  }

  #[test]
  fn test_seeked_parsing() {
    let msg = signal(&names::SIGNAL_SEEKED, &(1_500_000i64,));
    let parsed = MprisSignal::parse(&msg).unwrap();
    assert_eq!(parsed, Some(MprisSignal::Seeked { position: 1_500_000 }));
  }

  #[test]
  fn test_seeked_with_unsigned_position() {
    let msg = signal(&names::SIGNAL_SEEKED, &(42u64,));
    let parsed = MprisSignal::parse(&msg).unwrap().unwrap();
    assert_eq!(parsed.position(), Some(42));
  }

  #[test]
  fn test_seeked_with_narrow_positions() {
    let msg = signal(&names::SIGNAL_SEEKED, &(7i16,));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(7));

    let msg = signal(&names::SIGNAL_SEEKED, &(-7i16,));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(-7));

    let msg = signal(&names::SIGNAL_SEEKED, &(9u16,));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(9));

    let msg = signal(&names::SIGNAL_SEEKED, &(7u8,));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(7));
  }

  #[test]
  fn test_seeked_with_float_and_variant_positions() {
    let msg = signal(&names::SIGNAL_SEEKED, &(2.9f64,));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(2));

    let msg = signal(&names::SIGNAL_SEEKED, &(Value::I32(11),));
    assert_eq!(MprisSignal::parse(&msg).unwrap().unwrap().position(), Some(11));
  }

  #[test]
  fn test_seeked_with_text_is_error() {
    let msg = signal(&names::SIGNAL_SEEKED, &("12",));
    assert!(matches!(
      MprisSignal::parse(&msg),
      Err(BusError::UnexpectedBody { .. })
    ));
  }

  #[test]
  fn test_name_owner_changed_parsing() {
    let msg = signal(
      &names::SIGNAL_NAME_OWNER_CHANGED,
      &("org.mpris.MediaPlayer2.vlc", "", ":1.42"),
    );
    match MprisSignal::parse(&msg).unwrap() {
      Some(MprisSignal::NameOwnerChanged {
        name,
        old_owner,
        new_owner,
      }) => {
        assert_eq!(name, "org.mpris.MediaPlayer2.vlc");
        assert!(old_owner.is_empty());
        assert_eq!(new_owner, ":1.42");
      }
      other => panic!("Expected NameOwnerChanged, got {:?}", other),
    }
  }

  #[test]
  fn test_properties_changed_helpers() {
    let msg = properties(vec![
      ("Position", Value::U64(3_000_000)),
      ("Rate", Value::I32(2)),
      ("Shuffle", Value::Bool(true)),
      ("PlaybackStatus", Value::from("Paused")),
    ]);
    let parsed = MprisSignal::parse(&msg).unwrap().unwrap();
    assert_eq!(parsed.position(), Some(3_000_000));
    assert_eq!(parsed.rate(), Some(2.0));
    assert_eq!(parsed.shuffle(), Some(true));
    assert_eq!(parsed.playback_status(), Some(PlaybackStatus::Paused));
  }

  #[test]
  fn test_properties_changed_missing_values() {
    let msg = properties(vec![("Metadata", Value::from("opaque"))]);
    let parsed = MprisSignal::parse(&msg).unwrap().unwrap();
    assert_eq!(parsed.position(), None);
    assert_eq!(parsed.shuffle(), None);
    assert!(parsed.property(&names::MPRIS_METADATA).is_some());
  }

  #[test]
  fn test_malformed_body_is_error() {
    let msg = signal(&names::SIGNAL_NAME_OWNER_CHANGED, &(7u32,));
    assert!(matches!(
      MprisSignal::parse(&msg),
      Err(BusError::UnexpectedBody { .. })
    ));
  }

  #[test]
  fn test_unrelated_signal_is_ignored() {
    let msg = Message::signal("/org/example", "org.example.Iface", "Changed")
      .unwrap()
      .build(&())
      .unwrap();
    assert_eq!(MprisSignal::parse(&msg).unwrap(), None);
  }

  #[test]
  fn test_playback_status_from_str() {
    assert_eq!("Playing".parse(), Ok(PlaybackStatus::Playing));
    assert!("playing".parse::<PlaybackStatus>().is_err());
  }
}
