//! Bridge configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mpris::names::{self, MPRIS_NAME_PREFIX};
use crate::mpris::QualifiedName;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("{0}")]
  Invalid(String),
}

/// Which message bus to connect to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
  #[default]
  Session,
  System,
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
  /// Bus the player lives on.
  #[serde(default)]
  pub bus: BusKind,

  /// Well-known name of the player to follow (None = any player).
  #[serde(default)]
  pub player: Option<String>,

  /// Subscribe to `Seeked`.
  #[serde(default = "default_true")]
  pub watch_seeked: bool,

  /// Subscribe to `PropertiesChanged` on the player interface.
  #[serde(default = "default_true")]
  pub watch_properties: bool,

  /// Subscribe to `NameOwnerChanged` to notice players appearing and leaving.
  #[serde(default = "default_true")]
  pub watch_owner: bool,
}

fn default_true() -> bool {
  true
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      bus: BusKind::default(),
      player: None,
      watch_seeked: default_true(),
      watch_properties: default_true(),
      watch_owner: default_true(),
    }
  }
}

/// A signal subscription: the name plus its sender and argument filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
  pub name: QualifiedName,
  pub sender: String,
  pub args: Vec<String>,
}

impl Subscription {
  pub fn rule(&self) -> String {
    let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
    self.name.match_rule(&self.sender, &args)
  }
}

impl BridgeConfig {
  /// Parse and validate a JSON configuration.
  pub fn from_json(json: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(player) = &self.player {
      if !player.starts_with(MPRIS_NAME_PREFIX) || player.len() == MPRIS_NAME_PREFIX.len() {
        return Err(ConfigError::Invalid(format!(
          "Player name must start with {}: {}",
          MPRIS_NAME_PREFIX, player
        )));
      }
      // Match rules are not escaped.
      if player.contains(['\'', ',']) {
        return Err(ConfigError::Invalid(format!(
          "Player name contains a quote or comma: {}",
          player
        )));
      }
    }
    if !(self.watch_seeked || self.watch_properties || self.watch_owner) {
      return Err(ConfigError::Invalid("No signals to watch".to_string()));
    }
    Ok(())
  }

  /// Signal subscriptions implied by this configuration.
  pub fn subscriptions(&self) -> Vec<Subscription> {
    let player = self.player.clone().unwrap_or_default();
    let mut subs = Vec::new();

    if self.watch_seeked {
      subs.push(Subscription {
        name: names::SIGNAL_SEEKED,
        sender: player.clone(),
        args: Vec::new(),
      });
    }

    if self.watch_properties {
      subs.push(Subscription {
        name: names::SIGNAL_PROPERTIES_CHANGED,
        sender: player.clone(),
        args: vec![names::MPRIS_INTERFACE.to_string()],
      });
    }

    if self.watch_owner {
      subs.push(Subscription {
        name: names::SIGNAL_NAME_OWNER_CHANGED,
        sender: names::DBUS_DESTINATION.to_string(),
        args: self.player.iter().cloned().collect(),
      });
    }

    subs
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_from_empty_json() {
    let config = BridgeConfig::from_json("{}").unwrap();
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.bus, BusKind::Session);
  }

  #[test]
  fn test_camel_case_fields() {
    let config = BridgeConfig::from_json(
      r#"{"bus":"system","player":"org.mpris.MediaPlayer2.vlc","watchOwner":false}"#,
    )
    .unwrap();
    assert_eq!(config.bus, BusKind::System);
    assert_eq!(config.player.as_deref(), Some("org.mpris.MediaPlayer2.vlc"));
    assert!(config.watch_seeked);
    assert!(!config.watch_owner);
  }

  #[test]
  fn test_rejects_foreign_player_name() {
    let err = BridgeConfig::from_json(r#"{"player":"org.example.Player"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(BridgeConfig::from_json(r#"{"player":"org.mpris.MediaPlayer2."}"#).is_err());
  }

  #[test]
  fn test_rejects_rule_syntax_in_player() {
    let err = BridgeConfig::from_json(r#"{"player":"org.mpris.MediaPlayer2.a',b"}"#).unwrap_err();
    assert!(err.to_string().contains("quote or comma"));
  }

  #[test]
  fn test_rejects_nothing_to_watch() {
    let json = r#"{"watchSeeked":false,"watchProperties":false,"watchOwner":false}"#;
    assert!(BridgeConfig::from_json(json).is_err());
  }

  #[test]
  fn test_bad_json() {
    assert!(matches!(
      BridgeConfig::from_json("{"),
      Err(ConfigError::Json(_))
    ));
  }

  #[test]
  fn test_subscriptions_for_player() {
    let config = BridgeConfig {
      player: Some("org.mpris.MediaPlayer2.vlc".to_string()),
      ..Default::default()
    };
    let rules: Vec<String> = config.subscriptions().iter().map(Subscription::rule).collect();
    assert_eq!(
      rules,
      vec![
        "type='signal',interface='org.mpris.MediaPlayer2.Player',member='Seeked',\
         sender='org.mpris.MediaPlayer2.vlc'"
          .to_string(),
        "type='signal',interface='org.freedesktop.DBus.Properties',member='PropertiesChanged',\
         sender='org.mpris.MediaPlayer2.vlc',arg0='org.mpris.MediaPlayer2.Player'"
          .to_string(),
        "type='signal',interface='org.freedesktop.DBus',member='NameOwnerChanged',\
         sender='org.freedesktop.DBus',arg0='org.mpris.MediaPlayer2.vlc'"
          .to_string(),
      ]
    );
  }

  #[test]
  fn test_subscriptions_without_player() {
    let config = BridgeConfig {
      watch_properties: false,
      ..Default::default()
    };
    let subs = config.subscriptions();
    assert_eq!(subs.len(), 2);
    assert_eq!(
      subs[0].rule(),
      "type='signal',interface='org.mpris.MediaPlayer2.Player',member='Seeked'"
    );
    assert!(subs[1].args.is_empty());
  }
}
