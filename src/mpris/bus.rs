//! Async connection to the message bus.
//!
//! Wraps a `zbus::Connection`: registers match rules built from the name
//! table, reads properties, and forwards decoded signals to a channel.

use async_channel::{Receiver, Sender, TrySendError};
use futures_util::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use zbus::zvariant::OwnedValue;
use zbus::{Connection, Message, MessageStream};

use super::error::BusError;
use super::name::QualifiedName;
use super::names;
use super::numeric::{as_f64, as_i64};
use super::protocol::MprisSignal;
use crate::config::{BridgeConfig, BusKind};

/// Signals kept for the host before new ones are dropped.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Match rules registered with the daemon. Once closed, no rule is accepted.
#[derive(Debug, Default)]
struct RuleSet {
  rules: Vec<String>,
  closed: bool,
}

impl RuleSet {
  fn insert(&mut self, rule: &str) -> bool {
    if self.closed {
      return false;
    }
    self.rules.push(rule.to_string());
    true
  }

  fn remove(&mut self, rule: &str) -> bool {
    match self.rules.iter().position(|r| r == rule) {
      Some(pos) => {
        self.rules.remove(pos);
        true
      }
      None => false,
    }
  }

  /// Stop accepting rules and return the ones still registered.
  fn close(&mut self) -> Vec<String> {
    self.closed = true;
    self.rules.clone()
  }
}

/// Connection to the bus plus the match rules registered through it.
pub struct MprisBus {
  connection: Connection,
  rules: Mutex<RuleSet>,
  event_rx: Receiver<MprisSignal>,
  reader_handle: Mutex<Option<JoinHandle<()>>>,
}

impl MprisBus {
  /// Connect to the bus named in `config`.
  pub async fn connect(config: &BridgeConfig) -> Result<Self, BusError> {
    config.validate()?;

    let connection = match config.bus {
      BusKind::Session => Connection::session().await?,
      BusKind::System => Connection::system().await?,
    };
    log::info!("Connected to {:?} bus as {:?}", config.bus, connection.unique_name());

    Ok(Self::with_connection(connection))
  }

  /// Wrap an existing connection.
  pub fn with_connection(connection: Connection) -> Self {
    let (event_tx, event_rx) = async_channel::bounded(EVENT_QUEUE_CAPACITY);

    let stream = MessageStream::from(&connection);
    let reader_handle = tokio::spawn(async move {
      Self::reader_loop(stream, event_tx).await;
    });

    Self {
      connection,
      rules: Mutex::new(RuleSet::default()),
      event_rx,
      reader_handle: Mutex::new(Some(reader_handle)),
    }
  }

  async fn reader_loop(mut stream: MessageStream, event_tx: Sender<MprisSignal>) {
    log::info!("Bus reader loop started");

    while let Some(msg) = stream.next().await {
      let msg = match msg {
        Ok(msg) => msg,
        Err(e) => {
          log::warn!("Bus read error: {}", e);
          continue;
        }
      };

      match MprisSignal::parse(&msg) {
        Ok(Some(signal)) => {
          log::debug!("Bus reader: received signal {:?}", signal);
          if !Self::forward(&event_tx, signal) {
            break;
          }
        }
        Ok(None) => {}
        Err(e) => log::warn!("Failed to decode signal: {}", e),
      }
    }

    log::info!("Bus reader loop stopped");
  }

  /// Queue a signal for the host, dropping it when the queue is full.
  /// Returns false once the queue is closed.
  fn forward(event_tx: &Sender<MprisSignal>, signal: MprisSignal) -> bool {
    match event_tx.try_send(signal) {
      Ok(()) => true,
      Err(TrySendError::Full(signal)) => {
        log::warn!("Signal queue full, dropping {:?}", signal);
        true
      }
      Err(TrySendError::Closed(_)) => {
        log::info!("Signal queue closed");
        false
      }
    }
  }

  /// Call a method on the bus daemon itself.
  async fn call_daemon<B>(&self, method: &QualifiedName, body: &B) -> Result<Message, BusError>
  where
    B: serde::Serialize + zbus::zvariant::DynamicType,
  {
    let reply = self
      .connection
      .call_method(
        Some(names::DBUS_DESTINATION),
        names::DBUS_PATH,
        Some(method.interface),
        method.member,
        body,
      )
      .await?;
    Ok(reply)
  }

  /// Whether `name` currently has an owner on the bus.
  pub async fn name_has_owner(&self, name: &str) -> Result<bool, BusError> {
    let reply = self.call_daemon(&names::METHOD_NAME_HAS_OWNER, &(name,)).await?;
    Ok(reply.body().deserialize()?)
  }

  /// Unique connection name that owns `name`.
  pub async fn get_name_owner(&self, name: &str) -> Result<String, BusError> {
    let reply = self.call_daemon(&names::METHOD_GET_NAME_OWNER, &(name,)).await?;
    Ok(reply.body().deserialize()?)
  }

  /// Register a match rule with the bus daemon.
  ///
  /// Fails with `Disconnected` after `close()`. A rule whose registration
  /// races with `close()` is removed from the daemon again.
  pub async fn add_match(&self, rule: &str) -> Result<(), BusError> {
    if self.rules.lock().closed {
      return Err(BusError::Disconnected);
    }
    self.call_daemon(&names::METHOD_ADD_MATCH, &(rule,)).await?;

    let accepted = self.rules.lock().insert(rule);
    if !accepted {
      log::warn!("Connection closed while adding match rule: {}", rule);
      self.call_daemon(&names::METHOD_REMOVE_MATCH, &(rule,)).await?;
      return Err(BusError::Disconnected);
    }
    log::info!("Added match rule: {}", rule);
    Ok(())
  }

  /// Remove a previously registered match rule.
  pub async fn remove_match(&self, rule: &str) -> Result<(), BusError> {
    self.call_daemon(&names::METHOD_REMOVE_MATCH, &(rule,)).await?;
    log::info!("Removed match rule: {}", rule);
    self.rules.lock().remove(rule);
    Ok(())
  }

  /// Register every subscription the configuration asks for.
  pub async fn subscribe(&self, config: &BridgeConfig) -> Result<(), BusError> {
    for sub in config.subscriptions() {
      self.add_match(&sub.rule()).await?;
    }
    Ok(())
  }

  /// Match rules currently registered through this connection.
  pub fn rules(&self) -> Vec<String> {
    self.rules.lock().rules.clone()
  }

  /// Invoke an argument-less method on a player.
  pub async fn call(&self, destination: &str, method: &QualifiedName) -> Result<(), BusError> {
    log::debug!("Calling {} on {}", method, destination);
    self
      .connection
      .call_method(
        Some(destination),
        names::MPRIS_PATH,
        Some(method.interface),
        method.member,
        &(),
      )
      .await?;
    Ok(())
  }

  /// Read a player property as a raw dynamic value.
  pub async fn get_property(
    &self,
    destination: &str,
    property: &QualifiedName,
  ) -> Result<OwnedValue, BusError> {
    let get = names::METHOD_GET_PROPERTY;
    let reply = self
      .connection
      .call_method(
        Some(destination),
        names::MPRIS_PATH,
        Some(get.interface),
        get.member,
        &(property.interface, property.member),
      )
      .await?;
    Ok(reply.body().deserialize()?)
  }

  /// Read a numeric property as `i64`, whatever type the player reports.
  pub async fn get_i64(
    &self,
    destination: &str,
    property: &QualifiedName,
  ) -> Result<i64, BusError> {
    let value = self.get_property(destination, property).await?;
    Ok(as_i64(&value))
  }

  /// Read a numeric property as `f64`, whatever type the player reports.
  pub async fn get_f64(
    &self,
    destination: &str,
    property: &QualifiedName,
  ) -> Result<f64, BusError> {
    let value = self.get_property(destination, property).await?;
    Ok(as_f64(&value))
  }

  /// Get the receiver for decoded signals.
  ///
  /// At most `EVENT_QUEUE_CAPACITY` signals wait here; newer ones are
  /// dropped until the host drains the queue.
  pub fn events(&self) -> Receiver<MprisSignal> {
    self.event_rx.clone()
  }

  /// Remove all registered match rules and stop the reader.
  pub async fn close(&self) -> Result<(), BusError> {
    let handle = self.reader_handle.lock().take();
    let Some(handle) = handle else {
      return Err(BusError::Disconnected);
    };

    let rules = self.rules.lock().close();
    let mut first_error = None;
    for rule in rules {
      if let Err(e) = self.remove_match(&rule).await {
        log::error!("Failed to remove match rule {}: {}", rule, e);
        first_error.get_or_insert(e);
      }
    }

    handle.abort();
    self.event_rx.close();
    log::info!("Bus connection closed");

    match first_error {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}
