//! D-Bus names split into interface + member.

use std::fmt;

use zbus::message::{Header, Type};

/// A D-Bus name that decomposes into an interface and a member
/// (method, property or signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifiedName {
  pub interface: &'static str,
  pub member: &'static str,
}

impl QualifiedName {
  pub const fn new(interface: &'static str, member: &'static str) -> Self {
    Self { interface, member }
  }

  /// Build a match rule for the D-Bus `AddMatch`/`RemoveMatch` methods.
  ///
  /// An empty `sender` adds no sender clause. Each entry of `args` becomes an
  /// `argN` clause, numbered by position. Values are not escaped, so they must
  /// not contain `'` or `,`.
  pub fn match_rule(&self, sender: &str, args: &[&str]) -> String {
    let mut conditions = Vec::with_capacity(4 + args.len());
    conditions.push("type='signal'".to_string());
    conditions.push(format!("interface='{}'", self.interface));
    conditions.push(format!("member='{}'", self.member));
    if !sender.is_empty() {
      conditions.push(format!("sender='{}'", sender));
    }
    for (idx, val) in args.iter().enumerate() {
      conditions.push(format!("arg{}='{}'", idx, val));
    }
    conditions.join(",")
  }

  /// Whether a received message is this signal.
  pub fn matches(&self, header: &Header<'_>) -> bool {
    header.message_type() == Type::Signal
      && header.interface().map(|i| i.as_str()) == Some(self.interface)
      && header.member().map(|m| m.as_str()) == Some(self.member)
  }
}

impl fmt::Display for QualifiedName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}", self.interface, self.member)
  }
}
