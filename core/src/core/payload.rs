// signflow/src/core/payload.rs

//! The value carried on every inter-stage channel.

use std::fmt;

/// Tagged value exchanged between stages.
///
/// Every channel in a run carries `Payload`, so a stage list can mix stages that
/// consume integers with stages that consume tokens. A stage that receives the
/// wrong variant skips it instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
  /// An input integer, as seeded by the caller.
  Item(i64),
  /// An opaque token produced by a signer. Compared byte-wise only.
  Token(String),
}

impl Payload {
  pub const ITEM: &'static str = "item";
  pub const TOKEN: &'static str = "token";

  /// Variant name for logs and error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Payload::Item(_) => Self::ITEM,
      Payload::Token(_) => Self::TOKEN,
    }
  }

  pub fn as_item(&self) -> Option<i64> {
    match self {
      Payload::Item(v) => Some(*v),
      Payload::Token(_) => None,
    }
  }

  pub fn as_token(&self) -> Option<&str> {
    match self {
      Payload::Token(t) => Some(t.as_str()),
      Payload::Item(_) => None,
    }
  }

  /// Consumes the payload, handing it back unchanged if it is not a token.
  pub fn into_token(self) -> Result<String, Payload> {
    match self {
      Payload::Token(t) => Ok(t),
      other => Err(other),
    }
  }
}

impl From<i64> for Payload {
  fn from(v: i64) -> Self {
    Payload::Item(v)
  }
}

impl From<String> for Payload {
  fn from(t: String) -> Self {
    Payload::Token(t)
  }
}

impl From<&str> for Payload {
  fn from(t: &str) -> Self {
    Payload::Token(t.to_string())
  }
}

impl fmt::Display for Payload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Payload::Item(v) => write!(f, "{}", v),
      Payload::Token(t) => f.write_str(t),
    }
  }
}
