//! The decoded form of a bearer credential. Lives for one request only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims extracted from a verified identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedCredential {
  /// Provider subject identifier. Must be non-empty to authenticate.
  pub subject:      String,
  pub email:        Option<String>,
  pub display_name: Option<String>,
  pub expires_at:   Option<DateTime<Utc>>,
}

impl DecodedCredential {
  pub fn new(subject: impl Into<String>) -> Self {
    Self {
      subject:      subject.into(),
      email:        None,
      display_name: None,
      expires_at:   None,
    }
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }

  pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
    self.display_name = Some(name.into());
    self
  }

  pub fn with_expiry(mut self, at: DateTime<Utc>) -> Self {
    self.expires_at = Some(at);
    self
  }

  /// The email the store should hold for this login; absent means empty.
  pub fn email_or_empty(&self) -> &str { self.email.as_deref().unwrap_or("") }

  /// `true` if an expiry claim is present and not strictly after `now`.
  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at.is_some_and(|exp| exp <= now)
  }
}
