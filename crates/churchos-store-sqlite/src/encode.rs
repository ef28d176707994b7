//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings and
//! roles use their wire names (`"Nation Seer"`).

use chrono::{DateTime, Utc};
use churchos_core::{principal::Principal, role::Role};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str { role.as_str() }

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse()?) }

// ─── Raw row types ────────────────────────────────────────────────────────────

/// Column list matching [`RawPrincipal::from_row`].
pub const PRINCIPAL_COLUMNS: &str =
  "id, external_subject, email, display_name, role, active, created_at, updated_at";

/// A `users` row as read from SQLite, before decoding.
pub struct RawPrincipal {
  pub id:               String,
  pub external_subject: String,
  pub email:            String,
  pub display_name:     String,
  pub role:             String,
  pub active:           bool,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawPrincipal {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      external_subject: row.get(1)?,
      email:            row.get(2)?,
      display_name:     row.get(3)?,
      role:             row.get(4)?,
      active:           row.get(5)?,
      created_at:       row.get(6)?,
      updated_at:       row.get(7)?,
    })
  }

  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      id:               decode_uuid(&self.id)?,
      external_subject: self.external_subject,
      email:            self.email,
      display_name:     self.display_name,
      role:             decode_role(&self.role)?,
      active:           self.active,
      created_at:       decode_dt(&self.created_at)?,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}
