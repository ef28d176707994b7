//! The SQLite implementation of [`PrincipalStore`].

use std::path::Path;

use chrono::Utc;
use churchos_core::{
  principal::{NewPrincipal, Principal},
  role::Role,
  store::PrincipalStore,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{PRINCIPAL_COLUMNS, RawPrincipal, encode_dt, encode_role, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A principal store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of an `INSERT` that may collide with the `external_subject`
/// constraint.
enum InsertOutcome {
  Inserted,
  Duplicate,
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one row matching `column = value`.
  async fn fetch_one(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Principal>> {
    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        let sql =
          format!("SELECT {PRINCIPAL_COLUMNS} FROM users WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawPrincipal::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }

  /// Set one column on the row with `id`, refresh `updated_at`, and read the
  /// row back inside the same transaction.
  async fn update_column(
    &self,
    id: Uuid,
    column: &'static str,
    value: String,
  ) -> Result<Option<Principal>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawPrincipal> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          &format!("UPDATE users SET {column} = ?2, updated_at = ?3 WHERE id = ?1"),
          rusqlite::params![id_str, value, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(
          &format!("SELECT {PRINCIPAL_COLUMNS} FROM users WHERE id = ?1"),
          rusqlite::params![id_str],
          RawPrincipal::from_row,
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawPrincipal::into_principal).transpose()
  }
}

// ─── PrincipalStore impl ─────────────────────────────────────────────────────

impl PrincipalStore for SqliteStore {
  type Error = Error;

  async fn find_by_subject(&self, subject: &str) -> Result<Option<Principal>> {
    self.fetch_one("external_subject", subject.to_owned()).await
  }

  async fn get_principal(&self, id: Uuid) -> Result<Option<Principal>> {
    self.fetch_one("id", encode_uuid(id)).await
  }

  async fn list_principals(&self) -> Result<Vec<Principal>> {
    let raws: Vec<RawPrincipal> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRINCIPAL_COLUMNS} FROM users ORDER BY created_at, id"
        ))?;
        let rows = stmt
          .query_map([], RawPrincipal::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPrincipal::into_principal).collect()
  }

  async fn insert_principal(&self, input: NewPrincipal) -> Result<Principal> {
    let now = Utc::now();
    let principal = Principal {
      id:               Uuid::new_v4(),
      external_subject: input.external_subject,
      email:            input.email,
      display_name:     input.display_name,
      role:             input.role,
      active:           true,
      created_at:       now,
      updated_at:       now,
    };

    let id_str       = encode_uuid(principal.id);
    let subject      = principal.external_subject.clone();
    let email        = principal.email.clone();
    let display_name = principal.display_name.clone();
    let role_str     = encode_role(principal.role);
    let at_str       = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO users (
             id, external_subject, email, display_name,
             role, active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
          rusqlite::params![id_str, subject, email, display_name, role_str, at_str],
        );
        match result {
          Ok(_) => Ok(InsertOutcome::Inserted),
          Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    match outcome {
      InsertOutcome::Inserted => Ok(principal),
      InsertOutcome::Duplicate => {
        tracing::debug!(
          subject = %principal.external_subject,
          "insert rejected by external_subject constraint"
        );
        Err(Error::DuplicateSubject(principal.external_subject))
      }
    }
  }

  async fn update_email(
    &self,
    id: Uuid,
    email: String,
  ) -> Result<Option<Principal>> {
    self.update_column(id, "email", email).await
  }

  async fn update_role(&self, id: Uuid, role: Role) -> Result<Option<Principal>> {
    self.update_column(id, "role", encode_role(role).to_owned()).await
  }
}
