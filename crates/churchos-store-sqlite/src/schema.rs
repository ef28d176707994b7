//! SQL schema for the CHURCHOS SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- external_subject is the natural key; its UNIQUE constraint is what
-- serialises concurrent first logins for the same subject.
CREATE TABLE IF NOT EXISTS users (
    id               TEXT PRIMARY KEY,
    external_subject TEXT NOT NULL UNIQUE,
    email            TEXT NOT NULL DEFAULT '',
    display_name     TEXT NOT NULL,
    role             TEXT NOT NULL DEFAULT 'Deacon',
    active           INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_created_idx ON users(created_at);

PRAGMA user_version = 1;
";
