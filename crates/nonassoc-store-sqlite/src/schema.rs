//! SQL schema for the non-associations SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- At most one open record per unordered pair is enforced by the engine, not
-- here: closed duplicates are legitimate history.
CREATE TABLE IF NOT EXISTS non_associations (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    first_prisoner_number  TEXT NOT NULL,
    first_role             TEXT NOT NULL,  -- VICTIM | PERPETRATOR | NOT_RELEVANT | UNKNOWN
    second_prisoner_number TEXT NOT NULL,
    second_role            TEXT NOT NULL,
    reason                 TEXT NOT NULL,
    restriction_type       TEXT NOT NULL,  -- CELL | LANDING | WING
    comment                TEXT NOT NULL,
    authorised_by          TEXT NOT NULL DEFAULT '',
    updated_by             TEXT NOT NULL,
    is_closed              INTEGER NOT NULL DEFAULT 0,
    closed_by              TEXT,
    closed_reason          TEXT,
    closed_at              TEXT,           -- ISO 8601 UTC
    when_created           TEXT NOT NULL,
    when_updated           TEXT NOT NULL,
    CHECK (first_prisoner_number != second_prisoner_number),
    CHECK (
      (is_closed = 1 AND closed_by IS NOT NULL AND closed_reason IS NOT NULL AND closed_at IS NOT NULL)
      OR
      (is_closed = 0 AND closed_by IS NULL AND closed_reason IS NULL AND closed_at IS NULL)
    )
);

CREATE INDEX IF NOT EXISTS non_associations_first_idx  ON non_associations(first_prisoner_number);
CREATE INDEX IF NOT EXISTS non_associations_second_idx ON non_associations(second_prisoner_number);

PRAGMA user_version = 1;
";
