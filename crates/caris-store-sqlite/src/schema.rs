//! SQL schema for the CÁRIS SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS patients (
    patient_id   TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    email        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    created_at   TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS professionals (
    professional_id    TEXT PRIMARY KEY,
    display_name       TEXT NOT NULL,
    email              TEXT NOT NULL UNIQUE COLLATE NOCASE,
    kind               TEXT NOT NULL,   -- 'psychologist' | 'coach' | ...
    license_id         TEXT,
    specialty          TEXT,
    accepting_patients INTEGER NOT NULL DEFAULT 1,
    created_at         TEXT NOT NULL
);

-- One row per professional/patient relationship. Revoked links are reissued
-- or reactivated in place; rows are never duplicated or deleted, so the
-- consent trail keeps a stable link_id for its whole lifetime.
CREATE TABLE IF NOT EXISTS links (
    link_id           TEXT PRIMARY KEY,
    professional_id   TEXT NOT NULL REFERENCES professionals(professional_id),
    patient_id        TEXT NOT NULL REFERENCES patients(patient_id),
    invite_code       TEXT NOT NULL UNIQUE COLLATE NOCASE,
    status            TEXT NOT NULL DEFAULT 'pending',
                      -- 'pending' | 'active' | 'revoked' | 'expired'
    consent_granted   INTEGER NOT NULL DEFAULT 0,
    full_history      INTEGER NOT NULL DEFAULT 1,
    emotions          INTEGER NOT NULL DEFAULT 1,
    cycles            INTEGER NOT NULL DEFAULT 1,
    rituals           INTEGER NOT NULL DEFAULT 0,
    invited_at        TEXT NOT NULL,
    accepted_at       TEXT,
    consented_at      TEXT,
    revoked_at        TEXT,
    revocation_reason TEXT,
    notes             TEXT             -- professional-authored, patient never sees it
);

-- At most one non-revoked link per pair.
CREATE UNIQUE INDEX IF NOT EXISTS links_live_pair_idx
    ON links(professional_id, patient_id) WHERE status != 'revoked';

-- Consent records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS consent_records (
    record_id   TEXT PRIMARY KEY,
    link_id     TEXT NOT NULL REFERENCES links(link_id),
    action      TEXT NOT NULL,   -- 'granted' | 'revoked' | 'modified'
    recorded_at TEXT NOT NULL,
    permissions TEXT NOT NULL,   -- JSON snapshot of the four capability flags
    reason      TEXT,
    origin      TEXT             -- requester network origin, audit only
);

CREATE TABLE IF NOT EXISTS journal_entries (
    entry_id   TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(patient_id),
    cycle      TEXT NOT NULL,    -- slug of the Cycle variant
    emotion    TEXT NOT NULL,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS links_patient_idx      ON links(patient_id);
CREATE INDEX IF NOT EXISTS links_professional_idx ON links(professional_id);
CREATE INDEX IF NOT EXISTS consent_link_idx       ON consent_records(link_id);
CREATE INDEX IF NOT EXISTS entries_patient_idx    ON journal_entries(patient_id);
CREATE INDEX IF NOT EXISTS entries_created_idx    ON journal_entries(created_at);

PRAGMA user_version = 1;
";
