//! SQL schema for the Guild SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- root_id / profile_id are NULL until the account migration attaches the
-- corresponding document; NULL is how field absence is modelled.
CREATE TABLE IF NOT EXISTS accounts (
    account_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    root_id    TEXT REFERENCES roots(root_id),
    profile_id TEXT REFERENCES profiles(profile_id)
);

-- my_invitations / my_requests are NULL on roots written under the earlier
-- schema; '[]' (present but empty) is distinct from NULL (absent).
CREATE TABLE IF NOT EXISTS roots (
    root_id        TEXT PRIMARY KEY,
    date_of_birth  TEXT NOT NULL,                -- ISO 8601 calendar date
    organizations  TEXT NOT NULL DEFAULT '[]',   -- JSON array of org ids
    my_invitations TEXT,                         -- JSON array of ids or NULL
    my_requests    TEXT                          -- JSON array of ids or NULL
);

CREATE TABLE IF NOT EXISTS groups (
    group_id TEXT PRIMARY KEY,
    members  TEXT NOT NULL    -- JSON array of {principal, role}
);

CREATE TABLE IF NOT EXISTS profiles (
    profile_id TEXT PRIMARY KEY,
    name       TEXT NOT NULL DEFAULT '',
    first_name TEXT NOT NULL DEFAULT '',
    group_id   TEXT NOT NULL REFERENCES groups(group_id)
);

CREATE TABLE IF NOT EXISTS organizations (
    organization_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    activities      TEXT NOT NULL DEFAULT '[]'   -- JSON array of {name}
);

CREATE TABLE IF NOT EXISTS invitations (
    invitation_id   TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL,
    created_by      TEXT NOT NULL REFERENCES accounts(account_id),
    group_id        TEXT NOT NULL REFERENCES groups(group_id),
    created_at      TEXT NOT NULL,
    revoked_at      TEXT,
    archived_at     TEXT
);

-- Insertion order (rowid) is list order.
CREATE TABLE IF NOT EXISTS join_requests (
    request_id    TEXT PRIMARY KEY,
    invitation_id TEXT NOT NULL REFERENCES invitations(invitation_id),
    account_id    TEXT NOT NULL REFERENCES accounts(account_id),
    status        TEXT NOT NULL DEFAULT 'pending',
    created_at    TEXT NOT NULL,
    archived_at   TEXT
);

CREATE INDEX IF NOT EXISTS invitations_creator_idx ON invitations(created_by);
CREATE INDEX IF NOT EXISTS requests_invitation_idx ON join_requests(invitation_id);
CREATE INDEX IF NOT EXISTS requests_account_idx    ON join_requests(account_id);

PRAGMA user_version = 1;
";
