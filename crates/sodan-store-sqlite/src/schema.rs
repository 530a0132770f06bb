//! SQL schema for the Sodan SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS households (
    household_id TEXT PRIMARY KEY,
    code         TEXT NOT NULL UNIQUE,  -- registration code; portal username
    street       TEXT,
    ward         TEXT,
    district     TEXT,
    kind         TEXT NOT NULL,
    email        TEXT,                  -- credential delivery destination
    secret_hash  TEXT,                  -- argon2 PHC string or NULL
    active       INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL,         -- ISO 8601 UTC; server-assigned
    -- The active flag and the stored hash move together.
    CHECK ((active = 0) = (secret_hash IS NULL))
);

CREATE TABLE IF NOT EXISTS persons (
    person_id     TEXT PRIMARY KEY,
    household_id  TEXT REFERENCES households(household_id),  -- NULL = unassigned
    full_name     TEXT NOT NULL,
    date_of_birth TEXT,                 -- ISO 8601 date or NULL
    gender        TEXT NOT NULL,        -- 'male' | 'female' | 'other'
    national_id   TEXT NOT NULL UNIQUE,
    relationship  TEXT,
    occupation    TEXT,
    education     TEXT,
    residency     TEXT NOT NULL,        -- 'permanent' | 'temporary' | 'absent'
    deceased      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS staff_users (
    staff_id      TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    role          TEXT NOT NULL,        -- 'staff' | 'manager' | 'admin'
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS population_events (
    event_id    TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL REFERENCES persons(person_id),
    kind        TEXT NOT NULL,          -- discriminant of EventKind
    description TEXT,
    occurred_on TEXT NOT NULL,          -- ISO 8601 date
    recorded_by TEXT REFERENCES staff_users(staff_id),
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contributions (
    contribution_id TEXT PRIMARY KEY,
    household_id    TEXT NOT NULL REFERENCES households(household_id),
    kind            TEXT NOT NULL,
    amount          INTEGER NOT NULL,   -- whole currency units
    due_on          TEXT,
    paid            INTEGER NOT NULL DEFAULT 0,
    paid_at         TEXT,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS persons_household_idx       ON persons(household_id);
CREATE INDEX IF NOT EXISTS events_person_idx           ON population_events(person_id);
CREATE INDEX IF NOT EXISTS contributions_household_idx ON contributions(household_id);

PRAGMA user_version = 1;
";
