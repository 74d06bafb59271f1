//! SQL schema for the billwatch SQLite store.
//!
//! Executed once at connection startup. Field limits and enum choices live
//! here as `CHECK` constraints; cascades are foreign keys.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Mirror of the identity store; only existence matters here.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id                   TEXT PRIMARY KEY
                              REFERENCES users(user_id) ON DELETE CASCADE,
    organization_name         TEXT NOT NULL DEFAULT ''
                              CHECK (length(organization_name) <= 100),
    about                     TEXT NOT NULL DEFAULT '',
    feature_subscriptions     INTEGER NOT NULL DEFAULT 0,
    subscription_emails_html  INTEGER NOT NULL DEFAULT 1,
    subscription_frequency    TEXT NOT NULL DEFAULT 'w'
                              CHECK (subscription_frequency IN ('d', 'w')),
    subscription_last_checked TEXT NOT NULL
);

-- Read-only legislative reference data, mirrored for foreign keys.
CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bills (
    bill_id     TEXT PRIMARY KEY,
    identifier  TEXT NOT NULL,
    session     TEXT NOT NULL,
    state       TEXT NOT NULL,
    title       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    active          INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    query           TEXT NOT NULL DEFAULT '' CHECK (length(query) <= 300),
    state           TEXT NOT NULL DEFAULT '' CHECK (length(state) <= 2),
    chamber         TEXT NOT NULL DEFAULT '' CHECK (length(chamber) <= 15),
    session         TEXT NOT NULL DEFAULT '' CHECK (length(session) <= 100),
    classification  TEXT NOT NULL DEFAULT ''
                    CHECK (length(classification) <= 50),
    subjects        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    status          TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    sponsor_id      TEXT REFERENCES people(person_id) ON DELETE CASCADE,
    bill_id         TEXT REFERENCES bills(bill_id) ON DELETE CASCADE
);

-- Append-only; recipient stored by value, not linked to users.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id   TEXT PRIMARY KEY CHECK (length(notification_id) <= 22),
    email             TEXT NOT NULL CHECK (length(email) <= 254),
    sent              TEXT NOT NULL,
    num_query_updates INTEGER NOT NULL CHECK (num_query_updates >= 0),
    num_bill_updates  INTEGER NOT NULL CHECK (num_bill_updates >= 0)
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx    ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_sponsor_idx ON subscriptions(sponsor_id);
CREATE INDEX IF NOT EXISTS subscriptions_bill_idx    ON subscriptions(bill_id);
CREATE INDEX IF NOT EXISTS notifications_email_idx   ON notifications(email);

PRAGMA user_version = 1;
";
