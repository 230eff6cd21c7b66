//! # SQLite
//!
//! Durable store, one row per signup.
//!
//! ## Requirements
//!
//! - One writer at a time is plenty, signups trickle in
//! - Email and referral code must be unique, enforced here and not in
//!   application code
//! - Insertion order must survive restarts, it is the ranking key
//!
//! ## Schema
//!
//! - `waitlist_signups`: id (rowid, monotonic), area, first_name, email
//!   (unique), building, interests (JSON array or NULL), referral_code
//!   (unique), referred_by, created_at (epoch millis)
//! - Positions are counted from `(created_at, id)` ordering, never stored
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, params};

const SCHEMA: &str = "
    PRAGMA journal_mode=WAL;
    PRAGMA synchronous=NORMAL;
    PRAGMA busy_timeout=5000;
    CREATE TABLE IF NOT EXISTS waitlist_signups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        area TEXT NOT NULL,
        first_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        building TEXT,
        interests TEXT,
        referral_code TEXT NOT NULL UNIQUE,
        referred_by TEXT,
        created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_waitlist_signups_area_created
        ON waitlist_signups(area, created_at);
";

pub struct Store {
    conn: Mutex<Connection>,
}

pub struct InsertedSignup {
    pub id: i64,
    pub created_at: i64,
}

impl Store {
    pub fn open(path: &str) -> rusqlite::Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> rusqlite::Result<Self> {
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("Connection lock poisoned")
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_signup(
        &self,
        area: &str,
        first_name: &str,
        email: &str,
        building: Option<&str>,
        interests: Option<&str>,
        referral_code: &str,
        referred_by: Option<&str>,
    ) -> rusqlite::Result<InsertedSignup> {
        let created_at = Utc::now().timestamp_millis();
        let conn = self.conn();

        conn.execute(
            "INSERT INTO waitlist_signups (
                area, first_name, email, building, interests, referral_code, referred_by, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                area,
                first_name,
                email,
                building,
                interests,
                referral_code,
                referred_by,
                created_at
            ],
        )?;

        Ok(InsertedSignup {
            id: conn.last_insert_rowid(),
            created_at,
        })
    }

    /// 1-based rank within the area, ordered by `created_at` with the
    /// insertion id breaking ties.
    pub fn position_of(&self, area: &str, id: i64) -> rusqlite::Result<i64> {
        let conn = self.conn();

        let created_at: i64 = conn.query_row(
            "SELECT created_at FROM waitlist_signups WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;

        conn.query_row(
            "SELECT COUNT(*) FROM waitlist_signups
             WHERE area = ?1
               AND (created_at < ?2 OR (created_at = ?2 AND id <= ?3))",
            params![area, created_at, id],
            |row| row.get(0),
        )
    }

    pub fn count_signups(&self, area: &str) -> rusqlite::Result<i64> {
        self.conn().query_row(
            "SELECT COUNT(*) FROM waitlist_signups WHERE area = ?1",
            params![area],
            |row| row.get(0),
        )
    }

    #[cfg(test)]
    pub(crate) fn referred_by_of(&self, email: &str) -> rusqlite::Result<Option<String>> {
        self.conn().query_row(
            "SELECT referred_by FROM waitlist_signups WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
    }

    #[cfg(test)]
    pub(crate) fn break_for_tests(&self) {
        self.conn()
            .execute_batch("DROP TABLE waitlist_signups")
            .expect("Failed to drop table");
    }
}

#[cfg(test)]
mod tests {
    use super::Store;

    fn store() -> Store {
        Store::open_in_memory().expect("Failed to open in-memory store")
    }

    #[test]
    fn test_ids_increase_with_insertion_order() {
        let store = store();

        let first = store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        let second = store
            .insert_signup("valby", "Bo", "b@x.com", None, None, "BBBBBBBB", None)
            .unwrap();

        assert!(second.id > first.id);
        assert!(second.created_at >= first.created_at);
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let store = store();

        store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        let result =
            store.insert_signup("valby", "Asger", "a@x.com", None, None, "CCCCCCCC", None);

        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_referral_code_is_rejected() {
        let store = store();

        store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        let result =
            store.insert_signup("valby", "Bo", "b@x.com", None, None, "AAAAAAAA", None);

        assert!(result.is_err());
    }

    #[test]
    fn test_position_follows_insertion_order() {
        let store = store();

        let first = store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        let second = store
            .insert_signup("valby", "Bo", "b@x.com", None, None, "BBBBBBBB", None)
            .unwrap();

        assert_eq!(store.position_of("valby", first.id).unwrap(), 1);
        assert_eq!(store.position_of("valby", second.id).unwrap(), 2);
    }

    #[test]
    fn test_position_ignores_other_areas() {
        let store = store();

        store
            .insert_signup("sydhavn", "Carl", "c@x.com", None, None, "CCCCCCCC", None)
            .unwrap();
        let mine = store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();

        assert_eq!(store.position_of("valby", mine.id).unwrap(), 1);
    }

    #[test]
    fn test_count_scoped_by_area() {
        let store = store();

        store
            .insert_signup("valby", "Astrid", "a@x.com", None, None, "AAAAAAAA", None)
            .unwrap();
        store
            .insert_signup("valby", "Bo", "b@x.com", None, None, "BBBBBBBB", None)
            .unwrap();
        store
            .insert_signup("sydhavn", "Carl", "c@x.com", None, None, "CCCCCCCC", None)
            .unwrap();

        assert_eq!(store.count_signups("valby").unwrap(), 2);
        assert_eq!(store.count_signups("sydhavn").unwrap(), 1);
        assert_eq!(store.count_signups("amager").unwrap(), 0);
    }
}
