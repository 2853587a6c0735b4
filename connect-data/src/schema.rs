//! Table layout for the community database.
//!
//! List-valued attributes are JSON arrays in `TEXT` columns; relations live
//! in join tables whose `rowid` order is the insertion order the domain
//! records expose. Timestamps are UTC milliseconds.

use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    age INTEGER,
    bio TEXT,
    interests TEXT NOT NULL DEFAULT '[]',
    skills TEXT NOT NULL DEFAULT '[]',
    location TEXT,
    user_type TEXT NOT NULL,
    profile_picture TEXT NOT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    show_email INTEGER NOT NULL,
    show_age INTEGER NOT NULL,
    show_location INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    last_active INTEGER NOT NULL,
    reset_token_hash TEXT,
    reset_expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS blocks (
    blocker INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    blocked INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (blocker, blocked)
);

CREATE TABLE IF NOT EXISTS community_groups (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    category TEXT NOT NULL,
    interests TEXT NOT NULL DEFAULT '[]',
    creator INTEGER NOT NULL REFERENCES users(id),
    max_members INTEGER NOT NULL,
    is_private INTEGER NOT NULL DEFAULT 0,
    group_image TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    last_activity INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS group_members (
    group_id INTEGER NOT NULL REFERENCES community_groups(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    is_admin INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (group_id, user_id)
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    organizer INTEGER NOT NULL REFERENCES users(id),
    group_id INTEGER REFERENCES community_groups(id),
    location TEXT NOT NULL,
    starts_at INTEGER NOT NULL,
    duration_minutes INTEGER NOT NULL,
    max_participants INTEGER NOT NULL,
    category TEXT NOT NULL,
    is_online INTEGER NOT NULL DEFAULT 0,
    meeting_link TEXT,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS events_by_date ON events (starts_at, status);

CREATE TABLE IF NOT EXISTS event_participants (
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (event_id, user_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY,
    sender INTEGER NOT NULL REFERENCES users(id),
    receiver INTEGER REFERENCES users(id),
    group_id INTEGER REFERENCES community_groups(id),
    content TEXT NOT NULL,
    message_type TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    CHECK ((receiver IS NULL) <> (group_id IS NULL))
);

CREATE INDEX IF NOT EXISTS messages_by_pair ON messages (sender, receiver, created_at);
CREATE INDEX IF NOT EXISTS messages_by_group ON messages (group_id, created_at);
";

/// Enable foreign keys and create any missing tables.
pub(crate) fn prepare(connection: &Connection) -> rusqlite::Result<()> {
    connection.pragma_update(None, "foreign_keys", true)?;
    connection.execute_batch(SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preparing_twice_is_harmless() {
        let connection = Connection::open_in_memory().expect("open in-memory database");
        prepare(&connection).expect("first run");
        prepare(&connection).expect("second run");
        let tables: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(tables, 7);
    }
}
