//! The SQLite-backed community store and its shared row helpers.

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use connect_core::{CommunitySource, GroupId, GroupProfile, Profile, UserId};
use connect_fs::ensure_parent_dir;
use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension, params};

use crate::StoreError;
use crate::schema;

/// Bcrypt cost used when hashing passwords unless overridden.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Community records persisted in a single SQLite database.
///
/// Reads borrow the store immutably; operations that change several rows
/// take `&mut self` and run inside a savepoint, so they nest under
/// [`atomically`](Self::atomically). The store is not `Sync`;
/// give each thread its own handle or guard one with a mutex.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use connect_core::NewUser;
/// use connect_data::SqliteCommunityStore;
///
/// # fn main() -> Result<(), connect_data::StoreError> {
/// let mut store = SqliteCommunityStore::open_in_memory()?.with_password_cost(4);
/// let ada = store.register(NewUser::new("Ada", "ada@example.com"), "secret1", Utc::now())?;
/// let found = store.authenticate("ADA@example.com", "secret1", Utc::now())?;
/// assert_eq!(found.id, ada.id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteCommunityStore {
    pub(crate) connection: Connection,
    pub(crate) password_cost: u32,
}

impl SqliteCommunityStore {
    /// Open (creating if needed) the database at `path`.
    ///
    /// Missing parent directories are created and the schema is applied.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the directory cannot be created, the
    /// database cannot be opened, or the schema cannot be applied.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        ensure_parent_dir(path).map_err(|source| StoreError::CreateParent {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        schema::prepare(&connection)?;
        debug!("opened community store at {path}");
        Ok(Self::from_connection(connection))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`StoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection = Connection::open_in_memory()?;
        schema::prepare(&connection)?;
        Ok(Self::from_connection(connection))
    }

    /// Override the bcrypt cost used for new password hashes.
    #[must_use]
    pub const fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    const fn from_connection(connection: Connection) -> Self {
        Self {
            connection,
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }

    pub(crate) fn user_exists(&self, id: UserId) -> Result<bool, StoreError> {
        let found = self
            .connection
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![id.get()], |_| {
                Ok(())
            })
            .optional()?;
        Ok(found.is_some())
    }

    pub(crate) fn require_user(&self, id: UserId) -> Result<(), StoreError> {
        if self.user_exists(id)? {
            Ok(())
        } else {
            Err(StoreError::UnknownUser { id })
        }
    }

    /// Run `apply` so that every write it makes lands together or not at all.
    ///
    /// Store operations called inside `apply` nest as savepoints. When
    /// `apply` fails, all of its writes are rolled back and its error is
    /// returned.
    ///
    /// # Errors
    /// Returns the error from `apply`, or a [`StoreError`] (converted into
    /// `E`) when the batch cannot be opened, committed or rolled back.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use connect_core::NewUser;
    /// use connect_data::{SqliteCommunityStore, StoreError};
    ///
    /// # fn main() -> Result<(), StoreError> {
    /// let mut store = SqliteCommunityStore::open_in_memory()?.with_password_cost(4);
    /// let outcome = store.atomically(|batch| {
    ///     batch.register(NewUser::new("Ada", "ada@example.com"), "secret1", Utc::now())?;
    ///     batch.register(NewUser::new("Ada", "ADA@example.com"), "secret1", Utc::now())
    /// });
    /// assert!(matches!(outcome, Err(StoreError::EmailTaken { .. })));
    /// // Ada's first registration was rolled back, so the address is free.
    /// store.register(NewUser::new("Ada", "ada@example.com"), "secret1", Utc::now())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn atomically<T, E>(
        &mut self,
        apply: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        self.connection
            .execute_batch("SAVEPOINT batch")
            .map_err(StoreError::from)?;
        match apply(self) {
            Ok(value) => {
                self.connection
                    .execute_batch("RELEASE batch")
                    .map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                self.connection
                    .execute_batch("ROLLBACK TO batch; RELEASE batch")
                    .map_err(StoreError::from)?;
                debug!("rolled back a batch of store writes");
                Err(err)
            }
        }
    }
}

impl CommunitySource for SqliteCommunityStore {
    type Error = StoreError;

    fn profile(&self, id: UserId) -> Result<Option<Profile>, Self::Error> {
        Ok(self.user(id)?.map(|user| user.profile()))
    }

    fn match_candidates(&self, current: &Profile) -> Result<Vec<Profile>, Self::Error> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM users
             WHERE id <> ?1
               AND id NOT IN (SELECT blocked FROM blocks WHERE blocker = ?1)
               AND id NOT IN (SELECT blocker FROM blocks WHERE blocked = ?1)
             ORDER BY id",
        )?;
        let ids = collect_ids(statement.query_map(params![current.id.get()], |row| row.get(0))?)?;
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.user(UserId::new(id))? {
                profiles.push(user.profile());
            }
        }
        Ok(profiles)
    }

    fn recommendable_groups(&self, current: &Profile) -> Result<Vec<GroupProfile>, Self::Error> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM community_groups
             WHERE is_private = 0
               AND id NOT IN (SELECT group_id FROM group_members WHERE user_id = ?1)
             ORDER BY id",
        )?;
        let ids = collect_ids(statement.query_map(params![current.id.get()], |row| row.get(0))?)?;
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(group) = self.group(GroupId::new(id))? {
                groups.push(group.profile());
            }
        }
        Ok(groups)
    }
}

/// Drain a `query_map` iterator of raw identifiers.
pub(crate) fn collect_ids<I>(rows: I) -> Result<Vec<u64>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<u64>>,
{
    rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// Convert a fresh `rowid` into an unsigned identifier.
pub(crate) fn inserted_id(connection: &Connection) -> Result<u64, StoreError> {
    let raw = connection.last_insert_rowid();
    u64::try_from(raw).map_err(|_| StoreError::IdOutOfRange { raw })
}

pub(crate) fn to_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or(StoreError::InvalidTimestamp { millis })
}

pub(crate) fn encode_list(values: &[String]) -> String {
    // Serialising a slice of strings cannot fail.
    serde_json::to_string(values).unwrap_or_else(|_| String::from("[]"))
}

pub(crate) fn decode_list(
    column: &'static str,
    id: u64,
    raw: &str,
) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|source| {
        warn!("row {id} holds malformed {column}: {source}");
        StoreError::InvalidList { column, id, source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_core::{GroupCategory, NewGroup, NewUser};
    use rstest::rstest;

    #[rstest]
    fn lists_survive_encoding() {
        let values = vec![String::from("chess"), String::from("rock \"n\" roll")];
        let raw = encode_list(&values);
        assert_eq!(decode_list("interests", 1, &raw).expect("decode"), values);
    }

    #[rstest]
    fn malformed_lists_name_the_column() {
        let err = decode_list("skills", 9, "not json").expect_err("malformed");
        assert!(matches!(err, StoreError::InvalidList { column: "skills", id: 9, .. }));
    }

    #[rstest]
    #[case(0)]
    #[case(1_714_563_600_123)]
    fn timestamps_keep_millisecond_precision(#[case] millis: i64) {
        let time = from_millis(millis).expect("in range");
        assert_eq!(to_millis(time), millis);
    }

    #[rstest]
    fn opening_on_disk_creates_parent_directories() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let root = camino::Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let path = root.join("nested/dir/community.db");
        SqliteCommunityStore::open(&path).expect("open store");
        assert!(path.is_file());
    }

    fn count(store: &SqliteCommunityStore, table: &str) -> i64 {
        store
            .connection
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count rows")
    }

    fn chess_club() -> NewGroup {
        NewGroup::new("Chess club", "Weekly blitz", GroupCategory::Other)
    }

    #[rstest]
    fn failed_batches_leave_no_rows_behind() {
        let mut store = SqliteCommunityStore::open_in_memory()
            .expect("store")
            .with_password_cost(4);
        let now = Utc::now();

        let outcome = store.atomically(|batch| {
            let ada = batch.register(NewUser::new("Ada", "ada@example.com"), "secret1", now)?;
            batch.create_group(ada.id, chess_club(), now)?;
            batch.register(NewUser::new("Ada", "ADA@example.com"), "secret1", now)
        });

        assert!(matches!(outcome, Err(StoreError::EmailTaken { .. })));
        assert_eq!(count(&store, "users"), 0);
        assert_eq!(count(&store, "community_groups"), 0);
        assert_eq!(count(&store, "group_members"), 0);
    }

    #[rstest]
    fn successful_batches_commit_every_write() {
        let mut store = SqliteCommunityStore::open_in_memory()
            .expect("store")
            .with_password_cost(4);
        let now = Utc::now();

        let group = store
            .atomically(|batch| {
                let ada = batch.register(NewUser::new("Ada", "ada@example.com"), "secret1", now)?;
                batch.create_group(ada.id, chess_club(), now)
            })
            .expect("batch commits");

        assert_eq!(count(&store, "users"), 1);
        let stored = store.group(group.id).expect("query").expect("group exists");
        assert_eq!(stored.members.len(), 1);
    }
}
