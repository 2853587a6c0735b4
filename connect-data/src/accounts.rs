//! Account registration, login, profile edits, blocking and search.

use chrono::{DateTime, Utc};
use connect_core::user::canonical_email;
use connect_core::{
    GroupId, NewUser, PrivacySettings, ProfileUpdate, PublicUser, User, UserId, UserType,
};
use log::info;
use rusqlite::{OptionalExtension, Row, params};

use crate::store::{collect_ids, decode_list, encode_list, from_millis, inserted_id, to_millis};
use crate::{SqliteCommunityStore, StoreError};

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_CHARS: usize = 6;
/// Most results a single search returns.
pub const SEARCH_LIMIT: usize = 20;

const USER_COLUMNS: &str = "id, name, email, age, bio, interests, skills, location, user_type, \
     profile_picture, is_verified, show_email, show_age, show_location, created_at, last_active";

/// Filters for [`SqliteCommunityStore::search_users`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSearch {
    /// Case-insensitive text matched against names, interests and skills.
    pub query: Option<String>,
    /// Only users of this kind.
    pub user_type: Option<UserType>,
    /// Only users declaring at least one of these interests.
    pub interests: Vec<String>,
}

impl UserSearch {
    /// Search by free text.
    #[must_use]
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    fn accepts(&self, user: &User) -> bool {
        let text_ok = self.query.as_deref().map_or(true, |query| {
            let needle = query.trim().to_lowercase();
            std::iter::once(&user.name)
                .chain(&user.interests)
                .chain(&user.skills)
                .any(|field| field.to_lowercase().contains(&needle))
        });
        let interests_ok = self.interests.is_empty()
            || self
                .interests
                .iter()
                .any(|wanted| user.interests.iter().any(|have| have == wanted.trim()));
        text_ok && interests_ok
    }
}

struct UserRow {
    id: u64,
    name: String,
    email: String,
    age: Option<u8>,
    bio: Option<String>,
    interests: String,
    skills: String,
    location: Option<String>,
    user_type: String,
    profile_picture: String,
    is_verified: bool,
    privacy: PrivacySettings,
    created_at: i64,
    last_active: i64,
}

impl UserRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            age: row.get(3)?,
            bio: row.get(4)?,
            interests: row.get(5)?,
            skills: row.get(6)?,
            location: row.get(7)?,
            user_type: row.get(8)?,
            profile_picture: row.get(9)?,
            is_verified: row.get(10)?,
            privacy: PrivacySettings {
                show_email: row.get(11)?,
                show_age: row.get(12)?,
                show_location: row.get(13)?,
            },
            created_at: row.get(14)?,
            last_active: row.get(15)?,
        })
    }

    fn into_user(
        self,
        joined_groups: Vec<GroupId>,
        blocked_users: Vec<UserId>,
    ) -> Result<User, StoreError> {
        Ok(User {
            id: UserId::new(self.id),
            interests: decode_list("interests", self.id, &self.interests)?,
            skills: decode_list("skills", self.id, &self.skills)?,
            name: self.name,
            email: self.email,
            age: self.age,
            bio: self.bio,
            location: self.location,
            user_type: self.user_type.parse()?,
            profile_picture: self.profile_picture,
            joined_groups,
            blocked_users,
            is_verified: self.is_verified,
            privacy: self.privacy,
            created_at: from_millis(self.created_at)?,
            last_active: from_millis(self.last_active)?,
        })
    }
}

impl SqliteCommunityStore {
    /// Create an account with a bcrypt-hashed password.
    ///
    /// # Errors
    /// [`StoreError::InvalidUser`] for invalid input,
    /// [`StoreError::PasswordTooShort`], [`StoreError::EmailTaken`], or
    /// database and hashing failures.
    pub fn register(
        &mut self,
        input: NewUser,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let valid = input.validated()?;
        check_password(password)?;
        if self.user_id_by_email(&valid.email)?.is_some() {
            return Err(StoreError::EmailTaken { email: valid.email });
        }
        let hash = bcrypt::hash(password, self.password_cost)?;
        let privacy = PrivacySettings::default();
        self.connection.execute(
            "INSERT INTO users (name, email, password_hash, age, bio, interests, skills, location,
                user_type, profile_picture, show_email, show_age, show_location, created_at,
                last_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
            params![
                valid.name,
                valid.email,
                hash,
                valid.age,
                valid.bio,
                encode_list(&valid.interests),
                encode_list(&valid.skills),
                valid.location,
                valid.user_type.as_str(),
                connect_core::user::DEFAULT_AVATAR,
                privacy.show_email,
                privacy.show_age,
                privacy.show_location,
                to_millis(now),
            ],
        )?;
        let id = UserId::new(inserted_id(&self.connection)?);
        info!("registered user {id}");
        Ok(valid.into_user(id, now))
    }

    /// Check a password and bump the account's last activity.
    ///
    /// # Errors
    /// [`StoreError::InvalidCredentials`] when the e-mail is unknown or the
    /// password does not match, or database and hashing failures.
    pub fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let canonical = canonical_email(email).map_err(|_| StoreError::InvalidCredentials)?;
        let stored: Option<(u64, String)> = self
            .connection
            .query_row(
                "SELECT id, password_hash FROM users WHERE email = ?1",
                params![canonical],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((raw_id, hash)) = stored else {
            return Err(StoreError::InvalidCredentials);
        };
        if !bcrypt::verify(password, &hash)? {
            return Err(StoreError::InvalidCredentials);
        }
        self.connection.execute(
            "UPDATE users SET last_active = ?1 WHERE id = ?2",
            params![to_millis(now), raw_id],
        )?;
        let id = UserId::new(raw_id);
        self.user(id)?.ok_or(StoreError::UnknownUser { id })
    }

    /// Load an account, or `None` when it does not exist.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let Some(row) = self
            .connection
            .query_row(&sql, params![id.get()], UserRow::read)
            .optional()?
        else {
            return Ok(None);
        };
        let joined = self.ids_in_order(
            "SELECT group_id FROM group_members WHERE user_id = ?1 ORDER BY rowid",
            id.get(),
        )?;
        let blocked = self.ids_in_order(
            "SELECT blocked FROM blocks WHERE blocker = ?1 ORDER BY rowid",
            id.get(),
        )?;
        row.into_user(
            joined.into_iter().map(GroupId::new).collect(),
            blocked.into_iter().map(UserId::new).collect(),
        )
        .map(Some)
    }

    /// Load an account as other users may see it.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`] when the account does not exist.
    pub fn public_user(&self, id: UserId) -> Result<PublicUser, StoreError> {
        self.user(id)?
            .map(|user| user.public_view())
            .ok_or(StoreError::UnknownUser { id })
    }

    /// Apply a partial profile edit.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`], [`StoreError::InvalidUser`], or
    /// database failures.
    pub fn update_profile(
        &mut self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, StoreError> {
        let mut user = self.user(id)?.ok_or(StoreError::UnknownUser { id })?;
        user.apply(update)?;
        self.connection.execute(
            "UPDATE users SET name = ?1, age = ?2, bio = ?3, interests = ?4, skills = ?5,
                location = ?6, user_type = ?7, show_email = ?8, show_age = ?9,
                show_location = ?10
             WHERE id = ?11",
            params![
                user.name,
                user.age,
                user.bio,
                encode_list(&user.interests),
                encode_list(&user.skills),
                user.location,
                user.user_type.as_str(),
                user.privacy.show_email,
                user.privacy.show_age,
                user.privacy.show_location,
                id.get(),
            ],
        )?;
        Ok(user)
    }

    /// Add `blocked` to the blocklist of `blocker`; repeating is harmless.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`] when either account is missing, or
    /// database failures.
    pub fn block_user(&mut self, blocker: UserId, blocked: UserId) -> Result<(), StoreError> {
        self.require_user(blocker)?;
        self.require_user(blocked)?;
        let inserted = self.connection.execute(
            "INSERT OR IGNORE INTO blocks (blocker, blocked) VALUES (?1, ?2)",
            params![blocker.get(), blocked.get()],
        )?;
        if inserted > 0 {
            info!("user {blocker} blocked user {blocked}");
        }
        Ok(())
    }

    /// Find other users matching `search`, as they may be seen by `viewer`.
    ///
    /// The viewer, users the viewer blocked and users who blocked the viewer
    /// are never returned. At most [`SEARCH_LIMIT`] results are returned in
    /// registration order.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn search_users(
        &self,
        viewer: UserId,
        search: &UserSearch,
    ) -> Result<Vec<PublicUser>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM users
             WHERE id <> ?1
               AND id NOT IN (SELECT blocked FROM blocks WHERE blocker = ?1)
               AND id NOT IN (SELECT blocker FROM blocks WHERE blocked = ?1)
               AND (?2 IS NULL OR user_type = ?2)
             ORDER BY id",
        )?;
        let user_type = search.user_type.map(UserType::as_str);
        let ids = collect_ids(statement.query_map(params![viewer.get(), user_type], |row| {
            row.get(0)
        })?)?;

        let mut found = Vec::new();
        for id in ids {
            if found.len() == SEARCH_LIMIT {
                break;
            }
            if let Some(user) = self.user(UserId::new(id))? {
                if search.accepts(&user) {
                    found.push(user.public_view());
                }
            }
        }
        Ok(found)
    }

    pub(crate) fn user_id_by_email(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        let id: Option<u64> = self
            .connection
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(UserId::new))
    }

    pub(crate) fn ids_in_order(&self, sql: &str, key: u64) -> Result<Vec<u64>, StoreError> {
        let mut statement = self.connection.prepare_cached(sql)?;
        collect_ids(statement.query_map(params![key], |row| row.get(0))?)
    }
}

pub(crate) fn check_password(password: &str) -> Result<(), StoreError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        Err(StoreError::PasswordTooShort {
            minimum: MIN_PASSWORD_CHARS,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use connect_core::UserError;
    use rstest::{fixture, rstest};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn store() -> SqliteCommunityStore {
        SqliteCommunityStore::open_in_memory()
            .expect("open store")
            .with_password_cost(4)
    }

    fn register(store: &mut SqliteCommunityStore, name: &str, interests: &[&str]) -> User {
        let email = format!("{}@example.com", name.to_lowercase());
        let input = NewUser::new(name, email).with_interests(interests.iter().copied());
        store.register(input, "secret1", now()).expect("register")
    }

    #[rstest]
    fn registered_users_round_trip(mut store: SqliteCommunityStore) {
        let ada = register(&mut store, "Ada", &["Chess", "Go"]);
        let loaded = store.user(ada.id).expect("load").expect("exists");
        assert_eq!(loaded, ada);
    }

    #[rstest]
    fn duplicate_email_is_rejected(mut store: SqliteCommunityStore) {
        register(&mut store, "Ada", &[]);
        let err = store
            .register(NewUser::new("Other", "ADA@example.com"), "secret1", now())
            .expect_err("duplicate");
        assert!(matches!(err, StoreError::EmailTaken { email } if email == "ada@example.com"));
    }

    #[rstest]
    #[case("short")]
    #[case("")]
    fn short_passwords_are_rejected(mut store: SqliteCommunityStore, #[case] password: &str) {
        let err = store
            .register(NewUser::new("Ada", "ada@example.com"), password, now())
            .expect_err("short password");
        assert!(matches!(err, StoreError::PasswordTooShort { minimum: 6 }));
    }

    #[rstest]
    fn invalid_input_is_rejected(mut store: SqliteCommunityStore) {
        let err = store
            .register(NewUser::new(" ", "ada@example.com"), "secret1", now())
            .expect_err("blank name");
        assert!(matches!(err, StoreError::InvalidUser(UserError::EmptyName)));
    }

    #[rstest]
    fn authentication_checks_password_and_bumps_activity(mut store: SqliteCommunityStore) {
        let ada = register(&mut store, "Ada", &[]);
        let later = now() + chrono::Duration::hours(3);
        let err = store
            .authenticate("ada@example.com", "wrong-password", later)
            .expect_err("wrong password");
        assert!(matches!(err, StoreError::InvalidCredentials));
        let err = store
            .authenticate("nobody@example.com", "secret1", later)
            .expect_err("unknown email");
        assert!(matches!(err, StoreError::InvalidCredentials));

        let user = store
            .authenticate(" Ada@Example.com ", "secret1", later)
            .expect("login");
        assert_eq!(user.id, ada.id);
        assert_eq!(user.last_active, later);
    }

    #[rstest]
    fn profile_updates_persist(mut store: SqliteCommunityStore) {
        let ada = register(&mut store, "Ada", &["Chess"]);
        let update = ProfileUpdate {
            interests: Some(vec![String::from("Go")]),
            user_type: Some(UserType::Professional),
            privacy_settings: Some(PrivacySettings {
                show_email: true,
                show_age: false,
                show_location: false,
            }),
            ..ProfileUpdate::default()
        };
        store.update_profile(ada.id, update).expect("update");
        let loaded = store.user(ada.id).expect("load").expect("exists");
        assert_eq!(loaded.interests, vec!["Go"]);
        assert_eq!(loaded.user_type, UserType::Professional);
        assert!(loaded.privacy.show_email);
        assert_eq!(
            store.public_user(ada.id).expect("public").email.as_deref(),
            Some("ada@example.com")
        );
    }

    #[rstest]
    fn blocking_is_idempotent_and_checks_target(mut store: SqliteCommunityStore) {
        let ada = register(&mut store, "Ada", &[]);
        let bob = register(&mut store, "Bob", &[]);
        store.block_user(ada.id, bob.id).expect("block");
        store.block_user(ada.id, bob.id).expect("block again");
        let loaded = store.user(ada.id).expect("load").expect("exists");
        assert_eq!(loaded.blocked_users, vec![bob.id]);

        let err = store
            .block_user(ada.id, UserId::new(999))
            .expect_err("unknown target");
        assert!(matches!(err, StoreError::UnknownUser { id } if id == UserId::new(999)));
    }

    #[rstest]
    fn search_filters_and_hides_blocked_users(mut store: SqliteCommunityStore) {
        let ada = register(&mut store, "Ada", &["Chess"]);
        let bob = register(&mut store, "Bob", &["chess", "Go"]);
        let cy = register(&mut store, "Cy", &["Go"]);
        let dee = register(&mut store, "Dee", &["Chess"]);
        store.block_user(dee.id, ada.id).expect("block");

        let by_text = store
            .search_users(ada.id, &UserSearch::text("CHESS"))
            .expect("search");
        assert_eq!(by_text.iter().map(|u| u.id).collect::<Vec<_>>(), vec![bob.id]);

        let by_interest = UserSearch {
            interests: vec![String::from("Go")],
            ..UserSearch::default()
        };
        let found = store.search_users(ada.id, &by_interest).expect("search");
        assert_eq!(
            found.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![bob.id, cy.id]
        );
        assert!(found.iter().all(|u| u.email.is_none()));
    }
}
