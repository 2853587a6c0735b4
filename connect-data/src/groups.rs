//! Group creation, listing and membership.

use chrono::{DateTime, Utc};
use connect_core::{Group, GroupCategory, GroupId, NewGroup, UserId};
use log::info;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::store::{collect_ids, decode_list, encode_list, from_millis, inserted_id, to_millis};
use crate::{SqliteCommunityStore, StoreError};

/// Most groups a listing returns.
pub const GROUP_LISTING_LIMIT: usize = 20;

/// Filters for [`SqliteCommunityStore::public_groups`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    /// Only groups in this category.
    pub category: Option<GroupCategory>,
    /// Case-insensitive text matched against name, description and interests.
    pub search: Option<String>,
}

impl GroupFilter {
    fn accepts(&self, group: &Group) -> bool {
        self.search.as_deref().map_or(true, |search| {
            let needle = search.trim().to_lowercase();
            [&group.name, &group.description]
                .into_iter()
                .chain(&group.interests)
                .any(|field| field.to_lowercase().contains(&needle))
        })
    }
}

struct GroupRow {
    id: u64,
    name: String,
    description: String,
    category: String,
    interests: String,
    creator: u64,
    max_members: u32,
    is_private: bool,
    group_image: String,
    created_at: i64,
    last_activity: i64,
}

impl GroupRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            category: row.get(3)?,
            interests: row.get(4)?,
            creator: row.get(5)?,
            max_members: row.get(6)?,
            is_private: row.get(7)?,
            group_image: row.get(8)?,
            created_at: row.get(9)?,
            last_activity: row.get(10)?,
        })
    }
}

/// Load a group with its members and admins in join order.
pub(crate) fn load_group(connection: &Connection, id: GroupId) -> Result<Option<Group>, StoreError> {
    let Some(row) = connection
        .query_row(
            "SELECT id, name, description, category, interests, creator, max_members,
                    is_private, group_image, created_at, last_activity
             FROM community_groups WHERE id = ?1",
            params![id.get()],
            GroupRow::read,
        )
        .optional()?
    else {
        return Ok(None);
    };
    let members = member_ids(
        connection,
        "SELECT user_id FROM group_members WHERE group_id = ?1 ORDER BY rowid",
        id,
    )?;
    let admins = member_ids(
        connection,
        "SELECT user_id FROM group_members WHERE group_id = ?1 AND is_admin = 1 ORDER BY rowid",
        id,
    )?;
    Ok(Some(Group {
        id,
        interests: decode_list("interests", row.id, &row.interests)?,
        name: row.name,
        description: row.description,
        category: row.category.parse()?,
        creator: UserId::new(row.creator),
        members,
        admins,
        max_members: row.max_members,
        is_private: row.is_private,
        group_image: row.group_image,
        created_at: from_millis(row.created_at)?,
        last_activity: from_millis(row.last_activity)?,
    }))
}

fn member_ids(connection: &Connection, sql: &str, id: GroupId) -> Result<Vec<UserId>, StoreError> {
    let mut statement = connection.prepare_cached(sql)?;
    let ids = collect_ids(statement.query_map(params![id.get()], |row| row.get(0))?)?;
    Ok(ids.into_iter().map(UserId::new).collect())
}

impl SqliteCommunityStore {
    /// Create a group with `creator` as its first member and admin.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`], [`StoreError::InvalidGroup`], or
    /// database failures.
    pub fn create_group(
        &mut self,
        creator: UserId,
        input: NewGroup,
        now: DateTime<Utc>,
    ) -> Result<Group, StoreError> {
        self.require_user(creator)?;
        let mut group = input.into_group(GroupId::new(0), creator, now)?;
        let tx = self.connection.savepoint()?;
        tx.execute(
            "INSERT INTO community_groups (name, description, category, interests, creator,
                max_members, is_private, group_image, created_at, last_activity)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                group.name,
                group.description,
                group.category.as_str(),
                encode_list(&group.interests),
                creator.get(),
                group.max_members,
                group.is_private,
                group.group_image,
                to_millis(now),
            ],
        )?;
        group.id = GroupId::new(inserted_id(&tx)?);
        tx.execute(
            "INSERT INTO group_members (group_id, user_id, is_admin) VALUES (?1, ?2, 1)",
            params![group.id.get(), creator.get()],
        )?;
        tx.commit()?;
        info!("user {creator} created group {}", group.id);
        Ok(group)
    }

    /// Load a group regardless of privacy.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn group(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        load_group(&self.connection, id)
    }

    /// Load a group as `viewer` may see it.
    ///
    /// # Errors
    /// [`StoreError::UnknownGroup`], or [`StoreError::PrivateGroup`] when the
    /// group is private and `viewer` is not a member.
    pub fn group_for_viewer(&self, id: GroupId, viewer: UserId) -> Result<Group, StoreError> {
        let group = self.group(id)?.ok_or(StoreError::UnknownGroup { id })?;
        if group.is_visible_to(viewer) {
            Ok(group)
        } else {
            Err(StoreError::PrivateGroup { id })
        }
    }

    /// List public groups, most recently active first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn public_groups(&self, filter: &GroupFilter) -> Result<Vec<Group>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM community_groups
             WHERE is_private = 0 AND (?1 IS NULL OR category = ?1)
             ORDER BY last_activity DESC, id DESC",
        )?;
        let category = filter.category.map(GroupCategory::as_str);
        let ids = collect_ids(statement.query_map(params![category], |row| row.get(0))?)?;
        let mut listed = Vec::new();
        for id in ids {
            if listed.len() == GROUP_LISTING_LIMIT {
                break;
            }
            if let Some(group) = self.group(GroupId::new(id))? {
                if filter.accepts(&group) {
                    listed.push(group);
                }
            }
        }
        Ok(listed)
    }

    /// Add `user` to a group and bump its activity time.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`], [`StoreError::UnknownGroup`],
    /// [`StoreError::Membership`], or database failures.
    pub fn join_group(
        &mut self,
        id: GroupId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Group, StoreError> {
        self.require_user(user)?;
        let tx = self.connection.savepoint()?;
        let mut group = load_group(&tx, id)?.ok_or(StoreError::UnknownGroup { id })?;
        group.join(user, now)?;
        tx.execute(
            "INSERT INTO group_members (group_id, user_id, is_admin) VALUES (?1, ?2, 0)",
            params![id.get(), user.get()],
        )?;
        tx.execute(
            "UPDATE community_groups SET last_activity = ?1 WHERE id = ?2",
            params![to_millis(now), id.get()],
        )?;
        tx.commit()?;
        info!("user {user} joined group {id}");
        Ok(group)
    }

    /// Remove `user` from a group.
    ///
    /// # Errors
    /// [`StoreError::UnknownGroup`], [`StoreError::Membership`], or database
    /// failures.
    pub fn leave_group(&mut self, id: GroupId, user: UserId) -> Result<Group, StoreError> {
        let tx = self.connection.savepoint()?;
        let mut group = load_group(&tx, id)?.ok_or(StoreError::UnknownGroup { id })?;
        group.leave(user)?;
        tx.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND user_id = ?2",
            params![id.get(), user.get()],
        )?;
        tx.commit()?;
        info!("user {user} left group {id}");
        Ok(group)
    }

    /// Groups `user` belongs to, most recently active first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn groups_of(&self, user: UserId) -> Result<Vec<Group>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT g.id FROM community_groups g
             JOIN group_members m ON m.group_id = g.id
             WHERE m.user_id = ?1
             ORDER BY g.last_activity DESC, g.id DESC",
        )?;
        let ids = collect_ids(statement.query_map(params![user.get()], |row| row.get(0))?)?;
        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(group) = self.group(GroupId::new(id))? {
                groups.push(group);
            }
        }
        Ok(groups)
    }
}
