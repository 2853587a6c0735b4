//! Event scheduling and participation.

use chrono::{DateTime, Utc};
use connect_core::{Event, EventCategory, EventId, EventStatus, GroupId, NewEvent, UserId};
use log::info;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::store::{collect_ids, from_millis, inserted_id, to_millis};
use crate::{SqliteCommunityStore, StoreError};

/// Most events a listing returns.
pub const EVENT_LISTING_LIMIT: u32 = 20;

/// Filters for [`SqliteCommunityStore::upcoming_events`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only events in this category.
    pub category: Option<EventCategory>,
    /// Only online (`true`) or in-person (`false`) events.
    pub is_online: Option<bool>,
}

struct EventRow {
    title: String,
    description: String,
    organizer: u64,
    group: Option<u64>,
    location: String,
    starts_at: i64,
    duration_minutes: u32,
    max_participants: u32,
    category: String,
    is_online: bool,
    meeting_link: Option<String>,
    status: String,
    created_at: i64,
}

impl EventRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            title: row.get(0)?,
            description: row.get(1)?,
            organizer: row.get(2)?,
            group: row.get(3)?,
            location: row.get(4)?,
            starts_at: row.get(5)?,
            duration_minutes: row.get(6)?,
            max_participants: row.get(7)?,
            category: row.get(8)?,
            is_online: row.get(9)?,
            meeting_link: row.get(10)?,
            status: row.get(11)?,
            created_at: row.get(12)?,
        })
    }
}

fn load_event(connection: &Connection, id: EventId) -> Result<Option<Event>, StoreError> {
    let Some(row) = connection
        .query_row(
            "SELECT title, description, organizer, group_id, location, starts_at,
                    duration_minutes, max_participants, category, is_online, meeting_link,
                    status, created_at
             FROM events WHERE id = ?1",
            params![id.get()],
            EventRow::read,
        )
        .optional()?
    else {
        return Ok(None);
    };
    let mut statement = connection.prepare_cached(
        "SELECT user_id FROM event_participants WHERE event_id = ?1 ORDER BY rowid",
    )?;
    let participants = collect_ids(statement.query_map(params![id.get()], |row| row.get(0))?)?;
    Ok(Some(Event {
        id,
        title: row.title,
        description: row.description,
        organizer: UserId::new(row.organizer),
        group: row.group.map(GroupId::new),
        location: row.location,
        starts_at: from_millis(row.starts_at)?,
        duration_minutes: row.duration_minutes,
        max_participants: row.max_participants,
        participants: participants.into_iter().map(UserId::new).collect(),
        category: row.category.parse()?,
        is_online: row.is_online,
        meeting_link: row.meeting_link,
        status: row.status.parse()?,
        created_at: from_millis(row.created_at)?,
    }))
}

impl SqliteCommunityStore {
    /// Schedule an event with `organizer` as its first participant.
    ///
    /// Events hosted by a group may only be created by its members.
    ///
    /// # Errors
    /// [`StoreError::InvalidEvent`], [`StoreError::UnknownUser`],
    /// [`StoreError::UnknownGroup`], [`StoreError::NotGroupMember`], or
    /// database failures.
    pub fn create_event(
        &mut self,
        organizer: UserId,
        input: NewEvent,
        now: DateTime<Utc>,
    ) -> Result<Event, StoreError> {
        let mut event = input.into_event(EventId::new(0), organizer, now)?;
        self.require_user(organizer)?;
        if let Some(group) = event.group {
            let host = self
                .group(group)?
                .ok_or(StoreError::UnknownGroup { id: group })?;
            if !host.has_member(organizer) {
                return Err(StoreError::NotGroupMember {
                    group,
                    user: organizer,
                });
            }
        }
        let tx = self.connection.savepoint()?;
        tx.execute(
            "INSERT INTO events (title, description, organizer, group_id, location, starts_at,
                duration_minutes, max_participants, category, is_online, meeting_link, status,
                created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                event.title,
                event.description,
                organizer.get(),
                event.group.map(GroupId::get),
                event.location,
                to_millis(event.starts_at),
                event.duration_minutes,
                event.max_participants,
                event.category.as_str(),
                event.is_online,
                event.meeting_link,
                event.status.as_str(),
                to_millis(now),
            ],
        )?;
        event.id = EventId::new(inserted_id(&tx)?);
        tx.execute(
            "INSERT INTO event_participants (event_id, user_id) VALUES (?1, ?2)",
            params![event.id.get(), organizer.get()],
        )?;
        tx.commit()?;
        info!("user {organizer} scheduled event {}", event.id);
        Ok(event)
    }

    /// Load an event.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        load_event(&self.connection, id)
    }

    /// Events still ahead of `now`, soonest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn upcoming_events(
        &self,
        filter: EventFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT id FROM events
             WHERE status = ?1 AND starts_at >= ?2
               AND (?3 IS NULL OR category = ?3)
               AND (?4 IS NULL OR is_online = ?4)
             ORDER BY starts_at, id
             LIMIT ?5",
        )?;
        let ids = collect_ids(statement.query_map(
            params![
                EventStatus::Upcoming.as_str(),
                to_millis(now),
                filter.category.map(EventCategory::as_str),
                filter.is_online,
                EVENT_LISTING_LIMIT,
            ],
            |row| row.get(0),
        )?)?;
        self.events_by_id(ids)
    }

    /// Sign `user` up for an event.
    ///
    /// # Errors
    /// [`StoreError::UnknownUser`], [`StoreError::UnknownEvent`],
    /// [`StoreError::Participation`], or database failures.
    pub fn join_event(&mut self, id: EventId, user: UserId) -> Result<Event, StoreError> {
        self.require_user(user)?;
        let tx = self.connection.savepoint()?;
        let mut event = load_event(&tx, id)?.ok_or(StoreError::UnknownEvent { id })?;
        event.join(user)?;
        tx.execute(
            "INSERT INTO event_participants (event_id, user_id) VALUES (?1, ?2)",
            params![id.get(), user.get()],
        )?;
        tx.commit()?;
        info!("user {user} joined event {id}");
        Ok(event)
    }

    /// Withdraw `user` from an event.
    ///
    /// # Errors
    /// [`StoreError::UnknownEvent`], [`StoreError::Participation`], or
    /// database failures.
    pub fn leave_event(&mut self, id: EventId, user: UserId) -> Result<Event, StoreError> {
        let tx = self.connection.savepoint()?;
        let mut event = load_event(&tx, id)?.ok_or(StoreError::UnknownEvent { id })?;
        event.leave(user)?;
        tx.execute(
            "DELETE FROM event_participants WHERE event_id = ?1 AND user_id = ?2",
            params![id.get(), user.get()],
        )?;
        tx.commit()?;
        info!("user {user} left event {id}");
        Ok(event)
    }

    /// Future events `user` takes part in, soonest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures or corrupt rows.
    pub fn events_of(&self, user: UserId, now: DateTime<Utc>) -> Result<Vec<Event>, StoreError> {
        let mut statement = self.connection.prepare(
            "SELECT e.id FROM events e
             JOIN event_participants p ON p.event_id = e.id
             WHERE p.user_id = ?1 AND e.starts_at >= ?2
             ORDER BY e.starts_at, e.id",
        )?;
        let ids = collect_ids(
            statement.query_map(params![user.get(), to_millis(now)], |row| row.get(0))?,
        )?;
        self.events_by_id(ids)
    }

    fn events_by_id(&self, ids: Vec<u64>) -> Result<Vec<Event>, StoreError> {
        let mut events = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(event) = self.event(EventId::new(id))? {
                events.push(event);
            }
        }
        Ok(events)
    }
}
