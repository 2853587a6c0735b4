//! Scheduled meet-ups and their participation rules.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::group::MAX_DESCRIPTION_CHARS;
use crate::label::labelled_enum;
use crate::user::non_blank;
use crate::{EventId, GroupId, UserId};

/// Duration assigned when the organizer does not choose one.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
/// Capacity assigned when the organizer does not choose one.
pub const DEFAULT_MAX_PARTICIPANTS: u32 = 20;

labelled_enum! {
    /// Broad topic of an event.
    EventCategory as "event category" {
        /// Study sessions.
        Study => "study",
        /// Sports and fitness.
        Sports => "sports",
        /// Visual and performing arts.
        Arts => "arts",
        /// Technology.
        Technology => "technology",
        /// Business and careers.
        Business => "business",
        /// Social gatherings.
        Social => "social",
        /// Anything else.
        Other => "other",
    }
}

labelled_enum! {
    /// Lifecycle stage of an event.
    #[derive(Default)]
    EventStatus as "event status" {
        /// Scheduled and open for sign-up.
        #[default]
        Upcoming => "upcoming",
        /// Taking place now.
        Ongoing => "ongoing",
        /// Finished.
        Completed => "completed",
        /// Called off.
        Cancelled => "cancelled",
    }
}

/// Errors returned when validating event input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// The title was empty after trimming.
    #[error("event title must not be empty")]
    EmptyTitle,
    /// The description was empty after trimming.
    #[error("event description must not be empty")]
    EmptyDescription,
    /// The description was too long.
    #[error("event description has {length} characters; at most 1000 are allowed")]
    DescriptionTooLong {
        /// Character count of the rejected description.
        length: usize,
    },
    /// The location was empty after trimming.
    #[error("event location must not be empty")]
    EmptyLocation,
    /// An event must admit at least its organizer.
    #[error("event capacity must be at least one participant")]
    ZeroCapacity,
}

/// Errors returned by [`Event::join`] and [`Event::leave`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ParticipationError {
    /// The user already takes part.
    #[error("already joined this event")]
    AlreadyJoined,
    /// The event has reached its capacity.
    #[error("event is full ({capacity} participants)")]
    Full {
        /// Maximum participant count.
        capacity: u32,
    },
    /// The user does not take part.
    #[error("not a participant of this event")]
    NotParticipant,
    /// The organizer must cancel the event instead of leaving it.
    #[error("organizer cannot leave; cancel the event instead")]
    OrganizerCannotLeave,
}

/// Input for scheduling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct NewEvent {
    /// Headline.
    pub title: String,
    /// What will happen.
    pub description: String,
    /// Where it happens; an address or a venue name.
    pub location: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Length in minutes; defaults to [`DEFAULT_DURATION_MINUTES`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_minutes: Option<u32>,
    /// Capacity; defaults to [`DEFAULT_MAX_PARTICIPANTS`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_participants: Option<u32>,
    /// Broad topic.
    pub category: EventCategory,
    /// Held online.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_online: bool,
    /// Video-call link for online events.
    #[cfg_attr(feature = "serde", serde(default))]
    pub meeting_link: Option<String>,
    /// Hosting group, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub group: Option<GroupId>,
}

impl NewEvent {
    /// Start event input from the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        starts_at: DateTime<Utc>,
        category: EventCategory,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            location: location.into(),
            starts_at,
            duration_minutes: None,
            max_participants: None,
            category,
            is_online: false,
            meeting_link: None,
            group: None,
        }
    }

    /// Host the event inside `group`.
    #[must_use]
    pub fn in_group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    /// Validate the input and build the event with `organizer` as first
    /// participant.
    ///
    /// Group membership is checked by the caller, which owns the group record.
    ///
    /// # Errors
    /// Returns [`EventError`] naming the first invalid field.
    pub fn into_event(
        self,
        id: EventId,
        organizer: UserId,
        now: DateTime<Utc>,
    ) -> Result<Event, EventError> {
        let title = non_blank(&self.title).ok_or(EventError::EmptyTitle)?;
        let description = non_blank(&self.description).ok_or(EventError::EmptyDescription)?;
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(EventError::DescriptionTooLong { length });
        }
        let location = non_blank(&self.location).ok_or(EventError::EmptyLocation)?;
        let max_participants = self.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS);
        if max_participants == 0 {
            return Err(EventError::ZeroCapacity);
        }
        Ok(Event {
            id,
            title,
            description,
            organizer,
            group: self.group,
            location,
            starts_at: self.starts_at,
            duration_minutes: self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            max_participants,
            participants: vec![organizer],
            category: self.category,
            is_online: self.is_online,
            meeting_link: self.meeting_link.as_deref().and_then(non_blank),
            status: EventStatus::Upcoming,
            created_at: now,
        })
    }
}

/// A persisted event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Event {
    /// Identity.
    pub id: EventId,
    /// Headline.
    pub title: String,
    /// What will happen.
    pub description: String,
    /// User who scheduled the event.
    pub organizer: UserId,
    /// Hosting group, if any.
    pub group: Option<GroupId>,
    /// Where it happens.
    pub location: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Length in minutes.
    pub duration_minutes: u32,
    /// Capacity.
    pub max_participants: u32,
    /// Participants in sign-up order; the organizer comes first.
    pub participants: Vec<UserId>,
    /// Broad topic.
    pub category: EventCategory,
    /// Held online.
    pub is_online: bool,
    /// Video-call link.
    pub meeting_link: Option<String>,
    /// Lifecycle stage.
    pub status: EventStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Report whether `user` takes part.
    #[must_use]
    pub fn has_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    /// Report whether the event is still ahead of `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Upcoming && self.starts_at >= now
    }

    /// Sign `user` up.
    ///
    /// # Errors
    /// [`ParticipationError::AlreadyJoined`] or [`ParticipationError::Full`].
    pub fn join(&mut self, user: UserId) -> Result<(), ParticipationError> {
        if self.has_participant(user) {
            return Err(ParticipationError::AlreadyJoined);
        }
        let full = u32::try_from(self.participants.len())
            .map_or(true, |count| count >= self.max_participants);
        if full {
            return Err(ParticipationError::Full {
                capacity: self.max_participants,
            });
        }
        self.participants.push(user);
        Ok(())
    }

    /// Withdraw `user`.
    ///
    /// # Errors
    /// [`ParticipationError::NotParticipant`] or
    /// [`ParticipationError::OrganizerCannotLeave`].
    pub fn leave(&mut self, user: UserId) -> Result<(), ParticipationError> {
        if !self.has_participant(user) {
            return Err(ParticipationError::NotParticipant);
        }
        if self.organizer == user {
            return Err(ParticipationError::OrganizerCannotLeave);
        }
        self.participants.retain(|participant| *participant != user);
        Ok(())
    }
}
