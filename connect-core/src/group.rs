//! Interest groups and their membership rules.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::label::labelled_enum;
use crate::user::normalise_list;
use crate::{GroupId, GroupProfile, UserId};

/// Capacity assigned when the creator does not choose one.
pub const DEFAULT_MAX_MEMBERS: u32 = 50;
/// Longest permitted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
/// Picture assigned to groups that never uploaded one.
pub const DEFAULT_GROUP_IMAGE: &str = "default-group.png";

labelled_enum! {
    /// Broad topic of a group.
    GroupCategory as "group category" {
        /// Study circles.
        Study => "study",
        /// Sports and fitness.
        Sports => "sports",
        /// Visual and performing arts.
        Arts => "arts",
        /// Technology.
        Technology => "technology",
        /// Business and careers.
        Business => "business",
        /// Language exchange.
        Languages => "languages",
        /// Music.
        Music => "music",
        /// Anything else.
        Other => "other",
    }
}

/// Errors returned when validating group input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupError {
    /// The name was empty after trimming.
    #[error("group name must not be empty")]
    EmptyName,
    /// The description was empty after trimming.
    #[error("group description must not be empty")]
    EmptyDescription,
    /// The description was too long.
    #[error("group description has {length} characters; at most 1000 are allowed")]
    DescriptionTooLong {
        /// Character count of the rejected description.
        length: usize,
    },
    /// A group must admit at least its creator.
    #[error("group capacity must be at least one member")]
    ZeroCapacity,
}

/// Errors returned by [`Group::join`] and [`Group::leave`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MembershipError {
    /// The user already belongs to the group.
    #[error("already a member of this group")]
    AlreadyMember,
    /// The group has reached its capacity.
    #[error("group is full ({capacity} members)")]
    Full {
        /// Maximum member count.
        capacity: u32,
    },
    /// The user does not belong to the group.
    #[error("not a member of this group")]
    NotMember,
    /// The creator must delete the group instead of leaving it.
    #[error("creator cannot leave the group; delete the group instead")]
    CreatorCannotLeave,
}

/// Input for creating a group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct NewGroup {
    /// Display name.
    pub name: String,
    /// What the group is about.
    pub description: String,
    /// Broad topic.
    pub category: GroupCategory,
    /// Interests the group gathers around.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interests: Vec<String>,
    /// Capacity; defaults to [`DEFAULT_MAX_MEMBERS`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_members: Option<u32>,
    /// Hide the group from listings and non-members.
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_private: bool,
}

impl NewGroup {
    /// Start group input from the required fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: GroupCategory,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            interests: Vec::new(),
            max_members: None,
            is_private: false,
        }
    }

    /// Replace the interests while returning `self` for chaining.
    #[must_use]
    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the input and build the group with `creator` as sole member
    /// and admin.
    ///
    /// # Errors
    /// Returns [`GroupError`] naming the first invalid field.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use connect_core::{GroupCategory, GroupId, NewGroup, UserId};
    ///
    /// # fn main() -> Result<(), connect_core::GroupError> {
    /// let creator = UserId::new(1);
    /// let group = NewGroup::new("Chess club", "Weekly games", GroupCategory::Other)
    ///     .into_group(GroupId::new(10), creator, Utc::now())?;
    /// assert_eq!(group.members, vec![creator]);
    /// assert_eq!(group.admins, vec![creator]);
    /// assert_eq!(group.max_members, 50);
    /// # Ok(())
    /// # }
    /// ```
    pub fn into_group(
        self,
        id: GroupId,
        creator: UserId,
        now: DateTime<Utc>,
    ) -> Result<Group, GroupError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(GroupError::EmptyName);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(GroupError::EmptyDescription);
        }
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(GroupError::DescriptionTooLong { length });
        }
        let max_members = self.max_members.unwrap_or(DEFAULT_MAX_MEMBERS);
        if max_members == 0 {
            return Err(GroupError::ZeroCapacity);
        }
        Ok(Group {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            category: self.category,
            interests: normalise_list(self.interests),
            creator,
            members: vec![creator],
            admins: vec![creator],
            max_members,
            is_private: self.is_private,
            group_image: DEFAULT_GROUP_IMAGE.to_owned(),
            created_at: now,
            last_activity: now,
        })
    }
}

/// A persisted interest group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Group {
    /// Identity.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// What the group is about.
    pub description: String,
    /// Broad topic.
    pub category: GroupCategory,
    /// Interests the group gathers around.
    pub interests: Vec<String>,
    /// User who created the group.
    pub creator: UserId,
    /// Current members, in join order.
    pub members: Vec<UserId>,
    /// Members with administrative rights.
    pub admins: Vec<UserId>,
    /// Capacity.
    pub max_members: u32,
    /// Hidden from listings and non-members.
    pub is_private: bool,
    /// Image file name.
    pub group_image: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last membership change.
    pub last_activity: DateTime<Utc>,
}

impl Group {
    /// Report whether `user` belongs to the group.
    #[must_use]
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Report whether the group has reached capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        u32::try_from(self.members.len()).map_or(true, |count| count >= self.max_members)
    }

    /// Report whether `viewer` may see the group.
    #[must_use]
    pub fn is_visible_to(&self, viewer: UserId) -> bool {
        !self.is_private || self.has_member(viewer)
    }

    /// Add `user` to the members.
    ///
    /// # Errors
    /// [`MembershipError::AlreadyMember`] or [`MembershipError::Full`].
    pub fn join(&mut self, user: UserId, now: DateTime<Utc>) -> Result<(), MembershipError> {
        if self.has_member(user) {
            return Err(MembershipError::AlreadyMember);
        }
        if self.is_full() {
            return Err(MembershipError::Full {
                capacity: self.max_members,
            });
        }
        self.members.push(user);
        self.last_activity = now;
        Ok(())
    }

    /// Remove `user` from the members and admins.
    ///
    /// # Errors
    /// [`MembershipError::NotMember`] or [`MembershipError::CreatorCannotLeave`].
    pub fn leave(&mut self, user: UserId) -> Result<(), MembershipError> {
        if !self.has_member(user) {
            return Err(MembershipError::NotMember);
        }
        if self.creator == user {
            return Err(MembershipError::CreatorCannotLeave);
        }
        self.members.retain(|member| *member != user);
        self.admins.retain(|admin| *admin != user);
        Ok(())
    }

    /// Project the attributes the matching engine reads.
    #[must_use]
    pub fn profile(&self) -> GroupProfile {
        GroupProfile {
            id: self.id,
            interests: self.interests.clone(),
            members: self.members.clone(),
        }
    }
}
