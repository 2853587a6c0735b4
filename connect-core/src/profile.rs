//! The matchable subsets of user and group records.
//!
//! A [`Profile`] carries exactly what the matching engine reads from a user;
//! a [`GroupProfile`] does the same for a group. Both are plain data: string
//! lists keep their insertion order because ranking output echoes it, and
//! absent optional fields simply contribute nothing to a score.

use crate::{GroupId, UserId, UserType};

/// A user's matchable attributes.
///
/// # Examples
/// ```
/// use connect_core::{Profile, UserId, UserType};
///
/// let profile = Profile::new(UserId::new(1))
///     .with_interests(["Music", "Chess"])
///     .with_user_type(UserType::Hobbyist)
///     .with_age(29);
/// assert_eq!(profile.interests, vec!["Music", "Chess"]);
/// assert_eq!(profile.age, Some(29));
/// assert!(profile.location.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Profile {
    /// Identity of the user.
    pub id: UserId,
    /// Declared interests, compared case-insensitively.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interests: Vec<String>,
    /// Declared skills, compared case-insensitively.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<String>,
    /// Account kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_type: UserType,
    /// Age in years, when shared.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub age: Option<u8>,
    /// Free-text location, when shared.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub location: Option<String>,
    /// Users this profile has blocked.
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocked_users: Vec<UserId>,
}

impl Profile {
    /// Construct an empty profile for `id`.
    #[must_use]
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            interests: Vec::new(),
            skills: Vec::new(),
            user_type: UserType::default(),
            age: None,
            location: None,
            blocked_users: Vec::new(),
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

    /// Replace the skills while returning `self` for chaining.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set the account kind.
    #[must_use]
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Set the age.
    #[must_use]
    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add `user` to the blocklist.
    #[must_use]
    pub fn with_blocked(mut self, user: UserId) -> Self {
        self.block(user);
        self
    }

    /// Add `user` to the blocklist unless already present.
    pub fn block(&mut self, user: UserId) {
        if !self.blocked_users.contains(&user) {
            self.blocked_users.push(user);
        }
    }

    /// Report whether this profile has blocked `user`.
    #[must_use]
    pub fn has_blocked(&self, user: UserId) -> bool {
        self.blocked_users.contains(&user)
    }

    /// Report whether either profile has blocked the other.
    ///
    /// # Examples
    /// ```
    /// use connect_core::{Profile, UserId};
    ///
    /// let a = Profile::new(UserId::new(1));
    /// let b = Profile::new(UserId::new(2)).with_blocked(UserId::new(1));
    /// assert!(a.is_blocked_either_way(&b));
    /// assert!(b.is_blocked_either_way(&a));
    /// ```
    #[must_use]
    pub fn is_blocked_either_way(&self, other: &Self) -> bool {
        self.has_blocked(other.id) || other.has_blocked(self.id)
    }
}

/// A group's matchable attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GroupProfile {
    /// Identity of the group.
    pub id: GroupId,
    /// Interests the group gathers around.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interests: Vec<String>,
    /// Current members.
    #[cfg_attr(feature = "serde", serde(default))]
    pub members: Vec<UserId>,
}

impl GroupProfile {
    /// Construct a group profile without interests or members.
    #[must_use]
    pub const fn new(id: GroupId) -> Self {
        Self {
            id,
            interests: Vec::new(),
            members: Vec::new(),
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

    /// Replace the members while returning `self` for chaining.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = UserId>) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    /// Report whether `user` already belongs to the group.
    #[must_use]
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn block_is_idempotent() {
        let mut profile = Profile::new(UserId::new(1));
        profile.block(UserId::new(2));
        profile.block(UserId::new(2));
        assert_eq!(profile.blocked_users, vec![UserId::new(2)]);
    }

    #[rstest]
    #[case(false, false, false)]
    #[case(true, false, true)]
    #[case(false, true, true)]
    #[case(true, true, true)]
    fn blocks_are_checked_in_both_directions(
        #[case] a_blocks_b: bool,
        #[case] b_blocks_a: bool,
        #[case] expected: bool,
    ) {
        let mut a = Profile::new(UserId::new(1));
        let mut b = Profile::new(UserId::new(2));
        if a_blocks_b {
            a.block(b.id);
        }
        if b_blocks_a {
            b.block(a.id);
        }
        assert_eq!(a.is_blocked_either_way(&b), expected);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn profile_deserialises_with_missing_optional_fields() {
        let profile: Profile = serde_json::from_str(r#"{"id":5}"#).unwrap();
        assert_eq!(profile, Profile::new(UserId::new(5)));
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn profile_uses_camel_case_fields() {
        let profile = Profile::new(UserId::new(5)).with_user_type(UserType::Hobbyist);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["userType"], "hobbyist");
        assert!(json.get("blockedUsers").is_some());
        assert!(json.get("age").is_none());
    }
}
