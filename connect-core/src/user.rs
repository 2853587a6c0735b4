//! User accounts, registration input and privacy-aware views.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{GroupId, Profile, UserId, UserType};

/// Youngest permitted age.
pub const MIN_AGE: u8 = 16;
/// Oldest permitted age.
pub const MAX_AGE: u8 = 100;
/// Longest permitted bio, in characters.
pub const MAX_BIO_CHARS: usize = 500;
/// Picture assigned to accounts that never uploaded one.
pub const DEFAULT_AVATAR: &str = "default-avatar.png";

/// Errors returned when validating account data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserError {
    /// The name was empty after trimming.
    #[error("name must not be empty")]
    EmptyName,
    /// The e-mail address was not plausibly an address.
    #[error("'{email}' is not a valid e-mail address")]
    InvalidEmail {
        /// Rejected input.
        email: String,
    },
    /// The age fell outside the permitted range.
    #[error("age {age} is outside 16..=100")]
    AgeOutOfRange {
        /// Rejected age.
        age: u8,
    },
    /// The bio was too long.
    #[error("bio has {length} characters; at most 500 are allowed")]
    BioTooLong {
        /// Character count of the rejected bio.
        length: usize,
    },
}

/// Which optional fields other users may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct PrivacySettings {
    /// Reveal the e-mail address.
    pub show_email: bool,
    /// Reveal the age.
    pub show_age: bool,
    /// Reveal the location.
    pub show_location: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_email: false,
            show_age: true,
            show_location: true,
        }
    }
}

/// Registration input for a new account.
///
/// # Examples
/// ```
/// use connect_core::NewUser;
///
/// # fn main() -> Result<(), connect_core::UserError> {
/// let user = NewUser::new("  Ada ", " Ada@Example.COM ")
///     .with_interests(["Chess", "  "])
///     .validated()?;
/// assert_eq!(user.name, "Ada");
/// assert_eq!(user.email, "ada@example.com");
/// assert_eq!(user.interests, vec!["Chess"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login e-mail address.
    pub email: String,
    /// Age in years.
    #[cfg_attr(feature = "serde", serde(default))]
    pub age: Option<u8>,
    /// Short self-description.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bio: Option<String>,
    /// Declared interests.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interests: Vec<String>,
    /// Declared skills.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<String>,
    /// Free-text location.
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: Option<String>,
    /// Account kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_type: UserType,
}

impl NewUser {
    /// Start registration input from the two required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
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

    /// Set the account kind.
    #[must_use]
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    /// Trim and validate every field.
    ///
    /// The e-mail address is lowercased; blank list entries and blank optional
    /// strings are dropped.
    ///
    /// # Errors
    /// Returns [`UserError`] naming the first invalid field.
    pub fn validated(self) -> Result<Self, UserError> {
        Ok(Self {
            name: normalise_name(&self.name)?,
            email: normalise_email(&self.email)?,
            age: self.age.map(check_age).transpose()?,
            bio: self.bio.map(|bio| check_bio(&bio)).transpose()?.flatten(),
            interests: normalise_list(self.interests),
            skills: normalise_list(self.skills),
            location: self.location.as_deref().and_then(non_blank),
            user_type: self.user_type,
        })
    }

    /// Build the stored record for validated input.
    #[must_use]
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            age: self.age,
            bio: self.bio,
            interests: self.interests,
            skills: self.skills,
            location: self.location,
            user_type: self.user_type,
            profile_picture: DEFAULT_AVATAR.to_owned(),
            joined_groups: Vec::new(),
            blocked_users: Vec::new(),
            is_verified: false,
            privacy: PrivacySettings::default(),
            created_at: now,
            last_active: now,
        }
    }
}

/// A partial profile edit; `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New age.
    pub age: Option<u8>,
    /// New bio.
    pub bio: Option<String>,
    /// New interests, replacing the old list.
    pub interests: Option<Vec<String>>,
    /// New skills, replacing the old list.
    pub skills: Option<Vec<String>>,
    /// New location.
    pub location: Option<String>,
    /// New account kind.
    pub user_type: Option<UserType>,
    /// New privacy settings.
    pub privacy_settings: Option<PrivacySettings>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct User {
    /// Identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Lowercased login e-mail address.
    pub email: String,
    /// Age in years.
    pub age: Option<u8>,
    /// Short self-description.
    pub bio: Option<String>,
    /// Declared interests.
    pub interests: Vec<String>,
    /// Declared skills.
    pub skills: Vec<String>,
    /// Free-text location.
    pub location: Option<String>,
    /// Account kind.
    pub user_type: UserType,
    /// Avatar file name.
    pub profile_picture: String,
    /// Groups the user belongs to.
    pub joined_groups: Vec<GroupId>,
    /// Users this account has blocked.
    pub blocked_users: Vec<UserId>,
    /// Whether the e-mail address was confirmed.
    pub is_verified: bool,
    /// Visibility of optional fields.
    pub privacy: PrivacySettings,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last authenticated activity.
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Project the attributes the matching engine reads.
    #[must_use]
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            interests: self.interests.clone(),
            skills: self.skills.clone(),
            user_type: self.user_type,
            age: self.age,
            location: self.location.clone(),
            blocked_users: self.blocked_users.clone(),
        }
    }

    /// Render the account as other users may see it.
    ///
    /// Hidden fields are omitted and the blocklist is never included.
    #[must_use]
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.privacy.show_email.then(|| self.email.clone()),
            age: self.age.filter(|_| self.privacy.show_age),
            bio: self.bio.clone(),
            interests: self.interests.clone(),
            skills: self.skills.clone(),
            location: self
                .location
                .clone()
                .filter(|_| self.privacy.show_location),
            user_type: self.user_type,
            profile_picture: self.profile_picture.clone(),
            joined_groups: self.joined_groups.clone(),
            is_verified: self.is_verified,
            last_active: self.last_active,
        }
    }

    /// Apply a partial edit, validating the supplied fields.
    ///
    /// The record is left untouched when any field is invalid.
    ///
    /// # Errors
    /// Returns [`UserError`] naming the first invalid field.
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), UserError> {
        let name = update.name.as_deref().map(normalise_name).transpose()?;
        let age = update.age.map(check_age).transpose()?;
        let bio = update.bio.as_deref().map(check_bio).transpose()?;

        if let Some(value) = name {
            self.name = value;
        }
        if let Some(value) = age {
            self.age = Some(value);
        }
        if let Some(value) = bio {
            self.bio = value;
        }
        if let Some(value) = update.interests {
            self.interests = normalise_list(value);
        }
        if let Some(value) = update.skills {
            self.skills = normalise_list(value);
        }
        if let Some(value) = update.location.as_deref().and_then(non_blank) {
            self.location = Some(value);
        }
        if let Some(value) = update.user_type {
            self.user_type = value;
        }
        if let Some(value) = update.privacy_settings {
            self.privacy = value;
        }
        Ok(())
    }
}

/// An account as rendered for other users.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PublicUser {
    /// Identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// E-mail address, when shown.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub email: Option<String>,
    /// Age, when shown.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub age: Option<u8>,
    /// Short self-description.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bio: Option<String>,
    /// Declared interests.
    pub interests: Vec<String>,
    /// Declared skills.
    pub skills: Vec<String>,
    /// Location, when shown.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub location: Option<String>,
    /// Account kind.
    pub user_type: UserType,
    /// Avatar file name.
    pub profile_picture: String,
    /// Groups the user belongs to.
    pub joined_groups: Vec<GroupId>,
    /// Whether the e-mail address was confirmed.
    pub is_verified: bool,
    /// Last authenticated activity.
    pub last_active: DateTime<Utc>,
}

fn normalise_name(name: &str) -> Result<String, UserError> {
    non_blank(name).ok_or(UserError::EmptyName)
}

fn normalise_email(email: &str) -> Result<String, UserError> {
    let trimmed = email.trim().to_lowercase();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Ok(trimmed)
    } else {
        Err(UserError::InvalidEmail {
            email: email.to_owned(),
        })
    }
}

const fn check_age(age: u8) -> Result<u8, UserError> {
    if age < MIN_AGE || age > MAX_AGE {
        Err(UserError::AgeOutOfRange { age })
    } else {
        Ok(age)
    }
}

fn check_bio(bio: &str) -> Result<Option<String>, UserError> {
    let length = bio.chars().count();
    if length > MAX_BIO_CHARS {
        return Err(UserError::BioTooLong { length });
    }
    Ok(non_blank(bio))
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Trim each entry and drop the blank ones.
pub(crate) fn normalise_list(values: Vec<String>) -> Vec<String> {
    values.iter().filter_map(|value| non_blank(value)).collect()
}

/// Normalise an e-mail address the way registration does.
///
/// # Errors
/// Returns [`UserError::InvalidEmail`] for implausible addresses.
pub fn canonical_email(email: &str) -> Result<String, UserError> {
    normalise_email(email)
}
