//! Error types raised by the SQLite community store.

use camino::Utf8PathBuf;
use connect_core::{
    EventError, EventId, GroupError, GroupId, MembershipError, ParticipationError, UnknownLabel,
    UserError, UserId,
};
use thiserror::Error;

/// Errors raised while reading or writing community records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Creating the directory that holds the database failed.
    #[error("failed to create parent directory for {path}")]
    CreateParent {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    OpenDatabase {
        /// Requested database path.
        path: Utf8PathBuf,
        /// Source error from `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Generic SQLite error while reading or writing rows.
    #[error("database error: {source}")]
    Database {
        /// Source error raised by the SQLite driver.
        #[from]
        source: rusqlite::Error,
    },
    /// Hashing or verifying a password failed.
    #[error("password hashing failed")]
    Hash {
        /// Source error from `bcrypt`.
        #[from]
        source: bcrypt::BcryptError,
    },
    /// Account input was invalid.
    #[error(transparent)]
    InvalidUser(#[from] UserError),
    /// Group input was invalid.
    #[error(transparent)]
    InvalidGroup(#[from] GroupError),
    /// Event input was invalid.
    #[error(transparent)]
    InvalidEvent(#[from] EventError),
    /// A group membership change broke a rule.
    #[error(transparent)]
    Membership(#[from] MembershipError),
    /// An event participation change broke a rule.
    #[error(transparent)]
    Participation(#[from] ParticipationError),
    /// Another account already uses the e-mail address.
    #[error("an account for {email} already exists")]
    EmailTaken {
        /// Normalised e-mail address.
        email: String,
    },
    /// The password is shorter than the permitted minimum.
    #[error("password must be at least {minimum} characters")]
    PasswordTooShort {
        /// Minimum number of characters.
        minimum: usize,
    },
    /// The e-mail and password did not match an account.
    #[error("invalid e-mail or password")]
    InvalidCredentials,
    /// The reset token is unknown or has expired.
    #[error("invalid or expired reset token")]
    InvalidResetToken,
    /// No user has the identifier.
    #[error("user {id} not found")]
    UnknownUser {
        /// Identifier that was looked up.
        id: UserId,
    },
    /// No group has the identifier.
    #[error("group {id} not found")]
    UnknownGroup {
        /// Identifier that was looked up.
        id: GroupId,
    },
    /// No event has the identifier.
    #[error("event {id} not found")]
    UnknownEvent {
        /// Identifier that was looked up.
        id: EventId,
    },
    /// The group is private and the viewer is not a member.
    #[error("group {id} is private")]
    PrivateGroup {
        /// Identifier of the hidden group.
        id: GroupId,
    },
    /// Only group members may schedule events for the group.
    #[error("user {user} must be a member of group {group} to create events for it")]
    NotGroupMember {
        /// Group the event was meant for.
        group: GroupId,
        /// User who attempted to create the event.
        user: UserId,
    },
    /// A stored list column did not hold a JSON array of strings.
    #[error("failed to parse {column} for row {id}")]
    InvalidList {
        /// Column holding the payload.
        column: &'static str,
        /// Row identifier.
        id: u64,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored enumeration label was not recognised.
    #[error(transparent)]
    InvalidLabel(#[from] UnknownLabel),
    /// A stored message names neither or both of a receiver and a group.
    #[error("message {id} has no single recipient")]
    MessageTarget {
        /// Row identifier.
        id: u64,
    },
    /// A stored timestamp could not be represented.
    #[error("timestamp {millis} ms is out of range")]
    InvalidTimestamp {
        /// Raw milliseconds since the Unix epoch.
        millis: i64,
    },
    /// SQLite produced a row identifier that cannot be negative.
    #[error("row id {raw} is outside the supported range")]
    IdOutOfRange {
        /// Identifier returned by SQLite.
        raw: i64,
    },
}
