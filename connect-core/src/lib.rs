//! Core domain types for the InterestConnect engine.
//!
//! The crate models the records the matching engine consumes (profiles and
//! group profiles), the richer account, group, event and message records they
//! are projected from, and the membership rules that guard them. Constructors
//! and mutators return `Result` to surface invalid input early; nothing here
//! performs I/O.
//!
//! Persistence lives in `connect-data`; scoring and ranking live in
//! `connect-matching`. Both meet this crate at the [`CommunitySource`] trait.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod label;

pub mod event;
pub mod group;
pub mod ids;
pub mod message;
pub mod presence;
pub mod profile;
pub mod source;
pub mod user;
pub mod user_type;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use event::{Event, EventCategory, EventError, EventStatus, NewEvent, ParticipationError};
pub use group::{Group, GroupCategory, GroupError, MembershipError, NewGroup};
pub use ids::{ConnectionId, EventId, GroupId, MessageId, UserId};
pub use label::UnknownLabel;
pub use message::{
    ConversationSummary, Message, MessageDraft, MessageError, MessageTarget, MessageType,
};
pub use presence::{PresenceEvent, PresenceRegistry, Room};
pub use profile::{GroupProfile, Profile};
pub use source::CommunitySource;
pub use user::{NewUser, PrivacySettings, ProfileUpdate, PublicUser, User, UserError};
pub use user_type::UserType;
