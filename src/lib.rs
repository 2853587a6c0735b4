//! Facade crate for the InterestConnect matching engine.
//!
//! This crate re-exports the core domain types and the scoring functions, and
//! exposes the SQLite-backed community store behind a feature flag.

#![forbid(unsafe_code)]

pub use connect_core::{
    CommunitySource, Event, EventCategory, EventId, Group, GroupCategory, GroupId, GroupProfile,
    Message, MessageDraft, NewEvent, NewGroup, NewUser, PresenceEvent, PresenceRegistry, Profile,
    PublicUser, User, UserId, UserType,
};

pub use connect_matching::{
    DEFAULT_GROUP_LIMIT, DEFAULT_MATCH_LIMIT, GroupRecommendation, MAX_SCORE, MatchResult,
    RecommendError, Recommender, calculate_match_score, common_elements, find_matches,
    recommend_groups,
};

#[cfg(feature = "store-sqlite")]
pub use connect_data::{SqliteCommunityStore, StoreError};
