//! SQLite persistence for the InterestConnect engine.
//!
//! Responsibilities:
//! - Store accounts, groups, events and messages in one SQLite database.
//! - Hash passwords with bcrypt and manage password reset tokens.
//! - Feed the matching engine through [`CommunitySource`](connect_core::CommunitySource).
//!
//! Boundaries:
//! - Do not encode domain rules; membership, capacity and validation live in
//!   `connect-core` and are applied to loaded records before writing.
//! - Callers own the clock: every time-dependent operation takes `now`.
//!
//! Invariants:
//! - Multi-row changes run inside a single savepoint; callers group several
//!   operations into one all-or-nothing batch with
//!   [`SqliteCommunityStore::atomically`].
//! - Relation order (members, participants, blocks) is insertion order.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod accounts;
mod error;
mod events;
mod groups;
mod messages;
mod reset;
mod schema;
mod store;

pub use accounts::{MIN_PASSWORD_CHARS, SEARCH_LIMIT, UserSearch};
pub use error::StoreError;
pub use events::{EVENT_LISTING_LIMIT, EventFilter};
pub use groups::{GROUP_LISTING_LIMIT, GroupFilter};
pub use messages::GROUP_HISTORY_LIMIT;
pub use reset::{RESET_TOKEN_TTL, ResetToken};
pub use store::{DEFAULT_PASSWORD_COST, SqliteCommunityStore};
