//! Compatibility scoring and ranking for InterestConnect.
//!
//! The crate has two layers:
//! - **Pure functions** score a pair of [`Profile`](connect_core::Profile)s
//!   ([`calculate_match_score`]), intersect string lists case-insensitively
//!   ([`common_elements`]), and rank candidate users ([`find_matches`]) or
//!   groups ([`recommend_groups`]). They hold no state, never mutate their
//!   inputs and are safe to call from any thread.
//! - **[`Recommender`]** pulls candidate pools from a
//!   [`CommunitySource`](connect_core::CommunitySource) and feeds them to the
//!   rankers, turning missing users and source failures into
//!   [`RecommendError`].
//!
//! # Examples
//!
//! ```
//! use connect_core::{Profile, UserId, UserType};
//! use connect_matching::{DEFAULT_MATCH_LIMIT, calculate_match_score, find_matches};
//!
//! let me = Profile::new(UserId::new(1))
//!     .with_interests(["Music", "Art", "Chess"])
//!     .with_user_type(UserType::Student);
//! let other = Profile::new(UserId::new(2))
//!     .with_interests(["music", "Hiking"])
//!     .with_user_type(UserType::Student);
//!
//! assert_eq!(calculate_match_score(&me, &other), 25);
//! let ranked = find_matches(&me, [other], DEFAULT_MATCH_LIMIT);
//! assert_eq!(ranked[0].common_interests, vec!["Music"]);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod overlap;
mod rank;
mod score;
mod service;

pub use error::RecommendError;
pub use overlap::common_elements;
pub use rank::{
    DEFAULT_GROUP_LIMIT, DEFAULT_MATCH_LIMIT, GroupRecommendation, MatchResult, find_matches,
    recommend_groups,
};
pub use score::{MAX_SCORE, calculate_match_score};
pub use service::Recommender;
