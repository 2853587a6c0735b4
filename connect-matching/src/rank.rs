//! Ranking candidate users and groups.
//!
//! Both rankers score every candidate in input order, drop zero scores,
//! stable-sort by descending score (so ties keep their input order) and
//! truncate to the requested limit. Candidates are generic over
//! [`Borrow`] so callers can rank owned records or references without
//! cloning.

use std::borrow::Borrow;

use connect_core::{GroupProfile, Profile};
use log::debug;

use crate::overlap::{common_elements, overlap_count};
use crate::score::calculate_match_score;

/// Number of user matches returned when the caller has no preference.
pub const DEFAULT_MATCH_LIMIT: usize = 10;
/// Number of group recommendations returned when the caller has no
/// preference.
pub const DEFAULT_GROUP_LIMIT: usize = 5;

const POINTS_PER_SHARED_GROUP_INTEREST: u32 = 20;

/// A ranked candidate user.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct MatchResult<P = Profile> {
    /// The candidate as supplied.
    pub user: P,
    /// Compatibility score, 1 to 100.
    pub match_score: u8,
    /// The current user's interests the candidate shares.
    pub common_interests: Vec<String>,
    /// The current user's skills the candidate shares.
    pub common_skills: Vec<String>,
}

/// A ranked candidate group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GroupRecommendation<G = GroupProfile> {
    /// The candidate group as supplied.
    pub group: G,
    /// Twenty points per shared interest; not capped.
    pub relevance_score: u32,
    /// The user's interests the group gathers around.
    pub matched_interests: Vec<String>,
}

/// Rank `candidates` by compatibility with `current`.
///
/// Candidates scoring zero (the current user, blocked pairs and pairs with
/// nothing in common) are dropped. At most `limit` results are returned.
///
/// # Examples
/// ```
/// use connect_core::{Profile, UserId, UserType};
/// use connect_matching::{DEFAULT_MATCH_LIMIT, find_matches};
///
/// let me = Profile::new(UserId::new(1)).with_interests(["chess"]);
/// let pool = vec![
///     Profile::new(UserId::new(2)).with_user_type(UserType::Hobbyist),
///     Profile::new(UserId::new(3)).with_interests(["Chess"]),
/// ];
/// let ranked = find_matches(&me, &pool, DEFAULT_MATCH_LIMIT);
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].user.id, UserId::new(3));
/// assert_eq!(ranked[0].common_interests, vec!["chess"]);
/// ```
#[must_use]
pub fn find_matches<I, P>(current: &Profile, candidates: I, limit: usize) -> Vec<MatchResult<P>>
where
    I: IntoIterator<Item = P>,
    P: Borrow<Profile>,
{
    let mut considered = 0_usize;
    let mut ranked: Vec<MatchResult<P>> = candidates
        .into_iter()
        .filter_map(|user| {
            considered += 1;
            let candidate = user.borrow();
            let match_score = calculate_match_score(current, candidate);
            if match_score == 0 {
                return None;
            }
            let common_interests = common_elements(&current.interests, &candidate.interests);
            let common_skills = common_elements(&current.skills, &candidate.skills);
            Some(MatchResult {
                user,
                match_score,
                common_interests,
                common_skills,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    ranked.truncate(limit);
    debug!(
        "user {}: kept {} of {considered} match candidates",
        current.id,
        ranked.len()
    );
    ranked
}

/// Rank `groups` by interest overlap with `profile`.
///
/// Groups that already list `profile` as a member are skipped, as are
/// groups sharing no interest. At most `limit` results are returned.
///
/// # Examples
/// ```
/// use connect_core::{GroupId, GroupProfile, Profile, UserId};
/// use connect_matching::{DEFAULT_GROUP_LIMIT, recommend_groups};
///
/// let me = Profile::new(UserId::new(1)).with_interests(["chess", "go"]);
/// let groups = vec![
///     GroupProfile::new(GroupId::new(1)).with_interests(["Chess", "Go"]),
///     GroupProfile::new(GroupId::new(2))
///         .with_interests(["chess"])
///         .with_members([UserId::new(1)]),
/// ];
/// let ranked = recommend_groups(&me, &groups, DEFAULT_GROUP_LIMIT);
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].relevance_score, 40);
/// ```
#[must_use]
pub fn recommend_groups<I, G>(
    profile: &Profile,
    groups: I,
    limit: usize,
) -> Vec<GroupRecommendation<G>>
where
    I: IntoIterator<Item = G>,
    G: Borrow<GroupProfile>,
{
    let mut ranked: Vec<GroupRecommendation<G>> = groups
        .into_iter()
        .filter_map(|group| {
            let candidate = group.borrow();
            if candidate.has_member(profile.id) {
                return None;
            }
            let shared = overlap_count(&profile.interests, &candidate.interests);
            if shared == 0 {
                return None;
            }
            let relevance_score = u32::try_from(shared)
                .unwrap_or(u32::MAX)
                .saturating_mul(POINTS_PER_SHARED_GROUP_INTEREST);
            let matched_interests = common_elements(&profile.interests, &candidate.interests);
            Some(GroupRecommendation {
                group,
                relevance_score,
                matched_interests,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    ranked.truncate(limit);
    ranked
}
