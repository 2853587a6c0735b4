//! Recommendations backed by a [`CommunitySource`].

use connect_core::{CommunitySource, GroupProfile, Profile, UserId};
use log::info;

use crate::error::RecommendError;
use crate::rank::{GroupRecommendation, MatchResult, find_matches, recommend_groups};

/// Stateless service that loads candidate pools and ranks them.
///
/// # Examples
/// ```
/// use connect_core::test_support::MemoryCommunity;
/// # use connect_core::{Profile, UserId};
/// use connect_matching::{DEFAULT_MATCH_LIMIT, Recommender};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let community = MemoryCommunity::with_profiles([
///     Profile::new(UserId::new(1)).with_interests(["chess"]),
///     Profile::new(UserId::new(2)).with_interests(["chess"]),
/// ]);
/// let recommender = Recommender::new(community);
/// let matches = recommender.matches_for(UserId::new(1), DEFAULT_MATCH_LIMIT)?;
/// assert_eq!(matches[0].user.id, UserId::new(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Recommender<S> {
    source: S,
}

impl<S> Recommender<S>
where
    S: CommunitySource,
{
    /// Wrap a community source.
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Borrow the underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Rank the users `user` may connect with.
    ///
    /// # Errors
    /// [`RecommendError::UnknownUser`] when `user` does not exist, or
    /// [`RecommendError::Source`] when the source fails.
    pub fn matches_for(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<MatchResult<Profile>>, RecommendError<S::Error>> {
        let profile = self.load_profile(user)?;
        let candidates = self
            .source
            .match_candidates(&profile)
            .map_err(|source| RecommendError::Source {
                operation: "match candidates",
                source,
            })?;
        let matches = find_matches(&profile, candidates, limit);
        info!("found {} matches for user {user}", matches.len());
        Ok(matches)
    }

    /// Rank the public groups `user` could join.
    ///
    /// # Errors
    /// [`RecommendError::UnknownUser`] when `user` does not exist, or
    /// [`RecommendError::Source`] when the source fails.
    pub fn groups_for(
        &self,
        user: UserId,
        limit: usize,
    ) -> Result<Vec<GroupRecommendation<GroupProfile>>, RecommendError<S::Error>> {
        let profile = self.load_profile(user)?;
        let groups = self
            .source
            .recommendable_groups(&profile)
            .map_err(|source| RecommendError::Source {
                operation: "recommendable groups",
                source,
            })?;
        let recommendations = recommend_groups(&profile, groups, limit);
        info!(
            "found {} group recommendations for user {user}",
            recommendations.len()
        );
        Ok(recommendations)
    }

    fn load_profile(&self, user: UserId) -> Result<Profile, RecommendError<S::Error>> {
        self.source
            .profile(user)
            .map_err(|source| RecommendError::Source {
                operation: "profile",
                source,
            })?
            .ok_or(RecommendError::UnknownUser { id: user })
    }
}
