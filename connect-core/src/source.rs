//! Supplier interface for matchable records.
//!
//! The `CommunitySource` trait is how the recommendation service reads the
//! candidate pools it ranks. Persistence backends implement it; tests use
//! [`crate::test_support::MemoryCommunity`].

use crate::{GroupProfile, Profile, UserId};

/// Read access to the profiles and groups the matching engine ranks.
///
/// Implementations decide *which* records are eligible; the engine only
/// scores and orders what it is given.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use connect_core::{CommunitySource, GroupProfile, Profile, UserId};
///
/// struct Solo(Profile);
///
/// impl CommunitySource for Solo {
///     type Error = Infallible;
///
///     fn profile(&self, id: UserId) -> Result<Option<Profile>, Infallible> {
///         Ok((self.0.id == id).then(|| self.0.clone()))
///     }
///
///     fn match_candidates(&self, _current: &Profile) -> Result<Vec<Profile>, Infallible> {
///         Ok(Vec::new())
///     }
///
///     fn recommendable_groups(&self, _current: &Profile) -> Result<Vec<GroupProfile>, Infallible> {
///         Ok(Vec::new())
///     }
/// }
///
/// let source = Solo(Profile::new(UserId::new(1)));
/// assert!(source.profile(UserId::new(1)).unwrap().is_some());
/// assert!(source.profile(UserId::new(2)).unwrap().is_none());
/// ```
pub trait CommunitySource {
    /// Failure raised by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the profile of `id`, or `None` when no such user exists.
    fn profile(&self, id: UserId) -> Result<Option<Profile>, Self::Error>;

    /// Fetch every profile `current` may be matched with.
    ///
    /// The pool excludes `current` itself, users `current` blocked and users
    /// who blocked `current`.
    fn match_candidates(&self, current: &Profile) -> Result<Vec<Profile>, Self::Error>;

    /// Fetch every public group `current` could join.
    ///
    /// The pool excludes private groups and groups `current` already belongs
    /// to.
    fn recommendable_groups(&self, current: &Profile) -> Result<Vec<GroupProfile>, Self::Error>;
}
