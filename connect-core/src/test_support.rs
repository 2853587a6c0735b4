//! Test-only, in-memory `CommunitySource` implementation used by unit and
//! behaviour tests.

use std::convert::Infallible;

use crate::{CommunitySource, GroupId, GroupProfile, Profile, UserId};

/// In-memory `CommunitySource` over plain vectors.
///
/// Lookups are linear scans and are intended only for small datasets.
/// Candidate order follows insertion order.
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
#[derive(Default, Debug, Clone)]
pub struct MemoryCommunity {
    profiles: Vec<Profile>,
    groups: Vec<GroupProfile>,
    private_groups: Vec<GroupId>,
}

impl MemoryCommunity {
    /// Create a community from a collection of profiles.
    pub fn with_profiles<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = Profile>,
    {
        Self {
            profiles: profiles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a public group.
    #[must_use]
    pub fn with_group(mut self, group: GroupProfile) -> Self {
        self.groups.push(group);
        self
    }

    /// Add a private group, which is never recommended.
    #[must_use]
    pub fn with_private_group(mut self, group: GroupProfile) -> Self {
        self.private_groups.push(group.id);
        self.groups.push(group);
        self
    }

    /// Add a profile.
    pub fn insert(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }
}

impl CommunitySource for MemoryCommunity {
    type Error = Infallible;

    fn profile(&self, id: UserId) -> Result<Option<Profile>, Self::Error> {
        Ok(self.profiles.iter().find(|p| p.id == id).cloned())
    }

    fn match_candidates(&self, current: &Profile) -> Result<Vec<Profile>, Self::Error> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.id != current.id && !current.is_blocked_either_way(p))
            .cloned()
            .collect())
    }

    fn recommendable_groups(&self, current: &Profile) -> Result<Vec<GroupProfile>, Self::Error> {
        Ok(self
            .groups
            .iter()
            .filter(|g| !self.private_groups.contains(&g.id) && !g.has_member(current.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_skip_self_and_blocks() {
        let ada = Profile::new(UserId::new(1)).with_blocked(UserId::new(3));
        let community = MemoryCommunity::with_profiles([
            ada.clone(),
            Profile::new(UserId::new(2)),
            Profile::new(UserId::new(3)),
            Profile::new(UserId::new(4)).with_blocked(UserId::new(1)),
        ]);
        let ids: Vec<_> = community
            .match_candidates(&ada)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![UserId::new(2)]);
    }

    #[test]
    fn groups_skip_private_and_joined() {
        let ada = Profile::new(UserId::new(1));
        let community = MemoryCommunity::default()
            .with_group(GroupProfile::new(GroupId::new(1)))
            .with_group(GroupProfile::new(GroupId::new(2)).with_members([ada.id]))
            .with_private_group(GroupProfile::new(GroupId::new(3)));
        let ids: Vec<_> = community
            .recommendable_groups(&ada)
            .unwrap()
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec![GroupId::new(1)]);
    }
}
