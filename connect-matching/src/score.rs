//! Pairwise compatibility scoring.
//!
//! A score is the capped sum of five independent terms:
//!
//! | term            | points                                   | cap |
//! |-----------------|------------------------------------------|-----|
//! | shared interests| 10 per overlapping entry                 | 40  |
//! | shared skills   | 10 per overlapping entry                 | 30  |
//! | same user type  | 15                                       | 15  |
//! | age proximity   | 10 minus the age gap, never negative     | 10  |
//! | same location   | 5 when equal ignoring case               | 5   |
//!
//! The total is clamped to [`MAX_SCORE`]. Identical identities and blocked
//! pairs short-circuit to zero before any term is computed.

use connect_core::Profile;

use crate::overlap::overlap_count;

/// Upper bound of every score.
pub const MAX_SCORE: u8 = 100;

const POINTS_PER_OVERLAP: u32 = 10;
const INTEREST_CAP: u32 = 40;
const SKILL_CAP: u32 = 30;
const SAME_TYPE_BONUS: u32 = 15;
const AGE_WINDOW: u32 = 10;
const SAME_LOCATION_BONUS: u32 = 5;

/// Score how well `candidate` suits `current`, from 0 to [`MAX_SCORE`].
///
/// The function is pure. It is symmetric whenever neither interest nor skill
/// list repeats an entry (ignoring case); repeated entries count once per
/// occurrence on the `current` side. Missing ages or locations contribute
/// nothing; an age of zero and a blank location count as missing.
///
/// # Examples
/// ```
/// use connect_core::{Profile, UserId, UserType};
/// use connect_matching::calculate_match_score;
///
/// let a = Profile::new(UserId::new(1))
///     .with_interests(["music"])
///     .with_user_type(UserType::Student)
///     .with_age(20);
/// let b = Profile::new(UserId::new(2))
///     .with_interests(["Music"])
///     .with_user_type(UserType::Student)
///     .with_age(20);
/// assert_eq!(calculate_match_score(&a, &b), 35);
/// ```
#[must_use]
pub fn calculate_match_score(current: &Profile, candidate: &Profile) -> u8 {
    if current.id == candidate.id || current.is_blocked_either_way(candidate) {
        return 0;
    }

    let total = overlap_points(&current.interests, &candidate.interests, INTEREST_CAP)
        + overlap_points(&current.skills, &candidate.skills, SKILL_CAP)
        + type_points(current, candidate)
        + age_points(current.age, candidate.age)
        + location_points(current.location.as_deref(), candidate.location.as_deref());

    u8::try_from(total.min(u32::from(MAX_SCORE))).unwrap_or(MAX_SCORE)
}

fn overlap_points(first: &[String], second: &[String], cap: u32) -> u32 {
    let shared = u32::try_from(overlap_count(first, second)).unwrap_or(u32::MAX);
    shared.saturating_mul(POINTS_PER_OVERLAP).min(cap)
}

fn type_points(current: &Profile, candidate: &Profile) -> u32 {
    if current.user_type == candidate.user_type {
        SAME_TYPE_BONUS
    } else {
        0
    }
}

fn age_points(current: Option<u8>, candidate: Option<u8>) -> u32 {
    let known = |age: Option<u8>| age.filter(|years| *years > 0);
    match (known(current), known(candidate)) {
        (Some(a), Some(b)) => AGE_WINDOW.saturating_sub(u32::from(a.abs_diff(b))),
        _ => 0,
    }
}

fn location_points(current: Option<&str>, candidate: Option<&str>) -> u32 {
    fn known(place: Option<&str>) -> Option<&str> {
        place.filter(|name| !name.trim().is_empty())
    }
    match (known(current), known(candidate)) {
        (Some(a), Some(b)) if a.to_lowercase() == b.to_lowercase() => SAME_LOCATION_BONUS,
        _ => 0,
    }
}
