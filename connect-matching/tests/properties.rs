//! Property-based coverage for the match scorer and rankers.

use connect_core::{Profile, UserId, UserType};
use connect_matching::{MAX_SCORE, calculate_match_score, find_matches};
use proptest::prelude::*;

/// Case-insensitively distinct words in random case.
fn words() -> impl Strategy<Value = Vec<String>> {
    (
        prop::sample::subsequence(vec!["music", "chess", "go", "art", "hiking"], 0..=5),
        prop::collection::vec(any::<bool>(), 5),
    )
        .prop_map(|(picked, upper)| {
            picked
                .into_iter()
                .zip(upper)
                .map(|(word, up)| if up { word.to_uppercase() } else { word.to_owned() })
                .collect()
        })
}

fn user_type() -> impl Strategy<Value = UserType> {
    prop::sample::select(UserType::ALL.to_vec())
}

fn location() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["Paris", "paris", "Oslo"]).prop_map(str::to_owned))
}

prop_compose! {
    fn profile(id: u64)(
        interests in words(),
        skills in words(),
        kind in user_type(),
        age in prop::option::of(16_u8..=100),
        location in location(),
    ) -> Profile {
        Profile {
            id: UserId::new(id),
            interests,
            skills,
            user_type: kind,
            age,
            location,
            blocked_users: Vec::new(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn score_is_symmetric(a in profile(1), b in profile(2)) {
        prop_assert_eq!(calculate_match_score(&a, &b), calculate_match_score(&b, &a));
    }

    #[test]
    fn score_is_bounded(a in profile(1), b in profile(2)) {
        prop_assert!(calculate_match_score(&a, &b) <= MAX_SCORE);
    }

    #[test]
    fn self_score_is_zero(a in profile(1)) {
        prop_assert_eq!(calculate_match_score(&a, &a), 0);
    }

    #[test]
    fn blocking_either_way_scores_zero(a in profile(1), b in profile(2), outgoing in any::<bool>()) {
        let (mut a, mut b) = (a, b);
        if outgoing {
            a.block(b.id);
        } else {
            b.block(a.id);
        }
        prop_assert_eq!(calculate_match_score(&a, &b), 0);
        prop_assert_eq!(calculate_match_score(&b, &a), 0);
    }

    #[test]
    fn ranking_is_sorted_bounded_and_repeatable(
        me in profile(0),
        pool in prop::collection::vec(profile(1), 0..12),
        limit in 0_usize..8,
    ) {
        let pool: Vec<Profile> = pool
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| Profile {
                id: UserId::new(index as u64 + 1),
                ..candidate
            })
            .collect();
        let first = find_matches(&me, &pool, limit);
        prop_assert!(first.len() <= limit);
        prop_assert!(first.iter().all(|m| m.match_score > 0));
        prop_assert!(first.windows(2).all(|pair| pair[0].match_score >= pair[1].match_score));
        prop_assert_eq!(first, find_matches(&me, &pool, limit));
    }
}
