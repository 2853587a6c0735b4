#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for match and group ranking.

use std::cell::RefCell;

use connect_core::{GroupId, GroupProfile, Profile, UserId, UserType};
use connect_matching::{
    DEFAULT_GROUP_LIMIT, DEFAULT_MATCH_LIMIT, GroupRecommendation, MatchResult, find_matches,
    recommend_groups,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const STUDENT: UserId = UserId::new(100);
const INTERESTS: [&str; 4] = ["a", "b", "c", "d"];

/// Inputs and outputs shared by the ranking scenarios.
pub struct TestContext {
    student: RefCell<Option<Profile>>,
    candidates: RefCell<Vec<Profile>>,
    groups: RefCell<Vec<GroupProfile>>,
    matches: RefCell<Vec<MatchResult>>,
    recommendations: RefCell<Vec<GroupRecommendation>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        student: RefCell::new(None),
        candidates: RefCell::new(Vec::new()),
        groups: RefCell::new(Vec::new()),
        matches: RefCell::new(Vec::new()),
        recommendations: RefCell::new(Vec::new()),
    }
}

fn student(context: &TestContext) -> Profile {
    context
        .student
        .borrow()
        .clone()
        .expect("student must be defined first")
}

fn rank(context: &TestContext, limit: usize) {
    let me = student(context);
    let ranked = find_matches(&me, context.candidates.borrow().clone(), limit);
    *context.matches.borrow_mut() = ranked;
}

fn matched_ids(context: &TestContext) -> Vec<u64> {
    context
        .matches
        .borrow()
        .iter()
        .map(|result| result.user.id.get())
        .collect()
}

#[given("a student interested in a, b, c and d")]
fn a_student(context: &TestContext) {
    let profile = Profile::new(STUDENT)
        .with_interests(INTERESTS)
        .with_user_type(UserType::Student);
    *context.student.borrow_mut() = Some(profile);
}

#[given("five candidates sharing 1, 4, 0, 2 and 4 of those interests")]
fn five_candidates(context: &TestContext) {
    let candidates = [1_usize, 4, 0, 2, 4]
        .into_iter()
        .zip(1_u64..)
        .map(|(shared, id)| {
            Profile::new(UserId::new(id))
                .with_interests(INTERESTS.into_iter().take(shared))
                .with_user_type(UserType::Professional)
        })
        .collect();
    *context.candidates.borrow_mut() = candidates;
}

#[given("the student has blocked the second candidate")]
fn block_second(context: &TestContext) {
    let mut slot = context.student.borrow_mut();
    let profile = slot.as_mut().expect("student must be defined first");
    profile.block(UserId::new(2));
}

#[given("a joined group about a and b and an open group about c")]
fn two_groups(context: &TestContext) {
    let joined = GroupProfile::new(GroupId::new(1))
        .with_interests(["A", "B"])
        .with_members([STUDENT]);
    let open = GroupProfile::new(GroupId::new(2)).with_interests(["C"]);
    *context.groups.borrow_mut() = vec![joined, open];
}

#[when("I rank the candidates with a limit of 2")]
fn rank_two(context: &TestContext) {
    rank(context, 2);
}

#[when("I rank the candidates with the default limit")]
fn rank_default(context: &TestContext) {
    rank(context, DEFAULT_MATCH_LIMIT);
}

#[when("I ask for group recommendations")]
fn recommend(context: &TestContext) {
    let me = student(context);
    let ranked = recommend_groups(&me, context.groups.borrow().clone(), DEFAULT_GROUP_LIMIT);
    *context.recommendations.borrow_mut() = ranked;
}

#[then("the second and fifth candidates are returned in that order")]
fn second_and_fifth(context: &TestContext) {
    assert_eq!(matched_ids(context), vec![2, 5]);
}

#[then("the fifth, fourth and first candidates are returned in that order")]
fn fifth_fourth_first(context: &TestContext) {
    assert_eq!(matched_ids(context), vec![5, 4, 1]);
}

#[then("only the open group is recommended with a relevance of 20")]
fn only_open_group(context: &TestContext) {
    let recommendations = context.recommendations.borrow();
    let ids: Vec<_> = recommendations.iter().map(|r| r.group.id).collect();
    assert_eq!(ids, vec![GroupId::new(2)]);
    let first = recommendations.first().expect("one recommendation");
    assert_eq!(first.relevance_score, 20);
    assert_eq!(first.matched_interests, vec!["c"]);
}

#[scenario(path = "tests/features/ranking.feature", index = 0)]
fn limit_keeps_best(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/ranking.feature", index = 1)]
fn blocked_candidates_hidden(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/ranking.feature", index = 2)]
fn joined_groups_skipped(context: TestContext) {
    let _ = context;
}
