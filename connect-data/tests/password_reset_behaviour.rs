#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for the password reset flow.

use std::cell::RefCell;

use chrono::{DateTime, Duration, TimeZone, Utc};
use connect_core::NewUser;
use connect_data::{ResetToken, SqliteCommunityStore, StoreError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const EMAIL: &str = "ada@example.com";
const ORIGINAL: &str = "secret1";
const REPLACEMENT: &str = "changed1";

/// Store under test plus the token and outcome of the last step.
pub struct TestContext {
    store: RefCell<SqliteCommunityStore>,
    token: RefCell<Option<ResetToken>>,
    outcome: RefCell<Option<Result<(), StoreError>>>,
}

#[fixture]
/// Build a fresh `TestContext` backed by an in-memory database.
pub fn context() -> TestContext {
    let store = SqliteCommunityStore::open_in_memory()
        .expect("open store")
        .with_password_cost(4);
    TestContext {
        store: RefCell::new(store),
        token: RefCell::new(None),
        outcome: RefCell::new(None),
    }
}

fn requested_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn redeem(context: &TestContext, elapsed: Duration) {
    let token = context
        .token
        .borrow()
        .clone()
        .expect("a token should have been issued");
    let outcome =
        context
            .store
            .borrow_mut()
            .reset_password(&token.token, REPLACEMENT, requested_at() + elapsed);
    *context.outcome.borrow_mut() = Some(outcome);
}

fn can_log_in(context: &TestContext, password: &str) {
    context
        .store
        .borrow_mut()
        .authenticate(EMAIL, password, requested_at())
        .expect("login should succeed");
}

#[given("Ada has an account with the original password")]
fn account(context: &TestContext) {
    context
        .store
        .borrow_mut()
        .register(NewUser::new("Ada", EMAIL), ORIGINAL, requested_at())
        .expect("register");
}

#[given("Ada requested a password reset")]
fn requested(context: &TestContext) {
    let token = context
        .store
        .borrow_mut()
        .request_password_reset(EMAIL, requested_at())
        .expect("request");
    *context.token.borrow_mut() = token;
}

#[when("Ada redeems the token 30 minutes later with a new password")]
fn redeem_fresh(context: &TestContext) {
    redeem(context, Duration::minutes(30));
}

#[when("Ada redeems the token 2 hours later with a new password")]
fn redeem_stale(context: &TestContext) {
    redeem(context, Duration::hours(2));
}

#[when("a reset is requested for an unknown address")]
fn request_unknown(context: &TestContext) {
    let token = context
        .store
        .borrow_mut()
        .request_password_reset("nobody@example.com", requested_at())
        .expect("request");
    *context.token.borrow_mut() = token;
}

#[then("the reset succeeds")]
fn reset_succeeds(context: &TestContext) {
    let outcome = context.outcome.borrow_mut().take().expect("outcome recorded");
    outcome.expect("reset should succeed");
}

#[then("the reset fails because the token is invalid")]
fn reset_refused(context: &TestContext) {
    let outcome = context.outcome.borrow_mut().take().expect("outcome recorded");
    assert!(matches!(outcome, Err(StoreError::InvalidResetToken)));
}

#[then("Ada can log in with the new password")]
fn new_password_works(context: &TestContext) {
    can_log_in(context, REPLACEMENT);
}

#[then("Ada can log in with the original password")]
fn original_password_works(context: &TestContext) {
    can_log_in(context, ORIGINAL);
}

#[then("no token is issued")]
fn no_token(context: &TestContext) {
    assert!(context.token.borrow().is_none());
}

#[scenario(path = "tests/features/password_reset.feature", index = 0)]
fn fresh_token(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/password_reset.feature", index = 1)]
fn expired_token(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/password_reset.feature", index = 2)]
fn unknown_address(context: TestContext) {
    let _ = context;
}
