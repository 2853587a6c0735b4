//! Behavioural coverage for presence tracking and message fan-out.

use std::cell::RefCell;

use connect_core::{
    ConnectionId, GroupId, MessageTarget, PresenceEvent, PresenceRegistry, UserId,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const ADA: UserId = UserId::new(1);
const BOB: UserId = UserId::new(2);
const CHESS: GroupId = GroupId::new(7);

/// Registry under test plus the events of the last step.
pub struct TestContext {
    registry: RefCell<PresenceRegistry>,
    events: RefCell<Vec<PresenceEvent>>,
}

#[fixture]
/// Build a fresh `TestContext` for each scenario run.
pub fn context() -> TestContext {
    TestContext {
        registry: RefCell::new(PresenceRegistry::new()),
        events: RefCell::new(Vec::new()),
    }
}

fn conn(raw: u64) -> ConnectionId {
    ConnectionId::new(raw)
}

fn record(context: &TestContext, events: impl IntoIterator<Item = PresenceEvent>) {
    *context.events.borrow_mut() = events.into_iter().collect();
}

#[given("an empty presence registry")]
fn empty_registry(context: &TestContext) {
    assert!(context.registry.borrow().online_users().is_empty());
}

#[given("Ada is connected on connections 1 and 2")]
fn ada_two_connections(context: &TestContext) {
    let mut registry = context.registry.borrow_mut();
    registry.connect(ADA, conn(1));
    registry.connect(ADA, conn(2));
}

#[given("Ada is connected on connection 1")]
fn ada_one_connection(context: &TestContext) {
    context.registry.borrow_mut().connect(ADA, conn(1));
}

#[given("Bob is connected on connection 3")]
fn bob_connected(context: &TestContext) {
    context.registry.borrow_mut().connect(BOB, conn(3));
}

#[when("Ada connects on connection 1")]
fn ada_connects(context: &TestContext) {
    let event = context.registry.borrow_mut().connect(ADA, conn(1));
    record(context, event);
}

#[when("Bob takes over connection 1")]
fn bob_takes_over(context: &TestContext) {
    let events = context.registry.borrow_mut().connect(BOB, conn(1));
    record(context, events);
}

#[when("connection 1 disconnects")]
fn first_disconnects(context: &TestContext) {
    let event = context.registry.borrow_mut().disconnect(conn(1));
    record(context, event);
}

#[when("connection 2 disconnects")]
fn second_disconnects(context: &TestContext) {
    let event = context.registry.borrow_mut().disconnect(conn(2));
    record(context, event);
}

#[when("connections 2 and 3 join the chess group room")]
fn join_chess_room(context: &TestContext) {
    let mut registry = context.registry.borrow_mut();
    assert!(registry.join_group(conn(2), CHESS));
    assert!(registry.join_group(conn(3), CHESS));
}

#[then("an online event for Ada is emitted")]
fn online_emitted(context: &TestContext) {
    assert_eq!(*context.events.borrow(), vec![PresenceEvent::Online(ADA)]);
}

#[then("no presence event is emitted")]
fn nothing_emitted(context: &TestContext) {
    assert!(context.events.borrow().is_empty());
}

#[then("an offline event for Ada is emitted")]
fn offline_emitted(context: &TestContext) {
    assert_eq!(*context.events.borrow(), vec![PresenceEvent::Offline(ADA)]);
}

#[then("Ada goes offline before Bob comes online")]
fn handover_emitted(context: &TestContext) {
    assert_eq!(
        *context.events.borrow(),
        vec![PresenceEvent::Offline(ADA), PresenceEvent::Online(BOB)]
    );
}

#[then("a direct message to Bob is delivered to connection 1")]
fn bob_delivery(context: &TestContext) {
    let targets = context
        .registry
        .borrow()
        .deliveries(&MessageTarget::User(BOB));
    assert_eq!(targets, vec![conn(1)]);
}

#[then("Ada is online")]
fn ada_online(context: &TestContext) {
    assert!(context.registry.borrow().is_online(ADA));
}

#[then("Ada is offline")]
fn ada_offline(context: &TestContext) {
    assert!(!context.registry.borrow().is_online(ADA));
}

#[then("a chess group message is delivered to connections 2 and 3")]
fn group_delivery(context: &TestContext) {
    let targets = context
        .registry
        .borrow()
        .deliveries(&MessageTarget::Group(CHESS));
    assert_eq!(targets, vec![conn(2), conn(3)]);
}

#[then("a direct message to Ada is delivered to connections 1 and 2")]
fn direct_delivery(context: &TestContext) {
    let targets = context
        .registry
        .borrow()
        .deliveries(&MessageTarget::User(ADA));
    assert_eq!(targets, vec![conn(1), conn(2)]);
}

#[scenario(path = "tests/features/presence.feature", index = 0)]
fn first_connection_goes_online(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/presence.feature", index = 1)]
fn last_disconnection_goes_offline(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/presence.feature", index = 2)]
fn group_messages_fan_out(context: TestContext) {
    let _ = context;
}

#[scenario(path = "tests/features/presence.feature", index = 3)]
fn moved_connection_hands_over_presence(context: TestContext) {
    let _ = context;
}
