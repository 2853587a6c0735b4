//! Behaviour-driven step definitions driving the CLI command scenarios.

use super::helpers::{Workspace, community, write_dataset};
use super::*;
use crate::seed;
use connect_core::{GroupProfile, Profile, UserId};
use connect_data::SqliteCommunityStore;
use connect_matching::{GroupRecommendation, MatchResult};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;
use std::cell::RefCell;

struct CommandWorld {
    workspace: Workspace,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CommandWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn database_args(&self) -> [String; 2] {
        [
            format!("--{ARG_DATABASE}"),
            self.workspace.database.as_str().to_owned(),
        ]
    }

    fn run(&self, argv: Vec<String>) {
        self.stdout.borrow_mut().clear();
        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| {
            let mut buffer = self.stdout.borrow_mut();
            dispatch(cli.command, &mut *buffer)
        });
        self.result.replace(Some(outcome));
    }

    fn output<T: serde::de::DeserializeOwned>(&self) -> T {
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be JSON")
    }

    fn error(&self) -> CliError {
        self.result
            .borrow_mut()
            .take()
            .expect("result recorded")
            .expect_err("expected error")
    }
}

#[fixture]
fn world() -> CommandWorld {
    CommandWorld::new()
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_owned()).collect()
}

#[given("a community dataset exists on disk")]
fn dataset_exists(#[from(world)] world: &CommandWorld) {
    write_dataset(&world.workspace.dataset, &community());
}

#[given("a dataset whose group names an unknown member")]
fn dataset_with_stranger(#[from(world)] world: &CommandWorld) {
    let dataset = json!({
        "users": [
            { "name": "Ada", "email": "ada@example.com", "password": "secret1" }
        ],
        "groups": [
            {
                "name": "Chess club",
                "description": "Weekly blitz",
                "category": "other",
                "creator": "ada@example.com",
                "members": ["stranger@example.com"]
            }
        ]
    });
    write_dataset(&world.workspace.dataset, &dataset);
}

#[given("the dataset has been seeded")]
fn dataset_seeded(#[from(world)] world: &CommandWorld) {
    let dataset = seed::load_dataset(&world.workspace.dataset).expect("dataset loads");
    let mut store = SqliteCommunityStore::open(&world.workspace.database)
        .expect("open store")
        .with_password_cost(4);
    seed::import(&mut store, dataset).expect("import dataset");
}

#[when("I run the seed command")]
fn run_seed(#[from(world)] world: &CommandWorld) {
    let mut invocation = argv(&["interest-connect", "seed", world.workspace.dataset.as_str()]);
    invocation.extend(world.database_args());
    world.run(invocation);
}

#[when("I run the matches command for the first user")]
fn run_matches(#[from(world)] world: &CommandWorld) {
    let mut invocation = argv(&["interest-connect", "matches", "--user", "1"]);
    invocation.extend(world.database_args());
    world.run(invocation);
}

#[when("I run the recommend command for the first user")]
fn run_recommend(#[from(world)] world: &CommandWorld) {
    let mut invocation = argv(&["interest-connect", "recommend", "--user", "1"]);
    invocation.extend(world.database_args());
    world.run(invocation);
}

#[when("I run the matches command without a user")]
fn run_matches_without_user(#[from(world)] world: &CommandWorld) {
    let mut invocation = argv(&["interest-connect", "matches"]);
    invocation.extend(world.database_args());
    world.run(invocation);
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err}");
    }
}

#[then("the summary counts 4 users, 2 groups and 1 block")]
fn summary_counts(#[from(world)] world: &CommandWorld) {
    let summary: seed::SeedSummary = world.output();
    assert_eq!(
        summary,
        seed::SeedSummary {
            users: 4,
            groups: 2,
            memberships: 2,
            blocks: 1,
        }
    );
}

#[then("the matches are Bob then Cy")]
fn matches_bob_then_cy(#[from(world)] world: &CommandWorld) {
    let matches: Vec<MatchResult<Profile>> = world.output();
    let ranked: Vec<(UserId, u8)> = matches
        .iter()
        .map(|result| (result.user.id, result.match_score))
        .collect();
    assert_eq!(ranked, vec![(UserId::new(2), 49), (UserId::new(3), 10)]);
    let best = matches.first().expect("best match");
    assert_eq!(best.common_interests, vec!["Chess", "Music"]);
}

#[then("the only recommendation is the chess club")]
fn only_chess_club(#[from(world)] world: &CommandWorld) {
    let groups: Vec<GroupRecommendation<GroupProfile>> = world.output();
    assert_eq!(groups.len(), 1);
    let chess = groups.first().expect("chess club");
    assert_eq!(chess.relevance_score, 20);
    assert_eq!(chess.matched_interests, vec!["Chess"]);
    assert_eq!(chess.group.members, vec![UserId::new(2), UserId::new(3)]);
}

#[then("the command fails because the member is unknown")]
fn fails_unknown_member(#[from(world)] world: &CommandWorld) {
    match world.error() {
        CliError::UnknownSeedUser { email } => assert_eq!(email, "stranger@example.com"),
        other => panic!("expected UnknownSeedUser, found {other:?}"),
    }
}

#[then("the command fails because the user option is missing")]
fn fails_missing_user(#[from(world)] world: &CommandWorld) {
    match world.error() {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_USER);
            assert_eq!(env, ENV_MATCHES_USER);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_command_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_command_scenario!(seed_prints_summary, "seeding a dataset prints the imported counts");
register_command_scenario!(matches_after_seed, "ranking matches after seeding");
register_command_scenario!(recommend_after_seed, "recommending groups after seeding");
register_command_scenario!(seed_unknown_member, "rejecting a dataset that names an unknown member");
register_command_scenario!(matches_missing_user, "rejecting a missing user option");
