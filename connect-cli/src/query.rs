//! `matches` and `recommend` commands: rank candidates for one user.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use connect_core::UserId;
use connect_data::SqliteCommunityStore;
use connect_matching::{DEFAULT_GROUP_LIMIT, DEFAULT_MATCH_LIMIT, Recommender};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_LIMIT, ARG_USER, CliError, DEFAULT_DATABASE, ENV_MATCHES_USER,
    ENV_RECOMMEND_USER, write_json,
};

/// CLI arguments for the `matches` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Rank other users by compatibility with a user")]
#[ortho_config(prefix = "CONNECT")]
pub(crate) struct MatchesArgs {
    /// Identifier of the user to find matches for.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<u64>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Maximum number of matches to print.
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Recommend public groups to a user")]
#[ortho_config(prefix = "CONNECT")]
pub(crate) struct RecommendArgs {
    /// Identifier of the user to recommend groups to.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<u64>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Maximum number of groups to print.
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

/// Resolved configuration shared by both ranking commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryConfig {
    pub(crate) user: UserId,
    pub(crate) database: Utf8PathBuf,
    pub(crate) limit: usize,
}

impl QueryConfig {
    fn resolve(
        user: Option<u64>,
        database: Option<Utf8PathBuf>,
        limit: Option<usize>,
        env: &'static str,
        default_limit: usize,
    ) -> Result<Self, CliError> {
        let raw = user.ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env,
        })?;
        Ok(Self {
            user: UserId::new(raw),
            database: database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            limit: limit.unwrap_or(default_limit),
        })
    }

    fn recommender(&self) -> Result<Recommender<SqliteCommunityStore>, CliError> {
        let store = SqliteCommunityStore::open(&self.database)
            .map_err(CliError::store("open the database"))?;
        Ok(Recommender::new(store))
    }
}

impl TryFrom<MatchesArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: MatchesArgs) -> Result<Self, Self::Error> {
        Self::resolve(
            args.user,
            args.database,
            args.limit,
            ENV_MATCHES_USER,
            DEFAULT_MATCH_LIMIT,
        )
    }
}

impl TryFrom<RecommendArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        Self::resolve(
            args.user,
            args.database,
            args.limit,
            ENV_RECOMMEND_USER,
            DEFAULT_GROUP_LIMIT,
        )
    }
}

pub(crate) fn run_matches_with(args: MatchesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = QueryConfig::try_from(merged)?;
    let matches = config.recommender()?.matches_for(config.user, config.limit)?;
    write_json(writer, &matches)
}

pub(crate) fn run_recommend_with(
    args: RecommendArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = QueryConfig::try_from(merged)?;
    let groups = config.recommender()?.groups_for(config.user, config.limit)?;
    write_json(writer, &groups)
}
