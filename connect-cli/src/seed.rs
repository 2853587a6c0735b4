//! Seed command: import a JSON dataset into the community database.

use std::collections::HashMap;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::Parser;
use connect_core::user::canonical_email;
use connect_core::{NewGroup, NewUser, UserId};
use connect_data::SqliteCommunityStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ARG_DATABASE, ARG_DATASET, CliError, DEFAULT_DATABASE, ENV_SEED_DATASET, write_json};

/// CLI arguments for the `seed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Register the users in a JSON dataset, then create its groups \
                 and memberships. Users are referenced by e-mail address \
                 throughout the dataset.",
    about = "Import users and groups from a JSON dataset"
)]
#[ortho_config(prefix = "CONNECT")]
pub(crate) struct SeedArgs {
    /// Path to the JSON dataset.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) dataset: Option<Utf8PathBuf>,
    /// Path to the SQLite database (created if missing).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl SeedArgs {
    fn into_config(self) -> Result<SeedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SeedConfig::try_from(merged)
    }
}

/// Resolved `seed` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeedConfig {
    pub(crate) dataset: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<SeedArgs> for SeedConfig {
    type Error = CliError;

    fn try_from(args: SeedArgs) -> Result<Self, Self::Error> {
        let dataset = args.dataset.ok_or(CliError::MissingArgument {
            field: ARG_DATASET,
            env: ENV_SEED_DATASET,
        })?;
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        Ok(Self { dataset, database })
    }
}

/// Users and groups to import.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Dataset {
    #[serde(default)]
    pub(crate) users: Vec<SeedUser>,
    #[serde(default)]
    pub(crate) groups: Vec<SeedGroup>,
    #[serde(default)]
    pub(crate) blocks: Vec<SeedBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SeedUser {
    #[serde(flatten)]
    pub(crate) account: NewUser,
    pub(crate) password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SeedGroup {
    #[serde(flatten)]
    pub(crate) group: NewGroup,
    pub(crate) creator: String,
    #[serde(default)]
    pub(crate) members: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SeedBlock {
    pub(crate) blocker: String,
    pub(crate) blocked: String,
}

/// Counts printed once a dataset has been imported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeedSummary {
    pub(crate) users: usize,
    pub(crate) groups: usize,
    pub(crate) memberships: usize,
    pub(crate) blocks: usize,
}

pub(crate) fn run_seed_with(args: SeedArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let dataset = load_dataset(&config.dataset)?;
    let mut store = SqliteCommunityStore::open(&config.database)
        .map_err(CliError::store("open the database"))?;
    let summary = import(&mut store, dataset)?;
    info!(
        users = summary.users,
        groups = summary.groups,
        "seeded {}",
        config.database
    );
    write_json(writer, &summary)
}

/// Load and decode the dataset at `path`.
pub(crate) fn load_dataset(path: &Utf8Path) -> Result<Dataset, CliError> {
    match connect_fs::is_regular_file(path) {
        Ok(true) => {}
        Ok(false) => {
            return Err(CliError::MissingSourceFile {
                field: ARG_DATASET,
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(CliError::InspectSourcePath {
                field: ARG_DATASET,
                path: path.to_path_buf(),
                source,
            });
        }
    }
    let raw = connect_fs::read_to_string(path).map_err(|source| CliError::ReadDataset {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::ParseDataset {
        path: path.to_path_buf(),
        source,
    })
}

/// Write every record in `dataset` to `store`.
///
/// The import is all or nothing: when any entry fails, no rows from the
/// dataset remain, so the same file can be fixed and imported again.
pub(crate) fn import(
    store: &mut SqliteCommunityStore,
    dataset: Dataset,
) -> Result<SeedSummary, CliError> {
    store.atomically(|batch| import_records(batch, dataset))
}

fn import_records(
    store: &mut SqliteCommunityStore,
    dataset: Dataset,
) -> Result<SeedSummary, CliError> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();
    let mut accounts = HashMap::new();

    for entry in dataset.users {
        let user = store
            .register(entry.account, &entry.password, now)
            .map_err(CliError::store("register a user"))?;
        accounts.insert(user.email, user.id);
        summary.users += 1;
    }

    for entry in dataset.groups {
        let creator = lookup(&accounts, &entry.creator)?;
        let group = store
            .create_group(creator, entry.group, now)
            .map_err(CliError::store("create a group"))?;
        summary.groups += 1;
        for email in &entry.members {
            let member = lookup(&accounts, email)?;
            if member == creator {
                continue;
            }
            store
                .join_group(group.id, member, now)
                .map_err(CliError::store("add a group member"))?;
            summary.memberships += 1;
        }
    }

    for entry in dataset.blocks {
        let blocker = lookup(&accounts, &entry.blocker)?;
        let blocked = lookup(&accounts, &entry.blocked)?;
        store
            .block_user(blocker, blocked)
            .map_err(CliError::store("block a user"))?;
        summary.blocks += 1;
    }
    Ok(summary)
}

fn lookup(accounts: &HashMap<String, UserId>, email: &str) -> Result<UserId, CliError> {
    canonical_email(email)
        .ok()
        .and_then(|canonical| accounts.get(&canonical).copied())
        .ok_or_else(|| CliError::UnknownSeedUser {
            email: email.to_owned(),
        })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SeedConfig, CliError> {
    let merged = SeedArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SeedConfig::try_from(merged)
}
