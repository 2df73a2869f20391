pub mod preview;
pub mod rewrite;
pub mod show;

use std::collections::HashSet;
use std::path::PathBuf;

use clap::{Args, Subcommand};

use redate_core::{ObjectAccessor, ObjectId};
use redate_git::GitAccessor;
use redate_rewrite::{Jitter, RuleConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect the original author/committer timestamps of a history
    Show(show::ShowArgs),
    /// Compute the new schedule without touching the repository
    Preview(preview::PreviewArgs),
    /// Rewrite history and repoint refs
    Rewrite(rewrite::RewriteArgs),
}

impl Commands {
    pub fn run(self) -> anyhow::Result<i32> {
        match self {
            Commands::Show(args) => show::run(args),
            Commands::Preview(args) => preview::run(args),
            Commands::Rewrite(args) => rewrite::run(args),
        }
    }
}

#[derive(Args)]
pub struct RepoArgs {
    /// Repository path
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
    /// Rev (ref name or full hex id) treated as a fixed boundary; it and
    /// everything behind it is left untouched. Repeatable.
    #[arg(long = "boundary")]
    pub boundaries: Vec<String>,
}

impl RepoArgs {
    pub fn open(&self) -> anyhow::Result<GitAccessor> {
        Ok(GitAccessor::open(&self.repo)?)
    }

    pub fn boundary_set(&self, accessor: &GitAccessor) -> anyhow::Result<HashSet<ObjectId>> {
        let mut set = HashSet::new();
        for spec in &self.boundaries {
            let id = match ObjectId::from_hex(spec) {
                Ok(id) => id,
                Err(_) => accessor.resolve_ref(spec)?,
            };
            set.insert(id);
        }
        Ok(set)
    }
}

#[derive(Args)]
pub struct RuleArgs {
    /// Schedule start (RFC 3339, e.g. 2020-01-01T00:00:00Z)
    #[arg(long)]
    pub start: String,
    /// Interval between successive commits
    #[arg(long)]
    pub interval: i64,
    /// Interval unit: s, m, h or d
    #[arg(long, default_value = "s")]
    pub unit: String,
    /// oldest-first pins the root commit to the start instant,
    /// newest-first pins the tip
    #[arg(long, default_value = "oldest-first")]
    pub direction: String,
    /// Maximum jitter in seconds applied to each scheduled instant
    #[arg(long)]
    pub jitter: Option<i64>,
    /// Seed for deterministic jitter
    #[arg(long, default_value_t = 0)]
    pub jitter_seed: u64,
}

impl RuleArgs {
    pub fn to_config(&self) -> anyhow::Result<RuleConfig> {
        let config = RuleConfig {
            start: RuleConfig::parse_start(&self.start)?,
            interval: self.interval,
            unit: self.unit.parse()?,
            direction: self.direction.parse()?,
            jitter: self.jitter.map(|bound_seconds| Jitter {
                bound_seconds,
                seed: self.jitter_seed,
            }),
        };
        config.validate()?;
        Ok(config)
    }
}
