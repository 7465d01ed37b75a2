//! CLI argument definitions for the Binder binary.

use std::path::PathBuf;

use binder::AuthenticationToken;
use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// SQLite database (default, production-ready)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development)
    Inmemory,
}

/// Binder identity administration
#[derive(Parser, Debug)]
#[command(name = "binder")]
#[command(about = "Binder: bind federated login identities into one user")]
#[command(version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show store statistics
    Info,
    /// List every group and its members
    List,
    /// Show one identity and the group it belongs to
    Show(IdentityArgs),
    /// Bind identities into one group, merging existing groups
    Bind(TokensArgs),
    /// Remove an identity from its group
    Unbind(IdentityArgs),
    /// Check whether a set of tokens is consistent; exits 1 if not
    Check(TokensArgs),
}

/// Storage configuration shared by all commands
#[derive(clap::Args, Debug)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, global = true, default_value = "sqlite", env = "BINDER_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores binder.db
    /// For InMemory: stores binder.json
    #[arg(short = 'D', long, global = true, env = "BINDER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, global = true, env = "BINDER_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// A single identity in `subject@issuer` form
#[derive(clap::Args, Debug)]
pub struct IdentityArgs {
    /// Identity as subject@issuer
    pub identity: AuthenticationToken,
}

/// Tokens in `subject@issuer` form
#[derive(clap::Args, Debug)]
pub struct TokensArgs {
    /// Tokens as subject@issuer
    #[arg(required = true, num_args = 1..)]
    pub tokens: Vec<AuthenticationToken>,
}
