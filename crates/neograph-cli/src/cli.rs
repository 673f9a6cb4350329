use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use neograph_auth::{EntityType, ScopeOperation};

#[derive(Parser)]
#[command(name = "neograph")]
#[command(about = "Augment GraphQL schemas with authorization directives")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Augmentation config file (TOML)
    #[arg(short, long, global = true, env = "NEOGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "NEOGRAPH_LOG", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add authorization directive declarations to a schema
    Augment(AugmentArgs),
    /// Print the @hasScope annotation for a generated field
    Scope(ScopeArgs),
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Schema followed by the added declarations
    #[default]
    Sdl,
    /// Added declarations as JSON
    Json,
}

#[derive(clap::Args)]
pub struct AugmentArgs {
    /// Schema file (SDL)
    pub schema: PathBuf,
    /// Reject `auth` values that are neither a boolean nor a table
    #[arg(long)]
    pub strict: bool,
    /// Output format
    #[arg(short, long, default_value = "sdl")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OperationArg {
    Create,
    Read,
    Update,
    Delete,
    Add,
    Remove,
}

impl From<OperationArg> for ScopeOperation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Create => ScopeOperation::Create,
            OperationArg::Read => ScopeOperation::Read,
            OperationArg::Update => ScopeOperation::Update,
            OperationArg::Delete => ScopeOperation::Delete,
            OperationArg::Add => ScopeOperation::Add,
            OperationArg::Remove => ScopeOperation::Remove,
        }
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum EntityArg {
    #[default]
    Node,
    Relation,
}

impl From<EntityArg> for EntityType {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Node => EntityType::Node,
            EntityArg::Relation => EntityType::Relation,
        }
    }
}

#[derive(clap::Args)]
pub struct ScopeArgs {
    /// Type the field operates on (e.g. Movie)
    #[arg(short = 't', long = "type")]
    pub type_name: String,
    /// Other endpoint type, for relationship fields
    #[arg(short, long)]
    pub related: Option<String>,
    /// Operation the field performs
    #[arg(short, long)]
    pub operation: OperationArg,
    /// Entity kind
    #[arg(short, long, default_value = "node")]
    pub entity: EntityArg,
}
