use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::catalog::Section;
use crate::utils::export::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "bookstore-queries",
    version,
    about = "Run the bookstore CRUD, query, aggregation and indexing sequence against MongoDB"
)]
pub struct Cli {
    /// Connection string; overrides MONGO_URI.
    #[arg(long, global = true)]
    pub uri: Option<String>,

    /// Database name; overrides DB_NAME.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the query sequence and print every result.
    Run(RunArgs),
    /// Load the sample catalogue into the books collection.
    Seed(SeedArgs),
    /// Print the steps `run` would execute, without connecting.
    Plan(PlanArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only run these sections (repeatable). Defaults to all.
    #[arg(long = "section", value_enum)]
    pub sections: Vec<Section>,

    /// Also write each document result to a file in this directory.
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// File format for --export-dir.
    #[arg(long, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
}

#[derive(Args, Debug, Default)]
pub struct SeedArgs {
    /// Drop the collection before inserting.
    #[arg(long)]
    pub drop: bool,
}

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    #[arg(long = "section", value_enum)]
    pub sections: Vec<Section>,
}
