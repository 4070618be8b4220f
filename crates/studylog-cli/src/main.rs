mod cmd_parse;
mod cmd_record;
mod cmd_sync;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DATA: &str = "data/study-data.json";
const DEFAULT_TEMPLATE: &str = ".github/ISSUE_TEMPLATE/study_log.yml";

#[derive(Parser, Debug)]
#[command(name = "studylog")]
#[command(about = "Record study-log issues and keep the issue form's goals in sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the issue described by ISSUE_BODY, ISSUE_NUMBER, CREATED_AT and
    /// ISSUE_URL as a session
    Record {
        /// Study document to update
        #[arg(long, default_value = DEFAULT_DATA)]
        data: PathBuf,

        /// Issue form definition supplying the field labels
        #[arg(long, default_value = DEFAULT_TEMPLATE)]
        template: PathBuf,
    },
    /// Rewrite the goal dropdown options of the issue form from the document's goals
    SyncGoals {
        /// Study document to read goals from
        #[arg(long, default_value = DEFAULT_DATA)]
        data: PathBuf,

        /// Issue form definition to update
        #[arg(long, default_value = DEFAULT_TEMPLATE)]
        template: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse an issue body from stdin and print the fields as JSON
    Parse {
        /// Issue form definition supplying the field labels
        #[arg(long, default_value = DEFAULT_TEMPLATE)]
        template: PathBuf,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Record { data, template } => cmd_record::run(data, template),
        Commands::SyncGoals {
            data,
            template,
            dry_run,
        } => cmd_sync::run(data, template, dry_run),
        Commands::Parse { template } => cmd_parse::run(template),
    }
}
