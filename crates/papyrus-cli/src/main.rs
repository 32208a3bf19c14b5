//! papyrus CLI
//!
//! Command-line interface for papyrus - a personal reference manager.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_yaml::Value;
use tracing::debug;

use papyrus_core::{Config, ErrorCategory, StorageError, Store};

mod commands;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "papyrus")]
#[command(about = "papyrus - Personal reference manager")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Store directory (overrides config and PAPYRUS_STORE_DIR)
    #[arg(long, global = true, value_parser = existing_dir)]
    store: Option<PathBuf>,

    /// Configuration file to use (default honors PAPYRUS_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all paper keys
    #[command(alias = "ls")]
    List,
    /// List all authors
    ListAuthors,
    /// List all titles
    ListTitles,
    /// List all tags
    ListTags,
    /// Add a paper, or update an existing one
    Add {
        /// Paper key (the PDF is <key>.pdf in the store)
        key: String,
        /// Paper title
        #[arg(short, long)]
        title: Option<String>,
        /// Author (repeat for several, in order)
        #[arg(short, long)]
        author: Vec<String>,
        /// Extra metadata field as name=value
        #[arg(short, long, value_parser = commands::index::parse_field)]
        field: Vec<(String, Value)>,
    },
    /// Tag a paper
    Tag {
        /// Paper key
        paper: String,
        /// Tag name
        tag_name: String,
    },
    /// Show one paper's metadata
    Show {
        /// Paper key
        key: String,
    },
    /// List papers carrying a tag
    Tagged {
        /// Tag name
        tag: String,
    },
    /// Report papers whose PDF is missing
    Validate,
    /// Show store status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (store_dir, author_name, author_email, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn existing_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("'{}' is not an existing directory", raw))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            if let Some(hint) = storage_error(&err).and_then(StorageError::recovery_suggestion) {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands never touch the store
    if let Commands::Config { command } = &cli.command {
        logging::init(cli.verbose, None);
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let mut config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(cli.verbose, config.log_file.as_deref());

    if let Some(store_dir) = cli.store {
        config.store_dir = store_dir;
    }
    debug!("using store {:?}", config.store_dir);

    let mut store = Store::open_with_config(&config)?;

    match cli.command {
        Commands::List => commands::index::list(&store, &output),
        Commands::ListAuthors => commands::index::list_authors(&store, &output),
        Commands::ListTitles => commands::index::list_titles(&store, &output),
        Commands::ListTags => commands::tag::list(&store, &output),
        Commands::Add {
            key,
            title,
            author,
            field,
        } => commands::index::add(&mut store, key, title, author, field, &output),
        Commands::Tag { paper, tag_name } => commands::tag::tag(&store, paper, tag_name, &output),
        Commands::Show { key } => commands::index::show(&store, key, &output),
        Commands::Tagged { tag } => commands::tag::tagged(&store, tag, &output),
        Commands::Validate => commands::index::validate(&store, &output),
        Commands::Status => commands::status::show(&store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// First storage error in the chain, if any
fn storage_error(err: &anyhow::Error) -> Option<&StorageError> {
    err.chain().find_map(|cause| cause.downcast_ref::<StorageError>())
}

/// Process exit code for a failed run
///
/// 2 initialization, 3 parse, 4 I/O, 5 rejected request, 1 anything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(storage) = storage_error(err) {
        return match storage.category() {
            ErrorCategory::Initialization => 2,
            ErrorCategory::Parse => 3,
            ErrorCategory::Io => 4,
            ErrorCategory::Rejected => 5,
        };
    }

    if err
        .chain()
        .any(|cause| cause.downcast_ref::<toml::de::Error>().is_some())
    {
        return 3;
    }
    if err
        .chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
    {
        return 4;
    }

    1
}
