use anyhow::Result;
use blogsync::output::{self, Verbosity};
use blogsync::{SyncContext, commands};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use colored::Colorize;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "blogsync",
    version = blogsync::VERSION,
    about = "Mirror Markdown notes into blog repositories",
    long_about = "Copies Markdown folders from a notes vault into blog repositories, \
                  assigns every document a unique slug, and commits and pushes the result"
)]
struct Cli {
    /// Defaults to `sync`
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every configured blog now
    Sync,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show the last sync state of every mapping
    Status,

    /// Get and set top-level settings
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        output::set_verbosity(Verbosity::Quiet);
    } else if cli.verbose {
        output::set_verbosity(Verbosity::Verbose);
    }
    init_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => {
            let mut ctx = SyncContext::new()?;
            commands::sync::execute(&mut ctx)?;
        }
        Commands::Init { force } => {
            commands::init::execute(&blogsync::default_config_path()?, force)?;
        }
        Commands::Status => {
            let ctx = SyncContext::new()?;
            commands::status::execute(&ctx)?;
        }
        Commands::Config { key, value, list } => {
            let mut ctx = SyncContext::new()?;
            commands::config::execute(&mut ctx, key.as_deref(), value, list)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr, filtered by `$BLOGSYNC_LOG`
fn init_tracing(verbose: bool) {
    let filter = std::env::var(blogsync::ENV_LOG).map_or_else(
        |_| EnvFilter::new(if verbose { "debug" } else { "warn" }),
        EnvFilter::new,
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
