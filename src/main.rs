use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::process;
use subsys::cli::{Cli, Commands};
use subsys::output::{self, Verbosity};
use subsys::utils::{paths, thread_pool};
use subsys::{SnapContext, commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let root = resolve_root(cli.directory)?;

    match cli.command {
        Commands::Init => commands::init::execute(&root)?,
        Commands::Status { short } => {
            let ctx = open_context(&root)?;
            commands::status::execute(&ctx, short)?;
        }
        Commands::Snap { name, short } => {
            let ctx = open_context(&root)?;
            commands::snap::execute(&ctx, &name, short)?;
        }
        Commands::List => {
            let ctx = open_context(&root)?;
            commands::list::execute(&ctx)?;
        }
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
        }
    }

    Ok(())
}

fn resolve_root(directory: Option<PathBuf>) -> Result<PathBuf> {
    let root = match directory {
        Some(dir) => paths::make_absolute(&dir)?,
        None => std::env::current_dir().context("Could not determine current directory")?,
    };
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }
    Ok(root)
}

fn open_context(root: &std::path::Path) -> Result<SnapContext> {
    let ctx = SnapContext::open(root)?;
    if let Err(e) = thread_pool::configure_from_config(&ctx.config) {
        output::warning(&format!("Warning: Failed to configure thread pool: {e}"));
    }
    Ok(ctx)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
