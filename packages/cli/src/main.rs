mod commands;
mod config;
mod store;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    diff, init, propose, render, review, status, DiffArgs, InitArgs, ProposeArgs, RenderArgs, ReviewArgs, StatusArgs,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mailforge CLI - review and render email templates
#[derive(Parser, Debug)]
#[command(name = "mailforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (overrides MAILFORGE_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Mailforge project
    Init(InitArgs),

    /// Render a template file to HTML
    Render(RenderArgs),

    /// Show change records between two template files
    Diff(DiffArgs),

    /// Propose a template as a pending change batch
    Propose(ProposeArgs),

    /// Accept or reject pending changes
    Review(ReviewArgs),

    /// Show a template's version and pending changes
    Status(StatusArgs),
}

/// Initialize tracing with output to stderr, keeping stdout for HTML/JSON
fn init_tracing(verbose: bool) {
    let directives = if verbose {
        "debug".to_string()
    } else {
        std::env::var("MAILFORGE_LOG").unwrap_or_else(|_| "warn".into())
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(directives))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Render(args) => render(args, &cwd),
        Command::Diff(args) => diff(args, &cwd),
        Command::Propose(args) => propose(args, &cwd),
        Command::Review(args) => review(args, &cwd),
        Command::Status(args) => status(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
