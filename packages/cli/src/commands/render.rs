use super::read_template_file;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mailforge_compiler_html::compile_value;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template JSON file
    pub input: PathBuf,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact HTML regardless of config
    #[arg(long)]
    pub compact: bool,
}

pub fn render(args: RenderArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut options = config.compile_options();
    if args.compact {
        options.pretty = false;
    }

    let raw = read_template_file(&args.input)?;
    let html = compile_value(&raw, options)?;

    match args.output {
        Some(path) => {
            fs::write(&path, &html)?;
            println!(
                "  {} {} → {}",
                "✓".green(),
                args.input.display(),
                path.display()
            );
        }
        None => print!("{}", html),
    }

    Ok(())
}
