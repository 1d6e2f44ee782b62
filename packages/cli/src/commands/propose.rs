use super::diff::describe;
use super::{open_service, print_skipped, read_template_file};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ProposeArgs {
    /// Candidate template JSON file
    pub input: PathBuf,

    /// Template id (defaults to the file's `id`)
    #[arg(long)]
    pub id: Option<String>,
}

pub fn propose(args: ProposeArgs, cwd: &str) -> Result<()> {
    let raw = read_template_file(&args.input)?;
    let template_id = match args.id {
        Some(id) => id,
        None => raw
            .get("id")
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{} has no id; pass --id", args.input.display()))?,
    };

    let mut service = open_service(cwd)?;
    let transition = service.propose(&template_id, &raw)?;

    let Some(batch) = &transition.resolution.batch else {
        println!("{} {} has no changes", "✓".green(), template_id.bright_white());
        return Ok(());
    };

    println!(
        "{} Proposed batch {} for {}",
        "📝".bright_blue(),
        batch.id.bright_white(),
        template_id.bright_white()
    );
    if batch.frame.is_some() {
        println!("  {} template name, styles or sections", "~".yellow());
    }
    for record in &batch.records {
        println!("  {}  {}", describe(record), record.id.dimmed());
    }
    print_skipped(transition.skipped());

    println!();
    println!("Review with:");
    println!("  mailforge review accept-batch {} {}", template_id, batch.id);
    println!("  mailforge review reject-batch {} {}", template_id, batch.id);

    Ok(())
}
