use super::diff::describe;
use crate::config::Config;
use crate::store::JsonFileStore;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mailforge_editor::DocumentStore;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Template id
    pub template_id: String,
}

pub fn status(args: StatusArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = JsonFileStore::new(config.get_store_dir(cwd));

    let template = store
        .load_template(&args.template_id)?
        .ok_or_else(|| anyhow!("Unknown template: {}", args.template_id))?;

    println!("{} {}", template.name.bright_white().bold(), format!("({})", template.id).dimmed());
    println!("  Version:   {}", template.version);
    println!("  Sections:  {}", template.sections.len());
    println!("  Elements:  {}", template.element_count());

    let versions = store.snapshot_versions(&args.template_id)?;
    if !versions.is_empty() {
        let list: Vec<String> = versions.iter().map(u64::to_string).collect();
        println!("  Snapshots: {}", list.join(", "));
    }

    match store.load_pending_batch(&args.template_id)? {
        Some(batch) => {
            println!();
            println!(
                "{} Pending batch {} (based on version {})",
                "⏳".yellow(),
                batch.id.bright_white(),
                batch.base_version
            );
            if let Some(frame) = &batch.frame {
                println!(
                    "  {} template name, styles or sections  {}",
                    "~".yellow(),
                    frame.status.as_str().dimmed()
                );
            }
            for record in &batch.records {
                println!(
                    "  {}  {} {}",
                    describe(record),
                    record.status.as_str().dimmed(),
                    record.id.dimmed()
                );
            }
        }
        None => {
            println!();
            println!("{} No pending changes", "✓".green());
        }
    }

    Ok(())
}
