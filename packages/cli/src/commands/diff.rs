use super::read_template_file;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mailforge_editor::{diff as diff_templates, Change, ChangeRecord};
use mailforge_model::normalize_template;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Old template JSON file
    pub old: PathBuf,

    /// New template JSON file
    pub new: PathBuf,

    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn diff(args: DiffArgs, _cwd: &str) -> Result<()> {
    let old = normalize_template(&read_template_file(&args.old)?)?;
    let new = normalize_template(&read_template_file(&args.new)?)?;

    let records = diff_templates(Some(&old), &new);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No changes".dimmed());
        return Ok(());
    }

    for record in &records {
        println!("  {}", describe(record));
    }
    println!();
    println!("{} change records", records.len());

    Ok(())
}

pub(crate) fn describe(record: &ChangeRecord) -> String {
    match &record.change {
        Change::Add { new_content } => format!(
            "{} {} {} in {}",
            "+".green().bold(),
            new_content.element.element_type(),
            record.element_id.bright_white(),
            new_content.target_section_id
        ),
        Change::Edit {
            old_content,
            new_content,
        } => {
            let moved = if old_content.original_section_id != new_content.target_section_id {
                format!(
                    " (moved {} → {})",
                    old_content.original_section_id, new_content.target_section_id
                )
            } else {
                String::new()
            };
            format!(
                "{} {} {}{}",
                "~".yellow().bold(),
                new_content.element.element_type(),
                record.element_id.bright_white(),
                moved
            )
        }
        Change::Delete { old_content } => format!(
            "{} {} {} from {}",
            "-".red().bold(),
            old_content.element.element_type(),
            record.element_id.bright_white(),
            old_content.original_section_id
        ),
    }
}
