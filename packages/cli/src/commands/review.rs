use super::{open_service, print_skipped};
use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use mailforge_editor::{ChangeOperation, ChangeStatus};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReviewAction {
    AcceptBatch,
    RejectBatch,
    AcceptOne,
    RejectOne,
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// What to do
    #[arg(value_enum)]
    pub action: ReviewAction,

    /// Template the batch belongs to
    pub template_id: String,

    /// Batch id, or record id for the single-record actions
    pub id: String,
}

impl ReviewArgs {
    fn operation(&self) -> ChangeOperation {
        let id = self.id.clone();
        match self.action {
            ReviewAction::AcceptBatch => ChangeOperation::AcceptBatch(id),
            ReviewAction::RejectBatch => ChangeOperation::RejectBatch(id),
            ReviewAction::AcceptOne => ChangeOperation::AcceptOne(id),
            ReviewAction::RejectOne => ChangeOperation::RejectOne(id),
        }
    }
}

pub fn review(args: ReviewArgs, cwd: &str) -> Result<()> {
    let mut service = open_service(cwd)?;
    let transition = service.execute(&args.template_id, &args.operation())?;
    let resolution = &transition.resolution;

    let verb = match resolution.status {
        ChangeStatus::Accepted => "Accepted".green().bold(),
        ChangeStatus::Rejected => "Rejected".red().bold(),
        ChangeStatus::Pending => "Pending".yellow().bold(),
    };
    println!(
        "{} {} record(s) of {}",
        verb,
        resolution.records.len(),
        args.template_id.bright_white()
    );
    if let Some(status) = resolution.frame {
        println!("  Template name, styles and sections {}", status.as_str());
    }
    print_skipped(&resolution.skipped);

    if let Some(version) = resolution.snapshot {
        println!("  {} Snapshot stored as version {}", "✓".green(), version);
    }
    println!("  Version: {}", resolution.version);

    if let Some(batch) = &resolution.batch {
        let remaining = batch.pending().count();
        if remaining > 0 {
            println!("  {} record(s) still pending in {}", remaining, batch.id.dimmed());
        } else if batch.is_open() {
            println!("  Template frame change still pending in {}", batch.id.dimmed());
        }
    }

    Ok(())
}
