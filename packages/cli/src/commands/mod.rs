pub mod diff;
pub mod init;
pub mod propose;
pub mod render;
pub mod review;
pub mod status;

pub use diff::{diff, DiffArgs};
pub use init::{init, InitArgs};
pub use propose::{propose, ProposeArgs};
pub use render::{render, RenderArgs};
pub use review::{review, ReviewArgs};
pub use status::{status, StatusArgs};

use crate::config::Config;
use crate::store::JsonFileStore;
use anyhow::{Context, Result};
use colored::Colorize;
use mailforge_editor::{ReviewService, SkippedRecord};
use serde_json::Value;
use std::path::Path;

/// Read a wire-shaped template file
pub(crate) fn read_template_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Review service over the configured store
pub(crate) fn open_service(cwd: &str) -> Result<ReviewService<JsonFileStore>> {
    let config = Config::load(cwd)?;
    let store = JsonFileStore::new(config.get_store_dir(cwd));
    store.init()?;
    Ok(ReviewService::with_options(store, config.compile_options()))
}

pub(crate) fn print_skipped(skipped: &[SkippedRecord]) {
    for record in skipped {
        println!(
            "  {} skipped {} ({}): {}",
            "⚠️".yellow(),
            record.element_id,
            record.record_id.dimmed(),
            record.error
        );
    }
}
