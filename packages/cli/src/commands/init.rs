use crate::config::{Config, DEFAULT_CONFIG_NAME};
use crate::store::JsonFileStore;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Store directory
    #[arg(short, long, default_value = ".mailforge")]
    pub store_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Mailforge project...".bright_blue().bold());

    let config = Config {
        store_dir: args.store_dir.clone(),
        ..Config::default()
    };

    let store = JsonFileStore::new(config.get_store_dir(cwd));
    store.init()?;
    println!("  {} Created {}/", "✓".green(), args.store_dir);

    // Create example template
    let example_file = PathBuf::from(cwd).join("welcome.json");
    if !example_file.exists() {
        let example = json!({
            "id": "welcome",
            "name": "Welcome email",
            "styles": { "preheader": "Thanks for signing up" },
            "sections": [
                {
                    "id": "header",
                    "elements": [
                        { "id": "title", "type": "header", "content": "Welcome aboard" }
                    ]
                },
                {
                    "id": "body",
                    "elements": [
                        { "id": "intro", "type": "text", "content": "We are glad to have you." },
                        { "id": "cta", "type": "button", "content": "Get started", "properties": { "href": "https://example.com" } }
                    ]
                }
            ]
        });
        fs::write(&example_file, serde_json::to_string_pretty(&example)?)?;
        println!("  {} Created welcome.json", "✓".green());
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit welcome.json");
    println!("  2. Run: mailforge propose welcome.json");
    println!("  3. Run: mailforge status welcome");

    Ok(())
}
