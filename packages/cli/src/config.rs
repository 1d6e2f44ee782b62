use mailforge_compiler_html::CompileOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "mailforge.config.json";

/// Mailforge configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding templates, batches, snapshots and previews
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Pretty print generated HTML
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// Indentation used when pretty printing
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_store_dir() -> String {
    ".mailforge".to_string()
}

fn default_pretty() -> bool {
    true
}

fn default_indent() -> String {
    "  ".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the store directory
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            pretty: self.pretty,
            indent: self.indent.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            pretty: default_pretty(),
            indent: default_indent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "storeDir": "review-store",
            "pretty": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.store_dir, "review-store");
        assert!(!config.pretty);
        assert_eq!(config.indent, "  ");
        assert!(!config.compile_options().pretty);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store_dir, ".mailforge");
        assert!(config.pretty);
        assert_eq!(config.compile_options(), CompileOptions::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.store_dir, ".mailforge");
    }
}
