//! `tsync config` command implementation

use crate::config::{Config, CONFIG_KEYS};
use crate::error::Result;
use colored::Colorize;

/// Print one configuration value
pub async fn get(config: &Config, key: &str) -> Result<()> {
    println!("{}", config.get(key)?);
    Ok(())
}

/// Show the effective configuration
pub async fn show(config: &Config) -> Result<()> {
    println!("{}", "tsync configuration:".cyan().bold());
    println!();
    for key in CONFIG_KEYS {
        println!("{:<18} {}", format!("{}:", key), config.get(key)?);
    }
    println!();
    println!("{}", "Environment Variables:".cyan());
    for key in CONFIG_KEYS {
        println!("  {}", format_env_var(key));
    }
    println!("  TSYNC_CONFIG (config file path)");

    Ok(())
}

/// Format config key as environment variable name
fn format_env_var(key: &str) -> String {
    format!("TSYNC_{}", key.to_uppercase())
}
