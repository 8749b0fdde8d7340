use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::Config;

/// Write a configuration file with every option at its default
pub fn run(config_path: &Path, force: bool, langs: &[String]) -> Result<()> {
    println!("=== i18n-extractor init ===\n");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config {
        langs: langs.to_vec(),
        ..Config::default()
    };
    config.validate()?;

    let config_str = serde_json::to_string_pretty(&config)?;
    std::fs::write(config_path, format!("{}\n", config_str))
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!("Created configuration file: {}\n", config_path.display());
    println!("Configuration:");
    println!("  Input patterns: {:?}", config.input);
    println!("  Output: {}", config.output);
    println!("  Languages: {:?}", config.langs);
    println!("  Package: {}", config.extract.package);

    println!("\nNext steps:");
    println!("  1. Run 'i18n-extractor extract' to extract messages");
    println!("  2. Run 'i18n-extractor watch' for continuous extraction");

    Ok(())
}
