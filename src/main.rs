use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use i18n_extractor::commands;
use i18n_extractor::config::{base_dir_for, Config, DEFAULT_CONFIG_FILE};
use i18n_extractor::logging::{self, LogLevel};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "i18n-extractor")]
#[command(author, version, about = "Extract translatable messages into per-language JSON files", long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to ./i18n.config.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info or debug
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract messages from source files and merge them into locale files
    Extract {
        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<String>,

        /// Collect all merges in memory and write each locale file once
        #[arg(long)]
        buffered: bool,
    },

    /// Report translate calls whose message is not a string literal
    Lint {
        /// Exit with an error when issues are found
        #[arg(long)]
        fail_on_error: bool,
    },

    /// Watch for file changes and extract messages automatically
    Watch {
        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Create a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,

        /// Comma-separated language codes
        #[arg(long, value_delimiter = ',', default_value = "en")]
        langs: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = LogLevel::parse(&cli.log_level)
        .ok_or_else(|| anyhow!("Invalid log level: {}", cli.log_level))?;
    logging::setup_logger(level);

    if let Commands::Init { force, langs } = &cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        return commands::init::run(&path, *force, langs);
    }

    let config_path = cli.config.clone().or_else(|| {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        default_path.exists().then(|| default_path.to_path_buf())
    });
    let mut config = Config::load_or_default(config_path.as_ref())?;
    let mut base_dir = base_dir_for(config_path.as_deref());

    match cli.command {
        Commands::Extract { output, buffered } => {
            override_output(&mut config, &mut base_dir, output);
            commands::extract::run(&config, &base_dir, buffered)?;
        }
        Commands::Lint { fail_on_error } => {
            commands::lint::run(&config, fail_on_error)?;
        }
        Commands::Watch { output } => {
            override_output(&mut config, &mut base_dir, output);
            commands::watch::run(config, base_dir)?;
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// An `--output` given on the command line is relative to the working
/// directory, not to the config file.
fn override_output(config: &mut Config, base_dir: &mut PathBuf, output: Option<String>) {
    if let Some(output) = output {
        config.output = output;
        *base_dir = PathBuf::from(".");
    }
    log::debug!("Output directory: {}", config.output_dir(base_dir).display());
}
