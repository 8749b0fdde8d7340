use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "i18n.config.json";

/// Configuration for i18n-extractor
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Require an import from `extract.package` before a file is scanned
    #[serde(default = "default_strict")]
    pub strict: bool,

    /// Target language codes, one resource file each (e.g., ["en", "ja"])
    #[serde(default)]
    pub langs: Vec<String>,

    /// Directory for resource files, relative to the config base directory
    #[serde(default = "default_output")]
    pub output: String,

    /// Names the extractor looks for
    #[serde(default)]
    pub extract: ExtractTargets,

    /// Glob patterns for input files (e.g., ["src/**/*.tsx"])
    #[serde(default = "default_input")]
    pub input: Vec<String>,

    /// Path markers; any file whose path contains one is never scanned
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

/// The `extract` section. Missing fields fall back to their defaults, so a
/// partial override such as `{ "package": "my-i18n" }` keeps the other names.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractTargets {
    /// Module whose import gates strict-mode extraction
    pub package: String,
    /// Object in `instance.function('...')` calls
    pub instance: String,
    /// Hook whose destructured result exposes the translate function
    pub hook: String,
    /// Translate function name
    pub function: String,
    /// Marker component name
    pub component: String,
}

impl Default for ExtractTargets {
    fn default() -> Self {
        Self {
            package: "@scope/i18n".to_string(),
            instance: "i18n".to_string(),
            hook: "useTranslation".to_string(),
            function: "t".to_string(),
            component: "Trans".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("extract.{0} must not be empty")]
    EmptyTarget(&'static str),
    #[error("language codes must not be empty")]
    EmptyLanguage,
    #[error("output directory must not be empty")]
    EmptyOutput,
}

fn default_strict() -> bool {
    true
}

fn default_output() -> String {
    "./locales".to_string()
}

fn default_input() -> Vec<String> {
    ["ts", "tsx", "js", "jsx"]
        .iter()
        .map(|ext| format!("src/**/*.{}", ext))
        .collect()
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            langs: Vec::new(),
            output: default_output(),
            extract: ExtractTargets::default(),
            input: default_input(),
            exclude: default_exclude(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_json_string(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json_str).context("Failed to parse config JSON string")?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load from the given path, then the default config file, or
    /// return the default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let targets = [
            ("package", &self.extract.package),
            ("instance", &self.extract.instance),
            ("hook", &self.extract.hook),
            ("function", &self.extract.function),
            ("component", &self.extract.component),
        ];
        for (name, value) in targets {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyTarget(name));
            }
        }
        if self.langs.iter().any(|lang| lang.trim().is_empty()) {
            return Err(ConfigError::EmptyLanguage);
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::EmptyOutput);
        }
        Ok(())
    }

    /// Resource directory resolved against the host-supplied base directory
    pub fn output_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.output)
    }

    /// `<base>/<output>/<lang>.json`
    pub fn locale_path(&self, base_dir: &Path, lang: &str) -> PathBuf {
        self.output_dir(base_dir).join(format!("{}.json", lang))
    }

    /// Whether a source path is vendored code that must never be scanned
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.exclude
            .iter()
            .filter(|marker| !marker.is_empty())
            .any(|marker| path.contains(marker.as_str()))
    }
}

/// Directory the `output` option is resolved against: the config file's
/// parent, or the working directory when no file was given.
pub fn base_dir_for(config_path: Option<&Path>) -> PathBuf {
    config_path
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
