use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::path::Path;

use crate::config::Config;
use crate::fs::LocaleAdapter;

/// One language's resource: message key -> translated text.
///
/// Values are kept as JSON so hand-edited files with non-string entries
/// survive a merge untouched.
pub type Locale = Map<String, Value>;

/// A resource that gained keys
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub locale: Locale,
    /// Keys added by this merge, in message order
    pub added: Vec<String>,
}

/// Add every message missing from `source`, using the message itself as the
/// untranslated value.
///
/// Messages are deduplicated and empty ones skipped. Existing keys are never
/// touched or removed. Returns `None` when nothing was added so the caller
/// can skip the write.
pub fn merge<S: AsRef<str>>(mut source: Locale, messages: &[S]) -> Option<Merged> {
    let unique: IndexSet<&str> = messages.iter().map(|m| m.as_ref()).collect();

    let mut added = Vec::new();
    for key in unique {
        if key.is_empty() || source.contains_key(key) {
            continue;
        }
        source.insert(key.to_string(), Value::String(key.to_string()));
        added.push(key.to_string());
    }

    if added.is_empty() {
        None
    } else {
        Some(Merged {
            locale: source,
            added,
        })
    }
}

/// Parse resource content. Blank, malformed or non-object content is treated
/// as an empty resource; malformed content is logged.
pub fn parse_locale(content: &str, path: &Path) -> Locale {
    if content.trim().is_empty() {
        return Locale::new();
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!(
                "Locale file is not a JSON object, starting empty: {}",
                path.display()
            );
            Locale::new()
        }
        Err(e) => {
            log::warn!(
                "Invalid JSON in locale file, starting empty: {}: {}",
                path.display(),
                e
            );
            Locale::new()
        }
    }
}

/// Read a JSON locale file, returning an empty map if it doesn't exist or
/// can't be read
pub fn read_locale_file(path: &Path) -> Locale {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_locale(&content, path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Locale::new(),
        Err(e) => {
            log::warn!(
                "Failed to read locale file, starting empty: {}: {}",
                path.display(),
                e
            );
            Locale::new()
        }
    }
}

/// Pretty-printed JSON with two-space indentation and a trailing newline
pub fn to_json_string(locale: &Locale) -> Result<String> {
    let json = serde_json::to_string_pretty(locale).context("Failed to serialize locale")?;
    Ok(format!("{}\n", json))
}

/// Result of syncing messages into one language's resource
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncResult {
    pub lang: String,
    pub file_path: String,
    pub added_keys: Vec<String>,
    /// Set when the write for this language failed
    pub error: Option<String>,
}

impl SyncResult {
    pub fn from_outcome(lang: String, path: &Path, outcome: Result<Vec<String>>) -> Self {
        let file_path = path.display().to_string();
        match outcome {
            Ok(added_keys) => {
                if !added_keys.is_empty() {
                    log::debug!("{}: added {} key(s)", file_path, added_keys.len());
                }
                Self {
                    lang,
                    file_path,
                    added_keys,
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Failed to sync {}: {:#}", file_path, e);
                Self {
                    lang,
                    file_path,
                    added_keys: Vec::new(),
                    error: Some(format!("{:#}", e)),
                }
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Merge one file's messages into every configured language.
///
/// Languages are independent write units: a failure is recorded on that
/// language's result and the remaining languages are still processed.
pub fn sync_messages(
    config: &Config,
    base_dir: &Path,
    messages: &[String],
    adapter: &dyn LocaleAdapter,
) -> Vec<SyncResult> {
    if messages.is_empty() {
        return Vec::new();
    }

    config
        .langs
        .iter()
        .map(|lang| {
            let path = config.locale_path(base_dir, lang);
            SyncResult::from_outcome(lang.clone(), &path, adapter.merge_into(&path, messages))
        })
        .collect()
}
