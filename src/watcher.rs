use anyhow::{Context, Result};
use glob::Pattern;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::config::Config;
use crate::extractor;
use crate::fs::FileAdapter;
use crate::locale::{self, SyncResult};

const SOURCE_EXTENSIONS: [&str; 7] = ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs"];

/// Watches the input directories and merges messages from changed files.
///
/// Merging is additive, so deleted files need no handling; the per-file
/// cache only avoids re-merging a file whose messages did not change.
/// Cache keys and event paths are canonical so both sides agree.
pub struct FileWatcher {
    config: Config,
    base_dir: PathBuf,
    debounce_duration: Duration,
    adapter: FileAdapter,
    /// `config.input` anchored at canonical directories
    input_patterns: Vec<Pattern>,
    file_cache: HashMap<PathBuf, Vec<String>>,
}

impl FileWatcher {
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        let input_patterns = config
            .input
            .iter()
            .filter_map(|pattern| anchored_pattern(pattern))
            .collect();
        Self {
            config,
            base_dir,
            debounce_duration: Duration::from_millis(300),
            adapter: FileAdapter::new(),
            input_patterns,
            file_cache: HashMap::new(),
        }
    }

    /// Run the file watcher, blocking until interrupted
    pub fn run(&mut self) -> Result<()> {
        let (tx, rx) = channel();

        let mut debouncer = new_debouncer(self.debounce_duration, tx)
            .context("Failed to create file watcher")?;

        let watch_dirs = compute_watch_dirs(&self.config.input);
        if watch_dirs.is_empty() {
            anyhow::bail!("No valid directories found to watch from input patterns");
        }

        for dir in &watch_dirs {
            println!("Watching: {}", dir.display());
            debouncer
                .watcher()
                .watch(dir, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch directory: {}", dir.display()))?;
        }

        println!("\nWatching for changes... (Ctrl+C to stop)\n");

        self.full_extract()?;

        // Ends when the debouncer's channel closes
        while let Ok(result) = rx.recv() {
            self.handle_events(result);
        }

        Ok(())
    }

    /// Whether a canonical path is a source file `extract` would scan
    fn should_process_file(&self, path: &Path) -> bool {
        let has_source_ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
            .unwrap_or(false);
        has_source_ext
            && !self.config.is_excluded(path)
            && self
                .input_patterns
                .iter()
                .any(|pattern| pattern.matches_path(path))
    }

    /// Initial extraction of every input file
    pub fn full_extract(&mut self) -> Result<()> {
        println!("--- Initial extraction ---");

        let extraction =
            extractor::extract_from_glob(&self.config, &self.base_dir, Some(&self.adapter))?;

        for file in &extraction.files {
            self.file_cache
                .insert(canonical(Path::new(&file.file_path)), file.messages.clone());
        }

        let total_added: usize = extraction
            .sync_results
            .iter()
            .map(|r| r.added_keys.len())
            .sum();
        println!("  Files: {}", extraction.files_scanned);
        println!("  Messages: {}", extraction.unique_messages().len());
        if total_added > 0 {
            println!("  New keys added: {}", total_added);
        }
        for error in &extraction.errors {
            log::warn!("{}: {}", error.file_path, error.message);
        }
        println!("--- Ready ---\n");

        Ok(())
    }

    fn handle_events(&mut self, result: DebounceEventResult) {
        let events = match result {
            Ok(events) => events,
            Err(error) => {
                log::error!("Watch error: {:?}", error);
                return;
            }
        };

        let mut changed: Vec<PathBuf> = events
            .into_iter()
            .filter(|event| event.path.is_file())
            .map(|event| canonical(&event.path))
            .filter(|path| self.should_process_file(path))
            .collect();
        changed.sort();
        changed.dedup();

        if changed.is_empty() {
            return;
        }

        println!("--- Change detected ---");
        for path in &changed {
            println!("  Modified: {}", path.display());
        }

        let results = self.incremental_extract(&changed);
        let total_added: usize = results.iter().map(|r| r.added_keys.len()).sum();
        if total_added > 0 {
            println!("  Added {} new key(s)", total_added);
        }
        for result in results.iter().filter(|r| !r.is_ok()) {
            println!(
                "  Failed: {} ({})",
                result.file_path,
                result.error.as_deref().unwrap_or_default()
            );
        }

        println!("--- Sync complete ---\n");
    }

    /// Re-extract the changed files and merge those whose messages changed
    pub fn incremental_extract(&mut self, changed_files: &[PathBuf]) -> Vec<SyncResult> {
        use rayon::prelude::*;

        let extracted: Vec<(PathBuf, Vec<String>)> = changed_files
            .par_iter()
            .filter_map(|path| match extractor::extract_from_file(path, &self.config) {
                Ok(messages) => Some((canonical(path), messages)),
                Err(e) => {
                    log::warn!("{:#}", e);
                    None
                }
            })
            .collect();

        let mut results = Vec::new();
        for (path, messages) in extracted {
            if self.file_cache.get(&path) == Some(&messages) {
                continue;
            }
            results.extend(locale::sync_messages(
                &self.config,
                &self.base_dir,
                &messages,
                &self.adapter,
            ));
            if messages.is_empty() {
                self.file_cache.remove(&path);
            } else {
                self.file_cache.insert(path, messages);
            }
        }
        results
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn has_glob_meta(component: &Component) -> bool {
    component
        .as_os_str()
        .to_string_lossy()
        .contains(&['*', '?', '[', '{'][..])
}

/// Split a glob into its literal leading directories and the rest,
/// e.g. `/app/src/**/*.tsx` -> (`/app/src`, `**/*.tsx`). Root and prefix
/// components are kept.
fn split_glob_prefix(pattern: &str) -> (PathBuf, PathBuf) {
    let mut components = Path::new(pattern).components().peekable();
    let mut prefix = PathBuf::new();
    while let Some(component) = components.next_if(|c| !has_glob_meta(c)) {
        prefix.push(component);
    }
    (prefix, components.collect())
}

/// An input glob rewritten against the canonical form of its literal
/// prefix, so it matches the canonical paths file events carry
fn anchored_pattern(pattern: &str) -> Option<Pattern> {
    let (prefix, rest) = split_glob_prefix(pattern);
    let prefix = if prefix.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        prefix
    };

    let base = Pattern::escape(&canonical(&prefix).to_string_lossy());
    let anchored = if rest.as_os_str().is_empty() {
        base
    } else {
        format!("{}/{}", base.trim_end_matches('/'), rest.to_string_lossy())
    };

    match Pattern::new(&anchored) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            log::warn!("Invalid glob pattern: {}: {}", pattern, e);
            None
        }
    }
}

/// Directories to watch: the literal prefix of every input pattern,
/// e.g. `src/**/*.tsx` -> `src`
pub fn compute_watch_dirs(patterns: &[String]) -> Vec<PathBuf> {
    let mut dirs = HashSet::new();

    for pattern in patterns {
        let (mut prefix, _) = split_glob_prefix(pattern);
        if prefix.as_os_str().is_empty() {
            prefix.push(".");
        }
        // A pattern without wildcards names a file
        if prefix.is_file() {
            prefix = prefix
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
        }

        if prefix.is_dir() {
            dirs.insert(canonical(&prefix));
        }
    }

    let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
    dirs.sort();
    dirs
}
