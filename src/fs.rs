use anyhow::{Context, Result};
use fs2::FileExt;
use indexmap::IndexSet;
use std::collections::{BTreeMap, HashMap};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::locale::{self, Locale, SyncResult};

/// Storage for per-language resources.
///
/// `read` never fails: a missing or malformed resource reads as empty so a
/// first run can create files from scratch. `merge_into` is the unit the
/// extractor calls at the end of every file; implementations must make it
/// safe to call concurrently for the same path.
pub trait LocaleAdapter: Send + Sync {
    /// Read a resource, empty if missing or malformed
    fn read(&self, path: &Path) -> Locale;

    /// Persist a resource
    fn write(&self, path: &Path, locale: &Locale) -> Result<()>;

    /// Read, merge and write back only when keys were added.
    /// Returns the keys that were added.
    fn merge_into(&self, path: &Path, messages: &[String]) -> Result<Vec<String>> {
        match locale::merge(self.read(path), messages) {
            Some(merged) => {
                self.write(path, &merged.locale)?;
                Ok(merged.added)
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Resources stored as JSON files.
///
/// Each read-merge-write cycle holds an in-process mutex for the path plus an
/// exclusive `fs2` lock on a per-resource file in the temp dir, so neither
/// threads nor separate processes can interleave updates to one resource. Writes go
/// to a temp file in the same directory that is then renamed over the target.
#[derive(Debug, Default)]
pub struct FileAdapter {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn path_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }
}

/// Cross-process lock for a resource. It lives in the system temp dir so
/// the output directory only ever holds the resources themselves. The name is
/// derived from the resource's canonical path, so concurrent runs of this
/// binary agree on it whatever path spelling they were given.
fn lock_file_path(path: &Path) -> PathBuf {
    use std::hash::{Hash, Hasher};

    let canonical = match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    };
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    canonical.hash(&mut hasher);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("i18n-extractor-{}-{:016x}.lock", name, hasher.finish()))
}

impl LocaleAdapter for FileAdapter {
    fn read(&self, path: &Path) -> Locale {
        locale::read_locale_file(path)
    }

    fn write(&self, path: &Path, locale: &Locale) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        let content = locale::to_json_string(locale)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write locale file: {}", path.display()))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write locale file: {}", path.display()))?;

        log::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn merge_into(&self, path: &Path, messages: &[String]) -> Result<Vec<String>> {
        let path_lock = self.path_lock(path);
        let _guard = path_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let lock_path = lock_file_path(path);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        lock_file
            .lock_exclusive()
            .with_context(|| format!("Failed to lock: {}", lock_path.display()))?;

        // Both locks are released when `lock_file` and `_guard` drop
        match locale::merge(self.read(path), messages) {
            Some(merged) => self.write(path, &merged.locale).map(|_| merged.added),
            None => Ok(Vec::new()),
        }
    }
}

/// Defers all writes: merges are accumulated per resource in memory and
/// applied with one read-merge-write per resource on [`BufferedAdapter::flush`].
///
/// `merge_into` never touches the inner adapter and reports no added keys;
/// the real additions are reported by `flush`.
#[derive(Debug, Default)]
pub struct BufferedAdapter<A: LocaleAdapter> {
    inner: A,
    pending: Mutex<BTreeMap<PathBuf, IndexSet<String>>>,
}

impl<A: LocaleAdapter> BufferedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of resources with buffered keys
    pub fn pending_files(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Merge everything buffered into the inner adapter, one write per
    /// resource at most. A failing resource does not stop the others.
    pub fn flush(&self) -> Vec<SyncResult> {
        let pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );

        pending
            .into_iter()
            .map(|(path, keys)| {
                let keys: Vec<String> = keys.into_iter().collect();
                let lang = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                SyncResult::from_outcome(lang, &path, self.inner.merge_into(&path, &keys))
            })
            .collect()
    }
}

impl<A: LocaleAdapter> LocaleAdapter for BufferedAdapter<A> {
    fn read(&self, path: &Path) -> Locale {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, locale: &Locale) -> Result<()> {
        self.inner.write(path, locale)
    }

    fn merge_into(&self, path: &Path, messages: &[String]) -> Result<Vec<String>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending
            .entry(path.to_path_buf())
            .or_default()
            .extend(messages.iter().filter(|m| !m.is_empty()).cloned());
        Ok(Vec::new())
    }
}


#[cfg(test)]
mod tests {
    use super::mock::InMemoryAdapter;
    use super::*;
    use serde_json::Value;

    fn messages(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_file_adapter_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("locales/en.json");
        let adapter = FileAdapter::new();

        let added = adapter
            .merge_into(&path, &messages(&["hello", "world"]))
            .unwrap();
        assert_eq!(added, vec!["hello", "world"]);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"hello\": \"hello\",\n  \"world\": \"world\"\n}\n");
    }

    #[test]
    fn test_file_adapter_no_change_skips_write() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("en.json");
        std::fs::write(&path, "{\"hello\":\"Hallo\"}").unwrap();
        let adapter = FileAdapter::new();

        let added = adapter.merge_into(&path, &messages(&["hello"])).unwrap();
        assert!(added.is_empty());
        // Untouched, including its compact formatting
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"hello\":\"Hallo\"}"
        );
    }

    #[test]
    fn test_file_adapter_concurrent_merges_keep_all_keys() {
        use rayon::prelude::*;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("en.json");
        let adapter = FileAdapter::new();

        (0..32).into_par_iter().for_each(|i| {
            adapter
                .merge_into(&path, &[format!("key{}", i)])
                .unwrap();
        });

        let locale = adapter.read(&path);
        assert_eq!(locale.len(), 32);
        assert_eq!(locale.get("key7"), Some(&Value::String("key7".to_string())));
    }

    #[test]
    fn test_buffered_adapter_defers_writes() {
        let buffered = BufferedAdapter::new(InMemoryAdapter::new());
        let en = Path::new("locales/en.json");
        let ja = Path::new("locales/ja.json");

        buffered.merge_into(en, &messages(&["a", "b"])).unwrap();
        buffered.merge_into(en, &messages(&["b", "c", ""])).unwrap();
        buffered.merge_into(ja, &messages(&["a"])).unwrap();
        assert_eq!(buffered.inner.write_count(), 0);
        assert_eq!(buffered.pending_files(), 2);

        let results = buffered.flush();
        assert_eq!(results.len(), 2);
        assert_eq!(buffered.inner.write_count(), 2);
        assert_eq!(buffered.pending_files(), 0);

        let en_result = results.iter().find(|r| r.lang == "en").unwrap();
        assert_eq!(en_result.added_keys, vec!["a", "b", "c"]);
        assert!(en_result.error.is_none());
    }

    #[test]
    fn test_buffered_adapter_flush_merges_with_existing() {
        let inner = InMemoryAdapter::new();
        inner.add_file("en.json", r#"{ "a": "A" }"#);
        let buffered = BufferedAdapter::new(inner);

        buffered.merge_into(Path::new("en.json"), &messages(&["a"])).unwrap();
        let results = buffered.flush();
        assert!(results[0].added_keys.is_empty());
        assert_eq!(buffered.inner.write_count(), 0);
    }

    #[test]
    fn test_lock_file_path_outside_output() {
        let tmp = tempfile::tempdir().unwrap();
        let en = tmp.path().join("en.json");
        let lock = lock_file_path(&en);

        assert!(!lock.starts_with(tmp.path()));
        assert_eq!(lock, lock_file_path(&tmp.path().join("./en.json")));
        assert_ne!(lock, lock_file_path(&tmp.path().join("ja.json")));
    }

    #[test]
    fn test_output_dir_holds_only_resources() {
        let tmp = tempfile::tempdir().unwrap();
        let adapter = FileAdapter::new();
        adapter
            .merge_into(&tmp.path().join("en.json"), &messages(&["a"]))
            .unwrap();
        adapter
            .merge_into(&tmp.path().join("ja.json"), &messages(&["a"]))
            .unwrap();

        let mut names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["en.json", "ja.json"]);
    }
}
