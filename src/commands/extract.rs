use anyhow::{bail, Result};
use std::path::Path;

use crate::config::Config;
use crate::extractor;
use crate::fs::{BufferedAdapter, FileAdapter};
use crate::locale::SyncResult;

/// Extract every input file and merge its messages into each language file.
///
/// By default each file is merged as soon as it is traversed, through the
/// locking file adapter. With `buffered`, merges are collected in memory
/// and each language file is written once at the end.
pub fn run(config: &Config, base_dir: &Path, buffered: bool) -> Result<()> {
    println!("=== i18n-extractor extract ===\n");

    println!("Configuration:");
    println!("  Input patterns: {:?}", config.input);
    println!("  Output: {}", config.output_dir(base_dir).display());
    println!("  Languages: {:?}", config.langs);
    println!("  Strict: {}", config.strict);
    println!();

    if config.langs.is_empty() {
        log::warn!("No languages configured; messages will be listed but not written");
    }

    let (extraction, sync_results) = if buffered {
        let adapter = BufferedAdapter::new(FileAdapter::new());
        let extraction = extractor::extract_from_glob(config, base_dir, Some(&adapter))?;
        let sync_results = adapter.flush();
        (extraction, sync_results)
    } else {
        let adapter = FileAdapter::new();
        let mut extraction = extractor::extract_from_glob(config, base_dir, Some(&adapter))?;
        let sync_results = std::mem::take(&mut extraction.sync_results);
        (extraction, sync_results)
    };

    if !extraction.errors.is_empty() {
        eprintln!("Extraction errors:");
        for error in &extraction.errors {
            eprintln!("  {}: {}", error.file_path, error.message);
        }
        eprintln!();
    }

    if extraction.files.is_empty() {
        println!("No messages found.");
        return Ok(());
    }

    println!("Extracted messages by file:");
    println!("{}", "-".repeat(60));
    for file in &extraction.files {
        println!("\n{}", file.file_path);
        for message in &file.messages {
            println!("  - {}", message);
        }
    }

    println!("\n{}", "-".repeat(60));
    println!("\nExtraction Summary:");
    println!("  Files scanned: {}", extraction.files_scanned);
    println!("  Files with messages: {}", extraction.files.len());
    println!("  Unique messages found: {}", extraction.unique_messages().len());

    report_sync(&sync_results)
}

fn report_sync(sync_results: &[SyncResult]) -> Result<()> {
    println!("\nSyncing to locale files...");

    let mut total_added = 0;
    for result in sync_results.iter().filter(|r| !r.added_keys.is_empty()) {
        println!(
            "  {} - added {} new key(s)",
            result.file_path,
            result.added_keys.len()
        );
        total_added += result.added_keys.len();
    }
    if total_added == 0 {
        println!("  No new keys added (all keys already exist).");
    }

    let failed: Vec<&SyncResult> = sync_results.iter().filter(|r| !r.is_ok()).collect();
    if !failed.is_empty() {
        for result in &failed {
            eprintln!(
                "  Failed: {} ({})",
                result.file_path,
                result.error.as_deref().unwrap_or_default()
            );
        }
        bail!("{} locale file write(s) failed", failed.len());
    }

    println!("\nDone!");
    Ok(())
}
