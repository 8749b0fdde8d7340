use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::watcher::FileWatcher;

pub fn run(config: Config, base_dir: PathBuf) -> Result<()> {
    println!("=== i18n-extractor watch ===\n");
    let mut watcher = FileWatcher::new(config, base_dir);
    watcher.run()
}
