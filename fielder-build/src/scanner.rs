//! Source file discovery.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

/// A Rust file found below a scan root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the scan root; the output mirrors it.
    pub relative: PathBuf,
}

/// Recursively collect `.rs` files under `root`, skipping `generated/` and
/// `target/` trees.
pub fn scan_directory(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        anyhow::bail!("scan path {} does not exist", root.display());
    }

    let mut files: Vec<SourceFile> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "rs"))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(root).ok()?.to_path_buf();
            let skipped = relative.components().any(|c| {
                let name = c.as_os_str();
                name == "generated" || name == "target"
            });
            (!skipped).then(|| SourceFile {
                path: e.path().to_path_buf(),
                relative,
            })
        })
        .collect();

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}
