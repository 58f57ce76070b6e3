use anyhow::Result;
use ignore::{DirEntry, WalkBuilder};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::constants::constants;

pub struct Scanner {
    recursive: bool,
    exclude_dirs: Vec<String>,
}

impl Scanner {
    pub fn new(recursive: bool) -> Self {
        Self {
            recursive,
            exclude_dirs: constants::IGNORED_DIRECTORIES
                .iter()
                .map(|dir| dir.to_string())
                .collect(),
        }
    }

    /// All `.vtt` files in `folder`, sorted by path.
    ///
    /// Only direct children are considered unless the scanner is recursive.
    /// Hidden files and gitignored files are included.
    pub fn scan(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        let mut builder = WalkBuilder::new(folder);
        builder.standard_filters(false).follow_links(true);
        if !self.recursive {
            builder.max_depth(Some(1));
        }

        let exclude_dirs = self.exclude_dirs.clone();
        builder.filter_entry(move |entry| !is_excluded(entry, &exclude_dirs));

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_some_and(|ft| ft.is_file()) && has_vtt_extension(entry.path()) {
                debug!("Found subtitle file: {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

fn is_excluded(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    exclude_dirs.iter().any(|dir| *dir == name)
}

fn has_vtt_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            name.to_string_lossy()
                .to_lowercase()
                .ends_with(&format!(".{}", constants::INPUT_EXTENSION))
        })
        .unwrap_or(false)
}
