// Folder scanning and parallel, failure-isolated decoding

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::decode::{CursorFormat, DecodeError, DecodeOptions, ParsedCursor, decode_file};

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub decode: DecodeOptions,
    pub recursive: bool,
    /// 0 uses the global rayon pool.
    pub thread_count: usize,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decode_options(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_thread_count(mut self, count: usize) -> Self {
        self.thread_count = count;
        self
    }
}

#[derive(Debug)]
pub struct BatchEntry {
    pub path: PathBuf,
    /// File name without extension.
    pub name: String,
    pub result: Result<ParsedCursor, DecodeError>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Lists `.cur`/`.ani` files under `dir`, sorted by file name.
pub fn scan_cursor_dir(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut cursor_files = Vec::new();

    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && CursorFormat::from_path(path).is_some() {
            cursor_files.push(path.to_path_buf());
        }
    }

    Ok(cursor_files)
}

pub fn decode_files(paths: &[PathBuf], options: &DecodeOptions) -> Vec<BatchEntry> {
    paths
        .par_iter()
        .map(|path| decode_entry(path, options))
        .collect()
}

fn decode_entry(path: &Path, options: &DecodeOptions) -> BatchEntry {
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("cursor")
        .to_string();

    let result = decode_file(path, options);
    match &result {
        Ok(cursor) => log::debug!(
            "Decoded {}: {}x{}, {} frame(s)",
            path.display(),
            cursor.width,
            cursor.height,
            cursor.frame_count
        ),
        Err(e) => log::warn!("Failed to decode {}: {}", path.display(), e),
    }

    BatchEntry {
        path: path.to_path_buf(),
        name,
        result,
    }
}

/// Decodes every cursor in `dir`. One bad file never aborts the batch;
/// its error is kept in its entry instead.
pub fn decode_folder(dir: &Path, options: &BatchOptions) -> Result<Vec<BatchEntry>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let cursor_files = scan_cursor_dir(dir, options.recursive)?;
    log::info!(
        "Found {} cursor files in {}",
        cursor_files.len(),
        dir.display()
    );

    let entries = if options.thread_count > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.thread_count)
            .build()
            .context("Failed to build decoder thread pool")?;
        pool.install(|| decode_files(&cursor_files, &options.decode))
    } else {
        decode_files(&cursor_files, &options.decode)
    };

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    if failed > 0 {
        log::warn!(
            "Completed with {} successes and {} failures",
            entries.len() - failed,
            failed
        );
    } else {
        log::info!("Decoded {} cursors", entries.len());
    }

    Ok(entries)
}
