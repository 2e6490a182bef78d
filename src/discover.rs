//! Benchmark discovery: deterministic enumeration of a suite's instances.
//!
//! Each discovery root is listed and sorted lexicographically on its own,
//! then roots are concatenated in suite-priority order (curated
//! sub-collection first, suite top-level second) without re-sorting across
//! roots. Suites whose benchmarks span several co-located files (`foo.c`,
//! `foo.prob`, `foo.cfg`) collapse to one entry per base name.

use crate::suite::SuiteKind;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One discovered benchmark instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRef {
    pub suite: SuiteKind,
    /// Benchmark path; sans extension when the suite is multi-file.
    pub path: PathBuf,
    /// Display identifier, the file stem. Unique within one discovery pass.
    pub name: String,
}

/// List plain files directly under `root`, sorted lexicographically.
///
/// Subdirectories are excluded so a nested sub-collection is never
/// interleaved with its parent's files.
fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("benchmark directory not found: {}", root.display()),
        ));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Discover one root, collapsing co-located files by base name if asked.
fn discover_root(suite: SuiteKind, root: &Path, dedup: bool) -> io::Result<Vec<BenchmarkRef>> {
    let files = list_files(root)?;
    let mut refs: Vec<BenchmarkRef> = Vec::with_capacity(files.len());
    for file in files {
        let name = stem_of(&file);
        let path = if dedup { file.with_extension("") } else { file };
        if dedup && refs.iter().any(|r| r.path == path) {
            continue;
        }
        refs.push(BenchmarkRef { suite, path, name });
    }
    Ok(refs)
}

/// Enumerate a suite's benchmarks in deterministic order.
///
/// A missing directory is a fatal configuration error; no partial sequence
/// is produced.
pub fn discover(suite: SuiteKind, bench_root: &Path) -> io::Result<Vec<BenchmarkRef>> {
    let top = suite.bench_dir(bench_root);
    let dedup = suite.dedup_by_base_name();

    let mut refs = Vec::new();
    if let Some(sub) = suite.sub_collection() {
        refs.extend(discover_root(suite, &top.join(sub), dedup)?);
    }
    refs.extend(discover_root(suite, &top, dedup)?);
    Ok(refs)
}
