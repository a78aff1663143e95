//! Dump discovery
//!
//! Resolves each command-line input into concrete dump files. An input may
//! be a single file, a directory (scanned recursively), or a zip archive
//! (matching entries are extracted to a scratch directory that lives as
//! long as the run). Archive entries are treated as untrusted: anything
//! that would escape the scratch directory is refused.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::errors::{AuditError, Result};

/// Dump files resolved from one input path
///
/// Holds the scratch directory for archive extraction so the files stay on
/// disk until the run is over.
#[derive(Debug)]
pub struct ResolvedDumps {
    pub files: Vec<PathBuf>,
    _scratch: Option<TempDir>,
}

/// Resolve the directory-dump input (`*.json` files)
pub fn resolve_directory_dump(path: &Path) -> Result<ResolvedDumps> {
    resolve(path, &|name| name.ends_with(".json"), "directory dump (.json)")
}

/// Resolve the secrets-dump input (files carrying `.ntds` in their name)
pub fn resolve_secrets_dump(path: &Path) -> Result<ResolvedDumps> {
    resolve(path, &|name| name.contains(".ntds"), "secrets dump (.ntds)")
}

fn resolve(
    path: &Path,
    matches: &dyn Fn(&str) -> bool,
    expected: &'static str,
) -> Result<ResolvedDumps> {
    let (mut files, scratch) = if path.is_file() {
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zip")) {
            let (scratch, files) = extract_matching(path, matches)?;
            (files, Some(scratch))
        } else {
            // An explicitly named file is taken as-is
            (vec![path.to_path_buf()], None)
        }
    } else if path.is_dir() {
        let mut files = Vec::new();
        collect_matching(path, matches, &mut files)?;
        (files, None)
    } else {
        return Err(AuditError::NoDumpFiles {
            path: path.to_path_buf(),
            expected,
        });
    };

    if files.is_empty() {
        return Err(AuditError::NoDumpFiles {
            path: path.to_path_buf(),
            expected,
        });
    }
    files.sort();
    debug!(input = %path.display(), count = files.len(), "resolved dump files");
    Ok(ResolvedDumps {
        files,
        _scratch: scratch,
    })
}

fn file_name_matches(path: &Path, matches: &dyn Fn(&str) -> bool) -> bool {
    path.file_name()
        .map(|n| matches(&n.to_string_lossy().to_lowercase()))
        .unwrap_or(false)
}

fn collect_matching(
    dir: &Path,
    matches: &dyn Fn(&str) -> bool,
    out: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_matching(&path, matches, out)?;
        } else if file_name_matches(&path, matches) {
            out.push(path);
        }
    }
    Ok(())
}

/// Extract archive entries matching the predicate into a scratch directory
fn extract_matching(
    zip_path: &Path,
    matches: &dyn Fn(&str) -> bool,
) -> Result<(TempDir, Vec<PathBuf>)> {
    let file = fs::File::open(zip_path)?;
    let mut archive = ZipArchive::new(file).map_err(|err| AuditError::Archive {
        path: zip_path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let scratch = tempfile::tempdir()?;
    let mut files = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|err| AuditError::Archive {
            path: zip_path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if !entry.is_file() {
            continue;
        }
        // enclosed_name refuses absolute paths and parent-dir traversal
        let Some(rel) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(entry = %entry.name(), "archive entry with unsafe path, skipping");
            continue;
        };
        if !file_name_matches(&rel, matches) {
            continue;
        }
        let dest = scratch.path().join(&rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&dest)?;
        io::copy(&mut entry, &mut out)?;
        files.push(dest);
    }

    Ok((scratch, files))
}
