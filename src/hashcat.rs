//! Cracked-password parser
//!
//! Reads cracking output in `ntHash:password` form. The password may itself
//! contain colons, so lines are split on the first delimiter only.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::common_types::is_hex_hash;
use crate::errors::{AuditError, Result};
use crate::records::CrackedHashEntry;

/// Parse a cracking output file into canonical entries
pub fn parse_cracked_file(path: &Path) -> Result<Vec<CrackedHashEntry>> {
    let text = fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(entry) => entries.push(entry),
            None => warn!(
                path = %path.display(),
                line = lineno + 1,
                "malformed cracked-password entry, skipping"
            ),
        }
    }

    if entries.is_empty() {
        return Err(AuditError::EmptySource {
            path: PathBuf::from(path),
        });
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Option<CrackedHashEntry> {
    let (hash, password) = line.split_once(':')?;
    if !is_hex_hash(hash) {
        return None;
    }
    Some(CrackedHashEntry {
        nt_hash: hash.to_lowercase(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_line() {
        let entry = parse_line("8846f7eaee8fb117ad06bdd830b7586c:password").unwrap();
        assert_eq!(entry.password, "password");
    }

    #[test]
    fn test_password_keeps_colons() {
        let entry = parse_line("8846f7eaee8fb117ad06bdd830b7586c:P@ssw0rd12:345").unwrap();
        assert_eq!(entry.password, "P@ssw0rd12:345");
    }

    #[test]
    fn test_reject_non_hash_prefix() {
        assert!(parse_line("notahash:password").is_none());
        assert!(parse_line("8846f7ea:password").is_none());
        assert!(parse_line("no delimiter at all").is_none());
    }

    #[test]
    fn test_file_with_only_bad_lines_is_a_hard_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cracked.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"garbage\nmore garbage\n").unwrap();

        let err = parse_cracked_file(&path).unwrap_err();
        assert!(matches!(err, AuditError::EmptySource { .. }));
    }

    #[test]
    fn test_mixed_file_keeps_valid_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cracked.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(
            b"8846f7eaee8fb117ad06bdd830b7586c:password\nbroken\n31d6cfe0d16ae931b73c59d7e0c089c0:\n",
        )
        .unwrap();

        let entries = parse_cracked_file(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].password, "");
    }
}
