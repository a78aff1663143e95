//! Secrets dump parser
//!
//! Reads the line-oriented offline secrets dump. Two sub-formats share the
//! colon-delimited layout:
//!
//! ```text
//! corp.local\Administrator:500:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::
//! corp.local\svc-backup:CLEARTEXT:P@ssw0rd:with:colons
//! ```
//!
//! Hashes are exactly 32 hex characters. Cleartext passwords may contain
//! colons, so those lines are split on the first two delimiters only.
//! Companion `.kerberos` files are not credential material and are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common_types::is_hex_hash;
use crate::errors::{AuditError, Result};
use crate::records::SecretsEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretsFileKind {
    Hashes,
    Cleartext,
}

fn classify(path: &Path) -> Option<SecretsFileKind> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".kerberos") {
        None
    } else if name.ends_with(".cleartext") {
        Some(SecretsFileKind::Cleartext)
    } else {
        Some(SecretsFileKind::Hashes)
    }
}

/// Parse all secrets-dump files into canonical entries
///
/// Malformed lines are skipped with a diagnostic. A dump that yields no
/// valid entries at all is a hard failure.
pub fn parse_secrets_dumps(paths: &[PathBuf]) -> Result<Vec<SecretsEntry>> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for path in paths {
        let Some(kind) = classify(path) else {
            debug!(path = %path.display(), "skipping kerberos key file");
            continue;
        };
        let text = fs::read_to_string(path)?;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line, kind) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(
                        path = %path.display(),
                        line = lineno + 1,
                        "malformed secrets entry, skipping"
                    );
                    skipped += 1;
                }
            }
        }
    }

    if entries.is_empty() {
        let path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<secrets dump>"));
        return Err(AuditError::EmptySource { path });
    }
    if skipped > 0 {
        debug!(skipped, "secrets lines dropped");
    }
    Ok(entries)
}

fn parse_line(line: &str, kind: SecretsFileKind) -> Option<SecretsEntry> {
    match kind {
        SecretsFileKind::Hashes => parse_hash_line(line),
        SecretsFileKind::Cleartext => parse_cleartext_line(line),
    }
}

/// `qualifiedName:rid:lmHash:ntHash` with an optional `:::` tail
fn parse_hash_line(line: &str) -> Option<SecretsEntry> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() < 4 {
        return None;
    }
    let (name, rid, lm, nt) = (parts[0], parts[1], parts[2], parts[3]);
    if name.is_empty() || !is_hex_hash(lm) || !is_hex_hash(nt) {
        return None;
    }
    Some(SecretsEntry {
        qualified_name: name.to_string(),
        rid: rid.parse().ok(),
        lm_hash: Some(lm.to_lowercase()),
        nt_hash: Some(nt.to_lowercase()),
        cleartext_password: None,
    })
}

/// `qualifiedName:CLEARTEXT:password` where the password keeps its colons
fn parse_cleartext_line(line: &str) -> Option<SecretsEntry> {
    let mut parts = line.splitn(3, ':');
    let name = parts.next()?;
    let marker = parts.next()?;
    let password = parts.next()?;
    if name.is_empty() || marker != "CLEARTEXT" {
        return None;
    }
    Some(SecretsEntry {
        qualified_name: name.to_string(),
        rid: None,
        lm_hash: None,
        nt_hash: None,
        cleartext_password: Some(password.to_string()),
    })
}
