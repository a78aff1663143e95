//! Directory dump parser
//!
//! Reads the JSON object dumps exported from the directory (one file each
//! for users, groups and computers, routed by file name) and normalizes
//! every object into a canonical directory record. A malformed object is
//! skipped with a diagnostic; a file that is not valid JSON at all is fatal
//! for the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::common_types::dn_leaf_name;
use crate::errors::{AuditError, Result};
use crate::ldap_helpers::DumpObjectExt;
use crate::model::PrincipalKind;
use crate::records::{DirectoryGroupRecord, DirectoryPrincipalRecord};

/// All canonical records recovered from a directory dump
#[derive(Debug, Default)]
pub struct DirectoryRecords {
    pub principals: Vec<DirectoryPrincipalRecord>,
    pub groups: Vec<DirectoryGroupRecord>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
enum DumpFileKind {
    Users,
    Groups,
    Computers,
}

/// Route a dump file to its parser by file name
fn classify(path: &Path) -> Option<DumpFileKind> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains("users") {
        Some(DumpFileKind::Users)
    } else if name.contains("groups") {
        Some(DumpFileKind::Groups)
    } else if name.contains("computers") {
        Some(DumpFileKind::Computers)
    } else {
        None
    }
}

/// Parse every recognized dump file into canonical records
///
/// Fails with [`AuditError::EmptySource`] when the whole dump yields no
/// valid record, since an empty directory source would leave every
/// downstream finding silently incomplete.
pub fn parse_directory_dumps(paths: &[PathBuf]) -> Result<DirectoryRecords> {
    let mut records = DirectoryRecords::default();

    for path in paths {
        let Some(kind) = classify(path) else {
            debug!(path = %path.display(), "unrecognized dump file name, skipping");
            continue;
        };
        let text = fs::read_to_string(path)?;
        let objects: Vec<Value> =
            serde_json::from_str(&text).map_err(|err| AuditError::SourceFormat {
                path: path.clone(),
                reason: err.to_string(),
            })?;

        for obj in &objects {
            let parsed = match kind {
                DumpFileKind::Users => parse_principal(obj, PrincipalKind::User)
                    .map(|r| records.principals.push(r))
                    .is_some(),
                DumpFileKind::Computers => parse_principal(obj, PrincipalKind::Computer)
                    .map(|r| records.principals.push(r))
                    .is_some(),
                DumpFileKind::Groups => parse_group(obj)
                    .map(|r| records.groups.push(r))
                    .is_some(),
            };
            if !parsed {
                warn!(path = %path.display(), "directory object without a name, skipping");
                records.skipped += 1;
            }
        }
    }

    if records.principals.is_empty() && records.groups.is_empty() {
        let path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<directory dump>"));
        return Err(AuditError::EmptySource { path });
    }
    Ok(records)
}

fn parse_principal(obj: &Value, kind: PrincipalKind) -> Option<DirectoryPrincipalRecord> {
    let sam_account_name = obj.get_optional_attr("sAMAccountName")?;
    Some(DirectoryPrincipalRecord {
        kind,
        sam_account_name,
        distinguished_name: obj.get_string_attr("distinguishedName"),
        object_sid: obj.get_string_attr("objectSid"),
        spn_list: obj.get_multi_attr("servicePrincipalName"),
        member_of: obj
            .get_multi_attr("memberOf")
            .iter()
            .map(|dn| dn_leaf_name(dn))
            .collect(),
        user_account_control: obj.get_u32_attr("userAccountControl"),
        description: obj.get_string_attr("description"),
    })
}

fn parse_group(obj: &Value) -> Option<DirectoryGroupRecord> {
    let name = obj
        .get_optional_attr("name")
        .or_else(|| obj.get_optional_attr("sAMAccountName"))?;
    Some(DirectoryGroupRecord {
        name,
        object_sid: obj.get_string_attr("objectSid"),
        members: obj
            .get_multi_attr("member")
            .iter()
            .map(|dn| dn_leaf_name(dn))
            .collect(),
        member_of: obj
            .get_multi_attr("memberOf")
            .iter()
            .map(|dn| dn_leaf_name(dn))
            .collect(),
    })
}
