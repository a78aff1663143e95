//! Canonical record shapes
//!
//! Each source-specific record is normalized into one of these shapes before
//! it reaches the reconciliation pipeline. No cross-source logic lives here.

use serde::{Deserialize, Serialize};

use crate::model::PrincipalKind;

/// A principal as seen in the directory dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryPrincipalRecord {
    pub kind: PrincipalKind,
    pub sam_account_name: String,
    pub distinguished_name: String,
    pub object_sid: String,
    pub spn_list: Vec<String>,
    pub member_of: Vec<String>,
    pub user_account_control: u32,
    pub description: String,
}

/// A group as seen in the directory dump
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryGroupRecord {
    pub name: String,
    pub object_sid: String,
    pub members: Vec<String>,
    pub member_of: Vec<String>,
}

/// One line of the secrets dump: either a hash pair or a cleartext password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretsEntry {
    /// Account name as sighted, possibly `DOMAIN\name`-qualified
    pub qualified_name: String,
    pub rid: Option<u32>,
    pub lm_hash: Option<String>,
    pub nt_hash: Option<String>,
    pub cleartext_password: Option<String>,
}

impl SecretsEntry {
    /// The unqualified account name used as the merge key
    pub fn account_name(&self) -> &str {
        self.qualified_name
            .rsplit('\\')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

/// One line of cracking output: NT hash and the recovered password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrackedHashEntry {
    pub nt_hash: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_name_strips_domain_prefix() {
        let entry = SecretsEntry {
            qualified_name: "corp.local\\alice".to_string(),
            rid: Some(1104),
            lm_hash: None,
            nt_hash: None,
            cleartext_password: None,
        };
        assert_eq!(entry.account_name(), "alice");
    }

    #[test]
    fn test_account_name_without_prefix() {
        let entry = SecretsEntry {
            qualified_name: "alice".to_string(),
            rid: None,
            lm_hash: None,
            nt_hash: None,
            cleartext_password: None,
        };
        assert_eq!(entry.account_name(), "alice");
    }
}
