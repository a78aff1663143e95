//! Domain object model
//!
//! Entities owned by the domain graph: principals (users and computers) and
//! groups. Identity attributes come from the directory dump, credential
//! material from the secrets dump, cracked passwords from the cracking
//! output; the graph merges all three onto the same entity.

use serde::{Deserialize, Serialize};

use crate::common_types::UserAccountControlFlags;

/// Account suffix that marks a machine account (`WS01$`)
pub const COMPUTER_ACCOUNT_SUFFIX: char = '$';

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Computer,
}

/// A user or computer account
///
/// The account name is the primary external key. The SID, once known, is
/// immutable. Credential fields stay `None` until the matching source has
/// been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub kind: PrincipalKind,
    pub sam_account_name: String,
    pub distinguished_name: Option<String>,
    pub object_sid: Option<String>,
    pub spn_list: Vec<String>,
    pub user_account_control: u32,
    pub enabled: bool,
    pub member_of: Vec<String>,
    pub description: Option<String>,
    pub nt_hash: Option<String>,
    pub lm_hash: Option<String>,
    pub cleartext_password: Option<String>,
    pub cracked_password: Option<String>,
    /// Domain-qualified name the account was sighted under in the secrets
    /// dump (`corp.local\svc-backup`), kept for traceability
    pub qualified_name: Option<String>,
}

impl Principal {
    pub fn new(kind: PrincipalKind, sam_account_name: impl Into<String>) -> Self {
        Self {
            kind,
            sam_account_name: sam_account_name.into(),
            distinguished_name: None,
            object_sid: None,
            spn_list: Vec::new(),
            user_account_control: 0,
            enabled: true,
            member_of: Vec::new(),
            description: None,
            nt_hash: None,
            lm_hash: None,
            cleartext_password: None,
            cracked_password: None,
            qualified_name: None,
        }
    }

    pub fn has_spn(&self) -> bool {
        !self.spn_list.is_empty()
    }

    pub fn password_cracked(&self) -> bool {
        self.cracked_password.is_some()
    }

    pub fn uac(&self) -> UserAccountControlFlags {
        UserAccountControlFlags::from_value(self.user_account_control)
    }
}

/// A directory group
///
/// Members are stored by leaf name and may reference principals or nested
/// groups that were never seen in any source; such dangling references are
/// ignored by the membership resolver. The member graph must not be assumed
/// acyclic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub object_sid: Option<String>,
    pub members: Vec<String>,
    pub member_of: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_sid: None,
            members: Vec::new(),
            member_of: Vec::new(),
        }
    }
}

/// Decide the principal variant from the account name alone, used when an
/// account is first sighted outside the directory dump
pub fn kind_for_account_name(name: &str) -> PrincipalKind {
    if name.ends_with(COMPUTER_ACCOUNT_SUFFIX) {
        PrincipalKind::Computer
    } else {
        PrincipalKind::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_account_name() {
        assert_eq!(kind_for_account_name("WS01$"), PrincipalKind::Computer);
        assert_eq!(kind_for_account_name("alice"), PrincipalKind::User);
    }

    #[test]
    fn test_new_principal_is_enabled_without_credentials() {
        let p = Principal::new(PrincipalKind::User, "alice");
        assert!(p.enabled);
        assert!(!p.has_spn());
        assert!(!p.password_cracked());
        assert!(p.nt_hash.is_none());
    }
}
