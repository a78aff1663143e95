//! Common Types Module
//!
//! Shared types and helpers used across parsers, the domain graph and the
//! finding modules: severity levels, UserAccountControl decoding, SID string
//! manipulation, NT hash computation and password masking for reports.

use md4::{Digest, Md4};
use serde::{Deserialize, Serialize};

/// Severity levels for security findings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingSeverity {
    /// Lowest severity - informational only
    Informational,
    /// Low severity
    Low,
    /// Medium severity
    Medium,
    /// High severity
    High,
    /// Highest severity - critical issue
    Critical,
}

impl FindingSeverity {
    /// Returns a numeric level for the severity
    ///
    /// Critical = 4, High = 3, Medium = 2, Low = 1, Informational = 0
    pub fn level(&self) -> u8 {
        match self {
            FindingSeverity::Critical => 4,
            FindingSeverity::High => 3,
            FindingSeverity::Medium => 2,
            FindingSeverity::Low => 1,
            FindingSeverity::Informational => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FindingSeverity::Critical => "Critical",
            FindingSeverity::High => "High",
            FindingSeverity::Medium => "Medium",
            FindingSeverity::Low => "Low",
            FindingSeverity::Informational => "Informational",
        }
    }
}

/// Counts of findings grouped by severity level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub informational: u32,
    pub total: u32,
}

impl SeverityCounts {
    /// Create counts from an iterator of severity levels
    pub fn from_iter<'a>(severities: impl Iterator<Item = &'a FindingSeverity>) -> Self {
        let mut counts = Self::default();
        for severity in severities {
            match severity {
                FindingSeverity::Critical => counts.critical += 1,
                FindingSeverity::High => counts.high += 1,
                FindingSeverity::Medium => counts.medium += 1,
                FindingSeverity::Low => counts.low += 1,
                FindingSeverity::Informational => counts.informational += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

/// Common User Account Control (UAC) flag constants
///
/// These are the standard UAC flags from Active Directory
pub mod uac_flags {
    /// Account is disabled
    pub const ACCOUNTDISABLE: u32 = 0x0002;
    /// Password is stored using reversible encryption
    pub const ENCRYPTED_TEXT_PASSWORD_ALLOWED: u32 = 0x80;
    /// Password never expires
    pub const DONT_EXPIRE_PASSWORD: u32 = 0x10000;
    /// Account is trusted for delegation (unconstrained)
    pub const TRUSTED_FOR_DELEGATION: u32 = 0x80000;
    /// Account doesn't require Kerberos pre-authentication (AS-REP roastable)
    pub const DONT_REQ_PREAUTH: u32 = 0x400000;
}

/// Helper struct for parsing UserAccountControl flags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAccountControlFlags {
    pub raw_value: u32,
    pub is_disabled: bool,
    pub password_never_expires: bool,
    pub is_asrep_roastable: bool,
    pub is_unconstrained_delegation: bool,
    pub reversible_encryption: bool,
}

impl UserAccountControlFlags {
    /// Parse UAC flags from a u32 value
    pub fn from_value(uac: u32) -> Self {
        Self {
            raw_value: uac,
            is_disabled: (uac & uac_flags::ACCOUNTDISABLE) != 0,
            password_never_expires: (uac & uac_flags::DONT_EXPIRE_PASSWORD) != 0,
            is_asrep_roastable: (uac & uac_flags::DONT_REQ_PREAUTH) != 0,
            is_unconstrained_delegation: (uac & uac_flags::TRUSTED_FOR_DELEGATION) != 0,
            reversible_encryption: (uac & uac_flags::ENCRYPTED_TEXT_PASSWORD_ALLOWED) != 0,
        }
    }

    /// Check if account is enabled (not disabled)
    pub fn is_enabled(&self) -> bool {
        !self.is_disabled
    }
}

/// Extract domain name from a distinguished name
///
/// `CN=John,OU=Users,DC=example,DC=com` becomes `example.com`.
pub fn extract_domain_from_dn(dn: &str) -> String {
    dn.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.to_uppercase().starts_with("DC=") {
                Some(&part[3..])
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Extract the leaf name from a distinguished name
///
/// `CN=Domain Admins,CN=Users,DC=corp,DC=local` becomes `Domain Admins`.
/// Plain names pass through unchanged.
pub fn dn_leaf_name(dn: &str) -> String {
    let first = dn.split(',').next().unwrap_or(dn);
    match first.split_once('=') {
        Some((_, name)) => name.trim().to_string(),
        None => first.trim().to_string(),
    }
}

/// Strip the trailing relative identifier from a SID, leaving the domain
/// prefix shared by every principal in the domain.
///
/// `S-1-5-21-1004336348-1177238915-682003330-512` becomes
/// `S-1-5-21-1004336348-1177238915-682003330`.
pub fn sid_domain_prefix(sid: &str) -> Option<String> {
    let idx = sid.rfind('-')?;
    if idx == 0 {
        return None;
    }
    Some(sid[..idx].to_string())
}

/// Compute the NT hash (MD4 over UTF-16LE) of a password
pub fn nt_hash_of(password: &str) -> String {
    let utf16: Vec<u8> = password
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    let mut hasher = Md4::new();
    hasher.update(&utf16);
    format!("{:x}", hasher.finalize())
}

/// Check that a string looks like an NT/LM hash: exactly 32 hex characters
pub fn is_hex_hash(value: &str) -> bool {
    value.len() == 32 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Mask a password for display in reports
///
/// Keeps at most the first and last two characters visible so a reader can
/// recognize a pattern without the report itself leaking the credential.
pub fn mask_password(password: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    match chars.len() {
        0..=2 => "***".to_string(),
        3..=4 => format!("{}***{}", chars[0], chars[chars.len() - 1]),
        _ => {
            let head: String = chars[..2].iter().collect();
            let tail: String = chars[chars.len() - 2..].iter().collect();
            format!("{}***{}", head, tail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels() {
        assert_eq!(FindingSeverity::Critical.level(), 4);
        assert_eq!(FindingSeverity::High.level(), 3);
        assert_eq!(FindingSeverity::Medium.level(), 2);
        assert_eq!(FindingSeverity::Low.level(), 1);
        assert_eq!(FindingSeverity::Informational.level(), 0);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(FindingSeverity::Critical > FindingSeverity::High);
        assert!(FindingSeverity::High > FindingSeverity::Medium);
        assert!(FindingSeverity::Medium > FindingSeverity::Low);
        assert!(FindingSeverity::Low > FindingSeverity::Informational);
    }

    #[test]
    fn test_uac_flags() {
        let uac = uac_flags::ACCOUNTDISABLE | uac_flags::DONT_REQ_PREAUTH;
        let flags = UserAccountControlFlags::from_value(uac);
        assert!(flags.is_disabled);
        assert!(!flags.is_enabled());
        assert!(flags.is_asrep_roastable);
        assert!(!flags.is_unconstrained_delegation);
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain_from_dn("CN=John,OU=Users,DC=example,DC=com"),
            "example.com"
        );
        assert_eq!(
            extract_domain_from_dn("CN=Admin,DC=corp,DC=contoso,DC=local"),
            "corp.contoso.local"
        );
    }

    #[test]
    fn test_dn_leaf_name() {
        assert_eq!(
            dn_leaf_name("CN=Domain Admins,CN=Users,DC=corp,DC=local"),
            "Domain Admins"
        );
        assert_eq!(dn_leaf_name("Tier0"), "Tier0");
    }

    #[test]
    fn test_sid_domain_prefix() {
        assert_eq!(
            sid_domain_prefix("S-1-5-21-1004336348-1177238915-682003330-512").as_deref(),
            Some("S-1-5-21-1004336348-1177238915-682003330")
        );
        assert_eq!(sid_domain_prefix("S"), None);
    }

    #[test]
    fn test_nt_hash_of_empty_password() {
        // Well-known NT hash of the empty string
        assert_eq!(nt_hash_of(""), "31d6cfe0d16ae931b73c59d7e0c089c0");
    }

    #[test]
    fn test_nt_hash_of_password() {
        // Well-known NT hash of "password"
        assert_eq!(nt_hash_of("password"), "8846f7eaee8fb117ad06bdd830b7586c");
    }

    #[test]
    fn test_is_hex_hash() {
        assert!(is_hex_hash("31d6cfe0d16ae931b73c59d7e0c089c0"));
        assert!(!is_hex_hash("31d6cfe0"));
        assert!(!is_hex_hash("zzd6cfe0d16ae931b73c59d7e0c089c0"));
    }

    #[test]
    fn test_mask_password() {
        assert_eq!(mask_password("Summer2024!"), "Su***4!");
        assert_eq!(mask_password("abcd"), "a***d");
        assert_eq!(mask_password("ab"), "***");
        assert_eq!(mask_password(""), "***");
    }
}
