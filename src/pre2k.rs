//! Pre-Windows-2000 Computer Findings
//!
//! A computer account created with "pre-Windows 2000 compatibility" gets
//! its own lowercased name (without the trailing `$`) as its password.
//! Machines that never completed domain join keep that password, which is
//! derivable from the account name alone.

use crate::common_types::{nt_hash_of, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{yes_no, FindingModule, FindingReport};
use crate::model::COMPUTER_ACCOUNT_SUFFIX;

pub struct Pre2kComputers;

impl FindingModule for Pre2kComputers {
    fn name(&self) -> &'static str {
        "pre2k-computers"
    }

    fn description(&self) -> &'static str {
        "Computer accounts still using their pre-Windows 2000 default password"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let mut rows = Vec::new();
        for computer in graph.computers() {
            let Some(nt_hash) = computer.nt_hash.as_deref() else {
                continue;
            };
            let default_password = computer
                .sam_account_name
                .trim_end_matches(COMPUTER_ACCOUNT_SUFFIX)
                .to_lowercase();
            if nt_hash_of(&default_password) == nt_hash {
                rows.push((
                    computer.sam_account_name.clone(),
                    default_password,
                    computer.enabled,
                ));
            }
        }
        if rows.is_empty() {
            return None;
        }
        rows.sort_by(|a, b| (!a.2, &a.0).cmp(&(!b.2, &b.0)));

        let mut body = String::from("| Account | Password | Enabled |\n");
        body.push_str("|---------|----------|---------|\n");
        for (account, password, enabled) in &rows {
            // the password is the account name, masking it would hide nothing
            body.push_str(&format!("| {} | {} | {} |\n", account, password, yes_no(*enabled)));
        }

        Some(FindingReport {
            slug: self.name(),
            title: "Pre-Windows 2000 computer passwords".to_string(),
            severity: FindingSeverity::High,
            total: rows.len(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrincipalKind;
    use crate::records::{DirectoryPrincipalRecord, SecretsEntry};

    fn add_computer(graph: &mut DomainGraph, name: &str, nt: &str) {
        graph.merge_directory_principal(&DirectoryPrincipalRecord {
            kind: PrincipalKind::Computer,
            sam_account_name: name.to_string(),
            distinguished_name: String::new(),
            object_sid: String::new(),
            spn_list: vec![],
            member_of: vec![],
            user_account_control: 4096,
            description: String::new(),
        });
        graph.merge_secrets_entry(&SecretsEntry {
            qualified_name: name.to_string(),
            rid: Some(1201),
            lm_hash: Some("aad3b435b51404eeaad3b435b51404ee".to_string()),
            nt_hash: Some(nt.to_string()),
            cleartext_password: None,
        });
    }

    #[test]
    fn test_default_password_is_detected() {
        let mut graph = DomainGraph::new();
        add_computer(&mut graph, "LEGACY01$", &nt_hash_of("legacy01"));
        add_computer(&mut graph, "PATCHED01$", &nt_hash_of("7uP!x09$secure"));

        let report = Pre2kComputers.run(&graph).unwrap();
        assert_eq!(report.total, 1);
        assert!(report.body.contains("| LEGACY01$ | legacy01 |"));
        assert!(!report.body.contains("PATCHED01$"));
    }

    #[test]
    fn test_no_hashes_no_finding() {
        let mut graph = DomainGraph::new();
        graph.merge_directory_principal(&DirectoryPrincipalRecord {
            kind: PrincipalKind::Computer,
            sam_account_name: "WS01$".to_string(),
            distinguished_name: String::new(),
            object_sid: String::new(),
            spn_list: vec![],
            member_of: vec![],
            user_account_control: 4096,
            description: String::new(),
        });
        assert!(Pre2kComputers.run(&graph).is_none());
    }
}
