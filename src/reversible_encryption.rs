//! Reversible Encryption Findings
//!
//! When a domain stores a password with reversible encryption, the secrets
//! dump recovers it as cleartext. Any account with a recovered cleartext
//! password is reported; the password itself is masked in the report.

use crate::common_types::{mask_password, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{yes_no, FindingModule, FindingReport};
use crate::membership;
use crate::model::PrincipalKind;

pub struct ReversibleEncryption;

impl FindingModule for ReversibleEncryption {
    fn name(&self) -> &'static str {
        "reversible-encryption"
    }

    fn description(&self) -> &'static str {
        "Accounts whose password was recovered as cleartext"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows: Vec<(String, &'static str, String, bool, bool)> = graph
            .principals()
            .filter_map(|p| {
                let cleartext = p.cleartext_password.as_deref()?;
                Some((
                    p.sam_account_name.clone(),
                    match p.kind {
                        PrincipalKind::User => "user",
                        PrincipalKind::Computer => "computer",
                    },
                    mask_password(cleartext),
                    privileged.contains(&p.sam_account_name),
                    p.enabled,
                ))
            })
            .collect();
        if rows.is_empty() {
            return None;
        }
        rows.sort_by(|a, b| (!a.3, !a.4, &a.0).cmp(&(!b.3, !b.4, &b.0)));

        let mut body = String::from("| Account | Type | Password | Privileged | Enabled |\n");
        body.push_str("|---------|------|----------|------------|---------|\n");
        for (account, kind, password, privileged, enabled) in &rows {
            body.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                account,
                kind,
                password,
                yes_no(*privileged),
                yes_no(*enabled)
            ));
        }

        let severity = if rows.iter().any(|r| r.3) {
            FindingSeverity::Critical
        } else {
            FindingSeverity::High
        };
        Some(FindingReport {
            slug: self.name(),
            title: "Passwords stored with reversible encryption".to_string(),
            severity,
            total: rows.len(),
            body,
        })
    }
}
