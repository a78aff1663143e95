//! Password Reuse Findings
//!
//! An NT hash shared by several accounts means the same password is in use
//! on all of them. The dangerous case is a privileged account sharing its
//! password with ordinary accounts: compromising any of them compromises
//! the privileged one, whether or not the password was ever cracked.

use std::collections::BTreeMap;

use crate::common_types::{mask_password, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{yes_no, FindingModule, FindingReport};
use crate::membership;

pub struct PasswordReuse;

#[derive(Debug)]
struct ReuseRow {
    privileged_account: String,
    shared_with: Vec<String>,
    password: String,
    is_cracked: bool,
}

impl FindingModule for PasswordReuse {
    fn name(&self) -> &'static str {
        "password-reuse"
    }

    fn description(&self) -> &'static str {
        "Privileged accounts sharing a password with other accounts"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);

        let mut by_hash: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for user in graph.users() {
            if let Some(hash) = user.nt_hash.as_deref() {
                by_hash.entry(hash).or_default().push(&user.sam_account_name);
            }
        }

        let mut rows = Vec::new();
        for accounts in by_hash.values() {
            if accounts.len() < 2 {
                continue;
            }
            let cracked = accounts
                .iter()
                .find_map(|name| graph.find_by_account_name(name))
                .and_then(|p| p.cracked_password.clone());
            for admin in accounts.iter().filter(|a| privileged.contains(**a)) {
                rows.push(ReuseRow {
                    privileged_account: admin.to_string(),
                    shared_with: accounts
                        .iter()
                        .filter(|a| *a != admin)
                        .map(|a| a.to_string())
                        .collect(),
                    password: cracked
                        .as_deref()
                        .map(mask_password)
                        .unwrap_or_else(|| "Not cracked".to_string()),
                    is_cracked: cracked.is_some(),
                });
            }
        }
        if rows.is_empty() {
            return None;
        }
        rows.sort_by(|a, b| {
            (!a.is_cracked, &a.privileged_account).cmp(&(!b.is_cracked, &b.privileged_account))
        });

        let mut body =
            String::from("| Privileged account | Shared with | Password | Cracked |\n");
        body.push_str("|--------------------|-------------|----------|---------|\n");
        for row in &rows {
            body.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.privileged_account,
                row.shared_with.join(", "),
                row.password,
                yes_no(row.is_cracked)
            ));
        }

        Some(FindingReport {
            slug: self.name(),
            title: "Password reuse on privileged accounts".to_string(),
            severity: FindingSeverity::Critical,
            total: rows.len(),
            body,
        })
    }
}
