//! Weak Password Findings
//!
//! Every account whose password fell to offline cracking is weak by
//! definition. Privileged accounts are listed first since a cracked
//! privileged password is usually a full domain compromise.

use crate::common_types::{mask_password, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{account_table, sort_account_rows, AccountRow, FindingModule, FindingReport};
use crate::membership;

pub struct WeakPasswords;

impl FindingModule for WeakPasswords {
    fn name(&self) -> &'static str {
        "weak-passwords"
    }

    fn description(&self) -> &'static str {
        "Accounts whose password was recovered by offline cracking"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows: Vec<AccountRow> = graph
            .users()
            .filter(|user| user.password_cracked())
            .map(|user| AccountRow {
                account: user.sam_account_name.clone(),
                password: mask_password(user.cracked_password.as_deref().unwrap_or_default()),
                privileged: privileged.contains(&user.sam_account_name),
                enabled: user.enabled,
            })
            .collect();
        if rows.is_empty() {
            return None;
        }
        sort_account_rows(&mut rows);

        let severity = if rows.iter().any(|r| r.privileged) {
            FindingSeverity::Critical
        } else {
            FindingSeverity::High
        };
        Some(FindingReport {
            slug: self.name(),
            title: "Weak passwords".to_string(),
            severity,
            total: rows.len(),
            body: account_table(&rows),
        })
    }
}
