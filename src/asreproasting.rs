//! AS-REP Roasting Findings
//!
//! Accounts exempted from Kerberos pre-authentication hand out an AS-REP
//! encrypted with their own password hash to anyone who asks for it, making
//! their password crackable without any prior foothold.

use crate::common_types::{mask_password, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{account_table, sort_account_rows, AccountRow, FindingModule, FindingReport};
use crate::membership;

pub struct AsRepRoasting;

impl FindingModule for AsRepRoasting {
    fn name(&self) -> &'static str {
        "asrep-roasting"
    }

    fn description(&self) -> &'static str {
        "Accounts that do not require Kerberos pre-authentication"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows: Vec<AccountRow> = graph
            .users()
            .filter(|user| user.uac().is_asrep_roastable)
            .map(|user| AccountRow {
                account: user.sam_account_name.clone(),
                password: user
                    .cracked_password
                    .as_deref()
                    .map(mask_password)
                    .unwrap_or_else(|| "Not cracked".to_string()),
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
            title: "AS-REP roastable accounts".to_string(),
            severity,
            total: rows.len(),
            body: account_table(&rows),
        })
    }
}
