//! Kerberoasting Findings
//!
//! Any authenticated principal can request a service ticket for an account
//! carrying a service principal name; the ticket is encrypted with that
//! account's password hash and can be cracked offline. Service accounts
//! with SPNs and weak passwords are therefore directly exposed.

use crate::common_types::{mask_password, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{yes_no, FindingModule, FindingReport};
use crate::membership;

pub struct Kerberoasting;

struct RoastableRow {
    account: String,
    spn: String,
    password: String,
    privileged: bool,
    enabled: bool,
}

impl FindingModule for Kerberoasting {
    fn name(&self) -> &'static str {
        "kerberoasting"
    }

    fn description(&self) -> &'static str {
        "User accounts with service principal names (roastable tickets)"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows: Vec<RoastableRow> = graph
            .users()
            // krbtgt tickets are not obtainable through ordinary service
            // ticket requests
            .filter(|user| user.has_spn() && !user.sam_account_name.eq_ignore_ascii_case("krbtgt"))
            .map(|user| RoastableRow {
                account: user.sam_account_name.clone(),
                spn: user.spn_list.first().cloned().unwrap_or_default(),
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
        rows.sort_by(|a, b| {
            (!a.privileged, !a.enabled, &a.account).cmp(&(!b.privileged, !b.enabled, &b.account))
        });

        let mut body =
            String::from("| Account | Service principal name | Password | Privileged | Enabled |\n");
        body.push_str("|---------|------------------------|----------|------------|---------|\n");
        for row in &rows {
            body.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.account,
                row.spn,
                row.password,
                yes_no(row.privileged),
                yes_no(row.enabled)
            ));
        }

        let severity = if rows.iter().any(|r| r.privileged) {
            FindingSeverity::Critical
        } else {
            FindingSeverity::High
        };
        Some(FindingReport {
            slug: self.name(),
            title: "Kerberoastable accounts".to_string(),
            severity,
            total: rows.len(),
            body,
        })
    }
}
