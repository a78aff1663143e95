//! Unconstrained Delegation Findings
//!
//! A host trusted for unconstrained delegation caches the Kerberos tickets
//! of everyone who authenticates to it. Compromising such a host yields
//! reusable tickets for those principals, including domain administrators.

use crate::common_types::FindingSeverity;
use crate::domain_graph::DomainGraph;
use crate::findings::{yes_no, FindingModule, FindingReport};
use crate::membership;
use crate::model::PrincipalKind;

pub struct UnconstrainedDelegation;

struct DelegationRow {
    account: String,
    kind: &'static str,
    privileged: bool,
    enabled: bool,
}

impl FindingModule for UnconstrainedDelegation {
    fn name(&self) -> &'static str {
        "unconstrained-delegation"
    }

    fn description(&self) -> &'static str {
        "Accounts trusted for unconstrained delegation"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows: Vec<DelegationRow> = graph
            .principals()
            .filter(|p| p.uac().is_unconstrained_delegation)
            .map(|p| DelegationRow {
                account: p.sam_account_name.clone(),
                kind: match p.kind {
                    PrincipalKind::User => "user",
                    PrincipalKind::Computer => "computer",
                },
                privileged: privileged.contains(&p.sam_account_name),
                enabled: p.enabled,
            })
            .collect();
        if rows.is_empty() {
            return None;
        }
        rows.sort_by(|a, b| {
            (!a.privileged, !a.enabled, &a.account).cmp(&(!b.privileged, !b.enabled, &b.account))
        });

        let mut body = String::from("| Account | Type | Privileged | Enabled |\n");
        body.push_str("|---------|------|------------|---------|\n");
        for row in &rows {
            body.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                row.account,
                row.kind,
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
            title: "Unconstrained delegation".to_string(),
            severity,
            total: rows.len(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_types::uac_flags;
    use crate::records::DirectoryPrincipalRecord;

    fn add_principal(graph: &mut DomainGraph, kind: PrincipalKind, name: &str, rid: u32, uac: u32) {
        graph.merge_directory_principal(&DirectoryPrincipalRecord {
            kind,
            sam_account_name: name.to_string(),
            distinguished_name: String::new(),
            object_sid: format!("S-1-5-21-1-2-3-{}", rid),
            spn_list: vec![],
            member_of: vec![],
            user_account_control: uac,
            description: String::new(),
        });
    }

    #[test]
    fn test_users_and_computers_are_both_checked() {
        let mut graph = DomainGraph::new();
        add_principal(
            &mut graph,
            PrincipalKind::Computer,
            "FILESRV$",
            1201,
            4096 | uac_flags::TRUSTED_FOR_DELEGATION,
        );
        add_principal(
            &mut graph,
            PrincipalKind::User,
            "svc-legacy",
            1104,
            512 | uac_flags::TRUSTED_FOR_DELEGATION,
        );
        add_principal(&mut graph, PrincipalKind::User, "plain", 1105, 512);

        let report = UnconstrainedDelegation.run(&graph).unwrap();
        assert_eq!(report.total, 2);
        assert!(report.body.contains("| FILESRV$ | computer |"));
        assert!(report.body.contains("| svc-legacy | user |"));
    }

    #[test]
    fn test_no_delegation_no_finding() {
        let mut graph = DomainGraph::new();
        add_principal(&mut graph, PrincipalKind::User, "plain", 1104, 512);
        assert!(UnconstrainedDelegation.run(&graph).is_none());
    }
}
