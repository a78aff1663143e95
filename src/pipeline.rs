//! Reconciliation pipeline
//!
//! Applies the three normalized sources to one graph in a fixed order:
//! directory records establish the base topology, secrets entries attach
//! credential material (synthesizing principals the directory never saw),
//! cracked passwords land last by hash. Later sources only add or refine
//! fields; order matters because each stage merges onto entities created by
//! the previous ones.

use tracing::info;

use crate::domain_graph::DomainGraph;
use crate::ldap_dump::DirectoryRecords;
use crate::records::{CrackedHashEntry, SecretsEntry};

/// Build the converged identity graph from normalized records
///
/// Source-level validation (empty or unparseable sources) has already
/// happened in the parsers; everything arriving here is applied.
pub fn build_graph(
    directory: &DirectoryRecords,
    secrets: &[SecretsEntry],
    cracked: &[CrackedHashEntry],
) -> DomainGraph {
    let mut graph = DomainGraph::new();

    for record in &directory.principals {
        graph.merge_directory_principal(record);
    }
    for record in &directory.groups {
        graph.merge_directory_group(record);
    }
    info!(
        users = graph.user_count(),
        computers = graph.computer_count(),
        groups = graph.group_count(),
        "directory topology applied"
    );

    for entry in secrets {
        graph.merge_secrets_entry(entry);
    }
    info!(entries = secrets.len(), "secrets dump applied");

    let mut principals_updated = 0usize;
    for entry in cracked {
        principals_updated += graph.set_cracked_password_by_hash(&entry.nt_hash, &entry.password);
    }
    info!(
        entries = cracked.len(),
        principals_updated, "cracked passwords applied"
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrincipalKind;
    use crate::records::{DirectoryGroupRecord, DirectoryPrincipalRecord};

    fn directory() -> DirectoryRecords {
        DirectoryRecords {
            principals: vec![DirectoryPrincipalRecord {
                kind: PrincipalKind::User,
                sam_account_name: "alice".to_string(),
                distinguished_name: "CN=alice,CN=Users,DC=corp,DC=local".to_string(),
                object_sid: "S-1-5-21-1-2-3-1104".to_string(),
                spn_list: vec![],
                member_of: vec!["Tier0".to_string()],
                user_account_control: 512,
                description: String::new(),
            }],
            groups: vec![DirectoryGroupRecord {
                name: "Tier0".to_string(),
                object_sid: "S-1-5-21-1-2-3-2001".to_string(),
                members: vec!["alice".to_string()],
                member_of: vec![],
            }],
            skipped: 0,
        }
    }

    #[test]
    fn test_sources_converge_onto_one_entity() {
        let secrets = vec![SecretsEntry {
            qualified_name: "corp.local\\alice".to_string(),
            rid: Some(1104),
            lm_hash: Some("aad3b435b51404eeaad3b435b51404ee".to_string()),
            nt_hash: Some("8846f7eaee8fb117ad06bdd830b7586c".to_string()),
            cleartext_password: None,
        }];
        let cracked = vec![CrackedHashEntry {
            nt_hash: "8846f7eaee8fb117ad06bdd830b7586c".to_string(),
            password: "password".to_string(),
        }];

        let graph = build_graph(&directory(), &secrets, &cracked);
        let alice = graph.find_by_account_name("alice").unwrap();
        assert_eq!(alice.object_sid.as_deref(), Some("S-1-5-21-1-2-3-1104"));
        assert_eq!(alice.cracked_password.as_deref(), Some("password"));
        assert_eq!(graph.group_count(), 1);
    }

    #[test]
    fn test_missing_optional_sources_still_build_topology() {
        let graph = build_graph(&directory(), &[], &[]);
        assert_eq!(graph.user_count(), 1);
        assert!(graph
            .find_by_account_name("alice")
            .unwrap()
            .nt_hash
            .is_none());
    }
}
