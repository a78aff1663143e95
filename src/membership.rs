//! Privileged Membership Resolver
//!
//! Answers "is this principal, directly or transitively, a member of one of
//! the domain's built-in high-privilege groups?".
//!
//! The group nesting relation is a directed graph, not a tree: dumps from
//! real domains contain diamonds and outright cycles (a group nested inside
//! itself through any number of hops). The closure is therefore computed by
//! breadth-first traversal over an explicit frontier with a visited set,
//! never by unbounded recursion, so every group is expanded at most once and
//! stack depth stays bounded regardless of nesting depth.
//!
//! Seed groups are identified by SID: the well-known RIDs appended to the
//! domain SID, plus the domain-independent local Administrators SID. A seed
//! absent from the dump is normal (non-root domains have no Enterprise
//! Admins) and is skipped silently.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::debug;

use crate::domain_graph::DomainGraph;

/// Domain Admins, relative to the domain SID
pub const RID_DOMAIN_ADMINS: u32 = 512;
/// Enterprise Admins, relative to the domain SID (root domain only)
pub const RID_ENTERPRISE_ADMINS: u32 = 519;
/// Administrators, relative to the domain SID
pub const RID_ADMINISTRATORS: u32 = 544;
/// The built-in local Administrators group, identical in every domain
pub const LOCAL_ADMINISTRATORS_SID: &str = "S-1-5-32-544";

/// SIDs of the built-in high-privilege groups for a given domain
pub fn well_known_admin_sids(domain_sid: &str) -> Vec<String> {
    vec![
        format!("{}-{}", domain_sid, RID_DOMAIN_ADMINS),
        format!("{}-{}", domain_sid, RID_ADMINISTRATORS),
        format!("{}-{}", domain_sid, RID_ENTERPRISE_ADMINS),
        LOCAL_ADMINISTRATORS_SID.to_string(),
    ]
}

/// Compute the transitive member set of the built-in privileged groups
///
/// Returns the account names of every principal reachable from a seed group
/// through arbitrarily deep nesting. Member names that resolve to neither a
/// principal nor a group are dangling references and are ignored. Names are
/// resolved against the principal store first, the group store second.
pub fn privileged_principals(graph: &DomainGraph) -> BTreeSet<String> {
    let domain_sid = graph.domain_sid();
    let mut members = BTreeSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<String> = VecDeque::new();

    for sid in well_known_admin_sids(&domain_sid) {
        match graph.group_by_sid(&sid) {
            Some(group) => {
                if visited.insert(group.name.clone()) {
                    frontier.push_back(group.name.clone());
                }
            }
            None => debug!(%sid, "well-known privileged group absent from dump, skipping"),
        }
    }

    while let Some(name) = frontier.pop_front() {
        let Some(group) = graph.group_by_name(&name) else {
            continue;
        };
        for member in &group.members {
            if graph.find_by_account_name(member).is_some() {
                members.insert(member.clone());
            } else if graph.group_by_name(member).is_some() {
                if visited.insert(member.clone()) {
                    frontier.push_back(member.clone());
                }
            }
        }
    }

    members
}

/// Check a single principal, by account name or SID, against the privileged
/// closure. The closure is recomputed per query; the graph is read-only
/// after ingestion, so callers that need speed may compute
/// [`privileged_principals`] once and test against it themselves.
pub fn is_privileged(graph: &DomainGraph, account_name_or_sid: &str) -> bool {
    let name = if account_name_or_sid.starts_with("S-1-") {
        match graph.account_name_for_sid(account_name_or_sid) {
            Some(name) => name.to_string(),
            None => return false,
        }
    } else {
        account_name_or_sid.to_string()
    };
    privileged_principals(graph).contains(&name)
}
