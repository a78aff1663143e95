//! Finding Module Interface
//!
//! Detection modules consume the completed domain graph read-only and
//! produce a report section, or nothing when the domain is clean. Modules
//! are registered statically in [`registry`]; there is no runtime loading.

use tracing::warn;

use crate::common_types::FindingSeverity;
use crate::domain_graph::DomainGraph;

/// Result of one finding module run
#[derive(Debug, Clone)]
pub struct FindingReport {
    /// Stable identifier used for section anchors and module selection
    pub slug: &'static str,
    pub title: String,
    pub severity: FindingSeverity,
    /// Number of affected objects
    pub total: usize,
    /// Rendered markdown body
    pub body: String,
}

/// A detection over the completed, read-only domain graph
pub trait FindingModule {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// `None` means "no finding": the section is omitted from the report
    fn run(&self, graph: &DomainGraph) -> Option<FindingReport>;
}

/// All statically registered finding modules
pub fn registry() -> Vec<Box<dyn FindingModule>> {
    vec![
        Box::new(crate::weak_passwords::WeakPasswords),
        Box::new(crate::password_reuse::PasswordReuse),
        Box::new(crate::kerberoasting::Kerberoasting),
        Box::new(crate::asreproasting::AsRepRoasting),
        Box::new(crate::delegation::UnconstrainedDelegation),
        Box::new(crate::description_passwords::PasswordsInDescription),
        Box::new(crate::pre2k::Pre2kComputers),
        Box::new(crate::reversible_encryption::ReversibleEncryption),
    ]
}

/// Filter the registry by a comma-separated module list
pub fn select(names: &str) -> Vec<Box<dyn FindingModule>> {
    let wanted: Vec<&str> = names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    let all = registry();
    for name in &wanted {
        if !all.iter().any(|m| m.name().eq_ignore_ascii_case(name)) {
            warn!(module = %name, "unknown finding module requested");
        }
    }
    all.into_iter()
        .filter(|m| wanted.iter().any(|w| w.eq_ignore_ascii_case(m.name())))
        .collect()
}

// ==========================================
// Shared rendering helpers
// ==========================================

/// One table row describing an affected account
#[derive(Debug, Clone)]
pub(crate) struct AccountRow {
    pub account: String,
    pub password: String,
    pub privileged: bool,
    pub enabled: bool,
}

/// Privileged accounts first, then enabled, then the rest, name-ordered
/// within each band
pub(crate) fn sort_account_rows(rows: &mut [AccountRow]) {
    rows.sort_by(|a, b| {
        (!a.privileged, !a.enabled, &a.account).cmp(&(!b.privileged, !b.enabled, &b.account))
    });
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Render the standard account table
pub(crate) fn account_table(rows: &[AccountRow]) -> String {
    let mut out = String::from("| Account | Password | Privileged | Enabled |\n");
    out.push_str("|---------|----------|------------|---------|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            row.account,
            row.password,
            yes_no(row.privileged),
            yes_no(row.enabled)
        ));
    }
    out
}
