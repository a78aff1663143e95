//! Passwords In Description Findings
//!
//! Help-desk habits die hard: account descriptions sometimes carry the
//! actual password. Candidate tokens are extracted from the description,
//! gated on minimal complexity, and only reported when their NT hash
//! matches the account's dumped hash, so every finding is a confirmed
//! credential rather than a guess.

use std::sync::OnceLock;

use regex::Regex;

use crate::common_types::{mask_password, nt_hash_of, FindingSeverity};
use crate::domain_graph::DomainGraph;
use crate::findings::{account_table, sort_account_rows, AccountRow, FindingModule, FindingReport};
use crate::membership;

pub struct PasswordsInDescription;

const CANDIDATE_PATTERNS: &[&str] = &[
    r"(?i)password\s*[=:]\s*(\S+)",
    r"(?i)pass\s*[=:]\s*(\S+)",
    r"(?i)pwd\s*[=:]\s*(\S+)",
    r#""([^"]+)""#,
    r"'([^']+)'",
    r"`([^`]+)`",
    r"\(([^)]+)\)",
    r"\[([^\]]+)\]",
    r"\{([^}]+)\}",
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CANDIDATE_PATTERNS
            .iter()
            // patterns are literals, compilation cannot fail at runtime
            .map(|p| Regex::new(p).expect("invalid candidate pattern"))
            .collect()
    })
}

/// Minimal complexity gate to keep prose fragments out of the candidate set
fn looks_like_password(candidate: &str) -> bool {
    candidate.len() >= 8
        && candidate.chars().any(|c| c.is_uppercase())
        && candidate.chars().any(|c| c.is_lowercase())
        && candidate.chars().any(|c| c.is_ascii_digit())
}

fn confirmed_password(description: &str, nt_hash: &str) -> Option<String> {
    for pattern in patterns() {
        for captures in pattern.captures_iter(description) {
            let candidate = match captures.get(1) {
                Some(m) => m.as_str(),
                None => continue,
            };
            if looks_like_password(candidate) && nt_hash_of(candidate) == nt_hash {
                return Some(candidate.to_string());
            }
        }
    }
    None
}

impl FindingModule for PasswordsInDescription {
    fn name(&self) -> &'static str {
        "passwords-in-description"
    }

    fn description(&self) -> &'static str {
        "Account descriptions containing the account's actual password"
    }

    fn run(&self, graph: &DomainGraph) -> Option<FindingReport> {
        let privileged = membership::privileged_principals(graph);
        let mut rows = Vec::new();
        for user in graph.users() {
            let (Some(description), Some(nt_hash)) =
                (user.description.as_deref(), user.nt_hash.as_deref())
            else {
                continue;
            };
            if let Some(password) = confirmed_password(description, nt_hash) {
                rows.push(AccountRow {
                    account: user.sam_account_name.clone(),
                    password: mask_password(&password),
                    privileged: privileged.contains(&user.sam_account_name),
                    enabled: user.enabled,
                });
            }
        }
        if rows.is_empty() {
            return None;
        }
        sort_account_rows(&mut rows);

        Some(FindingReport {
            slug: self.name(),
            title: "Passwords stored in account descriptions".to_string(),
            severity: FindingSeverity::Critical,
            total: rows.len(),
            body: account_table(&rows),
        })
    }
}
