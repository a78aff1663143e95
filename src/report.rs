//! Report Builder
//!
//! Renders the finding reports into one markdown document. Sections are
//! ordered by severity, then by module name, so the same graph always
//! produces byte-identical output.

use std::fs;
use std::path::Path;

use crate::common_types::{extract_domain_from_dn, SeverityCounts};
use crate::domain_graph::DomainGraph;
use crate::errors::Result;
use crate::findings::FindingReport;

/// Render the full report to a markdown string
pub fn render(graph: &DomainGraph, reports: &[FindingReport]) -> String {
    let mut ordered: Vec<&FindingReport> = reports.iter().collect();
    ordered.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.slug.cmp(b.slug)));
    let counts = SeverityCounts::from_iter(ordered.iter().map(|r| &r.severity));

    let domain_name = graph
        .principals()
        .find_map(|p| p.distinguished_name.as_deref())
        .map(extract_domain_from_dn)
        .filter(|name| !name.is_empty());

    let mut out = String::new();
    out.push_str("# Domain credential exposure report\n\n");
    if let Some(name) = domain_name {
        out.push_str(&format!("- Domain: {}\n", name));
    }
    out.push_str(&format!("- Domain SID: {}\n", graph.domain_sid()));
    out.push_str(&format!(
        "- Objects: {} users, {} computers, {} groups\n",
        graph.user_count(),
        graph.computer_count(),
        graph.group_count()
    ));
    out.push_str(&format!(
        "- Generated: {}\n\n",
        chrono::Utc::now().to_rfc3339()
    ));

    if ordered.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str(&format!(
        "{} finding(s): {} critical, {} high, {} medium, {} low.\n\n",
        counts.total, counts.critical, counts.high, counts.medium, counts.low
    ));

    for report in &ordered {
        out.push_str(&format!("## {}\n\n", report.title));
        out.push_str(&format!(
            "Severity: {} — {} affected object(s)\n\n",
            report.severity.label(),
            report.total
        ));
        out.push_str(&report.body);
        out.push('\n');
    }
    out
}

/// Render and write the report to disk
pub fn write_report(path: &Path, graph: &DomainGraph, reports: &[FindingReport]) -> Result<()> {
    fs::write(path, render(graph, reports))?;
    Ok(())
}
