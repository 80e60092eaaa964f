//! Terminal rendering of dashboard state.

use anyhow::Result;
use secaudit_core::{DashboardView, FlatReport, MessageLevel, RemediationItem, StandardCatalog};

use crate::OutputFormat;

pub fn print_catalog(catalog: &StandardCatalog) {
    for standard in catalog.entries() {
        println!("{standard}");
    }
}

pub fn print_view(view: &DashboardView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
        OutputFormat::Table => print!("{}", render_view(view)),
    }
    Ok(())
}

fn render_view(view: &DashboardView) -> String {
    let mut out = String::new();

    if let Some(message) = &view.message {
        let tag = match message.level {
            MessageLevel::Success => "ok",
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warn",
            MessageLevel::Failure => "fail",
        };
        out.push_str(&format!("[{tag}] {}\n", message.text));
    }
    if let Some(error) = &view.error {
        out.push_str(&format!("[error] {error}\n"));
    }

    let chunks: Vec<Vec<String>> = view
        .chunks()
        .map(|c| {
            vec![
                c.index_name.clone().unwrap_or_default(),
                c.chunk_id.clone(),
                truncate(&c.content, 60),
            ]
        })
        .collect();
    if !chunks.is_empty() {
        out.push_str("\nIngested chunks\n");
        out.push_str(&table(&["Index", "Chunk", "Content"], &chunks));
    }

    if let Some(report) = &view.report {
        out.push_str(&render_report(report));
    }

    if !view.remediation.is_empty() {
        out.push_str("\nRemediation plan\n");
        out.push_str(&render_remediation(&view.remediation));
    }

    out
}

fn render_report(report: &FlatReport) -> String {
    let mut out = format!(
        "\nAudit report: {} non-compliant, {} compliant\n",
        report.non_compliant_count(),
        report.compliant_count()
    );

    let rows: Vec<Vec<String>> = report
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let plugins: Vec<&str> = r.missing_plugins.iter().filter_map(|p| p.name()).collect();
            vec![
                (i + 1).to_string(),
                r.service_name.clone(),
                r.policy_name.clone(),
                if r.compliant { "Compliant" } else { "Non-compliant" }.to_string(),
                plugins.join(", "),
                r.required_for.clone(),
                truncate(&r.details, 48),
            ]
        })
        .collect();
    out.push_str(&table(
        &["#", "Service", "Policy", "Status", "Missing plugins", "Required for", "Details"],
        &rows,
    ));

    for failure in &report.failures {
        out.push_str(&format!("[error] {}: {}\n", failure.service_name, failure.error));
    }
    out
}

fn render_remediation(items: &[RemediationItem]) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.service_name.clone().unwrap_or_default(),
                item.policy_name.clone().unwrap_or_default(),
                item.severity.clone().unwrap_or_default(),
                item.missing_plugin
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                truncate(item.recommended_action.as_deref().unwrap_or_default(), 48),
                item.owner.clone().unwrap_or_default(),
                item.estimated_effort.clone().unwrap_or_default(),
                item.standard_reference.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table(
        &["Service", "Policy", "Severity", "Plugin", "Action", "Owner", "Effort", "Reference"],
        &rows,
    )
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.to_vec());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secaudit_core::normalize;
    use serde_json::json;

    fn empty_view() -> DashboardView {
        DashboardView {
            epoch: 0,
            selected_standards: Vec::new(),
            report: None,
            ingestion: Vec::new(),
            remediation: Vec::new(),
            message: None,
            error: None,
            busy: None,
            has_audit_payload: false,
        }
    }

    #[test]
    fn test_report_lists_non_compliant_first() {
        let report = normalize(&json!({
            "a": { "policies": [{ "policy_name": "Logging", "comply": "comply" }] },
            "b": { "policies": [{ "policy_name": "Authentication", "comply": false,
                                   "missing_plugins": [{ "plugin": "jwt" }] }] }
        }));
        let view = DashboardView {
            report: Some(report),
            ..empty_view()
        };

        let text = render_view(&view);
        let auth = text.find("Authentication").unwrap();
        let logging = text.find("Logging").unwrap();
        assert!(auth < logging);
        assert!(text.contains("jwt"));
        assert!(text.contains("1 non-compliant, 1 compliant"));
    }

    #[test]
    fn test_error_is_rendered() {
        let view = DashboardView {
            error: Some("No audit report available to download.".to_string()),
            ..empty_view()
        };
        assert!(render_view(&view).contains("[error] No audit report"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
