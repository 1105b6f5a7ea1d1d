//! Report writing and terminal output

use actions_lib::CorrelatedRecord;
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Format of the summary printed after a run
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row for the pod group summary table
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Workload")]
    workload: String,
    #[tabled(rename = "Containers")]
    containers: usize,
    #[tabled(rename = "Actions")]
    actions: usize,
    #[tabled(rename = "Description")]
    description: String,
}

/// Machine-readable run summary
#[derive(Debug, Serialize)]
struct Summary<'a> {
    report: String,
    groups: usize,
    actions: usize,
    records: &'a [CorrelatedRecord],
}

/// Write the report as 2-space indented JSON
pub async fn write_report(path: &Path, records: &[CorrelatedRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize report")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Print a summary of the written report
pub fn print_summary(records: &[CorrelatedRecord], path: &Path, format: OutputFormat) {
    let actions = total_actions(records);

    match format {
        OutputFormat::Json => {
            let summary = Summary {
                report: path.display().to_string(),
                groups: records.len(),
                actions,
                records,
            };
            if let Ok(json) = serde_json::to_string_pretty(&summary) {
                println!("{}", json);
            }
        }
        OutputFormat::Table => {
            print_success(&format!("Report written to {}", path.display()));
            if records.is_empty() {
                print_warning("No pod groups with pending actions");
                return;
            }

            let rows: Vec<RecordRow> = records.iter().map(record_row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!(
                "\nTotal: {} pod groups, {} actions",
                records.len(),
                actions
            );
        }
    }
}

fn record_row(record: &CorrelatedRecord) -> RecordRow {
    let group = &record.group;
    RecordRow {
        cluster: group.cluster.clone().unwrap_or_default(),
        namespace: group.resource_namespace.clone(),
        workload: format!("{}/{}", group.resource_type, group.resource_name),
        containers: group.container_members.len(),
        actions: record.actions.len(),
        description: truncate(&record.actions_description, 60),
    }
}

fn total_actions(records: &[CorrelatedRecord]) -> usize {
    records.iter().map(|r| r.actions.len()).sum()
}

/// Truncate text for display, on a character boundary
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions_lib::{ActionDetail, Container, ExpandedGroup};

    fn record(actions: usize) -> CorrelatedRecord {
        CorrelatedRecord {
            group: ExpandedGroup {
                group_uuid: "g1".to_string(),
                resource_type: "Deployment".to_string(),
                resource_name: "app".to_string(),
                resource_namespace: "ns1".to_string(),
                cluster: Some("cluster1".to_string()),
                container_members: vec![Container {
                    uuid: "c1".to_string(),
                    display_name: Some("container1".to_string()),
                }],
            },
            actions_description: "Performance: Underprovisioned".to_string(),
            actions: (0..actions)
                .map(|_| ActionDetail {
                    container_name: Some("container1".to_string()),
                    action_type: Some("RESIZE".to_string()),
                    commodity: Some("VCPU".to_string()),
                    current_value: None,
                    resize_to_value: None,
                    value_units: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_record_row() {
        let row = record_row(&record(2));
        assert_eq!(row.cluster, "cluster1");
        assert_eq!(row.workload, "Deployment/app");
        assert_eq!(row.containers, 1);
        assert_eq!(row.actions, 2);
    }

    #[test]
    fn test_total_actions() {
        assert_eq!(total_actions(&[record(2), record(3)]), 5);
        assert_eq!(total_actions(&[]), 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_write_report_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_report(&path, &[record(1)]).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("[\n  {\n    \"group_uuid\": \"g1\""));
        let parsed: Vec<CorrelatedRecord> = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, vec![record(1)]);
    }
}
