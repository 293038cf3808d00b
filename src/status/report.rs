//! Render a status report for terminal, markdown, or JSON consumers.

use colored::Colorize;

use super::{RunStatus, StatusReport, WorkflowRun};
use crate::Result;

fn short_sha(sha: &str) -> &str {
    &sha[..7.min(sha.len())]
}

fn run_marker(run: &WorkflowRun) -> String {
    if run.status != RunStatus::Completed {
        return "~".yellow().to_string();
    }
    if run.is_success() {
        "+".green().to_string()
    } else {
        "x".red().to_string()
    }
}

/// Format the report for terminal output.
pub fn format_terminal(report: &StatusReport) -> String {
    let mut lines = vec!["sram-forge IC status".bold().to_string(), "=".repeat(50)];

    for rev in &report.revisions {
        let indicator = if rev.all_passing() {
            "+".green().to_string()
        } else {
            "x".red().to_string()
        };
        lines.push(format!(
            "{} ({})  {} {}",
            short_sha(&rev.forge_sha).bold(),
            rev.timestamp,
            rev.summary(),
            indicator
        ));

        let run_statuses: Vec<String> = rev
            .runs
            .iter()
            .map(|r| format!("{} {}", run_marker(r), r.sram))
            .collect();
        lines.push(format!("   {}", run_statuses.join("  ")));
        lines.push(String::new());
    }

    match report.revisions.first() {
        Some(latest) if latest.all_passing() => {
            lines.push(format!("Summary: latest revision passing {}", "+".green()));
        }
        Some(latest) => {
            lines.push(format!(
                "Summary: latest revision {} {}",
                latest.summary(),
                "x".red()
            ));
        }
        None => lines.push("No workflow runs found".to_string()),
    }

    lines.join("\n")
}

/// Format the report as a markdown table per revision.
pub fn format_markdown(report: &StatusReport) -> String {
    let mut lines = vec!["## sram-forge IC status".to_string(), String::new()];

    for rev in &report.revisions {
        let sha_short = short_sha(&rev.forge_sha);
        let sha_link = match &rev.forge_run_url {
            Some(url) => format!("[`{sha_short}`]({url})"),
            None => format!("`{sha_short}`"),
        };
        let indicator = if rev.all_passing() { "pass" } else { "fail" };

        lines.push(format!(
            "### Revision {sha_link} ({} {indicator})",
            rev.summary()
        ));
        lines.push(String::new());
        lines.push("| SRAM | Slot | Status | Workflow | Commit |".to_string());
        lines.push("|------|------|--------|----------|--------|".to_string());

        for run in &rev.runs {
            let status = match run.conclusion {
                Some(c) => c.to_string(),
                None => run.status.to_string(),
            };
            lines.push(format!(
                "| {} | {} | {} | {} | [`{}`]({}) |",
                run.sram,
                run.slot,
                status,
                run.workflow_name,
                short_sha(&run.head_sha),
                run.html_url
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Format the report as JSON.
pub fn format_json(report: &StatusReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_run;
    use super::super::ForgeRevision;
    use super::*;

    fn test_report() -> StatusReport {
        StatusReport {
            revisions: vec![ForgeRevision {
                forge_sha: "abc1234def".to_string(),
                forge_run_url: Some(
                    "https://github.com/mithro/gf180mcu-sram-forge/actions/runs/99".to_string(),
                ),
                timestamp: "2026-08-01T12:00:00Z".to_string(),
                runs: vec![
                    test_run("sram512x8", Some("abc1234def"), true),
                    test_run("sram256x8", Some("abc1234def"), false),
                ],
            }],
        }
    }

    #[test]
    fn terminal_report() {
        colored::control::set_override(false);
        let report = format_terminal(&test_report());
        assert!(report.contains("abc1234"));
        assert!(report.contains("1/2"));
        assert!(report.contains("sram512x8"));
        assert!(report.contains("latest revision 1/2"));
    }

    #[test]
    fn empty_terminal_report() {
        colored::control::set_override(false);
        let report = format_terminal(&StatusReport { revisions: vec![] });
        assert!(report.contains("No workflow runs"));
    }

    #[test]
    fn markdown_report() {
        let report = format_markdown(&test_report());
        assert!(report.contains("| SRAM | Slot |"));
        assert!(report.contains("| sram512x8 | 1x1 | success |"));
        assert!(report.contains("/actions/runs/99"));
    }

    #[test]
    fn json_round_trip() {
        let report = test_report();
        let json = format_json(&report).unwrap();
        let parsed: StatusReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
