//! Fetch workflow status from GitHub via the `gh` CLI.

use std::collections::BTreeMap;
use std::process::Command;

use anyhow::{bail, Context as _};
use log::warn;
use serde::Deserialize;

use super::{
    Conclusion, DownstreamRepo, ForgeRevision, RunStatus, StatusReport, WorkflowRun, FORGE_REPO,
};
use crate::Result;

/// Shape of one entry in `gh run list --json` output.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRun {
    workflow_name: String,
    status: RunStatus,
    /// Empty string until the run completes.
    #[serde(default)]
    conclusion: Option<String>,
    database_id: u64,
    head_sha: String,
    updated_at: String,
    url: String,
}

fn parse_conclusion(raw: Option<&str>) -> Result<Option<Conclusion>> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => {
            let value = serde_json::Value::String(s.to_string());
            Ok(Some(serde_json::from_value(value).with_context(|| {
                format!("unknown workflow conclusion '{s}'")
            })?))
        }
    }
}

/// Extract the generator commit SHA and workflow run ID from a downstream
/// commit message.
///
/// Generated commits carry lines like:
///
/// ```text
/// Source commit: abc1234
/// Workflow run: https://github.com/.../actions/runs/12345
/// ```
pub fn parse_forge_commit(message: &str) -> (Option<String>, Option<u64>) {
    let sha = message.split("Source commit:").nth(1).and_then(|rest| {
        let token: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect();
        (!token.is_empty()).then_some(token)
    });

    let run_id = message.split("/actions/runs/").nth(1).and_then(|rest| {
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    });

    (sha, run_id)
}

fn run_gh(args: &[&str]) -> Result<String> {
    let output = Command::new("gh")
        .args(args)
        .output()
        .context("failed to spawn gh; is the GitHub CLI installed?")?;
    if !output.status.success() {
        bail!(
            "gh {} failed: {}",
            args.first().unwrap_or(&""),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn fetch_workflow_runs(repo: &str, limit: usize) -> Result<Vec<RawRun>> {
    let limit = limit.to_string();
    let stdout = run_gh(&[
        "run",
        "list",
        "--repo",
        repo,
        "--limit",
        &limit,
        "--json",
        "workflowName,status,conclusion,databaseId,headSha,updatedAt,url",
    ])?;
    Ok(serde_json::from_str(&stdout)?)
}

fn fetch_commit_message(repo: &str, sha: &str) -> Option<String> {
    run_gh(&[
        "api",
        &format!("repos/{repo}/commits/{sha}"),
        "--jq",
        ".commit.message",
    ])
    .ok()
    .map(|s| s.trim().to_string())
}

/// Fetch workflow status for a single downstream repo.
pub fn fetch_repo_status(repo: &DownstreamRepo, limit: usize) -> Result<Vec<WorkflowRun>> {
    let full_name = repo.full_name();
    let raw_runs = fetch_workflow_runs(&full_name, limit)?;

    let mut runs = Vec::with_capacity(raw_runs.len());
    for raw in raw_runs {
        let (forge_sha, forge_run_id) = fetch_commit_message(&full_name, &raw.head_sha)
            .map(|msg| parse_forge_commit(&msg))
            .unwrap_or((None, None));

        runs.push(WorkflowRun {
            repo: full_name.clone(),
            sram: repo.sram.clone(),
            slot: repo.slot.clone(),
            workflow_name: raw.workflow_name,
            status: raw.status,
            conclusion: parse_conclusion(raw.conclusion.as_deref())?,
            run_id: raw.database_id,
            head_sha: raw.head_sha,
            updated_at: raw.updated_at,
            html_url: raw.url,
            forge_sha,
            forge_run_id,
        });
    }
    Ok(runs)
}

/// Group workflow runs by their generator revision, most recent first.
pub fn group_by_forge_revision(runs: Vec<WorkflowRun>) -> Vec<ForgeRevision> {
    let mut by_sha: BTreeMap<String, Vec<WorkflowRun>> = BTreeMap::new();
    for run in runs {
        let key = run
            .forge_sha
            .clone()
            .unwrap_or_else(|| format!("unknown-{}", &run.head_sha[..7.min(run.head_sha.len())]));
        by_sha.entry(key).or_default().push(run);
    }

    let mut revisions: Vec<ForgeRevision> = by_sha
        .into_iter()
        .map(|(sha, sha_runs)| {
            let latest = sha_runs
                .iter()
                .max_by(|a, b| a.updated_at.cmp(&b.updated_at))
                .expect("group is never empty");
            let forge_run_url = latest
                .forge_run_id
                .map(|id| format!("https://github.com/{FORGE_REPO}/actions/runs/{id}"));
            ForgeRevision {
                forge_sha: sha,
                forge_run_url,
                timestamp: latest.updated_at.clone(),
                runs: sha_runs,
            }
        })
        .collect();

    // RFC 3339 strings order chronologically.
    revisions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    revisions
}

/// Fetch status for all downstream repos. A repo that cannot be reached is
/// logged and skipped rather than failing the whole report.
pub fn fetch_all_status(repos: &[DownstreamRepo], limit: usize) -> StatusReport {
    let mut all_runs = Vec::new();
    for repo in repos {
        match fetch_repo_status(repo, limit) {
            Ok(runs) => all_runs.extend(runs),
            Err(e) => warn!("failed to fetch status for {}: {e}", repo.full_name()),
        }
    }

    StatusReport {
        revisions: group_by_forge_revision(all_runs),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::test_run;
    use super::*;

    #[test]
    fn parse_forge_commit_message() {
        let message = "Update generated design\n\n\
            Source commit: abc1234\n\
            Workflow run: https://github.com/mithro/gf180mcu-sram-forge/actions/runs/12345\n";
        let (sha, run_id) = parse_forge_commit(message);
        assert_eq!(sha.as_deref(), Some("abc1234"));
        assert_eq!(run_id, Some(12345));
    }

    #[test]
    fn parse_forge_commit_handles_missing_fields() {
        assert_eq!(parse_forge_commit("plain commit"), (None, None));
        let (sha, run_id) = parse_forge_commit("Source commit: deadbeef");
        assert_eq!(sha.as_deref(), Some("deadbeef"));
        assert_eq!(run_id, None);
    }

    #[test]
    fn raw_run_json_parses() {
        let json = r#"[{
            "workflowName": "harden",
            "status": "completed",
            "conclusion": "success",
            "databaseId": 17,
            "headSha": "0123abc",
            "updatedAt": "2026-08-01T12:00:00Z",
            "url": "https://github.com/mithro/x/actions/runs/17"
        }, {
            "workflowName": "harden",
            "status": "in_progress",
            "conclusion": "",
            "databaseId": 18,
            "headSha": "0123abd",
            "updatedAt": "2026-08-01T13:00:00Z",
            "url": "https://github.com/mithro/x/actions/runs/18"
        }]"#;
        let runs: Vec<RawRun> = serde_json::from_str(json).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].status, RunStatus::Completed);
        assert_eq!(
            parse_conclusion(runs[0].conclusion.as_deref()).unwrap(),
            Some(Conclusion::Success)
        );
        assert_eq!(parse_conclusion(runs[1].conclusion.as_deref()).unwrap(), None);
    }

    #[test]
    fn unknown_conclusion_is_an_error() {
        assert!(parse_conclusion(Some("exploded")).is_err());
    }

    #[test]
    fn grouping_by_revision() {
        let runs = vec![
            test_run("sram512x8", Some("aaa1111"), true),
            test_run("sram256x8", Some("aaa1111"), true),
            test_run("sram512x8", Some("bbb2222"), false),
            test_run("sram64x8", None, true),
        ];
        let revisions = group_by_forge_revision(runs);
        assert_eq!(revisions.len(), 3);

        let by_sha: Vec<&str> = revisions.iter().map(|r| r.forge_sha.as_str()).collect();
        assert!(by_sha.contains(&"aaa1111"));
        assert!(by_sha.contains(&"bbb2222"));
        assert!(by_sha.iter().any(|s| s.starts_with("unknown-")));

        let aaa = revisions.iter().find(|r| r.forge_sha == "aaa1111").unwrap();
        assert_eq!(aaa.total_count(), 2);
        assert!(aaa.all_passing());
        assert!(aaa
            .forge_run_url
            .as_deref()
            .unwrap()
            .contains("/actions/runs/99"));
    }
}
