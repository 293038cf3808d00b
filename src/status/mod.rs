//! Downstream build-status reporting.
//!
//! Each generated chip lives in its own downstream repository built by CI.
//! This module polls those repositories through the `gh` CLI, groups the
//! workflow runs by the generator revision that produced them, and renders
//! the result as a terminal, markdown, or JSON report.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

pub mod fetcher;
pub mod report;

/// The generator repository; used to link revisions back to their workflow
/// runs.
pub const FORGE_REPO: &str = "mithro/gf180mcu-sram-forge";

/// One downstream repository holding a generated chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownstreamRepo {
    pub owner: String,
    pub name: String,
    /// SRAM identifier for display.
    pub sram: String,
    /// Slot size for display.
    pub slot: String,
}

impl DownstreamRepo {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Deserialize)]
struct DownstreamDb {
    #[serde(default)]
    repos: Vec<DownstreamRepo>,
}

/// Load the downstream repository list from a `downstream.toml` database.
pub fn load_downstream_repos(path: impl AsRef<Path>) -> Result<Vec<DownstreamRepo>> {
    let contents = fs::read_to_string(path)?;
    let db: DownstreamDb = toml::from_str(&contents)?;
    Ok(db.repos)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
    Cancelled,
    Skipped,
    Neutral,
    TimedOut,
    ActionRequired,
    Stale,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
            Conclusion::Cancelled => "cancelled",
            Conclusion::Skipped => "skipped",
            Conclusion::Neutral => "neutral",
            Conclusion::TimedOut => "timed_out",
            Conclusion::ActionRequired => "action_required",
            Conclusion::Stale => "stale",
        };
        f.write_str(s)
    }
}

/// A single GitHub Actions workflow run in a downstream repo.
///
/// Timestamps stay as the RFC 3339 strings `gh` reports; they compare and
/// sort correctly as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub repo: String,
    pub sram: String,
    pub slot: String,
    pub workflow_name: String,
    pub status: RunStatus,
    pub conclusion: Option<Conclusion>,
    pub run_id: u64,
    pub head_sha: String,
    pub updated_at: String,
    pub html_url: String,
    /// Generator commit that produced this build, parsed from the
    /// downstream commit message.
    pub forge_sha: Option<String>,
    /// Generator workflow run ID, parsed from the commit message.
    pub forge_run_id: Option<u64>,
}

impl WorkflowRun {
    pub fn is_success(&self) -> bool {
        self.conclusion == Some(Conclusion::Success)
    }
}

/// Workflow runs grouped by the generator revision that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeRevision {
    pub forge_sha: String,
    pub forge_run_url: Option<String>,
    pub timestamp: String,
    pub runs: Vec<WorkflowRun>,
}

impl ForgeRevision {
    pub fn passing_count(&self) -> usize {
        self.runs.iter().filter(|r| r.is_success()).count()
    }

    pub fn total_count(&self) -> usize {
        self.runs.len()
    }

    /// Summary string like "3/4".
    pub fn summary(&self) -> String {
        format!("{}/{}", self.passing_count(), self.total_count())
    }

    pub fn all_passing(&self) -> bool {
        self.passing_count() == self.total_count()
    }
}

/// Complete status report across all downstream repos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Revisions, most recent first.
    pub revisions: Vec<ForgeRevision>,
}
