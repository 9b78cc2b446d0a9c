// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the run-report JSON model (request, fixes, timeline, score) shared by orchestration and rendering
// role: model/types
// outputs: Serializable structs with stable snake_case field names matching the agent wire shape
// invariants: Wire field names are snake_case; enum casing is fixed (SCREAMING for ci/bug/timeline status, capitalized for fix status)
// errors: validate() collects per-field messages; never touches the network
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_GITHUB_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https://github\.com/[^/\s]+/[^/\s]+/?$").unwrap());

/// Parameters for one healing run, as sent to `POST /run-agent`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunRequest {
  pub repo_url: String,
  pub team_name: String,
  pub leader_name: String,
}

/// One field-level validation failure, suitable for inline display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field: &'static str,
  pub message: &'static str,
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.message)
  }
}

impl RunRequest {
  /// Validate all fields, collecting every failure rather than stopping at the first.
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if self.repo_url.trim().is_empty() {
      errors.push(FieldError { field: "repo_url", message: "Repository URL is required" });
    } else if !RE_GITHUB_URL.is_match(self.repo_url.trim()) {
      errors.push(FieldError {
        field: "repo_url",
        message: "Must be a valid GitHub URL (https://github.com/...)",
      });
    }

    if self.team_name.trim().is_empty() {
      errors.push(FieldError { field: "team_name", message: "Team name is required" });
    }

    if self.leader_name.trim().is_empty() {
      errors.push(FieldError { field: "leader_name", message: "Leader name is required" });
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors)
    }
  }

  pub fn branch_name(&self) -> String {
    derive_branch_name(&self.team_name, &self.leader_name)
  }
}

/// Derives the working-branch name from team and leader names.
///
/// Each name is trimmed, internal whitespace runs collapse to a single
/// underscore, and the result is uppercased: `TEAM_LEADER_AI_Fix`.
pub fn derive_branch_name(team_name: &str, leader_name: &str) -> String {
  format!("{}_{}_AI_Fix", collapse_name(team_name), collapse_name(leader_name))
}

fn collapse_name(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join("_").to_uppercase()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BugType {
  Linting,
  Syntax,
  Logic,
  TypeError,
  Import,
  Indentation,
}

impl fmt::Display for BugType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      BugType::Linting => "LINTING",
      BugType::Syntax => "SYNTAX",
      BugType::Logic => "LOGIC",
      BugType::TypeError => "TYPE_ERROR",
      BugType::Import => "IMPORT",
      BugType::Indentation => "INDENTATION",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum FixStatus {
  Fixed,
  Failed,
}

impl fmt::Display for FixStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      FixStatus::Fixed => "Fixed",
      FixStatus::Failed => "Failed",
    })
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Fix {
  pub file: String,
  pub bug_type: BugType,
  pub line: i64,
  pub commit_message: String,
  pub status: FixStatus,
}

/// The agent's commit-message convention for a repaired issue.
pub fn conventional_commit_message(bug_type: BugType, file: &str, line: i64) -> String {
  format!("[AI-AGENT] Fixed {} error in {} line {}", bug_type, file, line)
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimelineStatus {
  Pass,
  Fail,
}

impl fmt::Display for TimelineStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      TimelineStatus::Pass => "PASS",
      TimelineStatus::Fail => "FAIL",
    })
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimelineEntry {
  pub iteration: i64,
  pub status: TimelineStatus,
  pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CiStatus {
  Passed,
  Failed,
  Running,
}

impl fmt::Display for CiStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      CiStatus::Passed => "PASSED",
      CiStatus::Failed => "FAILED",
      CiStatus::Running => "RUNNING",
    })
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Score {
  pub base: i64,
  pub speed_bonus: i64,
  pub efficiency_bonus: i64,
  pub quality_bonus: i64,
  pub efficiency_penalty: i64,
  pub final_score: i64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub breakdown: Option<ScoreBreakdown>,
}

/// Display-only explanation of a score; never feeds back into the arithmetic.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoreBreakdown {
  pub time_seconds: f64,
  pub time_formatted: String,
  pub total_failures: i64,
  pub total_fixes: i64,
  pub fix_rate: String,
  pub iterations: i64,
  pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunResult {
  pub repo_url: String,
  pub branch_name: String,
  pub team_name: String,
  pub leader_name: String,
  pub total_failures: i64,
  pub total_fixes: i64,
  pub iterations_used: i64,
  pub ci_status: CiStatus,
  pub time_taken: String,
  pub score: Score,
  pub fixes: Vec<Fix>,
  pub timeline: Vec<TimelineEntry>,
}

impl RunResult {
  /// True when `ci_status` agrees with the timeline: PASSED exactly when the
  /// last entry is a PASS. An empty timeline can never justify PASSED.
  pub fn ci_matches_timeline(&self) -> bool {
    let last_passed = matches!(self.timeline.last(), Some(entry) if entry.status == TimelineStatus::Pass);
    last_passed == (self.ci_status == CiStatus::Passed)
  }
}

/// Response shape of `GET /health`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Health {
  pub status: String,
  pub agent: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
}
