use chrono::{DateTime, Local};

use crate::model::{
  conventional_commit_message, BugType, CiStatus, Fix, FixStatus, RunResult, TimelineEntry, TimelineStatus,
};
use crate::score::{compute_score, format_time};
use crate::util::iso_in_tz;

// Elapsed wall time the sample run claims, in seconds.
const SAMPLE_ELAPSED_SECS: f64 = 154.0;

// Seconds before "now" at which each timeline iteration concluded.
const SAMPLE_TIMELINE_OFFSETS: [(i64, TimelineStatus); 3] =
  [(154, TimelineStatus::Fail), (92, TimelineStatus::Fail), (14, TimelineStatus::Pass)];

/// Builds the deterministic sample report used when no backend is reachable.
///
/// Counts, fixes, and status are fixed; timeline timestamps are anchored to
/// `now` so the report always reads as freshly produced, and the score is
/// computed from the sample's own counters.
pub fn sample_result(now: DateTime<Local>, tz: &str) -> RunResult {
  let fix = |file: &str, bug_type: BugType, line: i64, status: FixStatus| Fix {
    file: file.to_string(),
    bug_type,
    line,
    commit_message: conventional_commit_message(bug_type, file, line),
    status,
  };

  let timeline = SAMPLE_TIMELINE_OFFSETS
    .iter()
    .enumerate()
    .map(|(i, (offset, status))| TimelineEntry {
      iteration: i as i64 + 1,
      status: *status,
      timestamp: iso_in_tz(now.timestamp() - offset, tz),
    })
    .collect();

  RunResult {
    repo_url: "https://github.com/example/demo-repo".to_string(),
    branch_name: "DEVTEAM_ALICE_AI_Fix".to_string(),
    team_name: "DevTeam".to_string(),
    leader_name: "Alice".to_string(),
    total_failures: 5,
    total_fixes: 4,
    iterations_used: 3,
    ci_status: CiStatus::Passed,
    time_taken: format_time(SAMPLE_ELAPSED_SECS),
    score: compute_score(5, 4, SAMPLE_ELAPSED_SECS, 3, CiStatus::Passed),
    fixes: vec![
      fix("src/utils/parser.py", BugType::Syntax, 42, FixStatus::Fixed),
      fix("src/models/user.py", BugType::TypeError, 17, FixStatus::Fixed),
      fix("tests/test_auth.py", BugType::Import, 3, FixStatus::Fixed),
      fix("src/api/routes.py", BugType::Logic, 88, FixStatus::Fixed),
      fix("src/config.py", BugType::Indentation, 12, FixStatus::Failed),
    ],
    timeline,
  }
}
