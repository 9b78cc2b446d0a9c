// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Project a completed run into terminal surfaces (summary, fixes table, timeline, score panel) and JSON export
// role: rendering/output
// inputs: CompletedRun (result + origin); output path for the JSON export
// outputs: Plain text report, pretty JSON string, results.json on disk
// invariants: Pure projection of the model; sample-backed reports always carry a visible notice
// errors: Only serialization and filesystem failures; bubbled with path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};

use crate::model::{Fix, RunResult, TimelineEntry};
use crate::score::{score_label, score_percentage, MAX_ITERATIONS, MAX_SCORE};
use crate::session::{CompletedRun, RunOrigin};
use crate::util::ensure_parent_dir;

/// Renders the full text report for a completed run.
pub fn render_report(run: &CompletedRun) -> String {
  let mut out = String::new();

  out.push_str("Agent Run Report\n");
  out.push_str("================\n\n");
  push_summary(&mut out, run);
  out.push('\n');
  push_fixes(&mut out, &run.result.fixes);
  out.push('\n');
  push_timeline(&mut out, &run.result.timeline);
  out.push('\n');
  push_score(&mut out, &run.result);

  out
}

fn push_summary(out: &mut String, run: &CompletedRun) {
  let r = &run.result;

  out.push_str(&format!("{:<13}{}\n", "Repository:", r.repo_url));
  out.push_str(&format!("{:<13}{}\n", "Branch:", r.branch_name));
  out.push_str(&format!("{:<13}{} (lead: {})\n", "Team:", r.team_name, r.leader_name));
  out.push_str(&format!("{:<13}{}\n", "CI status:", r.ci_status));
  out.push_str(&format!("{:<13}{} found, {} fixed\n", "Failures:", r.total_failures, r.total_fixes));
  out.push_str(&format!("{:<13}{} / {}\n", "Iterations:", r.iterations_used, MAX_ITERATIONS));
  out.push_str(&format!("{:<13}{}\n", "Time taken:", r.time_taken));

  if run.origin == RunOrigin::Sample {
    out.push('\n');
    out.push_str("Note: showing built-in sample data (backend result unavailable).\n");
  }
}

fn push_fixes(out: &mut String, fixes: &[Fix]) {
  out.push_str("Fixes\n-----\n");

  if fixes.is_empty() {
    out.push_str("  (none)\n");
    return;
  }

  let file_w = fixes.iter().map(|f| f.file.len()).max().unwrap_or(0).max("FILE".len());
  let type_w = fixes
    .iter()
    .map(|f| f.bug_type.to_string().len())
    .max()
    .unwrap_or(0)
    .max("TYPE".len());

  out.push_str(&format!(
    "{:<file_w$}  {:<type_w$}  LINE  STATUS  COMMIT MESSAGE\n",
    "FILE", "TYPE"
  ));

  for fix in fixes {
    out.push_str(&format!(
      "{:<file_w$}  {:<type_w$}  {:>4}  {:<6}  {}\n",
      fix.file,
      fix.bug_type.to_string(),
      fix.line,
      fix.status.to_string(),
      fix.commit_message
    ));
  }
}

fn push_timeline(out: &mut String, timeline: &[TimelineEntry]) {
  out.push_str("Timeline\n--------\n");

  if timeline.is_empty() {
    out.push_str("  (none)\n");
    return;
  }

  for entry in timeline {
    out.push_str(&format!("{:>3}  {:<4}  {}\n", entry.iteration, entry.status.to_string(), entry.timestamp));
  }
}

fn push_score(out: &mut String, result: &RunResult) {
  let s = &result.score;

  out.push_str("Score\n-----\n");
  out.push_str(&format!("{:<20}{}\n", "Base:", s.base));
  out.push_str(&format!("{:<20}+{}\n", "Speed bonus:", s.speed_bonus));
  out.push_str(&format!("{:<20}+{}\n", "Efficiency bonus:", s.efficiency_bonus));
  out.push_str(&format!("{:<20}+{}\n", "Quality bonus:", s.quality_bonus));
  out.push_str(&format!("{:<20}-{}\n", "Efficiency penalty:", s.efficiency_penalty));
  out.push_str(&format!(
    "{:<20}{} / {} ({}%) {}\n",
    "Final score:",
    s.final_score,
    MAX_SCORE,
    score_percentage(s.final_score),
    score_label(s.final_score)
  ));

  if let Some(b) = &s.breakdown {
    out.push_str(&format!("Fix rate {}, {} iterations: {}\n", b.fix_rate, b.iterations, b.reason));
  }
}

/// Pretty JSON for the report, exactly the wire shape.
pub fn render_json(result: &RunResult) -> Result<String> {
  serde_json::to_string_pretty(result).context("serializing run result")
}

/// Writes `results.json`-style output, creating parent directories as needed.
pub fn write_json_pretty(result: &RunResult, path: &str) -> Result<()> {
  ensure_parent_dir(path)?;

  let mut text = render_json(result)?;
  text.push('\n');

  std::fs::write(path, text).with_context(|| format!("writing report to {}", path))?;
  tracing::info!(path = %path, "wrote report");

  Ok(())
}
