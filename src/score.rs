// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Canonical run scoring (150-point model) plus the display projections derived from it
// role: scoring/pure-functions
// inputs: Raw run counters (failures, fixes, elapsed seconds, iterations, CI status)
// outputs: Score with component bonuses, breakdown text, percentage and label for the gauge
// invariants: final_score stays within [0, MAX_SCORE]; breakdown is display-only and never feeds the arithmetic
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::model::{CiStatus, Score, ScoreBreakdown};

/// Ceiling of the scoring model.
pub const MAX_SCORE: i64 = 150;

/// Cap on pipeline iterations per run; the timeline never exceeds this.
pub const MAX_ITERATIONS: i64 = 5;

const BASE_AWARD: i64 = 100;

/// Computes the score for a completed run.
///
/// The components: a base award for a passing run, a speed bonus shrinking
/// with elapsed time, an efficiency bonus shrinking with fix count, a quality
/// bonus when all (or nearly all) failures were fixed, and a penalty for
/// excessive fix churn. A run that did not pass scores zero across the board.
/// A passing run with nothing to fix earns the fixed "already healthy" total.
pub fn compute_score(
  total_failures: i64,
  total_fixes: i64,
  elapsed_seconds: f64,
  iterations: i64,
  ci_status: CiStatus,
) -> Score {
  if ci_status != CiStatus::Passed {
    let reason = match ci_status {
      CiStatus::Failed => "CI failed",
      _ => "Run incomplete",
    };
    return zero_score(total_failures, total_fixes, elapsed_seconds, iterations, reason);
  }

  if total_failures == 0 {
    // Nothing to heal: fixed award, decomposed so the component identity holds.
    return Score {
      base: BASE_AWARD,
      speed_bonus: 20,
      efficiency_bonus: 10,
      quality_bonus: 10,
      efficiency_penalty: 0,
      final_score: 140,
      breakdown: Some(breakdown(
        total_failures,
        total_fixes,
        elapsed_seconds,
        iterations,
        "No issues found",
      )),
    };
  }

  let speed_bonus = if elapsed_seconds < 120.0 {
    20
  } else if elapsed_seconds < 300.0 {
    15
  } else if elapsed_seconds < 600.0 {
    10
  } else if elapsed_seconds < 900.0 {
    5
  } else {
    0
  };

  let efficiency_bonus = if total_fixes == 0 {
    0
  } else if total_fixes <= 5 {
    10
  } else if total_fixes <= 10 {
    5
  } else if total_fixes <= 15 {
    3
  } else {
    0
  };

  let quality_bonus = if total_fixes > 0 && total_fixes == total_failures {
    10
  } else if total_fixes as f64 >= 0.8 * total_failures as f64 {
    5
  } else {
    0
  };

  let efficiency_penalty = if total_fixes > 15 { (total_fixes - 15) * 2 } else { 0 };

  let raw = BASE_AWARD + speed_bonus + efficiency_bonus + quality_bonus - efficiency_penalty;

  Score {
    base: BASE_AWARD,
    speed_bonus,
    efficiency_bonus,
    quality_bonus,
    efficiency_penalty,
    final_score: raw.clamp(0, MAX_SCORE),
    breakdown: Some(breakdown(total_failures, total_fixes, elapsed_seconds, iterations, "CI passed")),
  }
}

fn zero_score(total_failures: i64, total_fixes: i64, elapsed_seconds: f64, iterations: i64, reason: &str) -> Score {
  Score {
    base: 0,
    speed_bonus: 0,
    efficiency_bonus: 0,
    quality_bonus: 0,
    efficiency_penalty: 0,
    final_score: 0,
    breakdown: Some(breakdown(total_failures, total_fixes, elapsed_seconds, iterations, reason)),
  }
}

fn breakdown(
  total_failures: i64,
  total_fixes: i64,
  elapsed_seconds: f64,
  iterations: i64,
  reason: &str,
) -> ScoreBreakdown {
  let fix_rate = if total_failures > 0 {
    total_fixes as f64 / total_failures as f64 * 100.0
  } else {
    0.0
  };

  ScoreBreakdown {
    time_seconds: (elapsed_seconds * 100.0).round() / 100.0,
    time_formatted: format_time(elapsed_seconds),
    total_failures,
    total_fixes,
    fix_rate: format!("{:.1}%", fix_rate),
    iterations,
    reason: reason.to_string(),
  }
}

/// Formats elapsed seconds for display: `45s`, `2m 34s`, `1h 1m`.
pub fn format_time(elapsed_seconds: f64) -> String {
  let total = elapsed_seconds as i64;
  if total < 60 {
    format!("{}s", total)
  } else if total < 3600 {
    format!("{}m {}s", total / 60, total % 60)
  } else {
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
  }
}

/// Gauge percentage: `round(100 * final / MAX_SCORE)`, clamped to 100.
pub fn score_percentage(final_score: i64) -> i64 {
  let pct = (final_score as f64 / MAX_SCORE as f64 * 100.0).round() as i64;
  pct.clamp(0, 100)
}

/// Gauge label for a final score.
pub fn score_label(final_score: i64) -> &'static str {
  if final_score >= 100 {
    "Excellent"
  } else if final_score >= 70 {
    "Good"
  } else {
    "Needs Work"
  }
}
