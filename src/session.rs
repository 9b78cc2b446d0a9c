// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Own per-session run state and orchestrate submission (backend attempt, sample fallback, single-flight gate)
// role: orchestration/state
// inputs: Validated RunRequest; an AgentBackend implementation; RunOptions (offline flag, delay, now, tz)
// outputs: CompletedRun (result + origin) stored on the session and readable by rendering
// invariants:
// - At most one run in flight; the loading flag is cleared on every exit path via a drop guard
// - A submission always completes with a report: backend failure degrades to the sample, never to an error
// - The stored result is replaced wholesale; no merging with a previous run
// errors: Only the single-flight violation surfaces as an error; backend failures are logged and absorbed
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cell::Cell;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Local};

use crate::backend::AgentBackend;
use crate::model::{derive_branch_name, RunRequest, RunResult};
use crate::sample::sample_result;

/// Where a completed run's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOrigin {
  Backend,
  Sample,
}

#[derive(Debug, Clone)]
pub struct CompletedRun {
  pub origin: RunOrigin,
  pub result: RunResult,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
  /// Skip the backend entirely and synthesize from the sample (demo mode).
  pub offline: bool,
  /// Pause before serving the fallback, mimicking pipeline latency.
  pub sim_delay: Duration,
  pub now: DateTime<Local>,
  pub tz: String,
}

/// Application-scoped state: the current report and the in-flight gate.
pub struct Session {
  loading: Cell<bool>,
  current: Option<CompletedRun>,
}

struct LoadingGuard<'a> {
  flag: &'a Cell<bool>,
}

impl Drop for LoadingGuard<'_> {
  fn drop(&mut self) {
    self.flag.set(false);
  }
}

impl Session {
  pub fn new() -> Self {
    Self {
      loading: Cell::new(false),
      current: None,
    }
  }

  pub fn loading(&self) -> bool {
    self.loading.get()
  }

  pub fn current(&self) -> Option<&CompletedRun> {
    self.current.as_ref()
  }

  /// Drop any stored report, returning the session to its initial state.
  pub fn reset(&mut self) {
    self.current = None;
  }

  /// Submit one run. The backend gets exactly one attempt; any failure falls
  /// back to the built-in sample stamped with the request's identity fields.
  pub fn submit_run(&mut self, backend: &dyn AgentBackend, request: &RunRequest, opts: &RunOptions) -> Result<()> {
    // Guard 1: single-flight only
    if self.loading.get() {
      bail!("a run is already in progress");
    }

    self.loading.set(true);
    let _guard = LoadingGuard { flag: &self.loading };

    let completed = execute(backend, request, opts);
    self.current = Some(completed);

    Ok(())
  }
}

fn execute(backend: &dyn AgentBackend, request: &RunRequest, opts: &RunOptions) -> CompletedRun {
  if !opts.offline {
    match backend.run_agent(request) {
      Ok(result) => {
        if !result.ci_matches_timeline() {
          tracing::warn!(
            ci_status = ?result.ci_status,
            "backend report's ci_status disagrees with its timeline"
          );
        }

        return CompletedRun {
          origin: RunOrigin::Backend,
          result,
        };
      }
      Err(err) => {
        tracing::warn!(error = %format!("{:#}", err), "backend run failed; falling back to sample report");
      }
    }
  }

  if !opts.sim_delay.is_zero() {
    std::thread::sleep(opts.sim_delay);
  }

  CompletedRun {
    origin: RunOrigin::Sample,
    result: synthesize_fallback(request, opts.now, &opts.tz),
  }
}

/// Clones the sample report and stamps it with the request's identity fields.
/// Everything else (counts, fixes, timeline, score) stays sample data.
pub fn synthesize_fallback(request: &RunRequest, now: DateTime<Local>, tz: &str) -> RunResult {
  let mut result = sample_result(now, tz);

  result.repo_url = request.repo_url.clone();
  result.team_name = request.team_name.clone();
  result.leader_name = request.leader_name.clone();
  result.branch_name = derive_branch_name(
    or_placeholder(&request.team_name, "TEAM"),
    or_placeholder(&request.leader_name, "LEADER"),
  );

  result
}

fn or_placeholder<'a>(name: &'a str, placeholder: &'a str) -> &'a str {
  if name.trim().is_empty() {
    placeholder
  } else {
    name
  }
}
