use crate::common;
use predicates::prelude::*;

#[test]
fn run_rejects_bad_input_with_exit_code_2() {
  let mut cmd = common::bin();
  cmd.args([
    "run",
    "--repo-url",
    "ftp://example.com/repo",
    "--team",
    "  ",
    "--leader",
    "Trinity",
  ]);

  cmd
    .assert()
    .code(2)
    .stderr(predicate::str::contains(
      "repo_url: Must be a valid GitHub URL (https://github.com/...)",
    ))
    .stderr(predicate::str::contains("team_name: Team name is required"));
}

#[test]
fn run_reports_every_missing_field_at_once() {
  let mut cmd = common::bin();
  cmd.args(["run", "--repo-url", "", "--team", "", "--leader", ""]);

  cmd
    .assert()
    .code(2)
    .stderr(predicate::str::contains("repo_url: Repository URL is required"))
    .stderr(predicate::str::contains("team_name: Team name is required"))
    .stderr(predicate::str::contains("leader_name: Leader name is required"));
}

#[test]
fn missing_command_is_an_error() {
  let mut cmd = common::bin();
  cmd
    .assert()
    .failure()
    .stderr(predicate::str::contains("Missing command"));
}
