use crate::common;

#[test]
fn offline_run_renders_the_sample_report() {
  let mut cmd = common::offline_run("https://github.com/acme/app", "Neo", "Trinity");
  let out = cmd.output().unwrap();
  assert!(out.status.success());

  let text = String::from_utf8_lossy(&out.stdout);
  insta::assert_snapshot!(text, @r###"
Agent Run Report
================

Repository:  https://github.com/acme/app
Branch:      NEO_TRINITY_AI_Fix
Team:        Neo (lead: Trinity)
CI status:   PASSED
Failures:    5 found, 4 fixed
Iterations:  3 / 5
Time taken:  2m 34s

Note: showing built-in sample data (backend result unavailable).

Fixes
-----
FILE                 TYPE         LINE  STATUS  COMMIT MESSAGE
src/utils/parser.py  SYNTAX         42  Fixed   [AI-AGENT] Fixed SYNTAX error in src/utils/parser.py line 42
src/models/user.py   TYPE_ERROR     17  Fixed   [AI-AGENT] Fixed TYPE_ERROR error in src/models/user.py line 17
tests/test_auth.py   IMPORT          3  Fixed   [AI-AGENT] Fixed IMPORT error in tests/test_auth.py line 3
src/api/routes.py    LOGIC          88  Fixed   [AI-AGENT] Fixed LOGIC error in src/api/routes.py line 88
src/config.py        INDENTATION    12  Failed  [AI-AGENT] Fixed INDENTATION error in src/config.py line 12

Timeline
--------
  1  FAIL  2025-08-15T11:57:26Z
  2  FAIL  2025-08-15T11:58:28Z
  3  PASS  2025-08-15T11:59:46Z

Score
-----
Base:               100
Speed bonus:        +15
Efficiency bonus:   +10
Quality bonus:      +5
Efficiency penalty: -0
Final score:        130 / 150 (87%) Excellent
Fix rate 80.0%, 3 iterations: CI passed
"###);
}

#[test]
fn offline_run_emits_result_json() {
  let mut cmd = common::offline_run("https://github.com/acme/app", "Neo", "Trinity");
  let out = cmd.arg("--json").output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["repo_url"], "https://github.com/acme/app");
  assert_eq!(v["team_name"], "Neo");
  assert_eq!(v["leader_name"], "Trinity");
  assert_eq!(v["branch_name"], "NEO_TRINITY_AI_Fix");
  assert_eq!(v["ci_status"], "PASSED");
  assert_eq!(v["time_taken"], "2m 34s");
  assert_eq!(v["score"]["final_score"], 130);
  assert_eq!(v["score"]["breakdown"]["fix_rate"], "80.0%");
  assert_eq!(v["fixes"].as_array().unwrap().len(), 5);
  assert_eq!(v["timeline"][2]["timestamp"], "2025-08-15T11:59:46Z");
}

#[test]
fn unreachable_backend_falls_back_to_sample() {
  // Nothing listens on port 1; the run should still succeed and say so.
  let mut cmd = common::bin();
  let out = cmd
    .args([
      "run",
      "--repo-url",
      "https://github.com/acme/app",
      "--team",
      "Neo",
      "--leader",
      "Trinity",
      "--api-url",
      "http://127.0.0.1:1",
      "--tz",
      "utc",
      "--now-override",
      common::FROZEN_NOW,
    ])
    .env("ARR_TEST_SIM_DELAY_MS", "0")
    .output()
    .unwrap();

  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  assert!(text.contains("Note: showing built-in sample data (backend result unavailable)."));
  assert!(text.contains("NEO_TRINITY_AI_Fix"));
}
