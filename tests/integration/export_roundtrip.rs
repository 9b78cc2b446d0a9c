use crate::common;

#[test]
fn out_flag_writes_the_same_json_it_prints() {
  let td = test_support::tempdir();
  let out_path = td.path().join("exports").join("results.json");

  let mut cmd = common::offline_run("https://github.com/acme/app", "Neo", "Trinity");
  let out = cmd
    .args(["--json", "--out", out_path.to_str().unwrap()])
    .output()
    .unwrap();
  assert!(out.status.success());

  let printed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();

  // Parent directories are created on demand; the file ends in a newline.
  let raw = std::fs::read_to_string(&out_path).unwrap();
  assert!(raw.ends_with('\n'));
  let written: serde_json::Value = serde_json::from_str(&raw).unwrap();

  assert_eq!(printed, written);
}

#[test]
fn exported_report_reloads_into_the_same_shape() {
  let td = test_support::tempdir();
  let out_path = td.path().join("results.json");

  let mut cmd = common::offline_run("https://github.com/acme/app", "Neo", "Trinity");
  let out = cmd.args(["--out", out_path.to_str().unwrap()]).output().unwrap();
  assert!(out.status.success());

  let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
  assert_eq!(v["branch_name"], "NEO_TRINITY_AI_Fix");
  assert_eq!(v["score"]["final_score"], 130);
  assert_eq!(v["fixes"].as_array().unwrap().len(), 5);

  // The text report still lands on stdout when --json is absent.
  let text = String::from_utf8_lossy(&out.stdout);
  assert!(text.contains("Agent Run Report"));
}
