use crate::common;

fn fixture_hook() -> String {
  format!("@{}", test_support::fixtures_dir().join("backend_result.json").display())
}

#[test]
fn canned_backend_result_is_adopted_verbatim() {
  let mut cmd = common::bin();
  let out = cmd
    .args([
      "run",
      "--repo-url",
      "https://github.com/acme/payments",
      "--team",
      "Platform",
      "--leader",
      "Morpheus",
      "--json",
    ])
    .env("ARR_TEST_RESULT_JSON", fixture_hook())
    .output()
    .unwrap();

  assert!(out.status.success());
  let got: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  let want: serde_json::Value = test_support::read_fixture_json("backend_result.json");
  assert_eq!(got, want);
}

#[test]
fn backend_results_render_without_the_sample_notice() {
  let mut cmd = common::bin();
  let out = cmd
    .args([
      "run",
      "--repo-url",
      "https://github.com/acme/payments",
      "--team",
      "Platform",
      "--leader",
      "Morpheus",
    ])
    .env("ARR_TEST_RESULT_JSON", fixture_hook())
    .output()
    .unwrap();

  assert!(out.status.success());
  let text = String::from_utf8_lossy(&out.stdout);
  assert!(!text.contains("sample data"));
  assert!(text.contains("Branch:      PLATFORM_MORPHEUS_AI_Fix"));
  assert!(text.contains("Final score:        135 / 150 (90%) Excellent"));
}
