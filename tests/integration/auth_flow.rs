use crate::common;
use predicates::prelude::*;

#[test]
fn signup_verify_login_whoami_round_trip() {
  let (_td, home) = test_support::temp_report_home();

  let out = common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["signup", "--email", "neo@example.com", "--name", "Neo", "--now-override", common::FROZEN_NOW])
    .output()
    .unwrap();
  assert!(out.status.success());
  let code = common::extract_verification_code(&String::from_utf8_lossy(&out.stdout));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["verify", "--email", "neo@example.com", "--code", &code])
    .assert()
    .success()
    .stdout(predicate::str::contains("Email verified. You can now login."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["login", "--email", "neo@example.com", "--now-override", common::FROZEN_NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("Logged in as Neo <neo@example.com>."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["whoami", "--now-override", common::FROZEN_NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("neo@example.com"))
    .stdout(predicate::str::contains("2025-08-16T12:00:00Z"));

  // A day later the token is stale.
  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["whoami", "--now-override", "2025-08-16T13:00:00Z"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Session expired. Please login again."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["logout"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Logged out."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["logout"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No active session."));
}

#[test]
fn auth_errors_use_the_exact_account_messages() {
  let (_td, home) = test_support::temp_report_home();

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["whoami"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Not logged in"));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["login", "--email", "ghost@example.com"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Account not found. Please sign up first."));

  let out = common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["signup", "--email", "neo@example.com", "--name", "Neo", "--now-override", common::FROZEN_NOW])
    .output()
    .unwrap();
  assert!(out.status.success());
  let code = common::extract_verification_code(&String::from_utf8_lossy(&out.stdout));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["signup", "--email", "neo@example.com", "--name", "Neo"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Account already exists. Please login instead."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["login", "--email", "neo@example.com"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Email not verified. Please verify your email first."));

  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["verify", "--email", "neo@example.com", "--code", "12ab"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Please enter a 6-digit verification code"));

  let wrong = if code == "000000" { "000001" } else { "000000" };
  common::bin()
    .env("AGENT_REPORT_HOME", &home)
    .args(["verify", "--email", "neo@example.com", "--code", wrong])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid verification code. Please try again."));
}
