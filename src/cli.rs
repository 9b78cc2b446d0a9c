use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::backend::RUN_TIMEOUT_SECS;

pub const ENV_API_URL: &str = "AGENT_API_URL";
pub const ENV_REPORT_HOME: &str = "AGENT_REPORT_HOME";
pub const ENV_SIM_DELAY_MS: &str = "ARR_TEST_SIM_DELAY_MS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_SIM_DELAY_MS: u64 = 3000;

#[derive(Parser, Debug)]
#[command(
    name = "agent-run-report",
    version,
    about = "Trigger the CI/CD healing agent and report the run outcome",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Backend base URL (default: $AGENT_API_URL, then http://localhost:8000)
  #[arg(long, global = true)]
  pub api_url: Option<String>,

  /// Timezone for ISO timestamps in output: "local", "utc", or an IANA name
  #[arg(long, global = true, default_value = "local")]
  pub tz: String,

  /// Log chatty progress to stderr
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Explicit tracing filter, e.g. "debug" (ARR_LOG takes precedence)
  #[arg(long, global = true)]
  pub log_level: Option<String>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for deterministic output (hidden; tests only)
  #[arg(long = "now-override", global = true, hide = true)]
  pub now_override: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Trigger an agent run against a repository and report the outcome
  Run(RunArgs),

  /// Fetch the latest run result stored by the backend
  Results {
    /// Print the result as pretty JSON instead of the text report
    #[arg(long)]
    json: bool,
  },

  /// Print the branch name the agent would create for a team/leader pair
  PreviewBranch {
    /// Team name
    #[arg(long)]
    team: String,

    /// Team leader name
    #[arg(long)]
    leader: String,
  },

  /// Probe the backend health endpoint
  Health {
    /// Print the health payload as pretty JSON
    #[arg(long)]
    json: bool,
  },

  /// Create a local account (prints a verification code)
  Signup {
    /// Account email
    #[arg(long)]
    email: String,

    /// Display name
    #[arg(long)]
    name: String,
  },

  /// Confirm an account with its 6-digit verification code
  Verify {
    /// Account email
    #[arg(long)]
    email: String,

    /// 6-digit code printed by signup
    #[arg(long)]
    code: String,
  },

  /// Start a session for a verified account
  Login {
    /// Account email
    #[arg(long)]
    email: String,
  },

  /// Drop the current session
  Logout,

  /// Show the logged-in profile
  Whoami,
}

#[derive(Args, Debug)]
pub struct RunArgs {
  /// GitHub repository the agent should heal (https://github.com/...)
  #[arg(long)]
  pub repo_url: String,

  /// Team name (used to derive the agent branch)
  #[arg(long)]
  pub team: String,

  /// Team leader name (used to derive the agent branch)
  #[arg(long)]
  pub leader: String,

  /// Skip the backend entirely and render the built-in sample report
  #[arg(long)]
  pub offline: bool,

  /// Print the result as pretty JSON instead of the text report
  #[arg(long)]
  pub json: bool,

  /// Also write the result to this path as JSON
  #[arg(long)]
  pub out: Option<String>,

  /// Backend request timeout in seconds
  #[arg(long, default_value_t = RUN_TIMEOUT_SECS)]
  pub timeout_secs: u64,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub api_url: String,
  pub tz: String,
  pub home: PathBuf,
  pub sim_delay_ms: u64,
  pub now_override: Option<String>,
}

pub fn normalize(cli: &Cli) -> Result<EffectiveConfig> {
  // Flag wins over env; env wins over the built-in default.
  let api_url = cli
    .api_url
    .clone()
    .or_else(|| std::env::var(ENV_API_URL).ok().filter(|v| !v.trim().is_empty()))
    .unwrap_or_else(|| DEFAULT_API_URL.to_string());
  let api_url = api_url.trim().trim_end_matches('/').to_string();

  let tz_raw = cli.tz.trim();
  let tz = if tz_raw.eq_ignore_ascii_case("local") {
    "local".to_string()
  } else if tz_raw.eq_ignore_ascii_case("utc") {
    "utc".to_string()
  } else if tz_raw.parse::<chrono_tz::Tz>().is_ok() {
    tz_raw.to_string()
  } else {
    bail!("Unknown timezone '{tz_raw}'; use \"local\", \"utc\", or an IANA name like \"Asia/Tokyo\"");
  };

  let home = match std::env::var(ENV_REPORT_HOME).ok().filter(|v| !v.trim().is_empty()) {
    Some(dir) => PathBuf::from(dir),
    None => match std::env::var("HOME").ok().filter(|v| !v.trim().is_empty()) {
      Some(home) => PathBuf::from(home).join(".agent-run-report"),
      None => bail!("Cannot locate a home directory; set {ENV_REPORT_HOME}"),
    },
  };

  // Lenient on purpose: a malformed delay falls back to the default rather than failing the run.
  let sim_delay_ms = std::env::var(ENV_SIM_DELAY_MS)
    .ok()
    .and_then(|v| v.trim().parse::<u64>().ok())
    .unwrap_or(DEFAULT_SIM_DELAY_MS);

  Ok(EffectiveConfig {
    api_url,
    tz,
    home,
    sim_delay_ms,
    now_override: cli.now_override.clone(),
  })
}
