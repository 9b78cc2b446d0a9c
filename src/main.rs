use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::Parser;
use std::time::Duration;

mod auth;
mod backend;
mod cli;
mod ext;
mod model;
mod render;
mod sample;
mod score;
mod session;
mod util;

use crate::auth::{AuthStore, SessionState};
use crate::cli::{Cli, Command, EffectiveConfig, RunArgs, normalize};
use crate::session::{CompletedRun, RunOptions, RunOrigin, Session};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_tracing(cli.verbose, cli.log_level.as_deref());

  // Phase 1: normalize CLI flags and environment into an effective config
  let cfg = normalize(&cli)?;

  // Phase 2: resolve the "now" instant once; every timestamp hangs off it
  let now = util::effective_now(util::parse_now_override(cfg.now_override.as_deref()));

  // Phase 3: dispatch
  match cli.command {
    Some(Command::Run(ref args)) => cmd_run(args, &cfg, now),
    Some(Command::Results { json }) => cmd_results(&cfg, now, json),
    Some(Command::PreviewBranch { ref team, ref leader }) => {
      println!("{}", model::derive_branch_name(team, leader));
      Ok(())
    }
    Some(Command::Health { json }) => cmd_health(&cfg, now, json),
    Some(Command::Signup { ref email, ref name }) => cmd_signup(&cfg, email, name, now),
    Some(Command::Verify { ref email, ref code }) => cmd_verify(&cfg, email, code),
    Some(Command::Login { ref email }) => cmd_login(&cfg, email, now),
    Some(Command::Logout) => cmd_logout(&cfg),
    Some(Command::Whoami) => cmd_whoami(&cfg, now),
    None => bail!("Missing command; see --help for usage"),
  }
}

fn init_tracing(verbose: bool, log_level: Option<&str>) {
  let fallback = if verbose { "agent_run_report=debug" } else { "agent_run_report=warn" };

  let filter = tracing_subscriber::EnvFilter::try_from_env("ARR_LOG")
    .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level.unwrap_or(fallback)))
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .try_init();
}

fn cmd_run(args: &RunArgs, cfg: &EffectiveConfig, now: DateTime<Local>) -> Result<()> {
  let request = model::RunRequest {
    repo_url: args.repo_url.clone(),
    team_name: args.team.clone(),
    leader_name: args.leader.clone(),
  };

  // Guard 1: reject bad input before touching the backend; exit code 2
  // distinguishes validation failures from runtime errors.
  if let Err(problems) = request.validate() {
    for problem in &problems {
      eprintln!("{}", problem);
    }
    std::process::exit(2);
  }

  let backend = backend::build_backend(&cfg.api_url, args.timeout_secs, now, &cfg.tz);
  let opts = RunOptions {
    offline: args.offline,
    sim_delay: Duration::from_millis(cfg.sim_delay_ms),
    now,
    tz: cfg.tz.clone(),
  };

  let mut session = Session::new();
  session.submit_run(backend.as_ref(), &request, &opts)?;

  let run = session.current().context("run completed without a result")?;

  if let Some(out) = args.out.as_deref() {
    render::write_json_pretty(&run.result, out)?;
  }

  if args.json {
    println!("{}", render::render_json(&run.result)?);
  } else {
    print!("{}", render::render_report(run));
  }

  Ok(())
}

fn cmd_results(cfg: &EffectiveConfig, now: DateTime<Local>, json: bool) -> Result<()> {
  let backend = backend::build_backend(&cfg.api_url, backend::HEALTH_TIMEOUT_SECS, now, &cfg.tz);
  let result = backend.latest_results()?;

  if json {
    println!("{}", render::render_json(&result)?);
    return Ok(());
  }

  // Stored results came from a real run; no sample notice applies.
  let run = CompletedRun {
    origin: RunOrigin::Backend,
    result,
  };
  print!("{}", render::render_report(&run));

  Ok(())
}

fn cmd_health(cfg: &EffectiveConfig, now: DateTime<Local>, json: bool) -> Result<()> {
  let backend = backend::build_backend(&cfg.api_url, backend::HEALTH_TIMEOUT_SECS, now, &cfg.tz);
  let health = backend.health()?;

  if json {
    println!("{}", serde_json::to_string_pretty(&health).context("serializing health payload")?);
    return Ok(());
  }

  println!("{:<9}{}", "Backend:", cfg.api_url);
  println!("{:<9}{} ({})", "Status:", health.status, health.agent);
  if let Some(ts) = &health.timestamp {
    println!("{:<9}{}", "Time:", ts);
  }

  Ok(())
}

fn cmd_signup(cfg: &EffectiveConfig, email: &str, name: &str, now: DateTime<Local>) -> Result<()> {
  let code = AuthStore::open(&cfg.home).signup(email, name, now)?;
  println!("Your verification code is: {}", code);
  Ok(())
}

fn cmd_verify(cfg: &EffectiveConfig, email: &str, code: &str) -> Result<()> {
  AuthStore::open(&cfg.home).verify(email, code)?;
  println!("Email verified. You can now login.");
  Ok(())
}

fn cmd_login(cfg: &EffectiveConfig, email: &str, now: DateTime<Local>) -> Result<()> {
  let session = AuthStore::open(&cfg.home).login(email, now)?;
  println!("Logged in as {} <{}>.", session.name, session.email);
  Ok(())
}

fn cmd_logout(cfg: &EffectiveConfig) -> Result<()> {
  if AuthStore::open(&cfg.home).logout()? {
    println!("Logged out.");
  } else {
    println!("No active session.");
  }
  Ok(())
}

fn cmd_whoami(cfg: &EffectiveConfig, now: DateTime<Local>) -> Result<()> {
  match AuthStore::open(&cfg.home).current(now)? {
    SessionState::Active(s) => {
      println!("{:<9}{}", "Name:", s.name);
      println!("{:<9}{}", "Email:", s.email);
      println!("{:<9}{}", "Expires:", s.expires_at);
      Ok(())
    }
    SessionState::Expired => bail!("Session expired. Please login again."),
    SessionState::Missing => bail!("Not logged in"),
  }
}
