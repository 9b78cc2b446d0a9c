// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for time formatting, deterministic "now" handling, output paths, and man page rendering
// role: utilities/helpers
// inputs: Epoch seconds; timezone labels; optional now override; clap CommandFactory
// outputs: RFC3339 timestamps, resolved now instant, directories ensured, man page text
// side_effects: ensure_parent_dir creates directories
// invariants:
// - iso_in_tz accepts "local", "utc", or an IANA zone name; unknown zones fall back to UTC
// - effective_now is the only sanctioned source of "now" so overrides stay honored everywhere
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use clap::CommandFactory;

/// Formats a Unix epoch timestamp into an RFC3339 string in the specified timezone.
pub fn iso_in_tz(epoch: i64, tz: &str) -> String {
  if tz.eq_ignore_ascii_case("local") {
    let dt = Local.timestamp_opt(epoch, 0).single().unwrap();
    return dt.to_rfc3339_opts(SecondsFormat::Secs, true);
  }

  if tz.eq_ignore_ascii_case("utc") {
    let dt = Utc.timestamp_opt(epoch, 0).single().unwrap();
    return dt.to_rfc3339_opts(SecondsFormat::Secs, true);
  }

  let dt_utc = Utc.timestamp_opt(epoch, 0).single().unwrap();

  match tz.parse::<Tz>() {
    Ok(zone) => zone
      .from_utc_datetime(&dt_utc.naive_utc())
      .to_rfc3339_opts(SecondsFormat::Secs, true),
    Err(_) => dt_utc.to_rfc3339_opts(SecondsFormat::Secs, true),
  }
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current local time is used. Centralizes our handling of test
/// determinism without sprinkling `Local::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}

/// Ensure the parent directory of an output file exists.
pub fn ensure_parent_dir(path: &str) -> Result<()> {
  if let Some(parent) = Path::new(path).parent() {
    if !parent.as_os_str().is_empty() {
      std::fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent.display()))?;
    }
  }

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
