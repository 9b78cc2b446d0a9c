// Local account + session store under the tool home directory.
// Layout: accounts.json (per-email records), session.json (opaque token + cached profile).

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::iso_in_tz;

static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());

/// Sessions expire a day after login; `whoami` refuses stale ones.
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
  pub email: String,
  pub name: String,
  pub verified: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pending_code: Option<String>,
}

/// Opaque token plus the cached profile projection; no credentials are stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionToken {
  pub token: String,
  pub email: String,
  pub name: String,
  pub issued_at: String,
  pub expires_at: String,
}

#[derive(Debug)]
pub enum SessionState {
  Missing,
  Expired,
  Active(SessionToken),
}

pub struct AuthStore {
  dir: PathBuf,
}

impl AuthStore {
  pub fn open(dir: &Path) -> Self {
    Self { dir: dir.to_path_buf() }
  }

  fn accounts_path(&self) -> PathBuf {
    self.dir.join("accounts.json")
  }

  fn session_path(&self) -> PathBuf {
    self.dir.join("session.json")
  }

  fn load_accounts(&self) -> Result<BTreeMap<String, Account>> {
    let path = self.accounts_path();

    if !path.exists() {
      return Ok(BTreeMap::new());
    }

    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
  }

  fn save_accounts(&self, accounts: &BTreeMap<String, Account>) -> Result<()> {
    std::fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;

    let path = self.accounts_path();
    let mut text = serde_json::to_string_pretty(accounts).context("serializing accounts")?;
    text.push('\n');

    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
  }

  /// Create an unverified account and return its verification code.
  /// The caller is responsible for delivering the code (we print it).
  pub fn signup(&self, email: &str, name: &str, now: DateTime<Local>) -> Result<String> {
    let key = normalize_email(email);

    if key.is_empty() {
      bail!("Email is required");
    }
    if name.trim().is_empty() {
      bail!("Name is required");
    }

    let mut accounts = self.load_accounts()?;

    if accounts.contains_key(&key) {
      bail!("Account already exists. Please login instead.");
    }

    let code = derive_code(&key, now);
    accounts.insert(
      key.clone(),
      Account {
        email: key,
        name: name.trim().to_string(),
        verified: false,
        pending_code: Some(code.clone()),
      },
    );
    self.save_accounts(&accounts)?;

    Ok(code)
  }

  /// Confirm an account with its 6-digit code.
  pub fn verify(&self, email: &str, code: &str) -> Result<()> {
    if !RE_CODE.is_match(code.trim()) {
      bail!("Please enter a 6-digit verification code");
    }

    let key = normalize_email(email);
    let mut accounts = self.load_accounts()?;

    let Some(account) = accounts.get_mut(&key) else {
      bail!("Account not found. Please sign up first.");
    };

    if account.verified {
      return Ok(());
    }

    if account.pending_code.as_deref() != Some(code.trim()) {
      bail!("Invalid verification code. Please try again.");
    }

    account.verified = true;
    account.pending_code = None;
    self.save_accounts(&accounts)
  }

  /// Issue a fresh session token for a verified account.
  pub fn login(&self, email: &str, now: DateTime<Local>) -> Result<SessionToken> {
    let key = normalize_email(email);
    let accounts = self.load_accounts()?;

    let Some(account) = accounts.get(&key) else {
      bail!("Account not found. Please sign up first.");
    };

    if !account.verified {
      bail!("Email not verified. Please verify your email first.");
    }

    let expires = now + chrono::Duration::hours(SESSION_TTL_HOURS);
    let session = SessionToken {
      token: derive_token(&key, now),
      email: account.email.clone(),
      name: account.name.clone(),
      issued_at: iso_in_tz(now.timestamp(), "utc"),
      expires_at: iso_in_tz(expires.timestamp(), "utc"),
    };

    std::fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;

    let path = self.session_path();
    let mut text = serde_json::to_string_pretty(&session).context("serializing session")?;
    text.push('\n');
    std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;

    Ok(session)
  }

  /// Remove the session file; returns whether one existed.
  pub fn logout(&self) -> Result<bool> {
    let path = self.session_path();

    match std::fs::remove_file(&path) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
  }

  /// Read the stored session, classifying it against `now`.
  pub fn current(&self, now: DateTime<Local>) -> Result<SessionState> {
    let path = self.session_path();

    if !path.exists() {
      return Ok(SessionState::Missing);
    }

    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let session: SessionToken = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let expires = chrono::DateTime::parse_from_rfc3339(&session.expires_at)
      .with_context(|| format!("parsing expiry in {}", path.display()))?;

    if now.with_timezone(&chrono::Utc) >= expires.with_timezone(&chrono::Utc) {
      return Ok(SessionState::Expired);
    }

    Ok(SessionState::Active(session))
  }
}

fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn derive_code(email: &str, now: DateTime<Local>) -> String {
  let mut h = DefaultHasher::new();
  email.hash(&mut h);
  now.timestamp_nanos_opt().unwrap_or_default().hash(&mut h);
  format!("{:06}", h.finish() % 1_000_000)
}

fn derive_token(email: &str, now: DateTime<Local>) -> String {
  let mut h1 = DefaultHasher::new();
  email.hash(&mut h1);
  now.timestamp_nanos_opt().unwrap_or_default().hash(&mut h1);

  let mut h2 = DefaultHasher::new();
  h1.finish().hash(&mut h2);
  email.len().hash(&mut h2);

  format!("{:016x}{:016x}", h1.finish(), h2.finish())
}
