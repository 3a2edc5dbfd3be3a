//! MorningPost configuration system.
//!
//! TOML file first, then the `MAIL_*` environment variables on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MorningPostError, Result};

/// Someone who gets the daily mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    /// Weather location path, e.g. `beijing/chaoyang-district`.
    pub local: String,
}

/// Run mode: `dev` prints one preview instead of sending mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Production,
    Dev,
}

impl RunMode {
    pub fn is_preview(&self) -> bool {
        matches!(self, RunMode::Dev)
    }
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MorningPostConfig {
    #[serde(default)]
    pub mode: RunMode,
    /// Replaces the built-in template when non-empty.
    #[serde(default)]
    pub template_path: String,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl MorningPostConfig {
    /// Load config from the default path (~/.morningpost/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MorningPostError::Config(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MorningPostError::Config(format!("Failed to parse config: {e}")))
    }

    /// Overlay the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, using the `MAIL_*` variable names.
    /// Unset and empty variables leave the current value alone.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(json) = get("MAIL_TO") {
            self.recipients = parse_recipients(&json)?;
        }
        if let Some(mode) = get("MAIL_MODE") {
            self.mode = if mode.trim() == "dev" {
                RunMode::Dev
            } else {
                RunMode::Production
            };
        }
        if let Some(cron) = get("MAIL_CRON") {
            self.schedule.cron = cron;
        }
        if let Some(host) = get("MAIL_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = get("MAIL_PORT") {
            self.smtp.port = port
                .trim()
                .parse()
                .map_err(|e| MorningPostError::Config(format!("MAIL_PORT '{port}': {e}")))?;
        }
        if let Some(username) = get("MAIL_USERNAME") {
            self.smtp.username = username;
        }
        if let Some(password) = get("MAIL_PASSWORD") {
            self.smtp.password = password;
        }
        if let Some(from) = get("MAIL_FROM") {
            self.smtp.from = from;
        }
        if let Some(subject) = get("MAIL_SUBJECT") {
            self.smtp.subject = subject;
        }
        Ok(())
    }

    /// Switch to preview regardless of the configured mode (`--preview`).
    /// Call before [`validate`](Self::validate) so no sender is demanded.
    pub fn force_preview(&mut self) {
        self.mode = RunMode::Dev;
    }

    /// Reject settings that would only fail later, mid-cycle.
    pub fn validate(&self) -> Result<()> {
        for r in &self.recipients {
            if !r.email.contains('@') {
                return Err(MorningPostError::Config(format!(
                    "recipient '{}' is not an email address",
                    r.email
                )));
            }
            if r.local.trim().is_empty() {
                return Err(MorningPostError::Config(format!(
                    "recipient '{}' has no weather location",
                    r.email
                )));
            }
        }
        if self.delivery.max_concurrent == 0 {
            return Err(MorningPostError::Config(
                "delivery.max_concurrent must be at least 1".into(),
            ));
        }
        if !(-12..=14).contains(&self.schedule.utc_offset_hours) {
            return Err(MorningPostError::Config(format!(
                "schedule.utc_offset_hours {} out of range",
                self.schedule.utc_offset_hours
            )));
        }
        if !self.mode.is_preview() && !self.recipients.is_empty() && self.smtp.from.is_empty() {
            return Err(MorningPostError::Config(
                "smtp.from (MAIL_FROM) is required to send mail".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the MorningPost home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".morningpost")
    }
}

/// Parse the `MAIL_TO` JSON list: `[{"email": "...", "local": "..."}]`.
pub fn parse_recipients(json: &str) -> Result<Vec<Recipient>> {
    serde_json::from_str(json)
        .map_err(|e| MorningPostError::Config(format!("MAIL_TO is not a recipient list: {e}")))
}

/// Content source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_enabled_sources")]
    pub enabled: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub accept_invalid_certs: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_enabled_sources() -> Vec<String> {
    vec!["one", "english", "poem", "wallpaper"]
        .into_iter().map(String::from).collect()
}
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String { "Mozilla/5.0 (compatible; MorningPost/0.1)".into() }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_sources(),
            timeout_secs: default_timeout_secs(),
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    #[default]
    Starttls,
    Tls,
    None,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub from: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default)]
    pub tls: SmtpTls,
}

fn default_smtp_host() -> String { "smtp.qq.com".into() }
fn default_smtp_port() -> u16 { 25 }
fn default_subject() -> String { "Good morning".into() }

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            subject: default_subject(),
            tls: SmtpTls::default(),
        }
    }
}

/// Per-recipient fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Abort the run on the first failed delivery.
    #[serde(default = "bool_true")]
    pub fail_fast: bool,
}

fn bool_true() -> bool { true }
fn default_max_concurrent() -> usize { 4 }

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            fail_fast: true,
        }
    }
}

/// Recurring run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 5-field cron expression; empty runs a single cycle.
    #[serde(default)]
    pub cron: String,
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

fn default_utc_offset() -> i32 { 8 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: String::new(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

impl ScheduleConfig {
    pub fn is_recurring(&self) -> bool {
        !self.cron.trim().is_empty()
    }
}
