use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

use crate::{
    auth::password::validate_password_hash,
    entities::rate_limit::{Quota, RateLimitPolicy},
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Only enable behind a proxy that overwrites `X-Forwarded-For`.
    #[serde(default)]
    pub trust_forwarded_for: bool,

    #[serde(default = "default_contact_max_attempts")]
    pub contact_max_attempts: u32,

    #[serde(default = "default_contact_window")]
    pub contact_window: String,

    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: u32,

    #[serde(default = "default_login_window")]
    pub login_window: String,

    #[serde(default = "default_sweep_interval")]
    pub counter_sweep_interval: String,

    #[serde(default)]
    pub notify_webhook_url: Option<Url>,

    #[serde(default = "default_notify_sender")]
    pub notify_sender: String,

    #[serde(default = "default_notify_recipient")]
    pub notify_recipient: String,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default)]
    pub admin_password_hash: String,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "STEM-CURES".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_max_connections() -> u32 {
    10
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_contact_max_attempts() -> u32 {
    3
}
fn default_contact_window() -> String {
    "1h".to_string()
}
fn default_login_max_attempts() -> u32 {
    5
}
fn default_login_window() -> String {
    "15m".to_string()
}
fn default_sweep_interval() -> String {
    "5m".to_string()
}
fn default_notify_sender() -> String {
    "noreply@stemcures.org".to_string()
}
fn default_notify_recipient() -> String {
    "info@stemcures.org".to_string()
}
fn default_admin_username() -> String {
    "admin".to_string()
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.database_url = fill_or_env(config.database_url, "DATABASE_URL")?;

        config.validate()?;
        Ok(config)
    }

    /// Collects every problem so a bad deployment fails once, with all of them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty".to_string());
        }
        if let Err(e) = self.rate_limit_policy() {
            errors.push(e.to_string());
        }
        if let Err(e) = self.counter_sweep_interval() {
            errors.push(e.to_string());
        }
        if !self.admin_password_hash.is_empty() {
            if let Err(e) = validate_password_hash(&self.admin_password_hash) {
                errors.push(format!("ADMIN_PASSWORD_HASH: {}", e));
            }
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, ConfigError> {
        let contact = quota("contact", self.contact_max_attempts, &self.contact_window)?;
        let login = quota("login", self.login_max_attempts, &self.login_window)?;
        Ok(RateLimitPolicy { contact, login })
    }

    /// Period of the expired-counter sweep, between one second and one year.
    pub fn counter_sweep_interval(&self) -> Result<Duration, ConfigError> {
        let every = parse_window("counter_sweep_interval", &self.counter_sweep_interval)?;
        if every < Duration::from_secs(1) || every > Quota::MAX_WINDOW {
            return Err(ConfigError::Message(format!(
                "counter_sweep_interval: {:?} is outside 1s..1y",
                self.counter_sweep_interval
            )));
        }
        Ok(every)
    }
}

fn parse_window(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw.trim())
        .map_err(|e| ConfigError::Message(format!("{field}: invalid duration {raw:?}: {e}")))
}

fn quota(action: &str, max_attempts: u32, window: &str) -> Result<Quota, ConfigError> {
    let window = parse_window(&format!("{action}_window"), window)?;
    Quota::new(max_attempts, window)
        .map_err(|e| ConfigError::Message(format!("{action} quota: {e}")))
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("APP_{env_key} or {env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("database_max_connections", &self.database_max_connections)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .field("contact_max_attempts", &self.contact_max_attempts)
            .field("contact_window", &self.contact_window)
            .field("login_max_attempts", &self.login_max_attempts)
            .field("login_window", &self.login_window)
            .field("counter_sweep_interval", &self.counter_sweep_interval)
            .field("notify_webhook_url", &self.notify_webhook_url.as_ref().map(Url::as_str))
            .field("notify_recipient", &self.notify_recipient)
            .field("admin_username", &self.admin_username)
            .field("admin_password_hash", &self.admin_password_hash.redact())
            .finish()
    }
}
