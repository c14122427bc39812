//! Configuration module for FastNews.

use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::{FastNewsError, Result};

/// Topic key of the "all sources combined" channel.
pub const ALL_USERS_TOPIC: &str = "all_users";

/// Environment variable overriding `push.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "FASTNEWS_PUSH_ACCESS_TOKEN";

/// Web API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Whether the Web API is enabled.
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/fastnews.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/fastnews.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// User agent sent with every feed request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Number of leading items kept from each source.
    #[serde(default = "default_max_items_per_source")]
    pub max_items_per_source: usize,
}

fn default_user_agent() -> String {
    "FastNews-Notifier/1.0 (RSS Poller)".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_max_items_per_source() -> usize {
    5
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            max_items_per_source: default_max_items_per_source(),
        }
    }
}

/// Push channel configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Whether messages are really sent. When false, messages are only logged.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the FCM HTTP v1 API.
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    /// Firebase project ID.
    #[serde(default)]
    pub project_id: String,
    /// Static OAuth2 access token.
    #[serde(default)]
    pub access_token: String,
    /// Path to a service account JSON key used to mint access tokens.
    #[serde(default)]
    pub credentials_path: String,
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_push_endpoint(),
            project_id: String::new(),
            access_token: String::new(),
            credentials_path: String::new(),
        }
    }
}

/// Schedule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Time zone the cadences are anchored to (e.g., "Asia/Ho_Chi_Minh").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Cadence of the primary job in hours.
    #[serde(default = "default_primary_interval")]
    pub primary_interval_hours: u32,
    /// Cadence of the categories job in hours.
    #[serde(default = "default_categories_interval")]
    pub categories_interval_hours: u32,
    /// Run one sweep per job immediately at startup.
    #[serde(default)]
    pub run_on_startup: bool,
}

fn default_timezone() -> String {
    "Asia/Ho_Chi_Minh".to_string()
}

fn default_primary_interval() -> u32 {
    1
}

fn default_categories_interval() -> u32 {
    2
}

impl ScheduleConfig {
    /// Parsed time zone. Call after [`Config::validate`].
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| FastNewsError::Config(format!("unknown time zone: {}", self.timezone)))
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            primary_interval_hours: default_primary_interval(),
            categories_interval_hours: default_categories_interval(),
            run_on_startup: false,
        }
    }
}

/// Which scheduled job sweeps a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// The "all sources combined" job.
    Primary,
    /// The per-category job.
    Categories,
}

impl JobKind {
    /// Job name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Primary => "primary",
            JobKind::Categories => "categories",
        }
    }
}

/// A notification topic and the feeds that feed it.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicConfig {
    /// Topic key, also the push channel name.
    pub key: String,
    /// Human-readable category name used in notification titles.
    pub display_name: String,
    /// Feed URLs.
    pub sources: Vec<String>,
    /// Job that sweeps this topic.
    #[serde(default = "default_job")]
    pub job: JobKind,
}

fn default_job() -> JobKind {
    JobKind::Categories
}

impl TopicConfig {
    /// Create a new topic.
    pub fn new(key: &str, display_name: &str, sources: &[&str], job: JobKind) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            job,
        }
    }
}

fn default_topics() -> Vec<TopicConfig> {
    use JobKind::{Categories, Primary};

    vec![
        TopicConfig::new(
            ALL_USERS_TOPIC,
            "Tin tức mới",
            &[
                "https://vnexpress.net/rss/tin-moi-nhat.rss",
                "https://tuoitre.vn/rss/tin-moi-nhat.rss",
                "https://thanhnien.vn/rss/home.rss",
            ],
            Primary,
        ),
        TopicConfig::new(
            "chinh_tri",
            "Chính trị",
            &["https://vnexpress.net/rss/thoi-su.rss"],
            Categories,
        ),
        TopicConfig::new(
            "kinh_te",
            "Kinh tế",
            &["https://vnexpress.net/rss/kinh-doanh.rss"],
            Categories,
        ),
        TopicConfig::new(
            "the_gioi",
            "Thế giới",
            &["https://vnexpress.net/rss/the-gioi.rss"],
            Categories,
        ),
        TopicConfig::new(
            "the_thao",
            "Thể thao",
            &["https://vnexpress.net/rss/the-thao.rss"],
            Categories,
        ),
        TopicConfig::new(
            "cong_nghe",
            "Công nghệ",
            &["https://vnexpress.net/rss/so-hoa.rss"],
            Categories,
        ),
        TopicConfig::new(
            "giai_tri",
            "Giải trí",
            &["https://vnexpress.net/rss/giai-tri.rss"],
            Categories,
        ),
        TopicConfig::new(
            "suc_khoe",
            "Sức khỏe",
            &["https://vnexpress.net/rss/suc-khoe.rss"],
            Categories,
        ),
        TopicConfig::new(
            "du_lich",
            "Du lịch",
            &["https://vnexpress.net/rss/du-lich.rss"],
            Categories,
        ),
    ]
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Feed fetching configuration.
    #[serde(default)]
    pub feeds: FeedsConfig,
    /// Push channel configuration.
    #[serde(default)]
    pub push: PushConfig,
    /// Schedule configuration.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Topics.
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            feeds: FeedsConfig::default(),
            push: PushConfig::default(),
            schedule: ScheduleConfig::default(),
            topics: default_topics(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FastNewsError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FastNewsError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FASTNEWS_PUSH_ACCESS_TOKEN`: Override the push access token
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            if !token.is_empty() {
                self.push.access_token = token;
            }
        }
    }

    /// Topics swept by the given job, in configuration order.
    pub fn topics_for(&self, job: JobKind) -> Vec<TopicConfig> {
        self.topics.iter().filter(|t| t.job == job).cloned().collect()
    }

    /// Find a topic by key.
    pub fn topic(&self, key: &str) -> Option<&TopicConfig> {
        self.topics.iter().find(|t| t.key == key)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.schedule.tz()?;

        for (name, hours) in [
            ("primary_interval_hours", self.schedule.primary_interval_hours),
            ("categories_interval_hours", self.schedule.categories_interval_hours),
        ] {
            if hours == 0 || 24 % hours != 0 {
                return Err(FastNewsError::Config(format!(
                    "{name} must divide 24 evenly, got {hours}"
                )));
            }
        }

        if self.feeds.max_items_per_source == 0 {
            return Err(FastNewsError::Config(
                "max_items_per_source must be at least 1".to_string(),
            ));
        }

        if self.topics.is_empty() {
            return Err(FastNewsError::Config("no topics configured".to_string()));
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if topic.key.is_empty() {
                return Err(FastNewsError::Config("topic key is empty".to_string()));
            }
            if !seen.insert(topic.key.as_str()) {
                return Err(FastNewsError::Config(format!(
                    "duplicate topic: {}",
                    topic.key
                )));
            }
            if topic.sources.is_empty() {
                return Err(FastNewsError::Config(format!(
                    "topic {} has no sources",
                    topic.key
                )));
            }
            for source in &topic.sources {
                crate::feed::validate_url(source)?;
            }
        }

        if self.push.enabled {
            if self.push.project_id.is_empty() {
                return Err(FastNewsError::Config(
                    "push is enabled but project_id is not set".to_string(),
                ));
            }
            if self.push.access_token.is_empty() && self.push.credentials_path.is_empty() {
                return Err(FastNewsError::Config(format!(
                    "push is enabled but neither credentials_path nor access_token is set. \
                     Set one in config.toml or via {ACCESS_TOKEN_ENV}."
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.web.enabled);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);

        assert_eq!(config.database.path, "data/fastnews.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/fastnews.log");

        assert_eq!(config.feeds.connect_timeout_secs, 10);
        assert_eq!(config.feeds.read_timeout_secs, 20);
        assert_eq!(config.feeds.total_timeout_secs, 30);
        assert_eq!(config.feeds.max_redirects, 5);
        assert_eq!(config.feeds.max_feed_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.feeds.max_items_per_source, 5);

        assert!(!config.push.enabled);
        assert_eq!(config.push.endpoint, "https://fcm.googleapis.com");

        assert_eq!(config.schedule.timezone, "Asia/Ho_Chi_Minh");
        assert_eq!(config.schedule.primary_interval_hours, 1);
        assert_eq!(config.schedule.categories_interval_hours, 2);
        assert!(!config.schedule.run_on_startup);

        assert_eq!(config.topics.len(), 9);
        assert_eq!(config.topics[0].key, ALL_USERS_TOPIC);
        assert_eq!(config.topics[0].sources.len(), 3);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_topics_for_job() {
        let config = Config::default();

        let primary = config.topics_for(JobKind::Primary);
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].key, ALL_USERS_TOPIC);

        let categories = config.topics_for(JobKind::Categories);
        assert_eq!(categories.len(), 8);
        assert!(categories.iter().all(|t| t.key != ALL_USERS_TOPIC));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[web]
enabled = false
host = "127.0.0.1"
port = 3000

[database]
path = "custom/markers.db"

[logging]
level = "debug"
file = "custom/logs/app.log"

[feeds]
user_agent = "Test/1.0"
max_items_per_source = 3

[push]
enabled = true
project_id = "fastnews-test"
access_token = "token"

[schedule]
timezone = "UTC"
primary_interval_hours = 2
categories_interval_hours = 6
run_on_startup = true

[[topics]]
key = "sports"
display_name = "Sports"
sources = ["https://example.com/a.rss", "https://example.org/b.rss"]

[[topics]]
key = "all_users"
display_name = "News"
sources = ["https://example.com/all.rss"]
job = "primary"
"#;

        let config = Config::parse(toml).unwrap();

        assert!(!config.web.enabled);
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.database.path, "custom/markers.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.feeds.user_agent, "Test/1.0");
        assert_eq!(config.feeds.max_items_per_source, 3);
        assert_eq!(config.feeds.total_timeout_secs, 30);
        assert!(config.push.enabled);
        assert_eq!(config.push.project_id, "fastnews-test");
        assert_eq!(config.schedule.timezone, "UTC");
        assert_eq!(config.schedule.categories_interval_hours, 6);
        assert!(config.schedule.run_on_startup);

        assert_eq!(config.topics.len(), 2);
        assert_eq!(config.topics[0].job, JobKind::Categories);
        assert_eq!(config.topics[1].job, JobKind::Primary);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.web.port, 8080);
        assert_eq!(config.topics.len(), 9);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(FastNewsError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(FastNewsError::Io(_))));
    }

    #[test]
    fn test_validate_unknown_timezone() {
        let mut config = Config::default();
        config.schedule.timezone = "Mars/Olympus".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown time zone"));
    }

    #[test]
    fn test_validate_cadence_must_divide_day() {
        let mut config = Config::default();
        config.schedule.categories_interval_hours = 5;
        assert!(config.validate().is_err());

        config.schedule.categories_interval_hours = 0;
        assert!(config.validate().is_err());

        config.schedule.categories_interval_hours = 12;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_topic() {
        let mut config = Config::default();
        let dup = config.topics[1].clone();
        config.topics.push(dup);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate topic"));
    }

    #[test]
    fn test_validate_topic_without_sources() {
        let mut config = Config::default();
        config.topics[2].sources.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("has no sources"));
    }

    #[test]
    fn test_validate_bad_source_url() {
        let mut config = Config::default();
        config.topics[0].sources.push("ftp://example.com/feed".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_push_enabled_without_credentials() {
        let mut config = Config::default();
        config.push.enabled = true;
        config.push.project_id = "fastnews".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("credentials_path"));

        config.push.credentials_path = "service-account.json".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_env_overrides_access_token() {
        let original = std::env::var(ACCESS_TOKEN_ENV).ok();

        std::env::set_var(ACCESS_TOKEN_ENV, "env-token");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.push.access_token, "env-token");

        std::env::set_var(ACCESS_TOKEN_ENV, "");
        let mut config = Config::default();
        config.push.access_token = "file-token".to_string();
        config.apply_env_overrides();
        assert_eq!(config.push.access_token, "file-token");

        if let Some(val) = original {
            std::env::set_var(ACCESS_TOKEN_ENV, val);
        } else {
            std::env::remove_var(ACCESS_TOKEN_ENV);
        }
    }
}
