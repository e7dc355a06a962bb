use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// How observation cycles are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fixed-interval poll of the match store
    Poll,
    /// Postgres LISTEN/NOTIFY change feed
    Feed,
}

impl TriggerMode {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "poll" => Ok(TriggerMode::Poll),
            "feed" => Ok(TriggerMode::Feed),
            _ => Err(format!("Invalid TRIGGER_MODE: {}. Must be one of: poll, feed", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Poll => "poll",
            TriggerMode::Feed => "feed",
        }
    }
}

/// Match watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub trigger_mode: TriggerMode,
    pub poll_interval_secs: u64,
    pub feed_retry_delay_secs: u64,
    /// Quiet period used to fold a burst of change notifications into one fetch
    pub feed_debounce_millis: u64,
    pub notify_second_half: bool,
}

/// Telegram Bot API credentials
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub watcher: WatcherConfig,
    pub telegram: Option<TelegramConfig>,
    pub log_level: String,
    pub log_json: bool,
    pub http_port: Option<u16>,
    pub environment: String,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS").unwrap_or(5);
        let acquire_timeout_secs = env_parse::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);
        let idle_timeout_secs = env_parse::<u64>("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600); // 10 minutes
        let max_lifetime_secs = env_parse::<u64>("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800); // 30 minutes
        let test_before_acquire = env_parse::<bool>("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/vortex".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl WatcherConfig {
    /// Create watcher config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let trigger_mode = match env::var("TRIGGER_MODE") {
            Ok(mode) => TriggerMode::from_str(&mode)?,
            Err(_) => TriggerMode::Poll,
        };

        let poll_interval_secs = env_parse::<u64>("POLL_INTERVAL_SECS").unwrap_or(5);
        let feed_retry_delay_secs = env_parse::<u64>("FEED_RETRY_DELAY_SECS").unwrap_or(5);
        let feed_debounce_millis = env_parse::<u64>("FEED_DEBOUNCE_MILLIS").unwrap_or(250);
        let notify_second_half = env_parse::<bool>("NOTIFY_SECOND_HALF").unwrap_or(true);

        if poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            trigger_mode,
            poll_interval_secs,
            feed_retry_delay_secs,
            feed_debounce_millis,
            notify_second_half,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn feed_retry_delay(&self) -> Duration {
        Duration::from_secs(self.feed_retry_delay_secs)
    }

    pub fn feed_debounce(&self) -> Duration {
        Duration::from_millis(self.feed_debounce_millis)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            trigger_mode: TriggerMode::Poll,
            poll_interval_secs: 5,
            feed_retry_delay_secs: 5,
            feed_debounce_millis: 250,
            notify_second_half: true,
        }
    }
}

impl TelegramConfig {
    /// Read Telegram settings; `Ok(None)` when the bot is not configured at all
    pub fn from_env() -> Result<Option<Self>, String> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty());
        let chat_id = env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty());

        match (bot_token, chat_id) {
            (None, None) => Ok(None),
            (Some(bot_token), Some(chat_id)) => Ok(Some(Self {
                api_url: env::var("TELEGRAM_API_URL")
                    .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
                bot_token,
                chat_id,
                timeout_secs: env_parse::<u64>("TELEGRAM_TIMEOUT_SECS").unwrap_or(10),
            })),
            _ => Err("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set together".to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let watcher = WatcherConfig::from_env()?;
        let telegram = TelegramConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

        let http_port = env_parse::<u16>("HTTP_PORT");

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let log_json = match log_format.to_lowercase().as_str() {
            "pretty" => false,
            "json" => true,
            _ => return Err(format!("Invalid LOG_FORMAT: {}. Must be one of: pretty, json", log_format)),
        };

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            watcher,
            telegram,
            log_level: log_level.to_lowercase(),
            log_json,
            http_port,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            watcher: WatcherConfig::default(),
            telegram: None,
            log_level: "info".to_string(),
            log_json: false,
            http_port: None,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.is_development());
        assert!(config.telegram.is_none());
        assert_eq!(config.watcher.trigger_mode, TriggerMode::Poll);
        assert_eq!(config.watcher.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.watcher.feed_debounce(), Duration::from_millis(250));
        assert!(config.watcher.notify_second_half);
    }

    #[test]
    fn test_trigger_mode_parse() {
        assert_eq!(TriggerMode::from_str("POLL"), Ok(TriggerMode::Poll));
        assert_eq!(TriggerMode::from_str("feed"), Ok(TriggerMode::Feed));
        assert!(TriggerMode::from_str("webhook").is_err());
        assert_eq!(TriggerMode::Feed.as_str(), "feed");
    }
}
