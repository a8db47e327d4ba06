use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let lead_store = match (
            non_empty_var("APP_SUPABASE_URL"),
            non_empty_var("APP_SUPABASE_ANON_KEY"),
        ) {
            (Some(url), Some(anon_key)) => Some(LeadStoreConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                request_timeout: millis_var("APP_SUPABASE_TIMEOUT_MS", 10_000)?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteLeadStore),
        };

        let activity_interval = millis_var("APP_ACTIVITY_INTERVAL_MS", 4_000)?;
        let notice_dismiss = millis_var("APP_NOTICE_DISMISS_MS", 5_000)?;
        let session_idle = millis_var("APP_SESSION_IDLE_MS", 1_800_000)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            intake: IntakeConfig {
                lead_store,
                timing: IntakeTiming {
                    activity_interval,
                    notice_dismiss,
                    session_idle,
                },
            },
        })
    }
}

fn non_empty_var(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn millis_var(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    let millis = match non_empty_var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidDuration { name })?,
        None => default,
    };
    Ok(Duration::from_millis(millis))
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Lead intake wiring: where leads are persisted and how the page timers run.
#[derive(Debug, Clone, Default)]
pub struct IntakeConfig {
    /// Remote lead store. `None` keeps leads in process memory.
    pub lead_store: Option<LeadStoreConfig>,
    pub timing: IntakeTiming,
}

/// Credentials for the hosted `leads` table.
#[derive(Clone)]
pub struct LeadStoreConfig {
    pub url: String,
    pub anon_key: String,
    /// Upper bound on one insert request, connect through response body.
    pub request_timeout: Duration,
}

impl fmt::Debug for LeadStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeadStoreConfig")
            .field("url", &self.url)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeTiming {
    /// Period between activity feed rotations.
    pub activity_interval: Duration,
    /// How long the success notice stays up after a lead is stored.
    pub notice_dismiss: Duration,
    /// Sessions untouched for this long are closed and forgotten.
    pub session_idle: Duration,
}

impl Default for IntakeTiming {
    fn default() -> Self {
        Self {
            activity_interval: Duration::from_millis(4_000),
            notice_dismiss: Duration::from_millis(5_000),
            session_idle: Duration::from_millis(1_800_000),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    IncompleteLeadStore,
    InvalidDuration { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::IncompleteLeadStore => write!(
                f,
                "APP_SUPABASE_URL and APP_SUPABASE_ANON_KEY must be set together"
            ),
            ConfigError::InvalidDuration { name } => {
                write!(f, "{name} must be a positive number of milliseconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::IncompleteLeadStore
            | ConfigError::InvalidDuration { .. } => None,
        }
    }
}
