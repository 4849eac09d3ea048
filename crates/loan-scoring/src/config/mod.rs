use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MODEL_PATH: &str = "models/scoring_model.json";
const DEFAULT_ML_WEIGHT: f64 = 0.6;
const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 2_000;

/// Deployment stage, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the scoring service reads from `.env` and the process environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = var("APP_ENV")
            .map(|raw| AppEnvironment::parse(&raw))
            .unwrap_or(AppEnvironment::Development);

        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed("APP_PORT", ConfigError::InvalidPort)?.unwrap_or(DEFAULT_PORT),
        };

        let telemetry = TelemetryConfig {
            log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            scoring: ScoringSettings::from_env()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|source| ConfigError::InvalidHost { source })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

/// Model artifact location and the externally supplied scoring dials.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSettings {
    pub model_path: PathBuf,
    /// Overrides the barrier shipped in the model artifact when set.
    pub income_barrier: Option<f64>,
    pub ml_weight: f64,
    pub oracle_timeout_ms: u64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            income_barrier: None,
            ml_weight: DEFAULT_ML_WEIGHT,
            oracle_timeout_ms: DEFAULT_ORACLE_TIMEOUT_MS,
        }
    }
}

impl ScoringSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let income_barrier =
            parsed::<f64>("SCORING_INCOME_BARRIER", ConfigError::InvalidIncomeBarrier)?;
        if income_barrier.is_some_and(|value| !value.is_finite() || value <= 0.0) {
            return Err(ConfigError::InvalidIncomeBarrier);
        }

        let ml_weight = parsed::<f64>("SCORING_ML_WEIGHT", ConfigError::InvalidMlWeight)?
            .unwrap_or(defaults.ml_weight);
        if !(0.0..=1.0).contains(&ml_weight) {
            return Err(ConfigError::InvalidMlWeight);
        }

        let oracle_timeout_ms =
            parsed::<u64>("SCORING_ORACLE_TIMEOUT_MS", ConfigError::InvalidOracleTimeout)?
                .unwrap_or(defaults.oracle_timeout_ms);
        if oracle_timeout_ms == 0 {
            return Err(ConfigError::InvalidOracleTimeout);
        }

        Ok(Self {
            model_path: var("SCORING_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            income_barrier,
            ml_weight,
            oracle_timeout_ms,
        })
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }
}

/// Non-empty value of `key`, trimmed.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Absent is `Ok(None)`; present but unparseable is `error`.
fn parsed<T: FromStr>(key: &str, error: ConfigError) -> Result<Option<T>, ConfigError> {
    match var(key) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| error),
        None => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("SCORING_INCOME_BARRIER must be a positive number")]
    InvalidIncomeBarrier,
    #[error("SCORING_ML_WEIGHT must be a number between 0 and 1")]
    InvalidMlWeight,
    #[error("SCORING_ORACLE_TIMEOUT_MS must be a positive integer")]
    InvalidOracleTimeout,
}
