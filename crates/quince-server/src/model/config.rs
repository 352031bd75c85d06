//! Configuration management for the Quince server
//!
//! Values come from `conf/application.yml`, `QUINCE_` prefixed environment
//! variables and command line overrides, in increasing precedence.

use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment};
use quince_config::CapacitySettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::startup::LoggingConfig;

use super::constants::{
    CONFIG_FILE, CORRECT_USAGE_DELAY, DB_CONNECT_TIMEOUT_SECS, DB_MAX_CONNECTIONS,
    DB_MIN_CONNECTIONS, DB_SQLX_LOGGING, DB_URL, DEFAULT_CLUSTER_QUOTA,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_GROUP_QUOTA, DEFAULT_MAX_AGGR_COUNT,
    DEFAULT_MAX_AGGR_SIZE, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_SIZE, DEFAULT_MIN_CONNECTIONS,
    DEFAULT_TENANT_QUOTA, ENV_PREFIX, INITIAL_EXPANSION_PERCENT, IS_CAPACITY_LIMIT_CHECK,
    IS_MANAGE_CAPACITY, LOGGING_CONSOLE, LOGGING_DIR, LOGGING_FILE, LOGGING_LEVEL,
    SWEEP_PAGE_DELAY_MS,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
    #[arg(long = "log-dir")]
    log_dir: Option<String>,
}

/// `QUINCE_` prefixed variables with `.` between nested keys, e.g. `QUINCE_DB.URL`
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(".")
        .try_parsing(true)
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(environment());

        if let Some(v) = args.database_url {
            config_builder = config_builder.set_override(DB_URL, v)?;
        }
        if let Some(v) = args.log_dir {
            config_builder = config_builder.set_override(LOGGING_DIR, v)?;
        }

        Ok(Self::from_config(config_builder.build()?))
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn database_url(&self) -> Option<String> {
        self.config.get_string(DB_URL).ok()
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let max_connections = self
            .config
            .get_int(DB_MAX_CONNECTIONS)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let min_connections = self
            .config
            .get_int(DB_MIN_CONNECTIONS)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_MIN_CONNECTIONS);
        let connect_timeout = self
            .config
            .get_int(DB_CONNECT_TIMEOUT_SECS)
            .map(|v| v as u64)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let sqlx_logging = self.config.get_bool(DB_SQLX_LOGGING).unwrap_or(false);

        let url = self
            .database_url()
            .ok_or_else(|| anyhow::anyhow!("missing `{}`, set it or pass --db-url", DB_URL))?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .sqlx_logging(sqlx_logging);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }

    // ========================================================================
    // Capacity Configuration
    // ========================================================================

    pub fn is_manage_capacity(&self) -> bool {
        self.config.get_bool(IS_MANAGE_CAPACITY).unwrap_or(true)
    }

    pub fn is_capacity_limit_check(&self) -> bool {
        self.config.get_bool(IS_CAPACITY_LIMIT_CHECK).unwrap_or(false)
    }

    /// Capacity switches and defaults, falling back to the built-in values
    pub fn capacity_settings(&self) -> CapacitySettings {
        let defaults = CapacitySettings::default();
        let int_or = |key: &str, default: i32| {
            self.config
                .get_int(key)
                .map(|v| v as i32)
                .unwrap_or(default)
        };

        CapacitySettings {
            manage_capacity: self.is_manage_capacity(),
            capacity_limit_check: self.is_capacity_limit_check(),
            default_cluster_quota: int_or(DEFAULT_CLUSTER_QUOTA, defaults.default_cluster_quota),
            default_group_quota: int_or(DEFAULT_GROUP_QUOTA, defaults.default_group_quota),
            default_tenant_quota: int_or(DEFAULT_TENANT_QUOTA, defaults.default_tenant_quota),
            default_max_size: int_or(DEFAULT_MAX_SIZE, defaults.default_max_size),
            default_max_aggr_count: int_or(DEFAULT_MAX_AGGR_COUNT, defaults.default_max_aggr_count),
            default_max_aggr_size: int_or(DEFAULT_MAX_AGGR_SIZE, defaults.default_max_aggr_size),
            initial_expansion_percent: int_or(
                INITIAL_EXPANSION_PERCENT,
                defaults.initial_expansion_percent,
            ),
            correct_usage_delay: self
                .config
                .get_int(CORRECT_USAGE_DELAY)
                .map(|v| Duration::from_secs(v.max(1) as u64))
                .unwrap_or(defaults.correct_usage_delay),
            sweep_page_delay: self
                .config
                .get_int(SWEEP_PAGE_DELAY_MS)
                .map(|v| Duration::from_millis(v.max(0) as u64))
                .unwrap_or(defaults.sweep_page_delay),
        }
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string(LOGGING_DIR).ok(),
            self.config.get_bool(LOGGING_CONSOLE).unwrap_or(true),
            self.config.get_bool(LOGGING_FILE).unwrap_or(true),
            self.config
                .get_string(LOGGING_LEVEL)
                .unwrap_or("info".to_string()),
        )
    }
}
