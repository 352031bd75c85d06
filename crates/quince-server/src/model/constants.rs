// ============================================================================
// Database Constants
// ============================================================================

pub const DB_URL: &str = "db.url";
pub const DB_MAX_CONNECTIONS: &str = "db.pool.max_connections";
pub const DB_MIN_CONNECTIONS: &str = "db.pool.min_connections";
pub const DB_CONNECT_TIMEOUT_SECS: &str = "db.pool.connect_timeout_secs";
pub const DB_SQLX_LOGGING: &str = "db.pool.sqlx_logging";

pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Capacity Constants
// ============================================================================

pub const IS_MANAGE_CAPACITY: &str = "isManageCapacity";
pub const IS_CAPACITY_LIMIT_CHECK: &str = "isCapacityLimitCheck";
pub const DEFAULT_CLUSTER_QUOTA: &str = "defaultClusterQuota";
pub const DEFAULT_GROUP_QUOTA: &str = "defaultGroupQuota";
pub const DEFAULT_TENANT_QUOTA: &str = "defaultTenantQuota";
pub const DEFAULT_MAX_SIZE: &str = "defaultMaxSize";
pub const DEFAULT_MAX_AGGR_COUNT: &str = "defaultMaxAggrCount";
pub const DEFAULT_MAX_AGGR_SIZE: &str = "defaultMaxAggrSize";
pub const INITIAL_EXPANSION_PERCENT: &str = "initialExpansionPercent";
/// Seconds between two usage correction sweeps
pub const CORRECT_USAGE_DELAY: &str = "correctUsageDelay";
pub const SWEEP_PAGE_DELAY_MS: &str = "capacity.sweepPageDelayMs";

// ============================================================================
// Logging Constants
// ============================================================================

pub const LOGGING_DIR: &str = "logging.dir";
pub const LOGGING_LEVEL: &str = "logging.level";
pub const LOGGING_CONSOLE: &str = "logging.console";
pub const LOGGING_FILE: &str = "logging.file";

pub const CONFIG_FILE: &str = "conf/application.yml";
pub const ENV_PREFIX: &str = "quince";
