// bind addresses
// RPC endpoints include admin routes and no authentication layer,
// so the default only listens on localhost.
pub const DEFAULT_RPC_BIND_ADDRESS: &str = "127.0.0.1:8080";

// Default directory of the database
pub const DEFAULT_DIR_PATH: &str = "earn_data/";

// Max time a RocksDB transaction waits for a row lock
pub const DEFAULT_LOCK_TIMEOUT_MS: i64 = 5_000;

// Default block cache size (64 MB)
pub const DEFAULT_DB_CACHE_SIZE: usize = 64 * 1024 * 1024;

// Default write buffer size (64 MB)
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 64 * 1024 * 1024;

// Environment variable read once at startup to freeze every per-task reward
pub const GLOBAL_TASK_AMOUNT_ENV: &str = "GLOBAL_TASK_AMOUNT";
