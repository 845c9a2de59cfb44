use clap::Parser;
use earn_common::{config::DEFAULT_TASKS_PER_DAY, reward::RewardSettings};
use serde::{Deserialize, Serialize};

use crate::{
    config::{
        DEFAULT_DB_CACHE_SIZE, DEFAULT_DIR_PATH, DEFAULT_LOCK_TIMEOUT_MS,
        DEFAULT_RPC_BIND_ADDRESS, DEFAULT_WRITE_BUFFER_SIZE, GLOBAL_TASK_AMOUNT_ENV,
    },
    core::storage::rocksdb::{CacheMode, CompressionMode},
};

fn default_rpc_bind_address() -> String {
    DEFAULT_RPC_BIND_ADDRESS.to_owned()
}

fn default_dir_path() -> String {
    DEFAULT_DIR_PATH.to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
#[serde(default)]
pub struct RocksDBConfig {
    /// Set the number of threads used by RocksDB background work
    #[clap(long = "rocksdb-background-threads", default_value_t = 2)]
    pub parallelism: usize,
    /// Set the max number of concurrent background jobs (flushes and compactions)
    #[clap(long = "rocksdb-max-background-jobs", default_value_t = 2)]
    pub max_background_jobs: usize,
    /// Set the max number of open files, -1 keeps them all open
    #[clap(long = "rocksdb-max-open-files", default_value_t = 1024)]
    pub max_open_files: i32,
    /// Number of RocksDB info log files to keep
    #[clap(long = "rocksdb-keep-max-log-files", default_value_t = 4)]
    pub keep_max_log_files: usize,
    /// Compression applied to every column
    #[clap(long = "rocksdb-compression-mode", value_enum, default_value_t = CompressionMode::Snappy)]
    pub compression_mode: CompressionMode,
    /// Block cache used by the tables
    #[clap(long = "rocksdb-cache-mode", value_enum, default_value_t = CacheMode::Lru)]
    pub cache_mode: CacheMode,
    /// Block cache size in bytes
    #[clap(long = "rocksdb-cache-size", default_value_t = DEFAULT_DB_CACHE_SIZE)]
    pub cache_size: usize,
    /// Write buffer size in bytes
    #[clap(long = "rocksdb-write-buffer-size", default_value_t = DEFAULT_WRITE_BUFFER_SIZE)]
    pub write_buffer_size: usize,
    /// Milliseconds a transaction waits on a locked row before failing
    #[clap(long = "rocksdb-lock-timeout-ms", default_value_t = DEFAULT_LOCK_TIMEOUT_MS)]
    pub lock_timeout_ms: i64,
}

impl Default for RocksDBConfig {
    fn default() -> Self {
        Self {
            parallelism: 2,
            max_background_jobs: 2,
            max_open_files: 1024,
            keep_max_log_files: 4,
            compression_mode: CompressionMode::default(),
            cache_mode: CacheMode::default(),
            cache_size: DEFAULT_DB_CACHE_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
#[serde(default)]
pub struct EarningConfig {
    /// Pay this amount for every task regardless of plans.
    /// Zero or unset computes the reward from the user's plan.
    #[clap(long, env = GLOBAL_TASK_AMOUNT_ENV)]
    pub global_task_amount: Option<u64>,
    /// Number of tasks assigned per user per day
    #[clap(long, default_value_t = DEFAULT_TASKS_PER_DAY)]
    pub tasks_per_day: u32,
    /// Synthesize default task templates when the catalog cannot fill a day
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub seed_default_tasks: bool,
}

impl Default for EarningConfig {
    fn default() -> Self {
        Self {
            global_task_amount: None,
            tasks_per_day: DEFAULT_TASKS_PER_DAY,
            seed_default_tasks: true,
        }
    }
}

impl EarningConfig {
    pub fn reward_settings(&self) -> RewardSettings {
        RewardSettings::new(self.global_task_amount, self.tasks_per_day)
    }
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[clap(version, about = "Earn Daemon: task rewards, eligibility and sponsor commissions")]
pub struct Config {
    /// Directory of the database
    #[clap(long, default_value_t = default_dir_path())]
    #[serde(default = "default_dir_path")]
    pub dir_path: String,
    /// Address the HTTP RPC server binds to
    #[clap(long, default_value_t = default_rpc_bind_address())]
    #[serde(default = "default_rpc_bind_address")]
    pub rpc_bind_address: String,
    /// Number of HTTP workers, 0 uses one per core
    #[clap(long, default_value_t = 0)]
    #[serde(default)]
    pub rpc_threads: usize,
    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value_t = default_log_level())]
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// JSON file whose content replaces the command line options
    #[clap(long)]
    #[serde(skip)]
    pub config_file: Option<String>,
    /// Write the current configuration to the config file and exit
    #[clap(long)]
    #[serde(skip)]
    pub generate_config_template: bool,
    #[clap(flatten)]
    #[serde(default)]
    pub rocksdb: RocksDBConfig,
    #[clap(flatten)]
    #[serde(default)]
    pub earning: EarningConfig,
}
