// Shared fixtures of the RocksDB integration tests
#![allow(dead_code)]
#![allow(clippy::disallowed_methods)]

use std::sync::Arc;

use earn_common::{
    account::{MembershipStatus, UserAccount, UserId},
    plan::PlanTier,
    task::{TaskId, TaskTemplate, TaskType},
    time::{Clock, FixedClock, TimestampSeconds},
};
use earn_daemon::core::{
    config::{EarningConfig, RocksDBConfig},
    earning::EarningEngine,
    storage::rocksdb::{CacheMode, CompressionMode, RocksStorage},
};
use tempdir::TempDir;

// 2023-11-14 12:00:00 UTC, mid-day so a test never crosses midnight
pub const START: TimestampSeconds = 1_699_963_200;

/// Create a RocksDBConfig with test defaults
pub fn test_rocksdb_config() -> RocksDBConfig {
    RocksDBConfig {
        parallelism: 2,
        max_background_jobs: 2,
        max_open_files: 100,
        keep_max_log_files: 1,
        compression_mode: CompressionMode::None,
        cache_mode: CacheMode::None,
        cache_size: 1024 * 1024,
        write_buffer_size: 1024 * 1024,
        lock_timeout_ms: 5_000,
    }
}

pub struct TestEnv {
    // Dropped last, removes the database
    _dir: TempDir,
    pub storage: Arc<RocksStorage>,
    pub clock: Arc<FixedClock>,
    pub engine: Arc<EarningEngine<RocksStorage>>,
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_config(EarningConfig::default()).await
    }

    pub async fn with_config(config: EarningConfig) -> Self {
        let dir = TempDir::new("earn_test").expect("create temp dir");
        let storage = Arc::new(
            RocksStorage::new(dir.path().to_str().unwrap(), &test_rocksdb_config())
                .expect("open storage"),
        );
        let clock = Arc::new(FixedClock::new(START));
        let engine = Arc::new(EarningEngine::new(
            Arc::clone(&storage),
            &config,
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        engine.seed_plan_catalog().await.expect("seed plans");

        Self {
            _dir: dir,
            storage,
            clock,
            engine,
        }
    }

    /// Register an active member whose membership starts now
    pub async fn member(&self, id: u64, sponsor: Option<u64>, tier: PlanTier) -> UserAccount {
        self.engine
            .register_account(UserId(id), sponsor.map(UserId))
            .await
            .expect("register");
        self.engine
            .set_membership(
                UserId(id),
                Some(tier),
                MembershipStatus::Active,
                Some(self.clock.now()),
            )
            .expect("membership")
    }

    pub fn task(&self, id: u64, task_type: TaskType) -> TaskTemplate {
        self.engine
            .put_task(TaskTemplate::new(TaskId(id), format!("Task {}", id), task_type))
            .expect("put task")
    }

    pub async fn balance(&self, id: u64) -> u64 {
        self.account(id).await.balance
    }

    pub async fn account(&self, id: u64) -> UserAccount {
        use earn_daemon::core::storage::AccountProvider;

        self.storage
            .get_account(UserId(id))
            .await
            .expect("read account")
            .expect("account exists")
    }
}
