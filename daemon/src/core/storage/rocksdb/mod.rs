mod batch;
mod column;
mod keys;
mod providers;

use std::sync::Arc;

use anyhow::Context;
use log::{debug, info, trace, warn};
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamilyDescriptor, DBCompactionStyle, DBCompressionType,
    Direction, Env, IteratorMode as InternalIteratorMode, MultiThreaded, Options, ReadOptions,
    SliceTransform, TransactionDB, TransactionDBOptions, TransactionOptions, WriteOptions,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use strum::IntoEnumIterator;

use earn_common::ledger::Notification;

use crate::core::{config::RocksDBConfig, error::EngineError};

pub use batch::RocksBatch;
pub use column::*;

use super::Storage;

macro_rules! cf_handle {
    ($db: expr, $column: expr) => {
        $db.cf_handle($column.as_ref())
            .with_context(|| format!("Column {:?} not found", $column))?
    };
}

pub(crate) use cf_handle;

type InnerDB = TransactionDB<MultiThreaded>;

#[derive(Debug, Copy, Clone, clap::ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CompressionMode {
    None,
    Snappy,
    Zlib,
    Bz2,
    Lz4,
    Lz4hc,
    Zstd,
}

#[derive(Debug, Copy, Clone, clap::ValueEnum, Serialize, Deserialize)]
#[clap(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    None,
    Lru,
    HyperClock,
}

impl Default for CacheMode {
    fn default() -> Self {
        Self::Lru
    }
}

impl Default for CompressionMode {
    fn default() -> Self {
        Self::Snappy
    }
}

impl CompressionMode {
    pub fn convert(self) -> DBCompressionType {
        match self {
            Self::None => DBCompressionType::None,
            Self::Snappy => DBCompressionType::Snappy,
            Self::Zlib => DBCompressionType::Zlib,
            Self::Bz2 => DBCompressionType::Bz2,
            Self::Lz4 => DBCompressionType::Lz4,
            Self::Lz4hc => DBCompressionType::Lz4hc,
            Self::Zstd => DBCompressionType::Zstd,
        }
    }
}

#[derive(Copy, Clone)]
pub enum IteratorMode<'a> {
    Start,
    // Strict prefix to all keys
    WithPrefix(&'a [u8], Direction),
}

impl<'a> IteratorMode<'a> {
    pub fn convert(self) -> (InternalIteratorMode<'a>, ReadOptions) {
        let mut opts = ReadOptions::default();
        let mode = match self {
            Self::Start => InternalIteratorMode::Start,
            Self::WithPrefix(prefix, direction) => {
                opts.set_prefix_same_as_start(true);
                InternalIteratorMode::From(prefix, direction)
            }
        };

        (mode, opts)
    }

    fn accepts(&self, key: &[u8]) -> bool {
        match self {
            Self::Start => true,
            Self::WithPrefix(prefix, _) => key.starts_with(prefix),
        }
    }
}

pub struct RocksStorage {
    db: Arc<InnerDB>,
}

impl RocksStorage {
    pub fn new(dir: &str, config: &RocksDBConfig) -> Result<Self, EngineError> {
        let cfs = Column::iter().map(|column| {
            let name = column.to_string();
            let mut opts = Options::default();
            if let Some(len) = column.prefix() {
                opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(len));
            }

            ColumnFamilyDescriptor::new(name, opts)
        });

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compaction_style(DBCompactionStyle::Universal);

        opts.increase_parallelism(config.parallelism as _);
        opts.set_max_background_jobs(config.max_background_jobs as _);

        opts.set_max_open_files(config.max_open_files);
        opts.set_keep_log_file_num(config.keep_max_log_files);

        let env = Env::new().context("Creating RocksDB env")?;
        opts.set_env(&env);
        opts.set_compression_type(config.compression_mode.convert());

        let mut block_opts = BlockBasedOptions::default();
        match config.cache_mode {
            CacheMode::None => {
                block_opts.disable_cache();
            }
            CacheMode::Lru => {
                let cache = Cache::new_lru_cache(config.cache_size as _);
                block_opts.set_block_cache(&cache);
            }
            CacheMode::HyperClock => {
                let cache = Cache::new_hyper_clock_cache(config.cache_size as _, 1024);
                block_opts.set_block_cache(&cache);
            }
        };

        opts.set_block_based_table_factory(&block_opts);
        opts.set_write_buffer_size(config.write_buffer_size as _);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(config.lock_timeout_ms);

        if log::log_enabled!(log::Level::Info) {
            info!("Opening database at {}", dir);
        }

        let db = InnerDB::open_cf_descriptors(&opts, &txn_opts, dir, cfs)
            .with_context(|| format!("Failed to open RocksDB at {}", dir))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn begin(&self) -> RocksBatch<'_> {
        let mut txn_opts = TransactionOptions::default();
        txn_opts.set_deadlock_detect(true);
        let txn = self.db.transaction_opt(&WriteOptions::default(), &txn_opts);
        RocksBatch::new(&self.db, txn)
    }

    pub(super) fn load_optional_from_disk<K: AsRef<[u8]> + ?Sized, V: DeserializeOwned>(
        &self,
        column: Column,
        key: &K,
    ) -> Result<Option<V>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("load optional {:?} from disk", column);
        }

        let cf = cf_handle!(self.db, column);
        match self
            .db
            .get_pinned_cf(&cf, key.as_ref())
            .with_context(|| format!("Internal error while reading column {:?}", column))?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(super) fn insert_into_disk<K: AsRef<[u8]>, V: Serialize>(
        &self,
        column: Column,
        key: K,
        value: &V,
    ) -> Result<(), EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("insert into disk {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        self.db
            .put_cf(&cf, key.as_ref(), bincode::serialize(value)?)
            .with_context(|| format!("Error while inserting into disk column {:?}", column))?;

        Ok(())
    }

    pub(super) fn contains_data<K: AsRef<[u8]> + ?Sized>(
        &self,
        column: Column,
        key: &K,
    ) -> Result<bool, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("contains data {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        let value = self.db.get_pinned_cf(&cf, key.as_ref()).with_context(|| {
            format!("Error while checking if key exists in column {:?}", column)
        })?;

        Ok(value.is_some())
    }

    // Count the keys matching the mode without decoding values
    pub(super) fn count_keys(&self, mode: IteratorMode, column: Column) -> Result<usize, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("count keys {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        let (m, opts) = mode.convert();
        let mut count = 0;
        for res in self.db.iterator_cf_opt(&cf, opts, m) {
            let (key, _) = res.context("Internal read error in count")?;
            if !mode.accepts(&key) {
                break;
            }
            count += 1;
        }

        Ok(count)
    }

    pub(super) fn iter_values<V: DeserializeOwned>(
        &self,
        mode: IteratorMode,
        column: Column,
    ) -> Result<Vec<V>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("iter values {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        let (m, opts) = mode.convert();
        let mut values = Vec::new();
        for res in self.db.iterator_cf_opt(&cf, opts, m) {
            let (key, value) = res.context("Internal read error in iter")?;
            if !mode.accepts(&key) {
                break;
            }
            values.push(bincode::deserialize(&value)?);
        }

        Ok(values)
    }

    fn store_notifications(&self, notifications: &[Notification]) -> Result<(), EngineError> {
        for notification in notifications {
            self.insert_into_disk(
                Column::Notifications,
                keys::notification_key(notification),
                notification,
            )?;
        }
        Ok(())
    }
}

impl Storage for RocksStorage {
    type Batch<'a> = RocksBatch<'a>;

    fn atomic<R, F>(&self, f: F) -> Result<R, EngineError>
    where
        F: FnOnce(&mut Self::Batch<'_>) -> Result<R, EngineError>,
    {
        let mut batch = self.begin();
        // Dropping an uncommitted transaction rolls it back
        let result = f(&mut batch)?;
        let notifications = batch.commit()?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("atomic unit committed with {} notifications", notifications.len());
        }

        if let Err(e) = self.store_notifications(&notifications) {
            if log::log_enabled!(log::Level::Warn) {
                warn!("Error while storing {} notifications: {}", notifications.len(), e);
            }
        }

        Ok(result)
    }
}
