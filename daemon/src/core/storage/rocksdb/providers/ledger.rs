// LedgerProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::{account::UserId, ledger::LedgerEntry, referral::CommissionEarning};
use log::trace;
use rocksdb::Direction;

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{Column, IteratorMode, RocksStorage},
        LedgerProvider,
    },
};

#[async_trait]
impl LedgerProvider for RocksStorage {
    async fn get_ledger_entries(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get ledger entries of {}", user);
        }
        let prefix = user.to_be_bytes();
        self.iter_values(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::LedgerEntries,
        )
    }

    async fn get_commission_earnings(
        &self,
        sponsor: UserId,
    ) -> Result<Vec<CommissionEarning>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get commission earnings of {}", sponsor);
        }
        let prefix = sponsor.to_be_bytes();
        self.iter_values(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::CommissionEarnings,
        )
    }
}
