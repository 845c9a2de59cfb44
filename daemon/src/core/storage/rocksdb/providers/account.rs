// AccountProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::account::{UserAccount, UserId};
use log::trace;
use rocksdb::Direction;

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{Column, IteratorMode, RocksStorage},
        AccountProvider,
    },
};

#[async_trait]
impl AccountProvider for RocksStorage {
    async fn get_account(&self, id: UserId) -> Result<Option<UserAccount>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get account {}", id);
        }
        self.load_optional_from_disk(Column::Accounts, &id.to_be_bytes())
    }

    async fn get_direct_referrals(&self, sponsor: UserId) -> Result<Vec<UserId>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get direct referrals of {}", sponsor);
        }
        let prefix = sponsor.to_be_bytes();
        self.iter_values(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::ReferralDirects,
        )
    }

    async fn count_direct_referrals(&self, sponsor: UserId) -> Result<usize, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("count direct referrals of {}", sponsor);
        }
        let prefix = sponsor.to_be_bytes();
        self.count_keys(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::ReferralDirects,
        )
    }
}
