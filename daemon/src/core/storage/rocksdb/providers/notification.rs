// NotificationProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::{account::UserId, ledger::Notification};
use rocksdb::Direction;

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{keys, Column, IteratorMode, RocksStorage},
        NotificationProvider,
    },
};

#[async_trait]
impl NotificationProvider for RocksStorage {
    async fn get_notifications(
        &self,
        recipient: Option<UserId>,
    ) -> Result<Vec<Notification>, EngineError> {
        let prefix = keys::notification_prefix(recipient);
        self.iter_values(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::Notifications,
        )
    }
}
