// CompletionProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::{
    account::UserId,
    task::{CompletionKey, TaskCompletion},
    time::DayIndex,
};
use log::trace;
use rocksdb::Direction;

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{Column, IteratorMode, RocksStorage},
        CompletionProvider,
    },
};

#[async_trait]
impl CompletionProvider for RocksStorage {
    async fn get_completion(
        &self,
        key: &CompletionKey,
    ) -> Result<Option<TaskCompletion>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get completion {}", key);
        }
        self.load_optional_from_disk(Column::Completions, &key.to_bytes())
    }

    async fn get_completions_for_day(
        &self,
        user: UserId,
        day: DayIndex,
    ) -> Result<Vec<TaskCompletion>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get completions of {} on day {}", user, day);
        }
        let prefix = CompletionKey::day_prefix(user, day);
        self.iter_values(
            IteratorMode::WithPrefix(&prefix, Direction::Forward),
            Column::Completions,
        )
    }

    async fn get_pending_reviews(&self) -> Result<Vec<CompletionKey>, EngineError> {
        self.iter_values(IteratorMode::Start, Column::ReviewQueue)
    }
}
