// TaskProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::task::{TaskId, TaskTemplate};
use log::trace;

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{Column, IteratorMode, RocksStorage},
        TaskProvider,
    },
};

#[async_trait]
impl TaskProvider for RocksStorage {
    async fn get_task(&self, id: TaskId) -> Result<Option<TaskTemplate>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get task {}", id);
        }
        self.load_optional_from_disk(Column::Tasks, &id.to_be_bytes())
    }

    async fn get_tasks(&self) -> Result<Vec<TaskTemplate>, EngineError> {
        self.iter_values(IteratorMode::Start, Column::Tasks)
    }
}
