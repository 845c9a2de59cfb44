// Task template storage provider trait

use async_trait::async_trait;
use earn_common::task::{TaskId, TaskTemplate};

use crate::core::error::EngineError;

#[async_trait]
pub trait TaskProvider {
    async fn get_task(&self, id: TaskId) -> Result<Option<TaskTemplate>, EngineError>;

    /// Every template ordered by id
    async fn get_tasks(&self) -> Result<Vec<TaskTemplate>, EngineError>;
}
