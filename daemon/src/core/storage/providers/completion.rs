// Task completion and review queue storage provider trait

use async_trait::async_trait;
use earn_common::{
    account::UserId,
    task::{CompletionKey, TaskCompletion},
    time::DayIndex,
};

use crate::core::error::EngineError;

#[async_trait]
pub trait CompletionProvider {
    async fn get_completion(
        &self,
        key: &CompletionKey,
    ) -> Result<Option<TaskCompletion>, EngineError>;

    /// Every slot assigned to `user` on `day`, ordered by slot
    async fn get_completions_for_day(
        &self,
        user: UserId,
        day: DayIndex,
    ) -> Result<Vec<TaskCompletion>, EngineError>;

    /// Completions waiting for an administrator, oldest user id first
    async fn get_pending_reviews(&self) -> Result<Vec<CompletionKey>, EngineError>;
}
