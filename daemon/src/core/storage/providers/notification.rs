// Notification storage provider trait

use async_trait::async_trait;
use earn_common::{account::UserId, ledger::Notification};

use crate::core::error::EngineError;

#[async_trait]
pub trait NotificationProvider {
    /// Notifications of a user, or of administrators when `recipient` is None.
    /// Oldest first.
    async fn get_notifications(
        &self,
        recipient: Option<UserId>,
    ) -> Result<Vec<Notification>, EngineError>;
}
