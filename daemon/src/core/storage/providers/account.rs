// Account storage provider trait

use async_trait::async_trait;
use earn_common::account::{UserAccount, UserId};

use crate::core::error::EngineError;

/// Read side of user accounts and of the referral forest
///
/// Accounts are only written through an `AtomicBatch`.
#[async_trait]
pub trait AccountProvider {
    async fn get_account(&self, id: UserId) -> Result<Option<UserAccount>, EngineError>;

    /// Users whose sponsor is `sponsor`, ordered by id
    async fn get_direct_referrals(&self, sponsor: UserId) -> Result<Vec<UserId>, EngineError>;

    /// Number of direct referrals without loading them
    async fn count_direct_referrals(&self, sponsor: UserId) -> Result<usize, EngineError>;
}
