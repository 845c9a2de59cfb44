// Ledger and commission audit storage provider trait

use async_trait::async_trait;
use earn_common::{account::UserId, ledger::LedgerEntry, referral::CommissionEarning};

use crate::core::error::EngineError;

/// Read side of the append-only audit trail
#[async_trait]
pub trait LedgerProvider {
    /// Entries of a user, oldest first
    async fn get_ledger_entries(&self, user: UserId) -> Result<Vec<LedgerEntry>, EngineError>;

    /// Commission records credited to a sponsor, oldest day first
    async fn get_commission_earnings(
        &self,
        sponsor: UserId,
    ) -> Result<Vec<CommissionEarning>, EngineError>;

    /// Sum of every commission credited to a sponsor
    async fn get_total_commission(&self, sponsor: UserId) -> Result<u64, EngineError> {
        let earnings = self.get_commission_earnings(sponsor).await?;
        Ok(earnings
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.amount)))
    }
}
