// Commission records

use serde::{Deserialize, Serialize};

use crate::{
    account::UserId,
    task::TaskId,
    time::{DayIndex, TimestampSeconds},
};

/// Append-only audit row, one per credited sponsor level of a task event.
/// Kept apart from the generic ledger so the cascade can be audited alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommissionEarning {
    pub id: u64,
    pub sponsor_id: UserId,
    pub referred_user_id: UserId,
    pub task_id: TaskId,
    // 1 = direct sponsor
    pub level: u8,
    pub amount: u64,
    pub earning_day: DayIndex,
    pub created_at: TimestampSeconds,
}

/// One credited level of a cascade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommissionPayout {
    pub sponsor_id: UserId,
    pub level: u8,
    pub rate_bps: u16,
    pub amount: u64,
}

/// Outcome of a cascade walk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CascadeResult {
    pub payouts: Vec<CommissionPayout>,
    // Levels whose sponsor was missing or not active
    pub skipped_levels: Vec<u8>,
}

impl CascadeResult {
    pub fn total_paid(&self) -> u64 {
        self.payouts.iter().map(|p| p.amount).sum()
    }

    pub fn paid_to(&self, sponsor: UserId) -> u64 {
        self.payouts
            .iter()
            .filter(|p| p.sponsor_id == sponsor)
            .map(|p| p.amount)
            .sum()
    }
}
