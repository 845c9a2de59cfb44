// Ledger entries and user notifications
//
// Every balance movement produces exactly one ledger entry written in the
// same atomic unit as the balance change itself.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{
    account::UserId,
    plan::PlanTier,
    task::TaskId,
    time::TimestampSeconds,
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    TaskReward,
    ReferralCommission,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryStatus {
    Completed,
}

/// Context attached to an entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerMetadata {
    pub task_id: TaskId,
    // Plan of the user who completed the task
    pub plan: Option<PlanTier>,
    // Set on commissions: the cascade level, the rate applied and the
    // user whose task paid it
    pub level: Option<u8>,
    pub rate_bps: Option<u16>,
    pub source_user: Option<UserId>,
}

impl LedgerMetadata {
    pub fn task_reward(task_id: TaskId, plan: Option<PlanTier>) -> Self {
        Self {
            task_id,
            plan,
            level: None,
            rate_bps: None,
            source_user: None,
        }
    }

    pub fn commission(
        task_id: TaskId,
        plan: Option<PlanTier>,
        level: u8,
        rate_bps: u16,
        source_user: UserId,
    ) -> Self {
        Self {
            task_id,
            plan,
            level: Some(level),
            rate_bps: Some(rate_bps),
            source_user: Some(source_user),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: u64,
    pub user_id: UserId,
    pub entry_type: LedgerEntryType,
    pub amount: u64,
    pub status: LedgerEntryStatus,
    pub description: String,
    pub metadata: LedgerMetadata,
    pub created_at: TimestampSeconds,
}

impl LedgerEntry {
    pub fn task_reward(
        id: u64,
        user_id: UserId,
        amount: u64,
        task_title: &str,
        metadata: LedgerMetadata,
        now: TimestampSeconds,
    ) -> Self {
        Self {
            id,
            user_id,
            entry_type: LedgerEntryType::TaskReward,
            amount,
            status: LedgerEntryStatus::Completed,
            description: format!("Reward for task \"{}\"", task_title),
            metadata,
            created_at: now,
        }
    }

    pub fn referral_commission(
        id: u64,
        sponsor_id: UserId,
        amount: u64,
        metadata: LedgerMetadata,
        now: TimestampSeconds,
    ) -> Self {
        let description = match (metadata.level, metadata.source_user) {
            (Some(level), Some(source)) => {
                format!("Level {} task commission from user {}", level, source)
            }
            _ => "Task commission".to_string(),
        };
        Self {
            id,
            user_id: sponsor_id,
            entry_type: LedgerEntryType::ReferralCommission,
            amount,
            status: LedgerEntryStatus::Completed,
            description,
            metadata,
            created_at: now,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    TaskApproved,
    CommissionEarned,
    ReviewRequested,
}

/// Message for a user, or for administrators when `recipient` is None
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub recipient: Option<UserId>,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: TimestampSeconds,
}

impl Notification {
    pub fn task_approved(id: u64, user: UserId, title: &str, reward: u64, now: TimestampSeconds) -> Self {
        Self {
            id,
            recipient: Some(user),
            kind: NotificationKind::TaskApproved,
            message: format!("Task \"{}\" completed, {} PKR credited", title, reward),
            created_at: now,
        }
    }

    pub fn commission_earned(
        id: u64,
        sponsor: UserId,
        level: u8,
        amount: u64,
        source: UserId,
        now: TimestampSeconds,
    ) -> Self {
        Self {
            id,
            recipient: Some(sponsor),
            kind: NotificationKind::CommissionEarned,
            message: format!(
                "You earned {} PKR level {} commission from user {}",
                amount, level, source
            ),
            created_at: now,
        }
    }

    pub fn review_requested(id: u64, user: UserId, title: &str, now: TimestampSeconds) -> Self {
        Self {
            id,
            recipient: None,
            kind: NotificationKind::ReviewRequested,
            message: format!("User {} submitted \"{}\" for review", user, title),
            created_at: now,
        }
    }
}
