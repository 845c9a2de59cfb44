// User earning state
//
// Balance counters are monotonic: they only move through the ledger writer
// in the daemon, which calls the credit helpers below inside its atomic unit.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{error::BalanceError, plan::PlanTier, time::TimestampSeconds};

/// Opaque user key
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    #[inline]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
        Some(Self(u64::from_be_bytes(array)))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active,
    #[default]
    Inactive,
    Expired,
}

impl MembershipStatus {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, MembershipStatus::Active)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    // Referring user, a weak back-reference bound once at registration
    pub sponsor_id: Option<UserId>,
    pub membership_plan: Option<PlanTier>,
    pub membership_status: MembershipStatus,
    pub membership_start: Option<TimestampSeconds>,
    // Admin kill-switch
    pub tasks_enabled: bool,
    pub balance: u64,
    pub total_earnings: u64,
    pub available_voucher_pkr: u64,
    pub total_points: u64,
    pub tasks_completed: u64,
    // Admin override, may only lengthen the computed earning window
    pub earnings_continue_until: Option<TimestampSeconds>,
}

impl UserAccount {
    pub fn new(id: UserId, sponsor_id: Option<UserId>) -> Self {
        Self {
            id,
            sponsor_id,
            membership_plan: None,
            membership_status: MembershipStatus::Inactive,
            membership_start: None,
            tasks_enabled: true,
            balance: 0,
            total_earnings: 0,
            available_voucher_pkr: 0,
            total_points: 0,
            tasks_completed: 0,
            earnings_continue_until: None,
        }
    }

    pub fn with_membership(
        mut self,
        plan: PlanTier,
        status: MembershipStatus,
        start: TimestampSeconds,
    ) -> Self {
        self.membership_plan = Some(plan);
        self.membership_status = status;
        self.membership_start = Some(start);
        self
    }

    /// Credit one approved task. Points are the floor of the PKR reward,
    /// which for integer rewards is the reward itself.
    ///
    /// Nothing is modified when any counter would overflow.
    pub fn credit_task_reward(&mut self, reward: u64) -> Result<(), BalanceError> {
        let balance = self.balance.checked_add(reward).ok_or(BalanceError::Overflow)?;
        let total_earnings = self
            .total_earnings
            .checked_add(reward)
            .ok_or(BalanceError::Overflow)?;
        let total_points = self
            .total_points
            .checked_add(reward)
            .ok_or(BalanceError::Overflow)?;
        let tasks_completed = self
            .tasks_completed
            .checked_add(1)
            .ok_or(BalanceError::Overflow)?;

        self.balance = balance;
        self.total_earnings = total_earnings;
        self.total_points = total_points;
        self.tasks_completed = tasks_completed;
        Ok(())
    }

    /// Credit a cascaded task commission
    pub fn credit_commission(&mut self, amount: u64) -> Result<(), BalanceError> {
        let balance = self.balance.checked_add(amount).ok_or(BalanceError::Overflow)?;
        let voucher = self
            .available_voucher_pkr
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;
        let total_earnings = self
            .total_earnings
            .checked_add(amount)
            .ok_or(BalanceError::Overflow)?;

        self.balance = balance;
        self.available_voucher_pkr = voucher;
        self.total_earnings = total_earnings;
        Ok(())
    }
}
