// User stats, display only

use earn_common::{
    account::{MembershipStatus, UserId},
    eligibility::EligibilityDecision,
    ledger::Notification,
    plan::PlanTier,
    task::CompletionStatus,
};
use serde::Serialize;

use super::EarningEngine;
use crate::core::{error::EngineError, storage::Storage};

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: UserId,
    pub membership_plan: Option<PlanTier>,
    pub membership_status: MembershipStatus,
    pub balance: u64,
    pub total_earnings: u64,
    pub available_voucher_pkr: u64,
    pub total_points: u64,
    pub tasks_completed: u64,
    pub per_task_reward: u64,
    pub daily_potential: u64,
    pub eligibility: EligibilityDecision,
    pub today_assigned: usize,
    pub today_completed: usize,
    pub direct_referrals: usize,
    pub total_commission: u64,
}

impl<S: Storage> EarningEngine<S> {
    /// Balances and counters of a user with the reward and the earning
    /// window derived exactly like submission does
    pub async fn user_stats(&self, user: UserId) -> Result<UserStats, EngineError> {
        let context = self.load_context(user).await?;
        let today = self.storage.get_completions_for_day(user, self.today()).await?;
        let total_commission = self.storage.get_total_commission(user).await?;
        let direct_referrals = self.storage.count_direct_referrals(user).await?;
        let plan = context.plan.as_ref();
        let account = &context.account;

        Ok(UserStats {
            user_id: user,
            membership_plan: account.membership_plan,
            membership_status: account.membership_status,
            balance: account.balance,
            total_earnings: account.total_earnings,
            available_voucher_pkr: account.available_voucher_pkr,
            total_points: account.total_points,
            tasks_completed: account.tasks_completed,
            per_task_reward: self.settings.per_task_reward(plan),
            daily_potential: self.settings.daily_potential(plan),
            eligibility: context.eligibility(self.now()),
            today_assigned: today.len(),
            today_completed: today
                .iter()
                .filter(|c| c.status == CompletionStatus::Completed)
                .count(),
            direct_referrals,
            total_commission,
        })
    }

    /// Notifications of a user, or the administrator feed when `recipient`
    /// is None. Oldest first.
    pub async fn notifications(&self, recipient: Option<UserId>) -> Result<Vec<Notification>, EngineError> {
        if let Some(user) = recipient {
            self.load_account(user).await?;
        }
        self.storage.get_notifications(recipient).await
    }
}
