// Account registration, membership updates and admin controls
//
// None of these touch the balance counters, money only moves through the
// ledger writer.

use earn_common::{
    account::{MembershipStatus, UserAccount, UserId},
    plan::{Plan, PlanTier},
    referral::ReferralError,
    task::{CompletionKey, CompletionStatus, TaskCompletion, TaskTemplate},
    time::TimestampSeconds,
};
use log::{debug, info, warn};

use super::{EarningEngine, SubmissionOutcome};
use crate::core::{
    error::EngineError,
    storage::{AtomicBatch, Storage},
};

impl<S: Storage> EarningEngine<S> {
    /// Create an account, binding its sponsor for life
    pub async fn register_account(
        &self,
        id: UserId,
        sponsor: Option<UserId>,
    ) -> Result<UserAccount, EngineError> {
        if sponsor == Some(id) {
            return Err(ReferralError::SelfReferral.into());
        }

        let account = UserAccount::new(id, sponsor);
        self.storage.atomic(|batch| {
            if batch.lock_account(id)?.is_some() {
                return Err(EngineError::AlreadyRegistered(id));
            }
            batch.put_account(&account)?;
            if let Some(sponsor) = sponsor {
                batch.add_direct_referral(sponsor, id)?;
            }
            Ok(())
        })?;

        if log::log_enabled!(log::Level::Info) {
            match sponsor {
                Some(sponsor) => info!("registered user {} sponsored by {}", id, sponsor),
                None => info!("registered user {} without sponsor", id),
            }
        }
        Ok(account)
    }

    // Read-modify-write of one account under its row lock
    fn update_account<F>(&self, id: UserId, update: F) -> Result<UserAccount, EngineError>
    where
        F: FnOnce(&mut UserAccount),
    {
        self.storage.atomic(|batch| {
            let mut account = batch
                .lock_account(id)?
                .ok_or(EngineError::UserNotFound(id))?;
            update(&mut account);
            batch.put_account(&account)?;
            Ok(account)
        })
    }

    /// Membership change coming from the purchase flow
    pub fn set_membership(
        &self,
        id: UserId,
        plan: Option<PlanTier>,
        status: MembershipStatus,
        start: Option<TimestampSeconds>,
    ) -> Result<UserAccount, EngineError> {
        let account = self.update_account(id, |account| {
            account.membership_plan = plan;
            account.membership_status = status;
            account.membership_start = start;
        })?;

        if log::log_enabled!(log::Level::Info) {
            info!("membership of user {} set to {:?} ({})", id, plan, status);
        }
        Ok(account)
    }

    /// Admin kill-switch
    pub fn set_tasks_enabled(&self, id: UserId, enabled: bool) -> Result<UserAccount, EngineError> {
        let account = self.update_account(id, |account| account.tasks_enabled = enabled)?;
        if log::log_enabled!(log::Level::Info) {
            info!("tasks of user {} enabled: {}", id, enabled);
        }
        Ok(account)
    }

    /// Let a user keep earning until `until`, `None` clears the override.
    /// The override never shortens the computed window.
    pub fn extend_earnings(
        &self,
        id: UserId,
        until: Option<TimestampSeconds>,
    ) -> Result<UserAccount, EngineError> {
        let account = self.update_account(id, |account| account.earnings_continue_until = until)?;
        if log::log_enabled!(log::Level::Info) {
            info!("earnings of user {} continue until {:?}", id, until);
        }
        Ok(account)
    }

    /// Write every default plan missing from storage
    pub async fn seed_plan_catalog(&self) -> Result<usize, EngineError> {
        let mut seeded = 0;
        for plan in Plan::default_catalog() {
            if self.storage.has_plan(plan.tier).await? {
                continue;
            }
            self.storage.put_plan(&plan).await?;
            seeded += 1;
        }

        if seeded > 0 && log::log_enabled!(log::Level::Info) {
            info!("seeded {} membership plans", seeded);
        }
        Ok(seeded)
    }

    /// Every plan of the catalog, cheapest tier first
    pub async fn plans(&self) -> Result<Vec<Plan>, EngineError> {
        self.storage.get_plans().await
    }

    /// Replace the definition of a tier
    ///
    /// Rewards are derived from the stored plan on every request, so the
    /// new values apply to the next assignment or approval.
    pub async fn put_plan(&self, plan: Plan) -> Result<Plan, EngineError> {
        self.storage.put_plan(&plan).await?;
        if log::log_enabled!(log::Level::Info) {
            info!(
                "plan {} updated: {} PKR per day over {} tasks",
                plan.tier, plan.daily_task_earning, plan.tasks_per_day
            );
        }
        Ok(plan)
    }

    /// Create or replace a task template, its completion counter is kept
    pub fn put_task(&self, template: TaskTemplate) -> Result<TaskTemplate, EngineError> {
        let template = self.storage.atomic(|batch| {
            let mut template = template;
            if let Some(existing) = batch.lock_task(template.id)? {
                template.completions = existing.completions;
            }
            batch.put_task(&template)?;
            Ok(template)
        })?;

        if log::log_enabled!(log::Level::Info) {
            info!("task {} ({}) stored as {}", template.id, template.task_type, template.status);
        }
        Ok(template)
    }

    /// Completions waiting for an administrator
    pub async fn pending_reviews(&self) -> Result<Vec<TaskCompletion>, EngineError> {
        let keys = self.storage.get_pending_reviews().await?;
        let mut completions = Vec::with_capacity(keys.len());
        for key in keys {
            match self.storage.get_completion(&key).await? {
                Some(completion) => completions.push(completion),
                None => {
                    if log::log_enabled!(log::Level::Warn) {
                        warn!("review queue references missing completion {}", key);
                    }
                }
            }
        }
        Ok(completions)
    }

    /// Approve a completion waiting for review and pay it
    ///
    /// The administrator's decision stands, eligibility is not evaluated
    /// again. The reward is derived from the current plan like any
    /// automatic approval.
    pub async fn approve_review(&self, key: CompletionKey) -> Result<SubmissionOutcome, EngineError> {
        let user = key.user_id;
        let account = self.load_account(user).await?;
        let plan = self.load_plan(account.membership_plan).await?;
        let reward = self.settings.per_task_reward(plan.as_ref());
        let plan_tier = account.membership_plan;
        let writer = self.ledger_writer();

        let outcome = self.storage.atomic(|batch| {
            let mut completion = batch
                .lock_completion(&key)?
                .ok_or(EngineError::NotAwaitingReview(key))?;
            if completion.status != CompletionStatus::UnderReview {
                return Err(EngineError::NotAwaitingReview(key));
            }

            let task = completion.task_id;
            let mut template = batch
                .lock_task(task)?
                .ok_or(EngineError::TaskNotFound(task))?;
            let mut account = batch
                .lock_account(user)?
                .ok_or(EngineError::UserNotFound(user))?;
            if account.membership_plan != plan_tier {
                return Err(EngineError::AccountChanged(user));
            }

            let cascade =
                writer.approve(batch, &mut completion, &mut account, &mut template, reward)?;
            batch.remove_review(&key)?;

            Ok(SubmissionOutcome {
                key,
                task_id: task,
                status: completion.status,
                reward_earned: Some(reward),
                commissions: cascade.payouts,
            })
        })?;

        if log::log_enabled!(log::Level::Debug) {
            debug!("review {} approved, {} commissions paid", key, outcome.commissions.len());
        }
        Ok(outcome)
    }
}
