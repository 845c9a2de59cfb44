// Earning engine
//
// Every request re-derives the reward and the eligibility decision from
// the same shared functions; nothing about them is cached between calls.
// Money only moves inside `Storage::atomic` through the ledger writer.

mod admin;
mod assignment;
mod commission;
mod ledger;
mod stats;
mod submission;

#[cfg(test)]
mod memory;

use std::sync::Arc;

use earn_common::{
    account::{UserAccount, UserId},
    eligibility::{EligibilityDecision, EligibilityInput},
    plan::{Plan, PlanTier},
    referral::CommissionSchedule,
    reward::RewardSettings,
    time::{Clock, DayIndex, TimestampSeconds},
};
use log::trace;

use crate::core::{
    config::EarningConfig,
    error::EngineError,
    storage::Storage,
};

pub use assignment::DailyStatus;
pub use commission::{CascadeEvent, Cascader};
pub use ledger::LedgerWriter;
pub use stats::UserStats;
pub use submission::SubmissionOutcome;

pub struct EarningEngine<S: Storage> {
    storage: Arc<S>,
    settings: RewardSettings,
    schedule: CommissionSchedule,
    // Synthesize default templates when the catalog cannot fill a day
    seed_default_tasks: bool,
    clock: Arc<dyn Clock>,
}

// Everything the gates need about one user, read before the atomic unit
struct UserContext {
    account: UserAccount,
    plan: Option<Plan>,
    // Plan tier of every direct referral
    referrals: Vec<Option<PlanTier>>,
}

impl UserContext {
    fn eligibility(&self, now: TimestampSeconds) -> EligibilityDecision {
        EligibilityInput {
            user: &self.account,
            plan: self.plan.as_ref(),
            direct_referrals: &self.referrals,
            now,
        }
        .evaluate()
    }
}

impl<S: Storage> EarningEngine<S> {
    pub fn new(storage: Arc<S>, config: &EarningConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            settings: config.reward_settings(),
            schedule: CommissionSchedule::default(),
            seed_default_tasks: config.seed_default_tasks,
            clock,
        }
    }

    #[inline]
    pub fn now(&self) -> TimestampSeconds {
        self.clock.now()
    }

    #[inline]
    pub fn today(&self) -> DayIndex {
        self.clock.today()
    }

    async fn load_account(&self, id: UserId) -> Result<UserAccount, EngineError> {
        self.storage
            .get_account(id)
            .await?
            .ok_or(EngineError::UserNotFound(id))
    }

    async fn load_plan(&self, tier: Option<PlanTier>) -> Result<Option<Plan>, EngineError> {
        match tier {
            Some(tier) => self.storage.get_plan(tier).await,
            None => Ok(None),
        }
    }

    // A referral without an account or a plan counts as a referral without a plan
    async fn direct_referral_tiers(&self, user: UserId) -> Result<Vec<Option<PlanTier>>, EngineError> {
        let referrals = self.storage.get_direct_referrals(user).await?;
        let mut tiers = Vec::with_capacity(referrals.len());
        for referral in referrals {
            let tier = self
                .storage
                .get_account(referral)
                .await?
                .and_then(|account| account.membership_plan);
            tiers.push(tier);
        }

        if log::log_enabled!(log::Level::Trace) {
            trace!("direct referral tiers of {}: {:?}", user, tiers);
        }
        Ok(tiers)
    }

    async fn load_context(&self, user: UserId) -> Result<UserContext, EngineError> {
        let account = self.load_account(user).await?;
        let plan = self.load_plan(account.membership_plan).await?;
        let referrals = self.direct_referral_tiers(user).await?;
        Ok(UserContext {
            account,
            plan,
            referrals,
        })
    }

    /// Current eligibility of a user, evaluated fresh
    pub async fn check_eligibility(&self, user: UserId) -> Result<EligibilityDecision, EngineError> {
        let context = self.load_context(user).await?;
        Ok(context.eligibility(self.now()))
    }

    // Ledger writer stamped with the current time
    fn ledger_writer(&self) -> LedgerWriter<'_> {
        LedgerWriter::new(&self.schedule, self.now())
    }
}
