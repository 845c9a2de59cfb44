// Earning eligibility
//
// Evaluated fresh on every request, nothing about the outcome is persisted.
// The gates run in a fixed order and the first failing one decides the reason:
//   1. membership must be ACTIVE
//   2. the admin kill-switch must be on
//   3. inside the base window (plan max earning days, or the admin override)
//   4. otherwise inside the extended window, only with a qualifying referral

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    account::UserAccount,
    config::{DEFAULT_EXTENDED_EARNING_DAYS, DEFAULT_MAX_EARNING_DAYS, SECONDS_PER_DAY},
    plan::{Plan, PlanTier},
    time::{add_days, TimestampSeconds},
};

#[derive(Serialize, Deserialize, Error, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    #[error("membership not active")]
    MembershipNotActive,
    #[error("tasks disabled by admin")]
    DisabledByAdmin,
    #[error("referral requirement not met")]
    ReferralRequirementNotMet,
    #[error("earning period expired")]
    WindowExpired,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub reason: Option<IneligibleReason>,
    // Last second at which the user may still earn, when a window applies
    pub window_end: Option<TimestampSeconds>,
    // Whole days left including today, zero when ineligible
    pub days_remaining: u32,
    // Earning only thanks to the referral extension
    pub extended: bool,
}

impl EligibilityDecision {
    fn allowed(window_end: TimestampSeconds, now: TimestampSeconds, extended: bool) -> Self {
        let left = window_end.saturating_sub(now);
        Self {
            eligible: true,
            reason: None,
            window_end: Some(window_end),
            days_remaining: u32::try_from(left / SECONDS_PER_DAY + 1).unwrap_or(u32::MAX),
            extended,
        }
    }

    fn denied(reason: IneligibleReason, window_end: Option<TimestampSeconds>) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
            window_end,
            days_remaining: 0,
            extended: false,
        }
    }

    /// Convert the decision into a gate result
    pub fn into_result(self) -> Result<Self, IneligibleReason> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(self),
        }
    }
}

/// Window bounds of a plan, defaults apply without a resolved plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EarningWindow {
    pub max_earning_days: u32,
    pub extended_earning_days: u32,
}

impl EarningWindow {
    pub fn for_plan(plan: Option<&Plan>) -> Self {
        match plan {
            Some(plan) => Self {
                max_earning_days: plan.max_earning_days,
                extended_earning_days: plan.extended_earning_days,
            },
            None => Self::default(),
        }
    }
}

impl Default for EarningWindow {
    fn default() -> Self {
        Self {
            max_earning_days: DEFAULT_MAX_EARNING_DAYS,
            extended_earning_days: DEFAULT_EXTENDED_EARNING_DAYS,
        }
    }
}

/// Whether the direct referrals satisfy the rule of `tier`.
/// Users without a plan follow the BASIC rule.
pub fn referral_requirement_met(tier: Option<PlanTier>, direct_referrals: &[Option<PlanTier>]) -> bool {
    let tier = tier.unwrap_or(PlanTier::Basic);
    direct_referrals
        .iter()
        .any(|referral| tier.accepts_referral(*referral))
}

/// Everything the evaluator reads, gathered by the caller
#[derive(Clone, Copy, Debug)]
pub struct EligibilityInput<'a> {
    pub user: &'a UserAccount,
    pub plan: Option<&'a Plan>,
    pub direct_referrals: &'a [Option<PlanTier>],
    pub now: TimestampSeconds,
}

impl<'a> EligibilityInput<'a> {
    #[inline]
    pub fn evaluate(&self) -> EligibilityDecision {
        can_earn_today(self.user, self.plan, self.direct_referrals, self.now)
    }
}

/// Decide whether `user` may earn at `now`
///
/// `direct_referrals` holds the plan tier of every direct referral of the
/// user, `None` for a referral without a plan.
pub fn can_earn_today(
    user: &UserAccount,
    plan: Option<&Plan>,
    direct_referrals: &[Option<PlanTier>],
    now: TimestampSeconds,
) -> EligibilityDecision {
    if !user.membership_status.is_active() {
        return EligibilityDecision::denied(IneligibleReason::MembershipNotActive, None);
    }

    let Some(start) = user.membership_start else {
        return EligibilityDecision::denied(IneligibleReason::MembershipNotActive, None);
    };

    if !user.tasks_enabled {
        return EligibilityDecision::denied(IneligibleReason::DisabledByAdmin, None);
    }

    let window = EarningWindow::for_plan(plan);
    let override_end = user.earnings_continue_until.unwrap_or(0);

    let base_end = add_days(start, window.max_earning_days).max(override_end);
    if now <= base_end {
        return EligibilityDecision::allowed(base_end, now, false);
    }

    let tier = plan.map(|p| p.tier).or(user.membership_plan);
    if !referral_requirement_met(tier, direct_referrals) {
        return EligibilityDecision::denied(IneligibleReason::ReferralRequirementNotMet, Some(base_end));
    }

    let extended_end = add_days(start, window.extended_earning_days).max(override_end);
    if now <= extended_end {
        return EligibilityDecision::allowed(extended_end, now, true);
    }

    EligibilityDecision::denied(IneligibleReason::WindowExpired, Some(extended_end))
}
