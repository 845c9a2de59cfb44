// Per-task reward
//
// This is the only place the reward formula exists. Assignment, submission
// and stats all call `per_task_reward` with the injected `RewardSettings`.

use serde::{Deserialize, Serialize};

use crate::{
    config::{DEFAULT_TASKS_PER_DAY, FALLBACK_TASK_REWARD},
    plan::Plan,
};

/// Process-wide reward configuration, loaded once at startup
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSettings {
    // Operator freeze of every per-task payout, zero means unset
    pub global_task_amount: Option<u64>,
    pub tasks_per_day: u32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            global_task_amount: None,
            tasks_per_day: DEFAULT_TASKS_PER_DAY,
        }
    }
}

impl RewardSettings {
    pub fn new(global_task_amount: Option<u64>, tasks_per_day: u32) -> Self {
        Self {
            global_task_amount: global_task_amount.filter(|amount| *amount > 0),
            tasks_per_day: tasks_per_day.max(1),
        }
    }

    #[inline]
    pub fn per_task_reward(&self, plan: Option<&Plan>) -> u64 {
        per_task_reward(plan, self.global_task_amount, self.tasks_per_day)
    }

    /// PKR a user can earn by completing every task of a day
    pub fn daily_potential(&self, plan: Option<&Plan>) -> u64 {
        self.per_task_reward(plan)
            .saturating_mul(self.tasks_per_day as u64)
    }
}

/// Half-up rounding of `numerator / denominator` for non-negative values
#[inline]
pub fn round_div(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let numerator = numerator as u128;
    let denominator = denominator as u128;
    ((2 * numerator + denominator) / (2 * denominator)) as u64
}

/// PKR awarded for one completed task
///
/// A positive global override wins unconditionally. Otherwise the plan's
/// daily earning is split over `tasks_per_day` and rounded half-up. A missing
/// plan or a zero daily earning pays the fallback.
pub fn per_task_reward(plan: Option<&Plan>, global_override: Option<u64>, tasks_per_day: u32) -> u64 {
    if let Some(amount) = global_override.filter(|amount| *amount > 0) {
        return amount;
    }

    match plan {
        Some(plan) if plan.daily_task_earning > 0 => {
            round_div(plan.daily_task_earning, tasks_per_day.max(1) as u64)
        }
        _ => FALLBACK_TASK_REWARD,
    }
}
