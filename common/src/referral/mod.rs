// Task commission cascade rules
//
// A completed task pays a share of its reward to up to five sponsors above
// the completing user. Rates apply to the task reward only; the signup
// commission paid on membership purchases is a separate schedule managed
// outside this crate and must never be mixed with this one.

mod error;
mod record;

pub use error::*;
pub use record::*;

use serde::{Deserialize, Serialize};

use crate::{
    config::{BPS_DENOMINATOR, TASK_COMMISSION_RATES_BPS},
    reward::round_div,
};

/// Commission ratios per sponsor level (in basis points, 100 = 1%)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommissionSchedule {
    /// index 0 = level 1 (direct sponsor)
    ratios: Vec<u16>,
}

impl Default for CommissionSchedule {
    fn default() -> Self {
        // 10%, 5%, 3%, 2%, 1%
        Self {
            ratios: TASK_COMMISSION_RATES_BPS.to_vec(),
        }
    }
}

impl CommissionSchedule {
    /// Number of paying levels
    pub fn levels(&self) -> u8 {
        self.ratios.len() as u8
    }

    /// Ratio of a 1-based level, None beyond the last level
    pub fn ratio_for_level(&self, level: u8) -> Option<u16> {
        if level == 0 {
            return None;
        }
        self.ratios.get(level as usize - 1).copied()
    }

    /// Commission owed at `level` for a task reward, rounded half-up
    pub fn commission_for(&self, level: u8, task_reward: u64) -> u64 {
        match self.ratio_for_level(level) {
            Some(ratio) => round_div(
                task_reward.saturating_mul(ratio as u64),
                BPS_DENOMINATOR,
            ),
            None => 0,
        }
    }
}
