// Membership plan catalog
// Tiers are configured by admins and read-only to the earning engine.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::config::{DEFAULT_EXTENDED_EARNING_DAYS, DEFAULT_MAX_EARNING_DAYS, DEFAULT_TASKS_PER_DAY};

/// Membership tier, ordered from the cheapest plan to the most expensive
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum PlanTier {
    Basic = 0,
    Standard = 1,
    Premium = 2,
}

impl PlanTier {
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether a direct referral on `referral` tier counts towards the
    /// extended earning window of a user on this tier.
    ///
    /// Higher tiers demand higher-tier referrals:
    /// - BASIC accepts any direct referral
    /// - STANDARD needs a STANDARD or PREMIUM referral
    /// - PREMIUM needs a PREMIUM referral
    ///
    /// A referral without a plan only satisfies BASIC.
    pub fn accepts_referral(self, referral: Option<PlanTier>) -> bool {
        match self {
            PlanTier::Basic => true,
            PlanTier::Standard => matches!(
                referral,
                Some(PlanTier::Standard) | Some(PlanTier::Premium)
            ),
            PlanTier::Premium => matches!(referral, Some(PlanTier::Premium)),
        }
    }
}

/// Tier definition, immutable per version
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub tier: PlanTier,
    pub name: String,
    // Membership price in PKR
    pub price: u64,
    // PKR earned when every daily task is completed
    pub daily_task_earning: u64,
    pub tasks_per_day: u32,
    pub max_earning_days: u32,
    pub extended_earning_days: u32,
    pub voucher_amount: u64,
    pub minimum_withdrawal: u64,
}

impl Plan {
    /// Default catalog, written to storage on first start
    pub fn default_catalog() -> Vec<Plan> {
        vec![
            Plan {
                tier: PlanTier::Basic,
                name: "Basic".to_string(),
                price: 1_000,
                daily_task_earning: 150,
                tasks_per_day: DEFAULT_TASKS_PER_DAY,
                max_earning_days: DEFAULT_MAX_EARNING_DAYS,
                extended_earning_days: DEFAULT_EXTENDED_EARNING_DAYS,
                voucher_amount: 500,
                minimum_withdrawal: 500,
            },
            Plan {
                tier: PlanTier::Standard,
                name: "Standard".to_string(),
                price: 2_000,
                daily_task_earning: 250,
                tasks_per_day: DEFAULT_TASKS_PER_DAY,
                max_earning_days: DEFAULT_MAX_EARNING_DAYS,
                extended_earning_days: DEFAULT_EXTENDED_EARNING_DAYS,
                voucher_amount: 1_000,
                minimum_withdrawal: 1_000,
            },
            Plan {
                tier: PlanTier::Premium,
                name: "Premium".to_string(),
                price: 5_000,
                daily_task_earning: 500,
                tasks_per_day: DEFAULT_TASKS_PER_DAY,
                max_earning_days: DEFAULT_MAX_EARNING_DAYS,
                extended_earning_days: DEFAULT_EXTENDED_EARNING_DAYS,
                voucher_amount: 2_500,
                minimum_withdrawal: 2_000,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_basic_accepts_any_referral() {
        assert!(PlanTier::Basic.accepts_referral(None));
        for tier in PlanTier::iter() {
            assert!(PlanTier::Basic.accepts_referral(Some(tier)));
        }
    }

    #[test]
    fn test_standard_requires_standard_or_premium() {
        assert!(!PlanTier::Standard.accepts_referral(None));
        assert!(!PlanTier::Standard.accepts_referral(Some(PlanTier::Basic)));
        assert!(PlanTier::Standard.accepts_referral(Some(PlanTier::Standard)));
        assert!(PlanTier::Standard.accepts_referral(Some(PlanTier::Premium)));
    }

    #[test]
    fn test_premium_requires_premium() {
        assert!(!PlanTier::Premium.accepts_referral(Some(PlanTier::Basic)));
        assert!(!PlanTier::Premium.accepts_referral(Some(PlanTier::Standard)));
        assert!(PlanTier::Premium.accepts_referral(Some(PlanTier::Premium)));
    }

    #[test]
    fn test_tier_names() {
        assert_eq!(PlanTier::Standard.to_string(), "STANDARD");
        assert_eq!(PlanTier::from_str("premium").unwrap(), PlanTier::Premium);
        assert_eq!(
            serde_json::to_string(&PlanTier::Basic).unwrap(),
            "\"BASIC\""
        );
    }

    #[test]
    fn test_default_catalog_covers_every_tier() {
        let catalog = Plan::default_catalog();
        let tiers: Vec<PlanTier> = catalog.iter().map(|p| p.tier).collect();
        assert_eq!(tiers, PlanTier::iter().collect::<Vec<_>>());
        assert!(catalog.iter().all(|p| p.tasks_per_day == DEFAULT_TASKS_PER_DAY));
    }
}
