// Content-engagement proof validation

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MIN_USER_INTERACTIONS;

/// Minimums a content-engagement submission must reach
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngagementThresholds {
    // Seconds
    pub min_duration: Option<u64>,
    pub min_scroll_percentage: Option<u8>,
    pub require_interaction: bool,
    pub min_ad_clicks: Option<u32>,
}

/// Telemetry sent by the client with a submission
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngagementProof {
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub scroll_percentage: u8,
    #[serde(default)]
    pub user_interactions: u32,
    #[serde(default)]
    pub ad_clicks: u32,
}

#[derive(Serialize, Deserialize, Error, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "requirement")]
pub enum MissingRequirement {
    #[error("spend at least {required}s on the content (spent {actual}s)")]
    Duration { required: u64, actual: u64 },
    #[error("scroll at least {required}% of the content (scrolled {actual}%)")]
    Scroll { required: u8, actual: u8 },
    #[error("interact at least {required} times (interacted {actual} times)")]
    Interactions { required: u32, actual: u32 },
    #[error("click at least {required} ads (clicked {actual})")]
    AdClicks { required: u32, actual: u32 },
}

impl EngagementThresholds {
    /// Every unmet requirement, in a stable order. Empty means the proof passes.
    pub fn missing_requirements(&self, proof: &EngagementProof) -> Vec<MissingRequirement> {
        let mut missing = Vec::new();

        if let Some(required) = self.min_duration {
            if proof.time_spent < required {
                missing.push(MissingRequirement::Duration {
                    required,
                    actual: proof.time_spent,
                });
            }
        }

        if let Some(required) = self.min_scroll_percentage {
            if proof.scroll_percentage < required {
                missing.push(MissingRequirement::Scroll {
                    required,
                    actual: proof.scroll_percentage,
                });
            }
        }

        if self.require_interaction && proof.user_interactions < MIN_USER_INTERACTIONS {
            missing.push(MissingRequirement::Interactions {
                required: MIN_USER_INTERACTIONS,
                actual: proof.user_interactions,
            });
        }

        if let Some(required) = self.min_ad_clicks {
            if proof.ad_clicks < required {
                missing.push(MissingRequirement::AdClicks {
                    required,
                    actual: proof.ad_clicks,
                });
            }
        }

        missing
    }
}
