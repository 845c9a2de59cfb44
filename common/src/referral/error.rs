// Referral system error types

use thiserror::Error;

/// Errors that can occur in the referral system
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferralError {
    /// Attempted to set self as sponsor
    #[error("Cannot set self as sponsor")]
    SelfReferral,
}
