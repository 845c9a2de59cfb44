use earn_common::{
    account::UserId,
    eligibility::IneligibleReason,
    error::BalanceError,
    referral::ReferralError,
    task::{CompletionKey, MissingRequirement, TaskId},
};
use strum::{AsRefStr, Display};
use thiserror::Error;

/// How a failure must be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    // The user may not earn right now
    Gate,
    // The submitted proof is below the task thresholds
    Validation,
    // Nothing left to do for this request
    Idempotence,
    NotFound,
    // Aborted atomic unit, everything was rolled back
    Ledger,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Ineligible(IneligibleReason),
    #[error("task requirements not met: {}", format_requirements(.0))]
    RequirementsNotMet(Vec<MissingRequirement>),
    #[error("task {0} is already completed today")]
    AlreadyCompleted(TaskId),
    #[error("task {0} is already waiting for review")]
    AlreadySubmitted(TaskId),
    #[error("task {0} is not assigned to the user today")]
    NoAssignment(TaskId),
    #[error("completion {0} is not waiting for review")]
    NotAwaitingReview(CompletionKey),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    #[error("no task available for assignment")]
    NoTasksAvailable,
    #[error("account of user {0} changed during the request, retry")]
    AccountChanged(UserId),
    #[error("user {0} is already registered")]
    AlreadyRegistered(UserId),
    #[error(transparent)]
    Referral(#[from] ReferralError),
    #[error(transparent)]
    Balance(#[from] BalanceError),
    #[error("storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

fn format_requirements(missing: &[MissingRequirement]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<IneligibleReason> for EngineError {
    fn from(reason: IneligibleReason) -> Self {
        EngineError::Ineligible(reason)
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;

        match self {
            Ineligible(_) => ErrorKind::Gate,
            RequirementsNotMet(_) | Referral(_) => ErrorKind::Validation,
            AlreadyCompleted(_)
            | AlreadySubmitted(_)
            | NoAssignment(_)
            | NotAwaitingReview(_)
            | AccountChanged(_)
            | AlreadyRegistered(_) => ErrorKind::Idempotence,
            UserNotFound(_) | TaskNotFound(_) | NoTasksAvailable => ErrorKind::NotFound,
            Balance(_) | Storage(_) | Serialization(_) | Any(_) => ErrorKind::Ledger,
        }
    }

    /// Every unmet requirement, empty for other errors
    pub fn missing_requirements(&self) -> &[MissingRequirement] {
        match self {
            EngineError::RequirementsNotMet(missing) => missing,
            _ => &[],
        }
    }
}
