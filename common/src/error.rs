use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BalanceError {
    #[error("Balance overflow")]
    Overflow,
}
