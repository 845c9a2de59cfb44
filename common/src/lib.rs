// Allow some clippy lints kept in line with the daemon crate
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::upper_case_acronyms)]

pub mod account;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod ledger;
pub mod plan;
pub mod referral;
pub mod reward;
pub mod task;
pub mod time;
