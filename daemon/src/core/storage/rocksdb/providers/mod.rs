mod account;
mod completion;
mod ledger;
mod notification;
mod plan;
mod task;
