mod account;
mod completion;
mod ledger;
mod notification;
mod plan;
mod task;

pub use account::*;
pub use completion::*;
pub use ledger::*;
pub use notification::*;
pub use plan::*;
pub use task::*;
