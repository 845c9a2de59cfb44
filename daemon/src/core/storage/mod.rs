mod providers;

pub mod rocksdb;

pub use self::{providers::*, rocksdb::RocksStorage};

use earn_common::{
    account::{UserAccount, UserId},
    ledger::{LedgerEntry, Notification},
    referral::CommissionEarning,
    task::{CompletionKey, TaskCompletion, TaskId, TaskTemplate},
};

use crate::core::error::EngineError;

/// One all-or-nothing unit of work
///
/// Every `lock_*` read takes an exclusive lock on the row, held until the
/// unit commits or rolls back, so a read-modify-write through the batch can
/// never lose a concurrent update. Locking a missing row also locks its key.
pub trait AtomicBatch {
    fn lock_account(&mut self, id: UserId) -> Result<Option<UserAccount>, EngineError>;

    fn put_account(&mut self, account: &UserAccount) -> Result<(), EngineError>;

    // Index `user` under the direct referrals of `sponsor`
    fn add_direct_referral(&mut self, sponsor: UserId, user: UserId) -> Result<(), EngineError>;

    fn lock_completion(
        &mut self,
        key: &CompletionKey,
    ) -> Result<Option<TaskCompletion>, EngineError>;

    fn put_completion(&mut self, completion: &TaskCompletion) -> Result<(), EngineError>;

    fn lock_task(&mut self, id: TaskId) -> Result<Option<TaskTemplate>, EngineError>;

    fn put_task(&mut self, task: &TaskTemplate) -> Result<(), EngineError>;

    // Append-only, an existing entry is never overwritten
    fn append_ledger_entry(&mut self, entry: &LedgerEntry) -> Result<(), EngineError>;

    // Append-only, an existing record is never overwritten
    fn append_commission_earning(
        &mut self,
        earning: &CommissionEarning,
    ) -> Result<(), EngineError>;

    fn add_review(&mut self, key: &CompletionKey) -> Result<(), EngineError>;

    fn remove_review(&mut self, key: &CompletionKey) -> Result<(), EngineError>;

    // Persisted only once the unit has committed
    fn queue_notification(&mut self, notification: Notification);
}

pub trait Storage:
    AccountProvider
    + PlanProvider
    + TaskProvider
    + CompletionProvider
    + LedgerProvider
    + NotificationProvider
    + Sync
    + Send
    + 'static
{
    type Batch<'a>: AtomicBatch
    where
        Self: 'a;

    /// Run `f` inside one transaction
    ///
    /// `Ok` commits every write of the batch, `Err` discards all of them.
    /// Notifications queued by `f` are written after the commit and a failure
    /// to write them never undoes the committed unit.
    fn atomic<R, F>(&self, f: F) -> Result<R, EngineError>
    where
        F: FnOnce(&mut Self::Batch<'_>) -> Result<R, EngineError>;
}
