// In-memory AtomicBatch used by the unit tests of the money path
// Rows are written immediately, nothing is rolled back.

use std::collections::{HashMap, HashSet};

use earn_common::{
    account::{UserAccount, UserId},
    ledger::{LedgerEntry, Notification},
    referral::CommissionEarning,
    task::{CompletionKey, TaskCompletion, TaskId, TaskTemplate},
};

use crate::core::{error::EngineError, storage::AtomicBatch};

#[derive(Default)]
pub struct MemoryBatch {
    pub accounts: HashMap<UserId, UserAccount>,
    pub directs: Vec<(UserId, UserId)>,
    pub completions: HashMap<CompletionKey, TaskCompletion>,
    pub tasks: HashMap<TaskId, TaskTemplate>,
    pub ledger: Vec<LedgerEntry>,
    pub commissions: Vec<CommissionEarning>,
    pub reviews: HashSet<CompletionKey>,
    pub notifications: Vec<Notification>,
}

impl MemoryBatch {
    pub fn insert_account(&mut self, account: UserAccount) {
        self.accounts.insert(account.id, account);
    }

    pub fn account(&self, id: UserId) -> &UserAccount {
        &self.accounts[&id]
    }
}

impl AtomicBatch for MemoryBatch {
    fn lock_account(&mut self, id: UserId) -> Result<Option<UserAccount>, EngineError> {
        Ok(self.accounts.get(&id).cloned())
    }

    fn put_account(&mut self, account: &UserAccount) -> Result<(), EngineError> {
        self.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn add_direct_referral(&mut self, sponsor: UserId, user: UserId) -> Result<(), EngineError> {
        self.directs.push((sponsor, user));
        Ok(())
    }

    fn lock_completion(
        &mut self,
        key: &CompletionKey,
    ) -> Result<Option<TaskCompletion>, EngineError> {
        Ok(self.completions.get(key).cloned())
    }

    fn put_completion(&mut self, completion: &TaskCompletion) -> Result<(), EngineError> {
        self.completions.insert(completion.key, completion.clone());
        Ok(())
    }

    fn lock_task(&mut self, id: TaskId) -> Result<Option<TaskTemplate>, EngineError> {
        Ok(self.tasks.get(&id).cloned())
    }

    fn put_task(&mut self, task: &TaskTemplate) -> Result<(), EngineError> {
        self.tasks.insert(task.id, task.clone());
        Ok(())
    }

    fn append_ledger_entry(&mut self, entry: &LedgerEntry) -> Result<(), EngineError> {
        self.ledger.push(entry.clone());
        Ok(())
    }

    fn append_commission_earning(
        &mut self,
        earning: &CommissionEarning,
    ) -> Result<(), EngineError> {
        self.commissions.push(earning.clone());
        Ok(())
    }

    fn add_review(&mut self, key: &CompletionKey) -> Result<(), EngineError> {
        self.reviews.insert(*key);
        Ok(())
    }

    fn remove_review(&mut self, key: &CompletionKey) -> Result<(), EngineError> {
        self.reviews.remove(key);
        Ok(())
    }

    fn queue_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
