// AtomicBatch over one pessimistic RocksDB transaction

use anyhow::Context;
use earn_common::{
    account::{UserAccount, UserId},
    ledger::{LedgerEntry, Notification},
    referral::CommissionEarning,
    task::{CompletionKey, TaskCompletion, TaskId, TaskTemplate},
};
use log::trace;
use rocksdb::Transaction;
use serde::{de::DeserializeOwned, Serialize};

use super::{cf_handle, keys, Column, InnerDB};
use crate::core::{error::EngineError, storage::AtomicBatch};

pub struct RocksBatch<'a> {
    db: &'a InnerDB,
    txn: Transaction<'a, InnerDB>,
    notifications: Vec<Notification>,
}

impl<'a> RocksBatch<'a> {
    pub(super) fn new(db: &'a InnerDB, txn: Transaction<'a, InnerDB>) -> Self {
        Self {
            db,
            txn,
            notifications: Vec::new(),
        }
    }

    // Commit and hand back the queued notifications
    pub(super) fn commit(self) -> Result<Vec<Notification>, EngineError> {
        self.txn.commit()?;
        Ok(self.notifications)
    }

    fn lock<V: DeserializeOwned>(
        &self,
        column: Column,
        key: &[u8],
    ) -> Result<Option<V>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("lock row in {:?}", column);
        }

        let cf = cf_handle!(self.db, column);
        match self.txn.get_for_update_cf(&cf, key, true)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<V: Serialize>(&self, column: Column, key: &[u8], value: &V) -> Result<(), EngineError> {
        let cf = cf_handle!(self.db, column);
        self.txn.put_cf(&cf, key, bincode::serialize(value)?)?;
        Ok(())
    }

    // Fails instead of overwriting an existing row
    fn append<V: Serialize>(&self, column: Column, key: &[u8], value: &V) -> Result<(), EngineError> {
        let cf = cf_handle!(self.db, column);
        if self.txn.get_for_update_cf(&cf, key, true)?.is_some() {
            return Err(anyhow::anyhow!("Duplicated key in append-only column {:?}", column).into());
        }
        self.txn.put_cf(&cf, key, bincode::serialize(value)?)?;
        Ok(())
    }
}

impl<'a> AtomicBatch for RocksBatch<'a> {
    fn lock_account(&mut self, id: UserId) -> Result<Option<UserAccount>, EngineError> {
        self.lock(Column::Accounts, &id.to_be_bytes())
    }

    fn put_account(&mut self, account: &UserAccount) -> Result<(), EngineError> {
        self.put(Column::Accounts, &account.id.to_be_bytes(), account)
    }

    fn add_direct_referral(&mut self, sponsor: UserId, user: UserId) -> Result<(), EngineError> {
        self.put(
            Column::ReferralDirects,
            &keys::direct_referral_key(sponsor, user),
            &user,
        )
    }

    fn lock_completion(
        &mut self,
        key: &CompletionKey,
    ) -> Result<Option<TaskCompletion>, EngineError> {
        self.lock(Column::Completions, &key.to_bytes())
    }

    fn put_completion(&mut self, completion: &TaskCompletion) -> Result<(), EngineError> {
        self.put(Column::Completions, &completion.key.to_bytes(), completion)
    }

    fn lock_task(&mut self, id: TaskId) -> Result<Option<TaskTemplate>, EngineError> {
        self.lock(Column::Tasks, &id.to_be_bytes())
    }

    fn put_task(&mut self, task: &TaskTemplate) -> Result<(), EngineError> {
        self.put(Column::Tasks, &task.id.to_be_bytes(), task)
    }

    fn append_ledger_entry(&mut self, entry: &LedgerEntry) -> Result<(), EngineError> {
        self.append(Column::LedgerEntries, &keys::ledger_entry_key(entry), entry)
    }

    fn append_commission_earning(
        &mut self,
        earning: &CommissionEarning,
    ) -> Result<(), EngineError> {
        self.append(
            Column::CommissionEarnings,
            &keys::commission_earning_key(earning),
            earning,
        )
    }

    fn add_review(&mut self, key: &CompletionKey) -> Result<(), EngineError> {
        self.put(Column::ReviewQueue, &key.to_bytes(), key)
    }

    fn remove_review(&mut self, key: &CompletionKey) -> Result<(), EngineError> {
        let cf = cf_handle!(self.db, Column::ReviewQueue);
        self.txn.delete_cf(&cf, key.to_bytes())?;
        Ok(())
    }

    fn queue_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
