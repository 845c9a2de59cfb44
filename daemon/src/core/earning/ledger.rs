// Ledger writer
//
// The atomic money path of one task approval. Callers hand in rows they
// already locked through the batch, the writer mutates and stores them in a
// fixed order and any error aborts the whole unit.

use earn_common::{
    account::UserAccount,
    error::BalanceError,
    ledger::{LedgerEntry, LedgerMetadata, Notification},
    referral::{CascadeResult, CommissionSchedule},
    task::{TaskCompletion, TaskTemplate},
    time::TimestampSeconds,
};
use log::info;

use super::commission::{CascadeEvent, Cascader};
use crate::core::{error::EngineError, storage::AtomicBatch};

// Random id of an append-only record, keys also carry the timestamp
pub(super) fn next_record_id() -> u64 {
    rand::random()
}

pub struct LedgerWriter<'a> {
    schedule: &'a CommissionSchedule,
    now: TimestampSeconds,
}

impl<'a> LedgerWriter<'a> {
    pub fn new(schedule: &'a CommissionSchedule, now: TimestampSeconds) -> Self {
        Self { schedule, now }
    }

    /// Approve a locked completion and pay `reward`
    ///
    /// The completing user is written before the cascade so a sponsor
    /// cycle leading back to them sees the credited balance.
    pub fn approve<B: AtomicBatch>(
        &self,
        batch: &mut B,
        completion: &mut TaskCompletion,
        user: &mut UserAccount,
        task: &mut TaskTemplate,
        reward: u64,
    ) -> Result<CascadeResult, EngineError> {
        // 1. freeze the reward
        completion.mark_completed(reward, self.now);
        batch.put_completion(completion)?;

        // 2. credit the user
        user.credit_task_reward(reward)?;
        batch.put_account(user)?;

        // 3. template counter
        task.completions = task
            .completions
            .checked_add(1)
            .ok_or(BalanceError::Overflow)?;
        batch.put_task(task)?;

        // 4. audit
        let metadata = LedgerMetadata::task_reward(task.id, user.membership_plan);
        batch.append_ledger_entry(&LedgerEntry::task_reward(
            next_record_id(),
            user.id,
            reward,
            &task.title,
            metadata,
            self.now,
        ))?;

        // 5. sponsors
        let cascade = match user.sponsor_id {
            Some(first_sponsor) => {
                let event = CascadeEvent {
                    source_user: user.id,
                    first_sponsor,
                    task_id: task.id,
                    plan: user.membership_plan,
                    task_reward: reward,
                };
                Cascader::new(self.schedule, self.now).cascade(batch, &event)?
            }
            None => CascadeResult::default(),
        };

        // 6. notify
        batch.queue_notification(Notification::task_approved(
            next_record_id(),
            user.id,
            &task.title,
            reward,
            self.now,
        ));

        if log::log_enabled!(log::Level::Info) {
            info!(
                "task {} approved for user {}: reward {}, commissions {}",
                task.id,
                user.id,
                reward,
                cascade.total_paid()
            );
        }

        Ok(cascade)
    }
}
