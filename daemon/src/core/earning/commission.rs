// Task commission cascade
//
// A parent-pointer walk bounded by the level counter. The counter is the
// only guard against cycles in the sponsor forest: a cycle simply pays the
// same sponsors again until level 5 is reached.

use earn_common::{
    account::UserId,
    config::MAX_COMMISSION_LEVELS,
    ledger::{LedgerEntry, LedgerMetadata, Notification},
    plan::PlanTier,
    referral::{CascadeResult, CommissionEarning, CommissionPayout, CommissionSchedule},
    task::TaskId,
    time::{day_index, TimestampSeconds},
};
use log::{debug, trace};

use super::ledger::next_record_id;
use crate::core::{error::EngineError, storage::AtomicBatch};

/// One approved task reward to distribute
#[derive(Debug, Clone, Copy)]
pub struct CascadeEvent {
    pub source_user: UserId,
    pub first_sponsor: UserId,
    pub task_id: TaskId,
    // Plan of the completing user
    pub plan: Option<PlanTier>,
    pub task_reward: u64,
}

pub struct Cascader<'a> {
    schedule: &'a CommissionSchedule,
    now: TimestampSeconds,
}

impl<'a> Cascader<'a> {
    pub fn new(schedule: &'a CommissionSchedule, now: TimestampSeconds) -> Self {
        Self { schedule, now }
    }

    /// Credit every active sponsor up the chain, inside the caller's unit
    ///
    /// An inactive sponsor earns nothing but the walk still moves on to its
    /// own sponsor and the level still increases. A missing sponsor ends the
    /// walk as there is no pointer left to follow.
    pub fn cascade<B: AtomicBatch>(
        &self,
        batch: &mut B,
        event: &CascadeEvent,
    ) -> Result<CascadeResult, EngineError> {
        let max_level = self.schedule.levels().min(MAX_COMMISSION_LEVELS);
        let mut result = CascadeResult::default();
        let mut current = Some(event.first_sponsor);
        let mut level: u8 = 1;

        while level <= max_level {
            let Some(sponsor_id) = current else {
                break;
            };

            let Some(mut sponsor) = batch.lock_account(sponsor_id)? else {
                if log::log_enabled!(log::Level::Debug) {
                    debug!("sponsor {} at level {} not found, cascade stops", sponsor_id, level);
                }
                result.skipped_levels.push(level);
                break;
            };

            if !sponsor.membership_status.is_active() {
                if log::log_enabled!(log::Level::Trace) {
                    trace!("sponsor {} at level {} is not active, skipped", sponsor_id, level);
                }
                result.skipped_levels.push(level);
            } else {
                let amount = self.schedule.commission_for(level, event.task_reward);
                if amount > 0 {
                    let rate_bps = self.schedule.ratio_for_level(level).unwrap_or(0);
                    sponsor.credit_commission(amount)?;
                    batch.put_account(&sponsor)?;
                    self.record(batch, event, sponsor_id, level, rate_bps, amount)?;

                    result.payouts.push(CommissionPayout {
                        sponsor_id,
                        level,
                        rate_bps,
                        amount,
                    });
                }
            }

            current = sponsor.sponsor_id;
            level += 1;
        }

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "cascade of {} from user {} paid {} to {} sponsors",
                event.task_reward,
                event.source_user,
                result.total_paid(),
                result.payouts.len()
            );
        }

        Ok(result)
    }

    // Audit rows of one credited level
    fn record<B: AtomicBatch>(
        &self,
        batch: &mut B,
        event: &CascadeEvent,
        sponsor_id: UserId,
        level: u8,
        rate_bps: u16,
        amount: u64,
    ) -> Result<(), EngineError> {
        let metadata = LedgerMetadata::commission(
            event.task_id,
            event.plan,
            level,
            rate_bps,
            event.source_user,
        );
        batch.append_ledger_entry(&LedgerEntry::referral_commission(
            next_record_id(),
            sponsor_id,
            amount,
            metadata,
            self.now,
        ))?;

        batch.append_commission_earning(&CommissionEarning {
            id: next_record_id(),
            sponsor_id,
            referred_user_id: event.source_user,
            task_id: event.task_id,
            level,
            amount,
            earning_day: day_index(self.now),
            created_at: self.now,
        })?;

        batch.queue_notification(Notification::commission_earned(
            next_record_id(),
            sponsor_id,
            level,
            amount,
            event.source_user,
            self.now,
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::earning::memory::MemoryBatch;
    use earn_common::{
        account::{MembershipStatus, UserAccount},
        ledger::LedgerEntryType,
    };

    const NOW: TimestampSeconds = 1_700_000_000;

    fn sponsor(id: u64, sponsor: Option<u64>, status: MembershipStatus) -> UserAccount {
        UserAccount::new(UserId(id), sponsor.map(UserId)).with_membership(
            PlanTier::Basic,
            status,
            NOW,
        )
    }

    fn event(first_sponsor: u64, reward: u64) -> CascadeEvent {
        CascadeEvent {
            source_user: UserId(1),
            first_sponsor: UserId(first_sponsor),
            task_id: TaskId(9),
            plan: Some(PlanTier::Standard),
            task_reward: reward,
        }
    }

    #[test]
    fn test_sample_scenario_with_inactive_sponsor() {
        let mut batch = MemoryBatch::default();
        batch.insert_account(sponsor(2, Some(3), MembershipStatus::Active));
        batch.insert_account(sponsor(3, Some(4), MembershipStatus::Inactive));
        batch.insert_account(sponsor(4, None, MembershipStatus::Active));

        let schedule = CommissionSchedule::default();
        let result = Cascader::new(&schedule, NOW)
            .cascade(&mut batch, &event(2, 50))
            .unwrap();

        assert_eq!(result.paid_to(UserId(2)), 5);
        assert_eq!(result.paid_to(UserId(3)), 0);
        // level 3 rate, not level 2
        assert_eq!(result.paid_to(UserId(4)), 2);
        assert_eq!(result.payouts[1].level, 3);
        assert_eq!(result.total_paid(), 7);
        assert_eq!(result.skipped_levels, vec![2]);

        assert_eq!(batch.account(UserId(4)).available_voucher_pkr, 2);
        assert_eq!(batch.account(UserId(3)).balance, 0);
        assert_eq!(batch.ledger.len(), 2);
        assert!(batch
            .ledger
            .iter()
            .all(|e| e.entry_type == LedgerEntryType::ReferralCommission));
        assert_eq!(batch.commissions.len(), 2);
        assert_eq!(batch.notifications.len(), 2);
    }

    #[test]
    fn test_walk_stops_after_five_levels() {
        let mut batch = MemoryBatch::default();
        // chain 2 -> 3 -> ... -> 8
        for id in 2..=8 {
            batch.insert_account(sponsor(id, Some(id + 1), MembershipStatus::Active));
        }

        let schedule = CommissionSchedule::default();
        let result = Cascader::new(&schedule, NOW)
            .cascade(&mut batch, &event(2, 100))
            .unwrap();

        let paid: Vec<u64> = (2..=8).map(|id| result.paid_to(UserId(id))).collect();
        assert_eq!(paid, vec![10, 5, 3, 2, 1, 0, 0]);
    }

    #[test]
    fn test_cycle_is_bounded_by_levels() {
        let mut batch = MemoryBatch::default();
        // 2 and 3 sponsor each other
        batch.insert_account(sponsor(2, Some(3), MembershipStatus::Active));
        batch.insert_account(sponsor(3, Some(2), MembershipStatus::Active));

        let schedule = CommissionSchedule::default();
        let result = Cascader::new(&schedule, NOW)
            .cascade(&mut batch, &event(2, 100))
            .unwrap();

        // levels 1, 3, 5 for user 2 and 2, 4 for user 3
        assert_eq!(result.payouts.len(), 5);
        assert_eq!(result.paid_to(UserId(2)), 10 + 3 + 1);
        assert_eq!(result.paid_to(UserId(3)), 5 + 2);
        assert_eq!(batch.account(UserId(2)).balance, 14);
    }

    #[test]
    fn test_missing_sponsor_ends_walk() {
        let mut batch = MemoryBatch::default();
        batch.insert_account(sponsor(2, Some(99), MembershipStatus::Active));

        let schedule = CommissionSchedule::default();
        let result = Cascader::new(&schedule, NOW)
            .cascade(&mut batch, &event(2, 50))
            .unwrap();

        assert_eq!(result.total_paid(), 5);
        assert_eq!(result.skipped_levels, vec![2]);
    }

    #[test]
    fn test_zero_commission_writes_nothing() {
        let mut batch = MemoryBatch::default();
        batch.insert_account(sponsor(2, None, MembershipStatus::Active));

        let schedule = CommissionSchedule::default();
        let result = Cascader::new(&schedule, NOW)
            .cascade(&mut batch, &event(2, 4))
            .unwrap();

        assert!(result.payouts.is_empty());
        assert!(batch.ledger.is_empty());
        assert!(batch.commissions.is_empty());
    }
}
