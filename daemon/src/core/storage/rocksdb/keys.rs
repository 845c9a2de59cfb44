// Key layouts, every integer is big-endian so prefix scans come out ordered

use earn_common::{
    account::UserId,
    ledger::{LedgerEntry, Notification},
    plan::PlanTier,
    referral::CommissionEarning,
    time::TimestampSeconds,
};

// Recipient slot of notifications addressed to administrators
const ADMIN_RECIPIENT: u64 = u64::MAX;

pub fn plan_key(tier: PlanTier) -> [u8; 1] {
    [tier.to_u8()]
}

pub fn direct_referral_key(sponsor: UserId, user: UserId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&sponsor.to_be_bytes());
    key[8..].copy_from_slice(&user.to_be_bytes());
    key
}

fn timestamped_key(owner: u64, timestamp: TimestampSeconds, id: u64) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&owner.to_be_bytes());
    key[8..16].copy_from_slice(&timestamp.to_be_bytes());
    key[16..].copy_from_slice(&id.to_be_bytes());
    key
}

pub fn ledger_entry_key(entry: &LedgerEntry) -> [u8; 24] {
    timestamped_key(entry.user_id.0, entry.created_at, entry.id)
}

pub fn commission_earning_key(earning: &CommissionEarning) -> [u8; 20] {
    let mut key = [0u8; 20];
    key[..8].copy_from_slice(&earning.sponsor_id.to_be_bytes());
    key[8..12].copy_from_slice(&earning.earning_day.to_be_bytes());
    key[12..].copy_from_slice(&earning.id.to_be_bytes());
    key
}

pub fn notification_prefix(recipient: Option<UserId>) -> [u8; 8] {
    recipient.map(|id| id.0).unwrap_or(ADMIN_RECIPIENT).to_be_bytes()
}

pub fn notification_key(notification: &Notification) -> [u8; 24] {
    let owner = notification
        .recipient
        .map(|id| id.0)
        .unwrap_or(ADMIN_RECIPIENT);
    timestamped_key(owner, notification.created_at, notification.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use earn_common::ledger::{LedgerEntry, LedgerMetadata};
    use earn_common::task::TaskId;

    #[test]
    fn test_ledger_keys_sort_by_time() {
        let metadata = LedgerMetadata::task_reward(TaskId(1), None);
        let older = LedgerEntry::task_reward(u64::MAX, UserId(7), 10, "a", metadata.clone(), 100);
        let newer = LedgerEntry::task_reward(0, UserId(7), 10, "a", metadata, 101);
        assert!(ledger_entry_key(&older) < ledger_entry_key(&newer));
        assert!(ledger_entry_key(&older).starts_with(&UserId(7).to_be_bytes()));
    }

    #[test]
    fn test_admin_notifications_prefix() {
        let n = Notification::review_requested(1, UserId(3), "survey", 5);
        assert!(notification_key(&n).starts_with(&notification_prefix(None)));
    }
}
