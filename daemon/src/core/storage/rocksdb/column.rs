use strum::{AsRefStr, Display, EnumIter};

const PREFIX_USER_ID_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, EnumIter, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    // {user_id} => {account}
    Accounts,
    // Reverse index of the sponsor pointer
    // {sponsor_id}{user_id} => {user_id}
    ReferralDirects,

    // {tier} => {plan}
    Plans,
    // {task_id} => {template}
    Tasks,

    // One row per assigned slot of a day
    // {user_id}{day}{slot} => {completion}
    Completions,
    // Completions waiting for an administrator
    // {user_id}{day}{slot} => {completion key}
    ReviewQueue,

    // Append-only audit trail
    // {user_id}{timestamp}{id} => {entry}
    LedgerEntries,
    // {sponsor_id}{day}{id} => {commission earning}
    CommissionEarnings,

    // Admin notifications use u64::MAX as recipient
    // {recipient}{timestamp}{id} => {notification}
    Notifications,
}

impl Column {
    pub const fn prefix(&self) -> Option<usize> {
        use Column::*;

        match self {
            ReferralDirects | Completions | LedgerEntries | CommissionEarnings | Notifications => {
                Some(PREFIX_USER_ID_LEN)
            }
            _ => None,
        }
    }
}
