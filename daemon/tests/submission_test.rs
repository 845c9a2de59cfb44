//! Task submission, ledger writes and the sponsor cascade over RocksStorage
//!
//! A. Idempotence
//!    - a completed task is never paid twice
//!    - a task waiting for review cannot be submitted again
//!
//! B. Cascade
//!    - five paid levels, never a sixth
//!    - inactive sponsors are skipped, the walk goes on
//!
//! C. Gates at submission time
//!    - an admin disabling a user mid-day blocks the payout
//!    - content-engagement proofs report every missing requirement

#![allow(clippy::disallowed_methods)]

mod common;

use common::TestEnv;
use earn_common::{
    account::UserId,
    eligibility::IneligibleReason,
    error::BalanceError,
    ledger::{LedgerEntryType, NotificationKind},
    plan::PlanTier,
    referral::ReferralError,
    task::{
        CompletionStatus, EngagementProof, EngagementThresholds, MissingRequirement, TaskId,
        TaskTemplate, TaskType,
    },
};
use earn_daemon::core::{
    config::EarningConfig,
    error::EngineError,
    storage::{AtomicBatch, CompletionProvider, LedgerProvider, NotificationProvider, Storage},
};

// Assign today's tasks and return the task of the first slot
async fn first_task(env: &TestEnv, user: u64) -> TaskId {
    let tasks = env.engine.assign_daily_tasks(UserId(user)).await.unwrap();
    tasks[0].task_id
}

#[tokio::test]
async fn test_completed_task_is_paid_once() {
    let env = TestEnv::new().await;
    env.member(1, None, PlanTier::Standard).await;
    let task = first_task(&env, 1).await;

    let outcome = env.engine.submit_task(UserId(1), task, None).await.unwrap();
    assert_eq!(outcome.status, CompletionStatus::Completed);
    assert_eq!(outcome.reward_earned, Some(50));

    let again = env.engine.submit_task(UserId(1), task, None).await;
    assert!(matches!(again, Err(EngineError::AlreadyCompleted(t)) if t == task));

    let account = env.account(1).await;
    assert_eq!(account.balance, 50);
    assert_eq!(account.total_earnings, 50);
    assert_eq!(account.total_points, 50);
    assert_eq!(account.tasks_completed, 1);

    let entries = env.storage.get_ledger_entries(UserId(1)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_type, LedgerEntryType::TaskReward);
    assert_eq!(entries[0].amount, 50);
    assert_eq!(entries[0].metadata.task_id, task);
}

#[tokio::test]
async fn test_task_not_assigned_today() {
    let env = TestEnv::new().await;
    env.member(1, None, PlanTier::Basic).await;
    first_task(&env, 1).await;

    assert!(matches!(
        env.engine.submit_task(UserId(1), TaskId(999), None).await,
        Err(EngineError::NoAssignment(TaskId(999)))
    ));
}

#[tokio::test]
async fn test_sample_cascade_skips_inactive_sponsor() {
    let env = TestEnv::new().await;
    // 4 -> 1 -> 2 (inactive) -> 3
    env.member(3, None, PlanTier::Basic).await;
    env.engine.register_account(UserId(2), Some(UserId(3))).await.unwrap();
    env.member(1, Some(2), PlanTier::Basic).await;
    env.member(4, Some(1), PlanTier::Standard).await;

    let task = first_task(&env, 4).await;
    let outcome = env.engine.submit_task(UserId(4), task, None).await.unwrap();
    assert_eq!(outcome.reward_earned, Some(50));
    assert_eq!(outcome.commissions.len(), 2);

    assert_eq!(env.balance(4).await, 50);
    assert_eq!(env.balance(1).await, 5);
    assert_eq!(env.balance(2).await, 0);
    // 3% of 50 rounds half-up
    assert_eq!(env.balance(3).await, 2);

    let sponsor = env.account(1).await;
    assert_eq!(sponsor.available_voucher_pkr, 5);
    assert_eq!(sponsor.total_earnings, 5);
    // commissions are not task completions
    assert_eq!(sponsor.tasks_completed, 0);
    assert_eq!(sponsor.total_points, 0);

    let earnings = env.storage.get_commission_earnings(UserId(3)).await.unwrap();
    assert_eq!(earnings.len(), 1);
    assert_eq!(earnings[0].level, 3);
    assert_eq!(earnings[0].amount, 2);
    assert_eq!(earnings[0].referred_user_id, UserId(4));

    let entries = env.storage.get_ledger_entries(UserId(1)).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_type, LedgerEntryType::ReferralCommission);
    assert_eq!(entries[0].metadata.level, Some(1));
    assert_eq!(entries[0].metadata.source_user, Some(UserId(4)));

    assert!(env.storage.get_commission_earnings(UserId(2)).await.unwrap().is_empty());
    assert_eq!(env.storage.get_total_commission(UserId(1)).await.unwrap(), 5);
}

#[tokio::test]
async fn test_cascade_stops_after_five_levels() {
    let env = TestEnv::new().await;
    // 7 -> 6 -> 5 -> 4 -> 3 -> 2 -> 1
    env.member(1, None, PlanTier::Basic).await;
    for id in 2..=6 {
        env.member(id, Some(id - 1), PlanTier::Basic).await;
    }
    env.member(7, Some(6), PlanTier::Premium).await;

    let task = first_task(&env, 7).await;
    let outcome = env.engine.submit_task(UserId(7), task, None).await.unwrap();
    assert_eq!(outcome.reward_earned, Some(100));

    let levels: Vec<(u64, u8, u64)> = outcome
        .commissions
        .iter()
        .map(|p| (p.sponsor_id.0, p.level, p.amount))
        .collect();
    assert_eq!(
        levels,
        vec![(6, 1, 10), (5, 2, 5), (4, 3, 3), (3, 4, 2), (2, 5, 1)]
    );
    assert_eq!(env.balance(1).await, 0);
}

#[tokio::test]
async fn test_global_task_amount_override() {
    let env = TestEnv::with_config(EarningConfig {
        global_task_amount: Some(40),
        ..Default::default()
    })
    .await;
    env.member(1, None, PlanTier::Premium).await;
    env.member(2, Some(1), PlanTier::Basic).await;

    let task = first_task(&env, 2).await;
    let outcome = env.engine.submit_task(UserId(2), task, None).await.unwrap();
    assert_eq!(outcome.reward_earned, Some(40));
    assert_eq!(env.balance(1).await, 4);

    let stats = env.engine.user_stats(UserId(1)).await.unwrap();
    assert_eq!(stats.per_task_reward, 40);
    assert_eq!(stats.daily_potential, 200);
    assert_eq!(stats.total_commission, 4);
    assert_eq!(stats.direct_referrals, 1);
}

#[tokio::test]
async fn test_admin_disable_blocks_assigned_task() {
    let env = TestEnv::new().await;
    env.member(1, None, PlanTier::Standard).await;
    let task = first_task(&env, 1).await;

    env.engine.set_tasks_enabled(UserId(1), false).unwrap();
    let result = env.engine.submit_task(UserId(1), task, None).await;
    assert!(matches!(
        result,
        Err(EngineError::Ineligible(IneligibleReason::DisabledByAdmin))
    ));

    assert_eq!(env.balance(1).await, 0);
    let status = env.engine.daily_status(UserId(1)).await.unwrap();
    assert_eq!(status.pending, 5);
    assert_eq!(status.completed, 0);

    // enabled again the same day, the task is still payable
    env.engine.set_tasks_enabled(UserId(1), true).unwrap();
    env.engine.submit_task(UserId(1), task, None).await.unwrap();
    assert_eq!(env.balance(1).await, 50);
}

#[tokio::test]
async fn test_content_engagement_lists_missing_requirements() {
    let env = TestEnv::with_config(EarningConfig {
        seed_default_tasks: false,
        ..Default::default()
    })
    .await;
    env.member(1, None, PlanTier::Basic).await;
    env.engine
        .put_task(
            TaskTemplate::new(TaskId(10), "Read the blog post", TaskType::ContentEngagement)
                .with_thresholds(EngagementThresholds {
                    min_duration: Some(60),
                    min_scroll_percentage: Some(80),
                    require_interaction: true,
                    min_ad_clicks: Some(1),
                }),
        )
        .unwrap();
    first_task(&env, 1).await;

    let weak = EngagementProof {
        time_spent: 10,
        scroll_percentage: 20,
        user_interactions: 0,
        ad_clicks: 0,
    };
    let err = env
        .engine
        .submit_task(UserId(1), TaskId(10), Some(weak))
        .await
        .unwrap_err();
    let missing = err.missing_requirements();
    assert_eq!(missing.len(), 4);
    assert!(matches!(missing[0], MissingRequirement::Duration { required: 60, actual: 10 }));
    assert_eq!(env.balance(1).await, 0);

    // no proof at all fails the same way
    assert!(matches!(
        env.engine.submit_task(UserId(1), TaskId(10), None).await,
        Err(EngineError::RequirementsNotMet(_))
    ));

    let proof = EngagementProof {
        time_spent: 90,
        scroll_percentage: 95,
        user_interactions: 5,
        ad_clicks: 1,
    };
    let outcome = env
        .engine
        .submit_task(UserId(1), TaskId(10), Some(proof))
        .await
        .unwrap();
    assert_eq!(outcome.status, CompletionStatus::Completed);
    assert_eq!(outcome.reward_earned, Some(30));

    let completion = env.storage.get_completion(&outcome.key).await.unwrap().unwrap();
    assert!(completion.tracking_data.is_some());
}

#[tokio::test]
async fn test_manual_review_then_approval() {
    let env = TestEnv::with_config(EarningConfig {
        tasks_per_day: 1,
        seed_default_tasks: false,
        ..Default::default()
    })
    .await;
    env.member(1, None, PlanTier::Basic).await;
    env.member(2, Some(1), PlanTier::Standard).await;
    env.task(10, TaskType::VideoWatch);
    first_task(&env, 2).await;

    let outcome = env.engine.submit_task(UserId(2), TaskId(10), None).await.unwrap();
    assert_eq!(outcome.status, CompletionStatus::UnderReview);
    assert_eq!(outcome.reward_earned, None);
    assert_eq!(env.balance(2).await, 0);

    assert!(matches!(
        env.engine.submit_task(UserId(2), TaskId(10), None).await,
        Err(EngineError::AlreadySubmitted(TaskId(10)))
    ));

    let reviews = env.engine.pending_reviews().await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].key, outcome.key);

    let admin = env.storage.get_notifications(None).await.unwrap();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].kind, NotificationKind::ReviewRequested);

    let approved = env.engine.approve_review(outcome.key).await.unwrap();
    assert_eq!(approved.status, CompletionStatus::Completed);
    // 250 split over one task a day
    assert_eq!(approved.reward_earned, Some(250));
    assert_eq!(env.balance(2).await, 250);
    assert_eq!(env.balance(1).await, 25);
    assert!(env.engine.pending_reviews().await.unwrap().is_empty());

    assert!(matches!(
        env.engine.approve_review(outcome.key).await,
        Err(EngineError::NotAwaitingReview(_))
    ));
    assert_eq!(env.balance(2).await, 250);
}

#[tokio::test]
async fn test_notifications_after_commit() {
    let env = TestEnv::new().await;
    env.member(1, None, PlanTier::Basic).await;
    env.member(2, Some(1), PlanTier::Standard).await;
    let task = first_task(&env, 2).await;
    env.engine.submit_task(UserId(2), task, None).await.unwrap();

    let user = env.storage.get_notifications(Some(UserId(2))).await.unwrap();
    assert_eq!(user.len(), 1);
    assert_eq!(user[0].kind, NotificationKind::TaskApproved);

    let sponsor = env.storage.get_notifications(Some(UserId(1))).await.unwrap();
    assert_eq!(sponsor.len(), 1);
    assert_eq!(sponsor[0].kind, NotificationKind::CommissionEarned);
}

#[tokio::test]
async fn test_registration_rules() {
    let env = TestEnv::new().await;
    assert!(matches!(
        env.engine.register_account(UserId(1), Some(UserId(1))).await,
        Err(EngineError::Referral(ReferralError::SelfReferral))
    ));

    env.engine.register_account(UserId(1), None).await.unwrap();
    assert!(matches!(
        env.engine.register_account(UserId(1), None).await,
        Err(EngineError::AlreadyRegistered(UserId(1)))
    ));
}

#[tokio::test]
async fn test_failed_cascade_rolls_back_everything() {
    let env = TestEnv::new().await;
    env.member(1, None, PlanTier::Basic).await;
    env.member(2, Some(1), PlanTier::Basic).await;
    env.member(3, Some(2), PlanTier::Basic).await;
    env.storage
        .atomic(|batch| {
            let mut account = batch.lock_account(UserId(1))?.unwrap();
            account.balance = u64::MAX;
            batch.put_account(&account)
        })
        .unwrap();

    let tasks = env.engine.assign_daily_tasks(UserId(3)).await.unwrap();
    // level 2 commission does not fit the balance of user 1
    let result = env.engine.submit_task(UserId(3), tasks[0].task_id, None).await;
    assert!(matches!(result, Err(EngineError::Balance(BalanceError::Overflow))));

    let account = env.account(3).await;
    assert_eq!(account.balance, 0);
    assert_eq!(account.tasks_completed, 0);
    assert_eq!(env.balance(2).await, 0);
    assert_eq!(env.balance(1).await, u64::MAX);

    let completion = env.storage.get_completion(&tasks[0].key).await.unwrap().unwrap();
    assert_eq!(completion.status, CompletionStatus::Pending);
    assert!(env.storage.get_ledger_entries(UserId(3)).await.unwrap().is_empty());
    assert!(env.storage.get_commission_earnings(UserId(2)).await.unwrap().is_empty());
    assert!(env.storage.get_commission_earnings(UserId(1)).await.unwrap().is_empty());
    assert!(env.storage.get_notifications(Some(UserId(3))).await.unwrap().is_empty());
    assert!(env.storage.get_notifications(Some(UserId(2))).await.unwrap().is_empty());
}
