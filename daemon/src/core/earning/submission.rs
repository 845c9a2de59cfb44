// Task submission

use anyhow::Context;
use earn_common::{
    account::UserId,
    eligibility::can_earn_today,
    ledger::Notification,
    referral::CommissionPayout,
    task::{
        CompletionKey, CompletionStatus, EngagementProof, TaskCompletion, TaskId, TaskTemplate,
    },
    time::TimestampSeconds,
};
use log::{debug, info, warn};
use serde::Serialize;

use super::{ledger::next_record_id, EarningEngine};
use crate::core::{
    error::EngineError,
    storage::{AtomicBatch, Storage},
};

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub key: CompletionKey,
    pub task_id: TaskId,
    pub status: CompletionStatus,
    // Set once money moved
    pub reward_earned: Option<u64>,
    pub commissions: Vec<CommissionPayout>,
}

impl SubmissionOutcome {
    fn under_review(completion: &TaskCompletion) -> Self {
        Self {
            key: completion.key,
            task_id: completion.task_id,
            status: completion.status,
            reward_earned: None,
            commissions: Vec::new(),
        }
    }
}

// Fail when the slot can no longer be submitted
pub(super) fn ensure_pending(completion: &TaskCompletion) -> Result<(), EngineError> {
    match completion.status {
        CompletionStatus::Pending => Ok(()),
        CompletionStatus::UnderReview => Err(EngineError::AlreadySubmitted(completion.task_id)),
        CompletionStatus::Completed => Err(EngineError::AlreadyCompleted(completion.task_id)),
    }
}

// First pending slot of `task` in a day, or why there is none
fn select_slot(
    completions: &[TaskCompletion],
    task: TaskId,
) -> Result<CompletionKey, EngineError> {
    let mut slots = completions.iter().filter(|c| c.task_id == task);
    if let Some(pending) = slots.clone().find(|c| c.is_pending()) {
        return Ok(pending.key);
    }

    match slots.next() {
        Some(completion) => ensure_pending(completion).map(|_| completion.key),
        None => Err(EngineError::NoAssignment(task)),
    }
}

impl<S: Storage> EarningEngine<S> {
    /// Submit one of today's tasks
    ///
    /// Eligibility is evaluated again on the locked account, so a user
    /// disabled after the assignment cannot be paid. Auto-approved types are
    /// paid immediately, other types wait for an administrator.
    pub async fn submit_task(
        &self,
        user: UserId,
        task: TaskId,
        proof: Option<EngagementProof>,
    ) -> Result<SubmissionOutcome, EngineError> {
        let today = self.today();
        let context = self.load_context(user).await?;

        let completions = self.storage.get_completions_for_day(user, today).await?;
        let key = select_slot(&completions, task)?;

        let template = self
            .storage
            .get_task(task)
            .await?
            .ok_or(EngineError::TaskNotFound(task))?;

        let tracking_data = match proof.as_ref() {
            Some(proof) => Some(serde_json::to_string(proof).context("Error while encoding proof")?),
            None => None,
        };

        if template.task_type.requires_engagement_proof() {
            let proof = proof.unwrap_or_default();
            let missing = template
                .thresholds
                .clone()
                .unwrap_or_default()
                .missing_requirements(&proof);
            if !missing.is_empty() {
                if log::log_enabled!(log::Level::Debug) {
                    debug!("user {} proof for task {} misses {} requirements", user, task, missing.len());
                }
                return Err(EngineError::RequirementsNotMet(missing));
            }
        }

        let reward = self.settings.per_task_reward(context.plan.as_ref());
        let plan_tier = context.account.membership_plan;
        let auto_approved = template.task_type.is_auto_approved();
        let writer = self.ledger_writer();
        let now = self.now();

        let result = self.storage.atomic(|batch| {
            let mut completion = batch
                .lock_completion(&key)?
                .ok_or(EngineError::NoAssignment(task))?;
            ensure_pending(&completion)?;

            // templates are locked before accounts in every unit
            let locked_task = if auto_approved {
                Some(batch.lock_task(task)?.ok_or(EngineError::TaskNotFound(task))?)
            } else {
                None
            };

            let mut account = batch
                .lock_account(user)?
                .ok_or(EngineError::UserNotFound(user))?;
            if account.membership_plan != plan_tier {
                return Err(EngineError::AccountChanged(user));
            }

            can_earn_today(&account, context.plan.as_ref(), &context.referrals, now).into_result()?;

            match locked_task {
                Some(mut locked_task) => {
                    completion.tracking_data = tracking_data;
                    let cascade =
                        writer.approve(batch, &mut completion, &mut account, &mut locked_task, reward)?;
                    Ok(SubmissionOutcome {
                        key,
                        task_id: task,
                        status: completion.status,
                        reward_earned: Some(reward),
                        commissions: cascade.payouts,
                    })
                }
                None => {
                    request_review(batch, &mut completion, &template, tracking_data, now)?;
                    Ok(SubmissionOutcome::under_review(&completion))
                }
            }
        });

        match &result {
            Ok(outcome) => {
                if log::log_enabled!(log::Level::Info) {
                    info!("user {} submitted task {}: {}", user, task, outcome.status);
                }
            }
            Err(EngineError::Ineligible(reason)) => {
                if log::log_enabled!(log::Level::Warn) {
                    warn!("user {} cannot earn from task {}: {}", user, task, reason);
                }
            }
            Err(_) => {}
        }

        result
    }
}

fn request_review<B: AtomicBatch>(
    batch: &mut B,
    completion: &mut TaskCompletion,
    template: &TaskTemplate,
    tracking_data: Option<String>,
    now: TimestampSeconds,
) -> Result<(), EngineError> {
    completion.mark_under_review(tracking_data, now);
    batch.put_completion(completion)?;
    batch.add_review(&completion.key)?;
    batch.queue_notification(Notification::review_requested(
        next_record_id(),
        completion.key.user_id,
        &template.title,
        now,
    ));
    Ok(())
}
