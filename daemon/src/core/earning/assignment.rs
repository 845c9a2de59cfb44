// Daily task assignment

use chrono::NaiveDate;
use earn_common::{
    account::UserId,
    eligibility::EligibilityDecision,
    task::{CompletionKey, CompletionStatus, TaskCompletion, TaskTemplate},
    time::{day_to_date, DayIndex},
};
use log::{debug, info};
use serde::Serialize;

use super::EarningEngine;
use crate::core::{error::EngineError, storage::Storage};

/// Assignment status of a user's day, returned without creating anything
#[derive(Debug, Clone, Serialize)]
pub struct DailyStatus {
    pub user_id: UserId,
    pub day: DayIndex,
    pub date: Option<NaiveDate>,
    pub quota: u32,
    pub assigned: usize,
    pub completed: usize,
    pub pending: usize,
    pub under_review: usize,
    pub per_task_reward: u64,
    pub eligibility: EligibilityDecision,
    pub tasks: Vec<TaskCompletion>,
}

impl<S: Storage> EarningEngine<S> {
    // Slots are stored on one byte
    fn daily_quota(&self) -> u32 {
        self.settings.tasks_per_day.min(u8::MAX as u32)
    }

    /// Create today's tasks of a user, or return them when they exist
    ///
    /// Only a day missing some of its slots is gated by the eligibility
    /// evaluator, a complete day is returned as is.
    pub async fn assign_daily_tasks(&self, user: UserId) -> Result<Vec<TaskCompletion>, EngineError> {
        let today = self.today();
        let quota = self.daily_quota();

        let existing = self.storage.get_completions_for_day(user, today).await?;
        if existing.len() >= quota as usize {
            if log::log_enabled!(log::Level::Debug) {
                debug!("user {} already has {} tasks on day {}", user, existing.len(), today);
            }
            return Ok(existing);
        }

        let context = self.load_context(user).await?;
        let now = self.now();
        context.eligibility(now).into_result()?;

        let templates = self.assignable_templates(quota).await?;
        if templates.is_empty() {
            return Err(EngineError::NoTasksAvailable);
        }

        // preview only, the reward is computed again at approval
        let reward = self.settings.per_task_reward(context.plan.as_ref());

        let assigned = self.storage.atomic(|batch| {
            let mut assigned = Vec::with_capacity(quota as usize);
            for slot in 0..quota {
                let key = CompletionKey::new(user, today, slot as u8);
                let completion = match batch.lock_completion(&key)? {
                    Some(completion) => completion,
                    None => {
                        let template = &templates[slot as usize % templates.len()];
                        let completion = TaskCompletion::assigned(key, template.id, reward, now);
                        batch.put_completion(&completion)?;
                        completion
                    }
                };
                assigned.push(completion);
            }
            Ok(assigned)
        })?;

        if log::log_enabled!(log::Level::Info) {
            info!("assigned {} tasks to user {} for day {}", assigned.len(), user, today);
        }

        Ok(assigned)
    }

    // Active templates of assignable types ordered by id, topped up with
    // the default templates when they cannot fill a day
    async fn assignable_templates(&self, quota: u32) -> Result<Vec<TaskTemplate>, EngineError> {
        let templates = self.active_templates().await?;
        if templates.len() >= quota as usize || !self.seed_default_tasks {
            return Ok(templates);
        }

        let defaults = TaskTemplate::defaults(quota);
        let added = self.storage.atomic(|batch| {
            let mut added = 0;
            for template in &defaults {
                if batch.lock_task(template.id)?.is_none() {
                    batch.put_task(template)?;
                    added += 1;
                }
            }
            Ok(added)
        })?;

        if added > 0 && log::log_enabled!(log::Level::Info) {
            info!("seeded {} default task templates", added);
        }

        // a concurrent request may have seeded them first
        self.active_templates().await
    }

    async fn active_templates(&self) -> Result<Vec<TaskTemplate>, EngineError> {
        let tasks = self.storage.get_tasks().await?;
        Ok(tasks.into_iter().filter(TaskTemplate::is_assignable).collect())
    }

    /// Today's assignment of a user without assigning anything
    pub async fn daily_status(&self, user: UserId) -> Result<DailyStatus, EngineError> {
        let today = self.today();
        let context = self.load_context(user).await?;
        let tasks = self.storage.get_completions_for_day(user, today).await?;

        let count = |status: CompletionStatus| tasks.iter().filter(|t| t.status == status).count();

        Ok(DailyStatus {
            user_id: user,
            day: today,
            date: day_to_date(today),
            quota: self.daily_quota(),
            assigned: tasks.len(),
            completed: count(CompletionStatus::Completed),
            pending: count(CompletionStatus::Pending),
            under_review: count(CompletionStatus::UnderReview),
            per_task_reward: self.settings.per_task_reward(context.plan.as_ref()),
            eligibility: context.eligibility(self.now()),
            tasks,
        })
    }
}
