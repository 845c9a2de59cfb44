// Task templates and per-day task completions

mod proof;

pub use proof::*;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{
    account::UserId,
    config::DEFAULT_TASK_ID_BASE,
    time::{DayIndex, TimestampSeconds},
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    #[inline]
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Daily,
    Simple,
    Basic,
    ContentEngagement,
    VideoWatch,
    SocialShare,
    Survey,
}

impl TaskType {
    /// Paid immediately on submission, others wait for an administrator
    #[inline]
    pub fn is_auto_approved(&self) -> bool {
        matches!(
            self,
            TaskType::Daily | TaskType::Simple | TaskType::Basic | TaskType::ContentEngagement
        )
    }

    /// Types picked by the daily assignment
    #[inline]
    pub fn is_daily_assignable(&self) -> bool {
        self.is_auto_approved() || matches!(self, TaskType::VideoWatch)
    }

    /// Submissions must carry engagement telemetry
    #[inline]
    pub fn requires_engagement_proof(&self) -> bool {
        matches!(self, TaskType::ContentEngagement)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Active,
    Inactive,
}

/// Reusable task definition
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskTemplate {
    pub id: TaskId,
    pub title: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub thresholds: Option<EngagementThresholds>,
    // Number of approved completions
    pub completions: u64,
}

impl TaskTemplate {
    pub fn new(id: TaskId, title: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id,
            title: title.into(),
            task_type,
            status: TaskStatus::Active,
            thresholds: None,
            completions: 0,
        }
    }

    pub fn with_thresholds(mut self, thresholds: EngagementThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.status == TaskStatus::Active && self.task_type.is_daily_assignable()
    }

    /// Fallback templates, synthesized when the catalog cannot fill a day
    pub fn defaults(count: u32) -> Vec<TaskTemplate> {
        const TITLES: [&str; 5] = [
            "Daily check-in",
            "Visit the featured products",
            "Read today's announcement",
            "Rate a product",
            "Share the store page",
        ];

        (0..count)
            .map(|i| {
                let title = TITLES[i as usize % TITLES.len()];
                TaskTemplate::new(
                    TaskId(DEFAULT_TASK_ID_BASE + i as u64),
                    title,
                    TaskType::Daily,
                )
            })
            .collect()
    }
}

/// Storage key of one assigned task: a user, a calendar day and a slot
/// in that day's quota
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CompletionKey {
    pub user_id: UserId,
    pub day: DayIndex,
    pub slot: u8,
}

impl CompletionKey {
    pub const SIZE: usize = 8 + 4 + 1;

    pub fn new(user_id: UserId, day: DayIndex, slot: u8) -> Self {
        Self { user_id, day, slot }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..8].copy_from_slice(&self.user_id.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.day.to_be_bytes());
        bytes[12] = self.slot;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SIZE {
            return None;
        }
        let user_id = UserId::from_be_slice(&bytes[..8])?;
        let day = DayIndex::from_be_bytes(bytes[8..12].try_into().ok()?);
        Some(Self::new(user_id, day, bytes[12]))
    }

    /// Prefix shared by every slot of a user's day
    pub fn day_prefix(user_id: UserId, day: DayIndex) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&user_id.to_be_bytes());
        bytes[8..].copy_from_slice(&day.to_be_bytes());
        bytes
    }
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.user_id, self.day, self.slot)
    }
}

/// Transitions only move forward:
/// PENDING -> COMPLETED, or PENDING -> UNDER_REVIEW -> COMPLETED
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Pending,
    UnderReview,
    Completed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskCompletion {
    pub key: CompletionKey,
    pub task_id: TaskId,
    pub status: CompletionStatus,
    // Percent, 0..=100
    pub progress: u8,
    // Frozen at approval, a preview until then
    pub reward: u64,
    pub assigned_at: TimestampSeconds,
    pub submitted_at: Option<TimestampSeconds>,
    pub completed_at: Option<TimestampSeconds>,
    // Proof blob as submitted by the client
    pub tracking_data: Option<String>,
}

impl TaskCompletion {
    pub fn assigned(key: CompletionKey, task_id: TaskId, reward: u64, now: TimestampSeconds) -> Self {
        Self {
            key,
            task_id,
            status: CompletionStatus::Pending,
            progress: 0,
            reward,
            assigned_at: now,
            submitted_at: None,
            completed_at: None,
            tracking_data: None,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == CompletionStatus::Pending
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == CompletionStatus::Completed
    }

    pub fn mark_under_review(&mut self, tracking_data: Option<String>, now: TimestampSeconds) {
        self.status = CompletionStatus::UnderReview;
        self.progress = 100;
        self.submitted_at = Some(now);
        self.tracking_data = tracking_data;
    }

    pub fn mark_completed(&mut self, reward: u64, now: TimestampSeconds) {
        self.status = CompletionStatus::Completed;
        self.progress = 100;
        self.reward = reward;
        self.completed_at = Some(now);
        if self.submitted_at.is_none() {
            self.submitted_at = Some(now);
        }
    }
}
