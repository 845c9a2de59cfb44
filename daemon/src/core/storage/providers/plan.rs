// Plan catalog storage provider trait

use async_trait::async_trait;
use earn_common::plan::{Plan, PlanTier};

use crate::core::error::EngineError;

#[async_trait]
pub trait PlanProvider {
    async fn has_plan(&self, tier: PlanTier) -> Result<bool, EngineError>;

    async fn get_plan(&self, tier: PlanTier) -> Result<Option<Plan>, EngineError>;

    /// Every configured plan, cheapest tier first
    async fn get_plans(&self) -> Result<Vec<Plan>, EngineError>;

    /// Replace the definition of a tier
    async fn put_plan(&self, plan: &Plan) -> Result<(), EngineError>;
}
