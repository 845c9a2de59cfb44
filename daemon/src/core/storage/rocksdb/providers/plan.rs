// PlanProvider implementation for RocksDB storage

use async_trait::async_trait;
use earn_common::plan::{Plan, PlanTier};
use log::{debug, trace};

use crate::core::{
    error::EngineError,
    storage::{
        rocksdb::{keys::plan_key, Column, IteratorMode, RocksStorage},
        PlanProvider,
    },
};

#[async_trait]
impl PlanProvider for RocksStorage {
    async fn has_plan(&self, tier: PlanTier) -> Result<bool, EngineError> {
        self.contains_data(Column::Plans, &plan_key(tier))
    }

    async fn get_plan(&self, tier: PlanTier) -> Result<Option<Plan>, EngineError> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("get plan {}", tier);
        }
        self.load_optional_from_disk(Column::Plans, &plan_key(tier))
    }

    async fn get_plans(&self) -> Result<Vec<Plan>, EngineError> {
        self.iter_values(IteratorMode::Start, Column::Plans)
    }

    async fn put_plan(&self, plan: &Plan) -> Result<(), EngineError> {
        if log::log_enabled!(log::Level::Debug) {
            debug!("storing plan {} ({})", plan.tier, plan.name);
        }
        self.insert_into_disk(Column::Plans, plan_key(plan.tier), plan)
    }
}
