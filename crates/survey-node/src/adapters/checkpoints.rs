//! Flow checkpoint table.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use survey_settlement::ports::outbound::{CheckpointStore, StoreError};
use survey_settlement::{FlowId, FlowStage};

#[derive(Default)]
pub struct MemoryCheckpointStore {
    stages: Mutex<HashMap<FlowId, FlowStage>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, flow_id: FlowId, stage: FlowStage) -> Result<(), StoreError> {
        self.stages.lock().unwrap().insert(flow_id, stage);
        Ok(())
    }

    async fn load(&self, flow_id: FlowId) -> Result<Option<FlowStage>, StoreError> {
        Ok(self.stages.lock().unwrap().get(&flow_id).copied())
    }
}
