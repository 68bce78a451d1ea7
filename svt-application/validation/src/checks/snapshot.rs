//! 卷快照检查

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use svt_cluster::SnapshotSpec;
use svt_engine::{wait_until_ready, Check, RunContext};

use super::CheckEnv;

/// 对基线卷声明创建快照并等待其可用
pub struct SnapshotCheck {
    env: Arc<CheckEnv>,
}

impl SnapshotCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Check for SnapshotCheck {
    fn name(&self) -> &str {
        "ensure volume snapshot can be created successfully"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;
        let source = self.env.baseline_claim()?;

        let snapshot = self
            .env
            .client
            .snapshot()
            .create(
                &config.namespace,
                "validator-snapshot-",
                SnapshotSpec {
                    source_claim_name: source,
                    snapshot_class: config.snapshot_class.clone(),
                },
            )
            .await?;
        self.env.tracker.register(snapshot.clone());

        let snapshot_api = self.env.client.snapshot();
        wait_until_ready(ctx, &snapshot, || snapshot_api.get(&snapshot), |s| {
            Ok(s.status.ready_to_use == Some(true))
        })
        .await
    }
}
