//! 虚拟机热迁移检查

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use svt_cluster::{MigrationPhase, MigrationSpec};
use svt_engine::{wait_until_ready, Check, RunContext};

use super::CheckEnv;

/// 对运行中的虚拟机发起热迁移并等待其成功
pub struct MigrationCheck {
    env: Arc<CheckEnv>,
}

impl MigrationCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Check for MigrationCheck {
    fn name(&self) -> &str {
        "trigger VM migration"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;
        let vm_name = self.env.vm()?;

        let migration = self
            .env
            .client
            .migration()
            .create(
                &config.namespace,
                "validator-migration-",
                MigrationSpec { vm_name },
            )
            .await?;
        self.env.tracker.register(migration.clone());

        let migration_api = self.env.client.migration();
        wait_until_ready(ctx, &migration, || migration_api.get(&migration), |m| {
            match m.status.phase {
                MigrationPhase::Succeeded => Ok(true),
                MigrationPhase::Failed => bail!("热迁移 {} 失败", m.metadata.name),
                _ => Ok(false),
            }
        })
        .await
    }
}
