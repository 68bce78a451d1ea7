//! 卷离线扩容检查

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use svt_cluster::{
    AccessMode, ClaimResources, ClaimSpec, PodPhase, StorageAmount, VolumeMode,
};
use svt_engine::{wait_until_ready, Check, RunContext};

use crate::settings::{CLAIM_EXPANDED_SIZE, CLAIM_SIZE};

use super::{validation_labels, workload_spec, CheckEnv};

/// 验证卷声明在离线状态下可以扩容
///
/// 使用独立的卷声明，不影响基线卷：先用临时负载触发供给与绑定，
/// 再删除负载使卷转为离线，然后提交扩容并等待容量更新。
pub struct ResizeCheck {
    env: Arc<CheckEnv>,
}

impl ResizeCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl Check for ResizeCheck {
    fn name(&self) -> &str {
        "ensure offline volume expansion is successful"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;

        let claim = self
            .env
            .client
            .volume()
            .create(
                &config.namespace,
                "validator-resize-claim-",
                validation_labels(),
                ClaimSpec {
                    access_modes: vec![AccessMode::ReadWriteOnce],
                    storage_class: Some(config.storage_class.clone()),
                    resources: ClaimResources {
                        requests: StorageAmount::new(CLAIM_SIZE),
                    },
                    volume_mode: Some(VolumeMode::Filesystem),
                },
            )
            .await?;
        self.env.tracker.register(claim.clone());

        let pod = self
            .env
            .client
            .pod()
            .create(
                &config.namespace,
                "validator-resize-workload-",
                workload_spec(&claim.name),
            )
            .await?;
        self.env.tracker.register(pod.clone());

        let pod_api = self.env.client.pod();
        wait_until_ready(ctx, &pod, || pod_api.get(&pod), |p| {
            Ok(p.status.phase == PodPhase::Running)
        })
        .await?;

        // 删除负载使卷离线，控制面完成脱挂后扩容才会生效
        self.env.client.pod().delete(&pod).await?;

        let volume_api = self.env.client.volume();
        volume_api.resize(&claim, CLAIM_EXPANDED_SIZE).await?;

        let expanded = StorageAmount::new(CLAIM_EXPANDED_SIZE);
        wait_until_ready(ctx, &claim, || volume_api.get(&claim), |c| {
            Ok(c.status.capacity.as_ref() == Some(&expanded))
        })
        .await
    }
}
