//! 卷声明创建与挂载检查

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use svt_cluster::{
    AccessMode, ClaimPhase, ClaimResources, ClaimSpec, PodPhase, StorageAmount, VolumeClaim,
    VolumeMode,
};
use svt_engine::{wait_until_ready, Check, RunContext};

use crate::settings::CLAIM_SIZE;

use super::{validation_labels, workload_spec, CheckEnv};

/// 创建卷声明并用验证负载确认其可被挂载使用
///
/// 负载进入运行状态即证明卷完成供给与挂载；绑定成功的卷声明作为
/// 基线卷供快照检查复用。
pub struct VolumeCheck {
    env: Arc<CheckEnv>,
}

impl VolumeCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

fn claim_bound(claim: &VolumeClaim) -> bool {
    claim.status.phase == ClaimPhase::Bound
}

#[async_trait]
impl Check for VolumeCheck {
    fn name(&self) -> &str {
        "ensure volume is created and used successfully"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;

        let claim = self
            .env
            .client
            .volume()
            .create(
                &config.namespace,
                "validator-claim-",
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
            .create(&config.namespace, "validator-workload-", workload_spec(&claim.name))
            .await?;
        self.env.tracker.register(pod.clone());

        let pod_api = self.env.client.pod();
        wait_until_ready(ctx, &pod, || pod_api.get(&pod), |p| {
            Ok(p.status.phase == PodPhase::Running)
        })
        .await?;

        // 绑定状态的上报可能滞后于负载就绪，轮询等待
        let volume_api = self.env.client.volume();
        wait_until_ready(ctx, &claim, || volume_api.get(&claim), |c| Ok(claim_bound(c)))
            .await?;

        self.env.set_baseline_claim(&claim.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(phase: &str) -> VolumeClaim {
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": "pvc-1", "namespace": "default" },
            "spec": {
                "accessModes": ["ReadWriteOnce"],
                "resources": { "requests": { "storage": "1Gi" } }
            },
            "status": { "phase": phase }
        }))
        .unwrap()
    }

    #[test]
    fn test_claim_bound_predicate() {
        assert!(claim_bound(&claim("Bound")));
        assert!(!claim_bound(&claim("Pending")));
        assert!(!claim_bound(&claim("Lost")));
    }
}
