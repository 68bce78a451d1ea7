//! 卷热插拔检查

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use svt_cluster::{
    AccessMode, AttachmentPhase, ClaimResources, ClaimSpec, ResourceHandle, ResourceKind,
    StorageAmount, VmInstance, VolumeMode,
};
use svt_engine::{wait_until_ready, Check, RunContext};

use crate::settings::CLAIM_SIZE;

use super::{validation_labels, CheckEnv};

/// 热插卷的数量
const HOTPLUG_VOLUME_COUNT: usize = 2;

/// 向运行中的虚拟机热插两块卷，等待全部挂载就绪后再热拔
///
/// 挂载状态通过与虚拟机同名的实例对象观察。挂载中的卷声明无法
/// 删除，检查结束前必须完成脱挂，否则清理扫描会被平台拒绝。
pub struct HotplugCheck {
    env: Arc<CheckEnv>,
}

impl HotplugCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }
}

fn attached(instance: &VmInstance, claim_names: &[String]) -> bool {
    claim_names.iter().all(|claim| {
        instance.status.volume_status.iter().any(|v| {
            v.claim_name == *claim
                && matches!(
                    v.phase,
                    AttachmentPhase::AttachedToNode
                        | AttachmentPhase::MountedToPod
                        | AttachmentPhase::Ready
                )
        })
    })
}

fn detached(instance: &VmInstance, claim_names: &[String]) -> bool {
    claim_names.iter().all(|claim| {
        !instance
            .status
            .volume_status
            .iter()
            .any(|v| v.claim_name == *claim)
    })
}

#[async_trait]
impl Check for HotplugCheck {
    fn name(&self) -> &str {
        "hotplug 2 volumes to existing VM"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;
        let vm_name = self.env.vm()?;

        let mut claim_names = Vec::with_capacity(HOTPLUG_VOLUME_COUNT);
        for _ in 0..HOTPLUG_VOLUME_COUNT {
            let claim = self
                .env
                .client
                .volume()
                .create(
                    &config.namespace,
                    "validator-hotplug-",
                    validation_labels(),
                    ClaimSpec {
                        access_modes: vec![AccessMode::ReadWriteMany],
                        storage_class: Some(config.storage_class.clone()),
                        resources: ClaimResources {
                            requests: StorageAmount::new(CLAIM_SIZE),
                        },
                        volume_mode: Some(VolumeMode::Block),
                    },
                )
                .await?;
            self.env.tracker.register(claim.clone());
            claim_names.push(claim.name);
        }

        for (index, claim_name) in claim_names.iter().enumerate() {
            let volume_name = format!("hotplug-{}", index + 1);
            self.env
                .client
                .vm()
                .add_volume(&config.namespace, &vm_name, &volume_name, claim_name)
                .await?;
        }

        // 实例与虚拟机同名，挂载进度反映在实例的卷状态列表上
        let instance = ResourceHandle::new(ResourceKind::VmInstance, &config.namespace, &vm_name);
        let instance_api = self.env.client.instance();
        wait_until_ready(
            ctx,
            &instance,
            || instance_api.get_by_name(&config.namespace, &vm_name),
            |i| Ok(attached(i, &claim_names)),
        )
        .await?;

        for index in 0..claim_names.len() {
            let volume_name = format!("hotplug-{}", index + 1);
            self.env
                .client
                .vm()
                .remove_volume(&config.namespace, &vm_name, &volume_name)
                .await?;
        }

        // 脱挂完成后卷声明才允许删除
        wait_until_ready(
            ctx,
            &instance,
            || instance_api.get_by_name(&config.namespace, &vm_name),
            |i| Ok(detached(i, &claim_names)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(entries: &[(&str, &str)]) -> VmInstance {
        let volume_status: Vec<_> = entries
            .iter()
            .map(|(claim, phase)| {
                serde_json::json!({ "name": *claim, "claimName": *claim, "phase": *phase })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": "vm-1" },
            "status": { "volumeStatus": volume_status }
        }))
        .unwrap()
    }

    #[test]
    fn test_all_volumes_attached() {
        let claims = vec!["pvc-a".to_string(), "pvc-b".to_string()];

        let ready = instance(&[("pvc-a", "Ready"), ("pvc-b", "MountedToPod")]);
        assert!(attached(&ready, &claims));

        // 块卷可能停留在节点挂载阶段，同样视为已挂载
        let node_attached = instance(&[("pvc-a", "AttachedToNode"), ("pvc-b", "Ready")]);
        assert!(attached(&node_attached, &claims));

        let partial = instance(&[("pvc-a", "Ready"), ("pvc-b", "Pending")]);
        assert!(!attached(&partial, &claims));

        let missing = instance(&[("pvc-a", "Ready")]);
        assert!(!attached(&missing, &claims));
    }

    #[test]
    fn test_all_volumes_detached() {
        let claims = vec!["pvc-a".to_string(), "pvc-b".to_string()];

        assert!(detached(&instance(&[]), &claims));
        assert!(detached(&instance(&[("pvc-other", "Ready")]), &claims));
        assert!(!detached(&instance(&[("pvc-b", "Detaching")]), &claims));
    }
}
