//! 存储检查项
//!
//! 七项检查按固定顺序执行，后面的检查消费前面检查登记的运行状态：
//! 快照与扩容依赖基线卷声明，虚拟机依赖导入的镜像，迁移与热插拔
//! 依赖运行中的虚拟机。

mod hotplug;
mod image;
mod migration;
mod resize;
mod snapshot;
mod virtualmachine;
mod volume;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use svt_cluster::{ClusterClient, Container, PodSpec, PodVolume};
use svt_common::Configuration;
use svt_engine::{Check, ResourceTracker};

pub use hotplug::HotplugCheck;
pub use image::ImageCheck;
pub use migration::MigrationCheck;
pub use resize::ResizeCheck;
pub use snapshot::SnapshotCheck;
pub use virtualmachine::VirtualMachineCheck;
pub use volume::VolumeCheck;

/// 验证负载使用的容器镜像
pub(crate) const WORKLOAD_IMAGE: &str = "registry.suse.com/bci/bci-busybox:latest";

/// 检查项共享的运行环境
pub struct CheckEnv {
    pub client: Arc<ClusterClient>,
    pub tracker: Arc<ResourceTracker>,
    pub config: Configuration,

    /// 存储策略是否由 Longhorn v1 引擎供给
    pub longhorn_v1: bool,

    state: RunState,
}

/// 跨检查传递的运行状态
#[derive(Default)]
struct RunState {
    claim_name: Mutex<Option<String>>,
    image_name: Mutex<Option<String>>,
    vm_name: Mutex<Option<String>>,
}

impl CheckEnv {
    pub fn new(
        client: Arc<ClusterClient>,
        tracker: Arc<ResourceTracker>,
        config: Configuration,
        longhorn_v1: bool,
    ) -> Self {
        Self {
            client,
            tracker,
            config,
            longhorn_v1,
            state: RunState::default(),
        }
    }

    pub(crate) fn set_baseline_claim(&self, name: &str) {
        *lock(&self.state.claim_name) = Some(name.to_string());
    }

    pub(crate) fn baseline_claim(&self) -> Result<String> {
        lock(&self.state.claim_name)
            .clone()
            .context("基线卷声明尚未创建")
    }

    pub(crate) fn set_image(&self, name: &str) {
        *lock(&self.state.image_name) = Some(name.to_string());
    }

    pub(crate) fn image(&self) -> Result<String> {
        lock(&self.state.image_name).clone().context("磁盘镜像尚未导入")
    }

    pub(crate) fn set_vm(&self, name: &str) {
        *lock(&self.state.vm_name) = Some(name.to_string());
    }

    pub(crate) fn vm(&self) -> Result<String> {
        lock(&self.state.vm_name).clone().context("验证用虚拟机尚未创建")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// 验证资源的统一标签
pub(crate) fn validation_labels() -> HashMap<String, String> {
    HashMap::from([("app".to_string(), "storage-validator".to_string())])
}

/// 挂载指定卷声明的验证负载
pub(crate) fn workload_spec(claim_name: &str) -> PodSpec {
    PodSpec {
        containers: vec![Container {
            name: "workload".to_string(),
            image: WORKLOAD_IMAGE.to_string(),
        }],
        volumes: vec![PodVolume {
            name: "data".to_string(),
            claim_name: claim_name.to_string(),
        }],
    }
}

/// 按执行顺序构建全部检查项
pub fn all(env: Arc<CheckEnv>) -> Vec<Box<dyn Check>> {
    vec![
        Box::new(VolumeCheck::new(Arc::clone(&env))),
        Box::new(SnapshotCheck::new(Arc::clone(&env))),
        Box::new(ResizeCheck::new(Arc::clone(&env))),
        Box::new(ImageCheck::new(Arc::clone(&env))),
        Box::new(VirtualMachineCheck::new(Arc::clone(&env))),
        Box::new(MigrationCheck::new(Arc::clone(&env))),
        Box::new(HotplugCheck::new(env)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use svt_cluster::{ClusterConfig, KindRegistry};
    use svt_common::ClusterEndpoint;

    #[test]
    fn test_workload_spec_mounts_claim() {
        let spec = workload_spec("pvc-1");
        assert_eq!(spec.containers.len(), 1);
        assert_eq!(spec.volumes.len(), 1);
        assert_eq!(spec.volumes[0].claim_name, "pvc-1");
    }

    #[test]
    fn test_check_order_and_names() {
        let endpoint = ClusterEndpoint {
            url: "http://localhost:8080".to_string(),
            token: None,
            verify_ssl: None,
        };
        let client = Arc::new(
            ClusterClient::new(
                &endpoint,
                ClusterConfig::default(),
                Arc::new(KindRegistry::with_defaults()),
            )
            .unwrap(),
        );
        let env = Arc::new(CheckEnv::new(
            client,
            Arc::new(ResourceTracker::new()),
            Configuration::default(),
            true,
        ));

        // 检查名称进入报告，顺序与名称都是对外契约
        let checks = all(env);
        let names: Vec<&str> = checks.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "ensure volume is created and used successfully",
                "ensure volume snapshot can be created successfully",
                "ensure offline volume expansion is successful",
                "ensure vm image creation is successful",
                "ensure vm can boot from recently created vmimage",
                "trigger VM migration",
                "hotplug 2 volumes to existing VM",
            ]
        );
    }
}
