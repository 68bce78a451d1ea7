//! 虚拟机启动检查

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use svt_cluster::{
    has_condition, AccessMode, ClaimResources, ClaimSpec, CpuTopology, DataVolumeSource,
    DataVolumeSpec, DataVolumeStorage, DiskAttachment, DiskBus, ImageRef, RunStrategy,
    StorageAmount, VirtualMachineSpec, VmNetwork, VmPrintableStatus, VmVolume, VolumeMode,
    DATA_VOLUME_READY_CONDITION,
};
use svt_engine::{wait_until_ready, Check, RunContext};

use super::{validation_labels, CheckEnv};

/// 用导入的镜像创建虚拟机并等待其运行
///
/// 根卷的创建路径按存储引擎分流：Longhorn v1 引擎在镜像导入后生成
/// 同名存储策略，直接按该策略创建卷声明；其余引擎先从镜像派生
/// 数据卷，就绪后生成同名卷声明。
pub struct VirtualMachineCheck {
    env: Arc<CheckEnv>,
}

impl VirtualMachineCheck {
    pub fn new(env: Arc<CheckEnv>) -> Self {
        Self { env }
    }

    async fn create_root_claim(&self, ctx: &RunContext, image_name: &str) -> Result<String> {
        let config = &self.env.config;

        if self.env.longhorn_v1 {
            let claim = self
                .env
                .client
                .volume()
                .create(
                    &config.namespace,
                    "validator-vm-root-",
                    validation_labels(),
                    ClaimSpec {
                        access_modes: vec![AccessMode::ReadWriteMany],
                        storage_class: Some(format!("longhorn-{}", image_name)),
                        resources: ClaimResources {
                            requests: StorageAmount::new(&config.vm_config.disk_size),
                        },
                        volume_mode: Some(VolumeMode::Block),
                    },
                )
                .await?;
            self.env.tracker.register(claim.clone());
            return Ok(claim.name);
        }

        let data_volume = self
            .env
            .client
            .data_volume()
            .create(
                &config.namespace,
                "validator-vm-root-",
                DataVolumeSpec {
                    source: DataVolumeSource {
                        image: ImageRef {
                            name: image_name.to_string(),
                            namespace: config.namespace.clone(),
                        },
                    },
                    storage: DataVolumeStorage {
                        storage_policy: config.storage_class.clone(),
                    },
                },
            )
            .await?;
        self.env.tracker.register(data_volume.clone());

        let dv_api = self.env.client.data_volume();
        wait_until_ready(ctx, &data_volume, || dv_api.get(&data_volume), |dv| {
            Ok(has_condition(&dv.status.conditions, DATA_VOLUME_READY_CONDITION))
        })
        .await?;

        // 数据卷就绪后生成同名卷声明
        Ok(data_volume.name)
    }
}

#[async_trait]
impl Check for VirtualMachineCheck {
    fn name(&self) -> &str {
        "ensure vm can boot from recently created vmimage"
    }

    async fn execute(&self, ctx: &RunContext) -> Result<()> {
        let config = &self.env.config;
        let image_name = self.env.image()?;
        let root_claim = self.create_root_claim(ctx, &image_name).await?;

        let vm = self
            .env
            .client
            .vm()
            .create(
                &config.namespace,
                "validator-vm-",
                VirtualMachineSpec {
                    run_strategy: RunStrategy::RerunOnFailure,
                    cpu: CpuTopology {
                        sockets: 1,
                        cores: config.vm_config.cpu,
                        threads: 1,
                    },
                    memory: config.vm_config.memory.clone(),
                    disks: vec![DiskAttachment {
                        name: "rootdisk".to_string(),
                        bus: DiskBus::Virtio,
                        boot_order: Some(1),
                    }],
                    volumes: vec![VmVolume {
                        name: "rootdisk".to_string(),
                        claim_name: root_claim,
                    }],
                    networks: vec![VmNetwork {
                        name: "default".to_string(),
                        model: "virtio".to_string(),
                    }],
                },
            )
            .await?;
        self.env.tracker.register(vm.clone());

        let vm_api = self.env.client.vm();
        wait_until_ready(ctx, &vm, || vm_api.get(&vm), |v| {
            match v.status.printable_status {
                VmPrintableStatus::Running => Ok(true),
                VmPrintableStatus::ErrorUnschedulable => {
                    bail!("虚拟机 {} 无法调度", v.metadata.name)
                }
                _ => Ok(false),
            }
        })
        .await?;

        self.env.set_vm(&vm.name);
        Ok(())
    }
}
