//! 虚拟机管理 API
//!
//! 提供虚拟机、虚拟机实例与热迁移操作，包括：
//! - 创建虚拟机并查询运行状态
//! - 卷热插拔（挂载状态通过实例对象观察）
//! - 触发跨节点热迁移

use reqwest::Method;
use serde_json::json;
use tracing::info;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{
    DiskBus, Migration, MigrationSpec, ResourceHandle, ResourceKind, VirtualMachine,
    VirtualMachineSpec, VmInstance,
};

/// 虚拟机管理 API
pub struct VmApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> VmApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 创建虚拟机
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: VirtualMachineSpec,
    ) -> Result<ResourceHandle> {
        info!("创建虚拟机: {}*", name_prefix);
        self.client
            .create(
                ResourceKind::VirtualMachine,
                namespace,
                name_prefix,
                json!({ "spec": spec }),
            )
            .await
    }

    /// 查询虚拟机
    pub async fn get(&self, handle: &ResourceHandle) -> Result<VirtualMachine> {
        decode(self.client.get(handle).await?)
    }

    /// 按名称查询虚拟机
    pub async fn get_by_name(&self, namespace: &str, name: &str) -> Result<VirtualMachine> {
        let handle = ResourceHandle::new(ResourceKind::VirtualMachine, namespace, name);
        self.get(&handle).await
    }

    /// 热插一个卷到运行中的虚拟机
    pub async fn add_volume(
        &self,
        namespace: &str,
        vm_name: &str,
        volume_name: &str,
        claim_name: &str,
    ) -> Result<()> {
        info!("热插卷 {} (声明 {}) 到虚拟机 {}/{}", volume_name, claim_name, namespace, vm_name);
        let handle = ResourceHandle::new(ResourceKind::VirtualMachine, namespace, vm_name);
        let url = format!("{}/addvolume", self.client.resource_url(&handle)?);
        self.client
            .execute(
                Method::POST,
                &url,
                Some(json!({
                    "name": volume_name,
                    "bus": DiskBus::Scsi,
                    "claimName": claim_name,
                })),
            )
            .await
    }

    /// 从虚拟机上拔出热插的卷
    pub async fn remove_volume(
        &self,
        namespace: &str,
        vm_name: &str,
        volume_name: &str,
    ) -> Result<()> {
        info!("热拔卷 {} (虚拟机 {}/{})", volume_name, namespace, vm_name);
        let handle = ResourceHandle::new(ResourceKind::VirtualMachine, namespace, vm_name);
        let url = format!("{}/removevolume", self.client.resource_url(&handle)?);
        self.client
            .execute(Method::POST, &url, Some(json!({ "name": volume_name })))
            .await
    }
}

/// 虚拟机实例管理 API
pub struct InstanceApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> InstanceApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 按名称查询虚拟机实例，实例与虚拟机同名
    pub async fn get_by_name(&self, namespace: &str, name: &str) -> Result<VmInstance> {
        let handle = ResourceHandle::new(ResourceKind::VmInstance, namespace, name);
        decode(self.client.get(&handle).await?)
    }
}

/// 热迁移管理 API
pub struct MigrationApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> MigrationApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 对指定虚拟机发起热迁移
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: MigrationSpec,
    ) -> Result<ResourceHandle> {
        info!("发起虚拟机热迁移: {}* (虚拟机 {})", name_prefix, spec.vm_name);
        self.client
            .create(
                ResourceKind::Migration,
                namespace,
                name_prefix,
                json!({ "spec": spec }),
            )
            .await
    }

    /// 查询热迁移
    pub async fn get(&self, handle: &ResourceHandle) -> Result<Migration> {
        decode(self.client.get(handle).await?)
    }
}
