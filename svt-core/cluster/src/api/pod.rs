//! 工作负载管理 API
//!
//! 验证过程中用于确认卷可被实际挂载的临时负载。

use serde_json::json;
use tracing::info;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{PodSpec, ResourceHandle, ResourceKind, WorkloadPod};

/// 工作负载管理 API
pub struct PodApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> PodApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 创建负载
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: PodSpec,
    ) -> Result<ResourceHandle> {
        info!("创建验证负载: {}*", name_prefix);
        self.client
            .create(ResourceKind::Pod, namespace, name_prefix, json!({ "spec": spec }))
            .await
    }

    /// 查询负载
    pub async fn get(&self, handle: &ResourceHandle) -> Result<WorkloadPod> {
        decode(self.client.get(handle).await?)
    }

    /// 删除负载
    ///
    /// 仅用于离线扩容检查在扩容前主动移除临时负载，常规回收
    /// 由清理协调器统一完成。
    pub async fn delete(&self, handle: &ResourceHandle) -> Result<()> {
        info!("删除验证负载: {}", handle);
        self.client.delete(handle).await
    }
}
