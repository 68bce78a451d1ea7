//! 存储卷管理 API
//!
//! 提供卷声明与数据卷的创建、查询和扩容操作。

use std::collections::HashMap;

use serde_json::json;
use tracing::info;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{
    ClaimSpec, DataVolume, DataVolumeSpec, ResourceHandle, ResourceKind, VolumeClaim,
};

/// 卷声明管理 API
pub struct VolumeApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> VolumeApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 创建卷声明
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        labels: HashMap<String, String>,
        spec: ClaimSpec,
    ) -> Result<ResourceHandle> {
        info!("创建卷声明: {}*", name_prefix);
        self.client
            .create(
                ResourceKind::VolumeClaim,
                namespace,
                name_prefix,
                json!({
                    "metadata": { "labels": labels },
                    "spec": spec,
                }),
            )
            .await
    }

    /// 查询卷声明
    pub async fn get(&self, handle: &ResourceHandle) -> Result<VolumeClaim> {
        decode(self.client.get(handle).await?)
    }

    /// 按名称查询卷声明
    pub async fn get_by_name(&self, namespace: &str, name: &str) -> Result<VolumeClaim> {
        let handle = ResourceHandle::new(ResourceKind::VolumeClaim, namespace, name);
        self.get(&handle).await
    }

    /// 修改卷声明的容量请求
    pub async fn resize(&self, handle: &ResourceHandle, new_size: &str) -> Result<()> {
        info!("调整卷声明容量: {} -> {}", handle, new_size);
        self.client
            .patch(
                handle,
                json!({
                    "spec": { "resources": { "requests": { "storage": new_size } } }
                }),
            )
            .await
    }
}

/// 数据卷管理 API
pub struct DataVolumeApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> DataVolumeApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 从镜像创建数据卷
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: DataVolumeSpec,
    ) -> Result<ResourceHandle> {
        info!("创建数据卷: {}*", name_prefix);
        self.client
            .create(
                ResourceKind::DataVolume,
                namespace,
                name_prefix,
                json!({ "spec": spec }),
            )
            .await
    }

    /// 查询数据卷
    pub async fn get(&self, handle: &ResourceHandle) -> Result<DataVolume> {
        decode(self.client.get(handle).await?)
    }
}
