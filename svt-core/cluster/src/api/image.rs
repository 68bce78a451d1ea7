//! 镜像管理 API

use serde_json::json;
use tracing::info;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{DiskImage, DiskImageSpec, ResourceHandle, ResourceKind};

/// 磁盘镜像管理 API
pub struct ImageApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> ImageApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 创建磁盘镜像并触发下载导入
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: DiskImageSpec,
    ) -> Result<ResourceHandle> {
        info!("创建磁盘镜像: {}* (来源 {})", name_prefix, spec.url);
        self.client
            .create(
                ResourceKind::DiskImage,
                namespace,
                name_prefix,
                json!({ "spec": spec }),
            )
            .await
    }

    /// 查询磁盘镜像
    pub async fn get(&self, handle: &ResourceHandle) -> Result<DiskImage> {
        decode(self.client.get(handle).await?)
    }
}
