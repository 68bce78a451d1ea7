//! 集群信息 API
//!
//! 预检查与默认值推导所需的只读查询：节点、平台设置、存储策略
//! 与存储配置文件。

use tracing::debug;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{Node, ResourceHandle, ResourceKind, Setting, StoragePolicy, StorageProfile};

/// 集群信息 API
pub struct ClusterApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> ClusterApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 列举集群节点
    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        debug!("列举集群节点");
        self.client
            .list(ResourceKind::Node, None)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// 查询平台设置项
    pub async fn get_setting(&self, name: &str) -> Result<Setting> {
        debug!("查询平台设置: {}", name);
        let handle = ResourceHandle::new(ResourceKind::Setting, "", name);
        decode(self.client.get(&handle).await?)
    }

    /// 按名称查询存储策略
    pub async fn get_storage_policy(&self, name: &str) -> Result<StoragePolicy> {
        debug!("查询存储策略: {}", name);
        let handle = ResourceHandle::new(ResourceKind::StoragePolicy, "", name);
        decode(self.client.get(&handle).await?)
    }

    /// 列举存储策略
    pub async fn list_storage_policies(&self) -> Result<Vec<StoragePolicy>> {
        debug!("列举存储策略");
        self.client
            .list(ResourceKind::StoragePolicy, None)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// 列举存储配置文件
    pub async fn list_storage_profiles(&self) -> Result<Vec<StorageProfile>> {
        debug!("列举存储配置文件");
        self.client
            .list(ResourceKind::StorageProfile, None)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}
