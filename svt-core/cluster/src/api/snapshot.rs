//! 快照管理 API

use serde_json::json;
use tracing::info;

use crate::client::{decode, ClusterClient, ResourceClient};
use crate::error::Result;
use crate::resources::{ResourceHandle, ResourceKind, SnapshotSpec, VolumeSnapshot};

/// 卷快照管理 API
pub struct SnapshotApi<'a> {
    client: &'a ClusterClient,
}

impl<'a> SnapshotApi<'a> {
    pub(crate) fn new(client: &'a ClusterClient) -> Self {
        Self { client }
    }

    /// 创建卷快照
    pub async fn create(
        &self,
        namespace: &str,
        name_prefix: &str,
        spec: SnapshotSpec,
    ) -> Result<ResourceHandle> {
        info!("创建卷快照: {}* (来源 {})", name_prefix, spec.source_claim_name);
        self.client
            .create(
                ResourceKind::VolumeSnapshot,
                namespace,
                name_prefix,
                json!({ "spec": spec }),
            )
            .await
    }

    /// 查询卷快照
    pub async fn get(&self, handle: &ResourceHandle) -> Result<VolumeSnapshot> {
        decode(self.client.get(handle).await?)
    }
}
