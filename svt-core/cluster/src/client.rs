//! 集群客户端核心实现

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use svt_common::ClusterEndpoint;

use crate::api::{
    cluster::ClusterApi,
    image::ImageApi,
    pod::PodApi,
    snapshot::SnapshotApi,
    vm::{InstanceApi, MigrationApi, VmApi},
    volume::{DataVolumeApi, VolumeApi},
};
use crate::error::{ClusterError, Result};
use crate::registry::KindRegistry;
use crate::resources::{ResourceHandle, ResourceKind};

/// 托管资源客户端契约
///
/// 验证引擎消费的最小能力集：创建、查询、删除与修改托管资源。
/// 删除与查询通过 [`ClusterError::NotFound`] 区分"资源不存在"。
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// 创建资源并返回句柄，资源名称由客户端按前缀生成以避免跨运行冲突
    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name_prefix: &str,
        manifest: Value,
    ) -> Result<ResourceHandle>;

    /// 查询资源当前状态
    async fn get(&self, handle: &ResourceHandle) -> Result<Value>;

    /// 删除资源
    async fn delete(&self, handle: &ResourceHandle) -> Result<()>;

    /// 合并修改资源
    async fn patch(&self, handle: &ResourceHandle, mutation: Value) -> Result<()>;
}

/// 集群客户端配置
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            request_timeout: 30,
            verify_ssl: true,
        }
    }
}

/// 集群编排 API 客户端
#[derive(Debug)]
pub struct ClusterClient {
    /// API 基础 URL
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    /// 认证令牌
    token: Option<String>,

    /// 资源类型注册表
    registry: Arc<KindRegistry>,
}

impl ClusterClient {
    /// 创建新的集群客户端
    pub fn new(
        endpoint: &ClusterEndpoint,
        config: ClusterConfig,
        registry: Arc<KindRegistry>,
    ) -> Result<Self> {
        if endpoint.url.is_empty() {
            return Err(ClusterError::Config("未配置集群 API 地址".to_string()));
        }
        let base = Url::parse(&endpoint.url)
            .map_err(|e| ClusterError::Config(format!("集群 API 地址无效: {}", e)))?;

        let verify_ssl = endpoint.verify_ssl.unwrap_or(config.verify_ssl);
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| ClusterError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base.as_str().trim_end_matches('/').to_string(),
            http_client,
            token: endpoint.token.clone(),
            registry,
        })
    }

    /// 按前缀生成资源名称，避免多次运行之间的命名冲突
    pub fn generate_name(prefix: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}{}", prefix, &id[..8])
    }

    /// 资源集合路径
    pub(crate) fn collection_url(&self, kind: ResourceKind, namespace: &str) -> Result<String> {
        let binding = self.registry.binding(kind)?;
        if binding.namespaced {
            Ok(format!("{}{}/{}", self.base_url, binding.path, namespace))
        } else {
            Ok(format!("{}{}", self.base_url, binding.path))
        }
    }

    /// 单个资源路径
    pub(crate) fn resource_url(&self, handle: &ResourceHandle) -> Result<String> {
        let binding = self.registry.binding(handle.kind)?;
        if binding.namespaced {
            Ok(format!(
                "{}{}/{}/{}",
                self.base_url, binding.path, handle.namespace, handle.name
            ))
        } else {
            Ok(format!("{}{}/{}", self.base_url, binding.path, handle.name))
        }
    }

    /// 发送请求并反序列化响应
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let response = self.send(method, url, body).await?;
        response
            .json()
            .await
            .map_err(|e| ClusterError::Parse(e.to_string()))
    }

    /// 发送请求并忽略响应体
    pub(crate) async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<()> {
        self.send(method, url, body).await.map(|_| ())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response> {
        debug!("集群 API 请求: {} {}", method, url);

        let mut request = self.http_client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClusterError::Http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClusterError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClusterError::Api(status.as_u16(), text));
        }
        Ok(response)
    }

    /// 列举资源集合
    pub async fn list(&self, kind: ResourceKind, namespace: Option<&str>) -> Result<Vec<Value>> {
        let url = self.collection_url(kind, namespace.unwrap_or(""))?;
        self.request(Method::GET, &url, None).await
    }

    /// 获取存储卷管理 API
    pub fn volume(&self) -> VolumeApi<'_> {
        VolumeApi::new(self)
    }

    /// 获取数据卷管理 API
    pub fn data_volume(&self) -> DataVolumeApi<'_> {
        DataVolumeApi::new(self)
    }

    /// 获取工作负载管理 API
    pub fn pod(&self) -> PodApi<'_> {
        PodApi::new(self)
    }

    /// 获取快照管理 API
    pub fn snapshot(&self) -> SnapshotApi<'_> {
        SnapshotApi::new(self)
    }

    /// 获取镜像管理 API
    pub fn image(&self) -> ImageApi<'_> {
        ImageApi::new(self)
    }

    /// 获取虚拟机管理 API
    pub fn vm(&self) -> VmApi<'_> {
        VmApi::new(self)
    }

    /// 获取虚拟机实例管理 API
    pub fn instance(&self) -> InstanceApi<'_> {
        InstanceApi::new(self)
    }

    /// 获取热迁移管理 API
    pub fn migration(&self) -> MigrationApi<'_> {
        MigrationApi::new(self)
    }

    /// 获取集群信息 API
    pub fn cluster(&self) -> ClusterApi<'_> {
        ClusterApi::new(self)
    }
}

#[async_trait]
impl ResourceClient for ClusterClient {
    async fn create(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name_prefix: &str,
        manifest: Value,
    ) -> Result<ResourceHandle> {
        let name = Self::generate_name(name_prefix);
        let namespaced = self.registry.binding(kind)?.namespaced;
        let handle = ResourceHandle::new(kind, if namespaced { namespace } else { "" }, &name);

        let mut manifest = manifest;
        let root = manifest
            .as_object_mut()
            .ok_or_else(|| ClusterError::Parse("资源清单必须是 JSON 对象".to_string()))?;
        let metadata = root
            .entry("metadata")
            .or_insert_with(|| Value::Object(Default::default()));
        if let Some(meta) = metadata.as_object_mut() {
            meta.insert("name".to_string(), Value::String(name));
            if namespaced {
                meta.insert(
                    "namespace".to_string(),
                    Value::String(namespace.to_string()),
                );
            }
        }

        let url = self.collection_url(kind, namespace)?;
        self.execute(Method::POST, &url, Some(manifest)).await?;
        Ok(handle)
    }

    async fn get(&self, handle: &ResourceHandle) -> Result<Value> {
        let url = self.resource_url(handle)?;
        self.request(Method::GET, &url, None).await
    }

    async fn delete(&self, handle: &ResourceHandle) -> Result<()> {
        let url = self.resource_url(handle)?;
        self.execute(Method::DELETE, &url, None).await
    }

    async fn patch(&self, handle: &ResourceHandle, mutation: Value) -> Result<()> {
        let url = self.resource_url(handle)?;
        self.execute(Method::PATCH, &url, Some(mutation)).await
    }
}

/// 把原始响应解码为具体资源类型
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ClusterError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name() {
        let name = ClusterClient::generate_name("pvc-storage-validation-");
        assert!(name.starts_with("pvc-storage-validation-"));
        assert_eq!(name.len(), "pvc-storage-validation-".len() + 8);

        // 两次生成不应重名
        assert_ne!(name, ClusterClient::generate_name("pvc-storage-validation-"));
    }

    #[test]
    fn test_url_construction() {
        let endpoint = ClusterEndpoint {
            url: "https://cluster.local:6443/".to_string(),
            token: None,
            verify_ssl: None,
        };
        let client = ClusterClient::new(
            &endpoint,
            ClusterConfig::default(),
            Arc::new(KindRegistry::with_defaults()),
        )
        .unwrap();

        let claim = ResourceHandle::new(ResourceKind::VolumeClaim, "default", "pvc-1");
        assert_eq!(
            client.resource_url(&claim).unwrap(),
            "https://cluster.local:6443/v1/volumeclaims/default/pvc-1"
        );

        let node = ResourceHandle::new(ResourceKind::Node, "", "node-1");
        assert_eq!(
            client.resource_url(&node).unwrap(),
            "https://cluster.local:6443/v1/nodes/node-1"
        );

        assert_eq!(
            client
                .collection_url(ResourceKind::Pod, "default")
                .unwrap(),
            "https://cluster.local:6443/v1/pods/default"
        );
    }

    #[test]
    fn test_invalid_endpoint_url() {
        let endpoint = ClusterEndpoint {
            url: "not a url".to_string(),
            token: None,
            verify_ssl: None,
        };
        let err = ClusterClient::new(
            &endpoint,
            ClusterConfig::default(),
            Arc::new(KindRegistry::with_defaults()),
        )
        .unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }

    #[test]
    fn test_missing_endpoint_url() {
        let endpoint = ClusterEndpoint::default();
        let err = ClusterClient::new(
            &endpoint,
            ClusterConfig::default(),
            Arc::new(KindRegistry::with_defaults()),
        )
        .unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }
}
