//! 验证运行输入配置

use serde::{Deserialize, Serialize};

/// 存储验证配置
///
/// 从 YAML 配置文件反序列化，未填写的字段在运行前由默认值补全。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// 集群编排 API 接入配置
    pub cluster: ClusterEndpoint,

    /// 执行检查所在的命名空间
    #[serde(default)]
    pub namespace: String,

    /// 用于创建磁盘镜像的下载地址，必填
    #[serde(rename = "imageURL", default)]
    pub image_url: String,

    /// 存储检查使用的存储策略名称
    #[serde(default)]
    pub storage_class: String,

    /// 与存储策略关联的快照类，缺省时从存储配置文件中查找
    #[serde(default)]
    pub snapshot_class: String,

    /// 覆盖验证用虚拟机的默认规格
    #[serde(default)]
    pub vm_config: VmConfig,

    /// 是否跳过验证所创建资源的清理
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cleanup: Option<bool>,

    /// 触发清理前的等待时长（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// 集群编排 API 接入配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEndpoint {
    /// API 基础 URL
    pub url: String,

    /// 认证令牌
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// 是否验证 SSL 证书
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
}

/// 验证用虚拟机规格
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmConfig {
    /// CPU 核数
    #[serde(default)]
    pub cpu: u32,

    /// 内存大小，如 "4Gi"
    #[serde(rename = "ram", default)]
    pub memory: String,

    /// 系统盘大小，如 "10Gi"
    #[serde(default)]
    pub disk_size: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_from_yaml() {
        let yaml = r#"
cluster:
  url: "https://cluster.local:6443"
  token: "abc"
imageURL: "https://images.local/noble.img"
storageClass: "longhorn"
vmConfig:
  cpu: 4
  ram: "8Gi"
skipCleanup: false
timeout: 600
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cluster.url, "https://cluster.local:6443");
        assert_eq!(config.image_url, "https://images.local/noble.img");
        assert_eq!(config.storage_class, "longhorn");
        assert_eq!(config.vm_config.cpu, 4);
        assert_eq!(config.vm_config.memory, "8Gi");
        assert_eq!(config.skip_cleanup, Some(false));
        assert_eq!(config.timeout, Some(600));
        // 未填写的字段保持空值，等待默认值补全
        assert!(config.namespace.is_empty());
        assert!(config.snapshot_class.is_empty());
    }

    #[test]
    fn test_minimal_configuration() {
        let yaml = r#"
cluster:
  url: "http://localhost:8080"
imageURL: "https://images.local/noble.img"
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert!(config.skip_cleanup.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.vm_config.cpu, 0);
    }
}
