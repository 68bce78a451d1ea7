//! 配置加载、默认值补全与预检查

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use svt_cluster::{ClusterClient, Node, StoragePolicy};
use svt_common::Configuration;

/// 默认命名空间
pub const DEFAULT_NAMESPACE: &str = "default";

/// 验证用虚拟机的默认 CPU 核数
pub const DEFAULT_VM_CPU: u32 = 2;

/// 验证用虚拟机的默认内存
pub const DEFAULT_VM_MEMORY: &str = "4Gi";

/// 验证用虚拟机的默认系统盘大小
pub const DEFAULT_VM_DISK_SIZE: &str = "10Gi";

/// 默认运行超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// 默认跳过清理
pub const DEFAULT_SKIP_CLEANUP: bool = true;

/// 基线卷声明的初始容量
pub const CLAIM_SIZE: &str = "1Gi";

/// 离线扩容后的目标容量
pub const CLAIM_EXPANDED_SIZE: &str = "2Gi";

/// Longhorn 存储策略的供给器标识
pub const LONGHORN_PROVISIONER: &str = "driver.longhorn.io";

/// 标记默认存储策略的注解
const DEFAULT_POLICY_ANNOTATION: &str = "policy.storage.io/is-default-policy";

/// 热迁移检查要求的最少就绪节点数
const MIN_READY_NODES: usize = 2;

/// 从 YAML 文件加载配置
pub fn load(path: &Path) -> Result<Configuration> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置文件 {} 失败", path.display()))?;
    let config: Configuration =
        serde_yaml::from_str(&text).with_context(|| format!("解析配置文件 {} 失败", path.display()))?;
    Ok(config)
}

/// 补全不依赖集群状态的默认值
pub fn fill_static_defaults(config: &mut Configuration) {
    if config.namespace.is_empty() {
        config.namespace = DEFAULT_NAMESPACE.to_string();
    }
    if config.vm_config.cpu == 0 {
        config.vm_config.cpu = DEFAULT_VM_CPU;
    }
    if config.vm_config.memory.is_empty() {
        config.vm_config.memory = DEFAULT_VM_MEMORY.to_string();
    }
    if config.vm_config.disk_size.is_empty() {
        config.vm_config.disk_size = DEFAULT_VM_DISK_SIZE.to_string();
    }
    if config.timeout.is_none() {
        config.timeout = Some(DEFAULT_TIMEOUT_SECS);
    }
    if config.skip_cleanup.is_none() {
        config.skip_cleanup = Some(DEFAULT_SKIP_CLEANUP);
    }
}

/// 从集群状态补全存储相关默认值
///
/// 存储策略缺省时取集群标记的默认策略；快照类缺省时从存储配置
/// 文件中查找与策略关联的快照类。
pub async fn resolve_storage_defaults(
    config: &mut Configuration,
    client: &ClusterClient,
) -> Result<()> {
    if config.storage_class.is_empty() {
        let policies = client.cluster().list_storage_policies().await?;
        let default = policies
            .into_iter()
            .find(is_default_policy)
            .context("集群中没有标记默认的存储策略，请在配置中指定 storageClass")?;
        info!("使用默认存储策略: {}", default.metadata.name);
        config.storage_class = default.metadata.name;
    }

    if config.snapshot_class.is_empty() {
        let profiles = client.cluster().list_storage_profiles().await?;
        let matched = profiles
            .into_iter()
            .find(|p| p.status.storage_policy.as_deref() == Some(config.storage_class.as_str()))
            .and_then(|p| p.status.snapshot_class);
        match matched {
            Some(snapshot_class) => {
                info!("使用存储策略 {} 关联的快照类: {}", config.storage_class, snapshot_class);
                config.snapshot_class = snapshot_class;
            }
            None => bail!(
                "未找到存储策略 {} 关联的快照类，请在配置中指定 snapshotClass",
                config.storage_class
            ),
        }
    }

    Ok(())
}

fn is_default_policy(policy: &StoragePolicy) -> bool {
    policy
        .metadata
        .annotations
        .get(DEFAULT_POLICY_ANNOTATION)
        .map(String::as_str)
        == Some("true")
}

/// 校验配置中不依赖集群状态的必填项
pub fn validate(config: &Configuration) -> Result<()> {
    if config.image_url.is_empty() {
        bail!("配置缺少 imageURL，无法执行镜像与虚拟机检查");
    }
    Ok(())
}

/// 运行前的集群预检查，返回就绪节点数量
pub async fn preflight(config: &Configuration, client: &ClusterClient) -> Result<usize> {
    validate(config)?;
    let nodes = client.cluster().list_nodes().await?;
    ensure_enough_ready_nodes(&nodes)
}

fn ensure_enough_ready_nodes(nodes: &[Node]) -> Result<usize> {
    let ready = nodes.iter().filter(|n| n.is_ready()).count();
    debug!("集群就绪节点: {}/{}", ready, nodes.len());
    if ready < MIN_READY_NODES {
        bail!(
            "热迁移检查要求至少 {} 个就绪节点，当前只有 {} 个",
            MIN_READY_NODES,
            ready
        );
    }
    Ok(ready)
}

/// 判断存储策略是否由 Longhorn v1 引擎供给
///
/// 镜像后端与虚拟机根卷的创建路径都按此分流：v1 引擎走镜像后备文件
/// 直连卷声明，其余走数据卷导入。
pub async fn probe_longhorn_v1(config: &Configuration, client: &ClusterClient) -> Result<bool> {
    let policy = client
        .cluster()
        .get_storage_policy(&config.storage_class)
        .await
        .with_context(|| format!("查询存储策略 {} 失败", config.storage_class))?;
    Ok(is_longhorn_v1_policy(&policy))
}

fn is_longhorn_v1_policy(policy: &StoragePolicy) -> bool {
    policy.provisioner == LONGHORN_PROVISIONER
        && policy.parameters.get("dataEngine").map(String::as_str) != Some("v2")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config_from(yaml: &str) -> Configuration {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "cluster:\n  url: \"https://cluster.local:6443\"\nimageURL: \"https://images.local/noble.img\"\n"
        )
        .unwrap();

        let config = load(file.path()).unwrap();
        assert_eq!(config.cluster.url, "https://cluster.local:6443");
        assert_eq!(config.image_url, "https://images.local/noble.img");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/config.yaml"));
    }

    #[test]
    fn test_static_defaults() {
        let mut config = config_from(
            "cluster:\n  url: \"http://localhost\"\nimageURL: \"https://images.local/a.img\"\n",
        );
        fill_static_defaults(&mut config);

        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.vm_config.cpu, DEFAULT_VM_CPU);
        assert_eq!(config.vm_config.memory, DEFAULT_VM_MEMORY);
        assert_eq!(config.vm_config.disk_size, DEFAULT_VM_DISK_SIZE);
        assert_eq!(config.timeout, Some(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.skip_cleanup, Some(DEFAULT_SKIP_CLEANUP));
    }

    #[test]
    fn test_static_defaults_keep_explicit_values() {
        let mut config = config_from(
            "cluster:\n  url: \"http://localhost\"\nnamespace: \"validation\"\nvmConfig:\n  cpu: 8\nskipCleanup: false\ntimeout: 600\n",
        );
        fill_static_defaults(&mut config);

        assert_eq!(config.namespace, "validation");
        assert_eq!(config.vm_config.cpu, 8);
        assert_eq!(config.timeout, Some(600));
        assert_eq!(config.skip_cleanup, Some(false));
    }

    #[test]
    fn test_validate_requires_image_url() {
        let config = config_from("cluster:\n  url: \"http://localhost\"\n");
        assert!(validate(&config).is_err());
    }

    fn node(name: &str, ready: bool) -> Node {
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": name },
            "status": {
                "conditions": [
                    { "type": "Ready", "status": if ready { "True" } else { "False" } }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_ready_node_count() {
        let err = ensure_enough_ready_nodes(&[node("a", true), node("b", false)]).unwrap_err();
        assert!(format!("{:#}", err).contains("就绪节点"));

        let count =
            ensure_enough_ready_nodes(&[node("a", true), node("b", true), node("c", false)])
                .unwrap();
        assert_eq!(count, 2);
    }

    fn policy(provisioner: &str, parameters: HashMap<String, String>) -> StoragePolicy {
        StoragePolicy {
            metadata: Default::default(),
            provisioner: provisioner.to_string(),
            parameters,
        }
    }

    #[test]
    fn test_longhorn_engine_probe() {
        assert!(is_longhorn_v1_policy(&policy(LONGHORN_PROVISIONER, HashMap::new())));

        let v2 = HashMap::from([("dataEngine".to_string(), "v2".to_string())]);
        assert!(!is_longhorn_v1_policy(&policy(LONGHORN_PROVISIONER, v2)));

        assert!(!is_longhorn_v1_policy(&policy("rancher.io/local-path", HashMap::new())));
    }
}
