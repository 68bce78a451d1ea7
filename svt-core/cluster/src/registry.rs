//! 资源类型注册表

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ClusterError, Result};
use crate::resources::ResourceKind;

/// 资源类型到 REST 路径的绑定
#[derive(Debug, Clone)]
pub struct KindBinding {
    /// 集合路径，如 `/v1/volumeclaims`
    pub path: &'static str,

    /// 是否为命名空间级资源
    pub namespaced: bool,
}

/// 资源类型注册表
///
/// 进程启动时构建一次，之后以只读方式传入客户端。客户端根据注册
/// 表把资源句柄映射为具体的 API 路径，未注册的类型直接报错。
#[derive(Debug, Default)]
pub struct KindRegistry {
    bindings: HashMap<ResourceKind, KindBinding>,
}

impl KindRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含全部内置资源类型的注册表
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            ResourceKind::VolumeClaim,
            KindBinding { path: "/v1/volumeclaims", namespaced: true },
        );
        registry.register(
            ResourceKind::Pod,
            KindBinding { path: "/v1/pods", namespaced: true },
        );
        registry.register(
            ResourceKind::VolumeSnapshot,
            KindBinding { path: "/v1/volumesnapshots", namespaced: true },
        );
        registry.register(
            ResourceKind::DiskImage,
            KindBinding { path: "/v1/diskimages", namespaced: true },
        );
        registry.register(
            ResourceKind::DataVolume,
            KindBinding { path: "/v1/datavolumes", namespaced: true },
        );
        registry.register(
            ResourceKind::VirtualMachine,
            KindBinding { path: "/v1/virtualmachines", namespaced: true },
        );
        registry.register(
            ResourceKind::VmInstance,
            KindBinding { path: "/v1/virtualmachineinstances", namespaced: true },
        );
        registry.register(
            ResourceKind::Migration,
            KindBinding { path: "/v1/migrations", namespaced: true },
        );
        registry.register(
            ResourceKind::Node,
            KindBinding { path: "/v1/nodes", namespaced: false },
        );
        registry.register(
            ResourceKind::StoragePolicy,
            KindBinding { path: "/v1/storagepolicies", namespaced: false },
        );
        registry.register(
            ResourceKind::StorageProfile,
            KindBinding { path: "/v1/storageprofiles", namespaced: false },
        );
        registry.register(
            ResourceKind::Setting,
            KindBinding { path: "/v1/settings", namespaced: false },
        );
        registry
    }

    /// 注册资源类型
    pub fn register(&mut self, kind: ResourceKind, binding: KindBinding) {
        debug!("注册资源类型: {} -> {}", kind, binding.path);
        self.bindings.insert(kind, binding);
    }

    /// 查询资源类型绑定
    pub fn binding(&self, kind: ResourceKind) -> Result<&KindBinding> {
        self.bindings
            .get(&kind)
            .ok_or_else(|| ClusterError::KindNotRegistered(kind.to_string()))
    }

    /// 已注册的资源类型数量
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_kinds() {
        let registry = KindRegistry::with_defaults();
        for kind in [
            ResourceKind::VolumeClaim,
            ResourceKind::Pod,
            ResourceKind::VolumeSnapshot,
            ResourceKind::DiskImage,
            ResourceKind::DataVolume,
            ResourceKind::VirtualMachine,
            ResourceKind::VmInstance,
            ResourceKind::Migration,
            ResourceKind::Node,
            ResourceKind::StoragePolicy,
            ResourceKind::StorageProfile,
            ResourceKind::Setting,
        ] {
            assert!(registry.binding(kind).is_ok(), "{} 未注册", kind);
        }
    }

    #[test]
    fn test_unregistered_kind() {
        let registry = KindRegistry::new();
        let err = registry.binding(ResourceKind::Pod).unwrap_err();
        assert!(matches!(err, ClusterError::KindNotRegistered(_)));
    }

    #[test]
    fn test_cluster_scoped_bindings() {
        let registry = KindRegistry::with_defaults();
        assert!(!registry.binding(ResourceKind::Node).unwrap().namespaced);
        assert!(registry.binding(ResourceKind::VolumeClaim).unwrap().namespaced);
    }
}
