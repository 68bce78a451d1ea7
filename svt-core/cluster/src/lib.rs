//! 集群编排 API 客户端
//!
//! 提供与集群编排平台交互的托管资源客户端实现。
//!
//! # 功能
//!
//! - **存储卷管理** (`VolumeApi`): 卷声明的创建、查询、扩容
//! - **负载管理** (`PodApi`): 用于验证挂载的工作负载
//! - **快照管理** (`SnapshotApi`): 卷快照操作
//! - **镜像管理** (`ImageApi`): 磁盘镜像导入
//! - **虚拟机管理** (`VmApi`): 虚拟机创建、热插拔、实例查询、迁移
//! - **集群信息** (`ClusterApi`): 节点、设置、存储策略与配置文件查询
//!
//! 所有写操作统一通过 [`ResourceClient`] 契约暴露，资源类型到
//! REST 路径的映射由进程启动时构建的 [`KindRegistry`] 提供。

pub mod api;
pub mod client;
pub mod error;
pub mod registry;
pub mod resources;

pub use client::{ClusterClient, ClusterConfig, ResourceClient};
pub use error::{ClusterError, Result};
pub use registry::{KindBinding, KindRegistry};
pub use resources::*;

// 导出 API 模块
pub use api::{
    cluster::ClusterApi,
    image::ImageApi,
    pod::PodApi,
    snapshot::SnapshotApi,
    vm::{InstanceApi, MigrationApi, VmApi},
    volume::{DataVolumeApi, VolumeApi},
};
