//! 托管资源模型
//!
//! 集群编排 API 暴露的资源对象定义。每个检查项的就绪判定都针对
//! 这里的具体类型编写，不经过多态对象断言。

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 条件状态为真的取值
pub const CONDITION_TRUE: &str = "True";

/// 镜像导入完成条件
pub const IMAGE_IMPORTED_CONDITION: &str = "Imported";

/// 数据卷就绪条件
pub const DATA_VOLUME_READY_CONDITION: &str = "Ready";

/// 节点就绪条件
pub const NODE_READY_CONDITION: &str = "Ready";

/// 托管资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    VolumeClaim,
    Pod,
    VolumeSnapshot,
    DiskImage,
    DataVolume,
    VirtualMachine,
    VmInstance,
    Migration,
    Node,
    StoragePolicy,
    StorageProfile,
    Setting,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::VolumeClaim => "volumeclaim",
            ResourceKind::Pod => "pod",
            ResourceKind::VolumeSnapshot => "volumesnapshot",
            ResourceKind::DiskImage => "diskimage",
            ResourceKind::DataVolume => "datavolume",
            ResourceKind::VirtualMachine => "virtualmachine",
            ResourceKind::VmInstance => "vminstance",
            ResourceKind::Migration => "migration",
            ResourceKind::Node => "node",
            ResourceKind::StoragePolicy => "storagepolicy",
            ResourceKind::StorageProfile => "storageprofile",
            ResourceKind::Setting => "setting",
        };
        f.write_str(name)
    }
}

/// 托管资源句柄
///
/// 对检查项创建的外部资源的不透明引用。注册进资源跟踪器之后由
/// 跟踪器独占持有，删除只能由清理协调器发起。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    /// 集群级资源的命名空间为空字符串
    pub namespace: String,
    pub name: String,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        Self {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} {}", self.kind, self.name)
        } else {
            write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
        }
    }
}

/// 资源元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,

    /// 非空表示资源正在删除中
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<String>,
}

/// 资源状态条件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

/// 判断条件列表中指定条件是否为真
pub fn has_condition(conditions: &[Condition], kind: &str) -> bool {
    conditions
        .iter()
        .any(|c| c.kind == kind && c.status == CONDITION_TRUE)
}

// ---------------------------------------------------------------------------
// 存储卷
// ---------------------------------------------------------------------------

/// 卷声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeClaim {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: ClaimSpec,
    #[serde(default)]
    pub status: ClaimStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSpec {
    pub access_modes: Vec<AccessMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    pub resources: ClaimResources,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_mode: Option<VolumeMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResources {
    pub requests: StorageAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAmount {
    pub storage: String,
}

impl StorageAmount {
    pub fn new(storage: &str) -> Self {
        Self {
            storage: storage.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadWriteMany,
    ReadOnlyMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeMode {
    Filesystem,
    Block,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatus {
    #[serde(default)]
    pub phase: ClaimPhase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<StorageAmount>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimPhase {
    #[default]
    Pending,
    Bound,
    Lost,
}

// ---------------------------------------------------------------------------
// 工作负载
// ---------------------------------------------------------------------------

/// 用于验证卷挂载的工作负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadPod {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<PodVolume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodVolume {
    pub name: String,
    pub claim_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: PodPhase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

// ---------------------------------------------------------------------------
// 卷快照
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSnapshot {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: SnapshotSpec,
    #[serde(default)]
    pub status: SnapshotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSpec {
    /// 快照来源卷声明
    pub source_claim_name: String,
    pub snapshot_class: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_to_use: Option<bool>,
}

// ---------------------------------------------------------------------------
// 磁盘镜像
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskImage {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: DiskImageSpec,
    #[serde(default)]
    pub status: DiskImageStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskImageSpec {
    pub display_name: String,
    pub url: String,
    pub source_type: ImageSourceType,
    /// 镜像落盘使用的存储策略
    pub target_storage_policy: String,
    pub backend: ImageBackend,
    pub retry: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageSourceType {
    Download,
}

/// 镜像后端，按存储引擎版本选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageBackend {
    BackingImage,
    Cdi,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskImageStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

// ---------------------------------------------------------------------------
// 数据卷
// ---------------------------------------------------------------------------

/// 从镜像派生、供虚拟机启动使用的数据卷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataVolume {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: DataVolumeSpec,
    #[serde(default)]
    pub status: DataVolumeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataVolumeSpec {
    pub source: DataVolumeSource,
    pub storage: DataVolumeStorage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataVolumeSource {
    pub image: ImageRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVolumeStorage {
    pub storage_policy: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataVolumeStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

// ---------------------------------------------------------------------------
// 虚拟机
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualMachine {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: VirtualMachineSpec,
    #[serde(default)]
    pub status: VirtualMachineStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    pub run_strategy: RunStrategy,
    pub cpu: CpuTopology,
    pub memory: String,
    pub disks: Vec<DiskAttachment>,
    pub volumes: Vec<VmVolume>,
    pub networks: Vec<VmNetwork>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStrategy {
    Always,
    Halted,
    RerunOnFailure,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CpuTopology {
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskAttachment {
    pub name: String,
    pub bus: DiskBus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_order: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskBus {
    Virtio,
    Scsi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmVolume {
    pub name: String,
    pub claim_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmNetwork {
    pub name: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineStatus {
    #[serde(default)]
    pub printable_status: VmPrintableStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmPrintableStatus {
    #[default]
    Stopped,
    Starting,
    Running,
    Paused,
    Stopping,
    Migrating,
    ErrorUnschedulable,
}

// ---------------------------------------------------------------------------
// 虚拟机实例
// ---------------------------------------------------------------------------

/// 虚拟机运行实例，热插拔卷的挂载状态挂在实例对象上
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmInstance {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub status: VmInstanceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmInstanceStatus {
    #[serde(default)]
    pub volume_status: Vec<VolumeAttachmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAttachmentStatus {
    pub name: String,

    #[serde(default)]
    pub claim_name: String,

    #[serde(default)]
    pub phase: AttachmentPhase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentPhase {
    #[default]
    Pending,
    AttachedToNode,
    MountedToPod,
    Ready,
    Detaching,
}

// ---------------------------------------------------------------------------
// 热迁移
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: MigrationSpec,
    #[serde(default)]
    pub status: MigrationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSpec {
    /// 被迁移的虚拟机名称
    pub vm_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationStatus {
    #[serde(default)]
    pub phase: MigrationPhase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationPhase {
    #[default]
    Pending,
    Scheduling,
    Running,
    Succeeded,
    Failed,
}

// ---------------------------------------------------------------------------
// 集群信息
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub status: NodeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Node {
    /// 节点就绪且未处于删除中
    pub fn is_ready(&self) -> bool {
        self.metadata.deletion_timestamp.is_none()
            && has_condition(&self.status.conditions, NODE_READY_CONDITION)
    }
}

/// 存储策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePolicy {
    #[serde(default)]
    pub metadata: Metadata,
    pub provisioner: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// 存储策略配置文件，记录策略与快照类的关联
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageProfile {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub status: StorageProfileStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfileStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_class: Option<String>,
}

/// 平台设置项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = ResourceHandle::new(ResourceKind::VolumeClaim, "default", "pvc-1");
        assert_eq!(format!("{}", handle), "volumeclaim default/pvc-1");

        let node = ResourceHandle::new(ResourceKind::Node, "", "node-1");
        assert_eq!(format!("{}", node), "node node-1");
    }

    #[test]
    fn test_node_readiness() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "node-1" },
            "status": { "conditions": [ { "type": "Ready", "status": "True" } ] }
        }))
        .unwrap();
        assert!(node.is_ready());

        let deleting: Node = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "node-2", "deletionTimestamp": "2026-08-01T00:00:00Z" },
            "status": { "conditions": [ { "type": "Ready", "status": "True" } ] }
        }))
        .unwrap();
        assert!(!deleting.is_ready());
    }

    #[test]
    fn test_claim_decoding() {
        let claim: VolumeClaim = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "pvc-1", "namespace": "default" },
            "spec": {
                "accessModes": ["ReadWriteMany"],
                "storageClass": "longhorn",
                "resources": { "requests": { "storage": "1Gi" } }
            },
            "status": { "phase": "Bound", "capacity": { "storage": "1Gi" } }
        }))
        .unwrap();
        assert_eq!(claim.status.phase, ClaimPhase::Bound);
        assert_eq!(
            claim.status.capacity,
            Some(StorageAmount::new("1Gi"))
        );
    }

    #[test]
    fn test_image_imported_condition() {
        let conditions = vec![
            Condition {
                kind: "Initialized".to_string(),
                status: "True".to_string(),
            },
            Condition {
                kind: IMAGE_IMPORTED_CONDITION.to_string(),
                status: "False".to_string(),
            },
        ];
        assert!(!has_condition(&conditions, IMAGE_IMPORTED_CONDITION));
        assert!(has_condition(&conditions, "Initialized"));
    }
}
