//! 资源跟踪器

use std::sync::Mutex;

use tracing::debug;

use svt_cluster::ResourceHandle;

/// 资源跟踪器
///
/// 只追加的资源句柄记录，插入顺序即创建顺序。检查项在截止上下文
/// 存活期间写入，清理协调器在上下文结束后读取，二者在时间上互斥，
/// 这也是唯一的同步约定。
#[derive(Debug, Default)]
pub struct ResourceTracker {
    handles: Mutex<Vec<ResourceHandle>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记检查项创建成功的资源，供清理协调器使用
    pub fn register(&self, handle: ResourceHandle) {
        debug!("登记待清理资源: {}", handle);
        self.lock().push(handle);
    }

    /// 按创建顺序返回全部句柄
    pub fn handles(&self) -> Vec<ResourceHandle> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ResourceHandle>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svt_cluster::ResourceKind;

    #[test]
    fn test_insertion_order_is_preserved() {
        let tracker = ResourceTracker::new();
        for name in ["a", "b", "c"] {
            tracker.register(ResourceHandle::new(ResourceKind::VolumeClaim, "default", name));
        }

        let names: Vec<String> = tracker.handles().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = ResourceTracker::new();
        assert!(tracker.is_empty());
        assert!(tracker.handles().is_empty());
    }
}
