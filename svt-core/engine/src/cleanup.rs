//! 清理协调器
//!
//! 运行开始时作为后台任务启动，阻塞在截止上下文上；上下文结束后
//! 按创建顺序的逆序删除所有已登记资源，尽力而为，单个资源删除
//! 失败只记录日志不中断扫描。扫描结束通过完成信号通知运行主体。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use svt_cluster::{ResourceClient, ResourceHandle};

use crate::context::{CancelCause, RunContext};
use crate::tracker::ResourceTracker;

/// 单个资源的最大删除尝试次数
pub const MAX_DELETE_ATTEMPTS: u32 = 3;

/// 两次删除尝试之间的固定等待
///
/// 刻意取得较长：外部系统中依赖资源的回收可能需要数十秒，例如卷
/// 声明删除后底层卷的释放，期间对镜像或策略的删除会被拒绝。
pub const DELETE_BACKOFF: Duration = Duration::from_secs(20);

/// 清理协调器
pub struct CleanupCoordinator {
    client: Arc<dyn ResourceClient>,
    tracker: Arc<ResourceTracker>,
    skip_cleanup: bool,
}

impl CleanupCoordinator {
    pub fn new(
        client: Arc<dyn ResourceClient>,
        tracker: Arc<ResourceTracker>,
        skip_cleanup: bool,
    ) -> Self {
        Self {
            client,
            tracker,
            skip_cleanup,
        }
    }

    /// 等待上下文结束后执行一次清理扫描
    ///
    /// 无论扫描是否执行、是否成功，完成信号都恰好发送一次。
    pub async fn run(self, ctx: RunContext, complete: oneshot::Sender<()>) {
        // 阻塞直到检查序列完成或超时
        ctx.cancelled().await;
        if ctx.cause() == Some(CancelCause::DeadlineExceeded) {
            error!("验证运行超时");
        }

        info!("开始清理验证过程中创建的资源");
        if self.skip_cleanup {
            info!("跳过资源清理");
            let _ = complete.send(());
            return;
        }

        let handles = self.tracker.handles();
        debug!("需要清理 {} 个资源", handles.len());

        // 逆序删除以先解除依赖关系
        for handle in handles.iter().rev() {
            if let Err(e) = delete_with_retry(self.client.as_ref(), handle).await {
                // 记录错误后继续尝试清理剩余资源
                error!("删除资源 {} 失败: {}", handle, e);
            }
        }

        let _ = complete.send(());
    }
}

/// 带重试的资源删除
///
/// 删除使用独立的请求路径，不受已到期的运行截止时间约束。
/// "资源不存在"视为删除成功；重试预算耗尽时返回最后一次错误。
pub async fn delete_with_retry(
    client: &dyn ResourceClient,
    handle: &ResourceHandle,
) -> svt_cluster::Result<()> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        debug!("尝试删除资源 {} (第 {} 次)", handle, attempt);

        match client.delete(handle).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("资源 {} 已不存在", handle);
                return Ok(());
            }
            Err(e) if attempt >= MAX_DELETE_ATTEMPTS => return Err(e),
            Err(e) => {
                warn!("删除资源 {} 失败，稍后重试: {}", handle, e);
                tokio::time::sleep(DELETE_BACKOFF).await;
            }
        }
    }
}
