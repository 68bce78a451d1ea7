//! 资源就绪等待
//!
//! 有界轮询循环：反复拉取资源状态并用调用方给定的判定函数评估，
//! 直到就绪、拉取失败或运行截止。总等待时长完全由运行上下文的
//! 截止时间约束，循环本身没有次数上限。

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use svt_cluster::ResourceHandle;

use crate::context::RunContext;

/// 两次轮询之间的固定间隔
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// 等待资源达到期望状态
///
/// `fetch` 负责刷新资源的观测状态，拉取失败立即返回错误而不重试：
/// 失败通常意味着资源被带外删除或 API 不可达，对当前检查是致命的。
/// `predicate` 针对具体资源类型判断是否就绪，判定出错同样立即返回。
pub async fn wait_until_ready<T, F, Fut, P>(
    ctx: &RunContext,
    handle: &ResourceHandle,
    fetch: F,
    predicate: P,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = svt_cluster::Result<T>>,
    P: Fn(&T) -> Result<bool>,
{
    loop {
        if ctx.is_cancelled() {
            return Err(ctx.error().into());
        }

        let state = fetch()
            .await
            .with_context(|| format!("获取资源 {} 失败", handle))?;

        if predicate(&state)? {
            return Ok(());
        }

        debug!("等待资源 {} 达到期望状态", handle);
        tokio::select! {
            _ = ctx.cancelled() => return Err(ctx.error().into()),
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use svt_cluster::{ClusterError, ResourceKind};

    fn handle() -> ResourceHandle {
        ResourceHandle::new(ResourceKind::VolumeClaim, "default", "pvc-1")
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_several_polls() {
        let ctx = RunContext::with_timeout(Duration::from_secs(60));
        let polls = AtomicUsize::new(0);

        let result = wait_until_ready(
            &ctx,
            &handle(),
            || async {
                Ok(polls.fetch_add(1, Ordering::SeqCst) + 1)
            },
            |count| Ok(*count >= 3),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_fatal() {
        let ctx = RunContext::with_timeout(Duration::from_secs(60));
        let polls = AtomicUsize::new(0);

        let result = wait_until_ready(
            &ctx,
            &handle(),
            || async {
                polls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ClusterError::Http("connection refused".to_string()))
            },
            |_| Ok(true),
        )
        .await;

        assert!(result.is_err());
        // 拉取失败不重试
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_error_is_fatal() {
        let ctx = RunContext::with_timeout(Duration::from_secs(60));

        let result = wait_until_ready(
            &ctx,
            &handle(),
            || async { Ok(0u32) },
            |_| anyhow::bail!("unexpected state"),
        )
        .await;

        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("unexpected state"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_wait() {
        let ctx = RunContext::with_timeout(Duration::from_secs(1));

        let result = wait_until_ready(
            &ctx,
            &handle(),
            || async { Ok(0u32) },
            |_| Ok(false),
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is::<crate::EngineError>());
        assert_eq!(
            *err.downcast_ref::<crate::EngineError>().unwrap(),
            crate::EngineError::DeadlineExceeded
        );
    }
}
