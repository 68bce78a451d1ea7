//! 运行截止上下文

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::EngineError;

/// 取消原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// 截止时间已到
    DeadlineExceeded,
    /// 检查序列主动结束
    Cancelled,
}

/// 运行截止上下文
///
/// 检查执行与清理协调器共享的单一可取消执行范围。取消是单调的：
/// 一旦发生就保持取消态，重复取消为幂等操作；首个取消原因被保留，
/// 之后不再改变。
#[derive(Clone)]
pub struct RunContext {
    token: CancellationToken,
    cause: Arc<OnceLock<CancelCause>>,
}

impl RunContext {
    /// 创建带超时的上下文，超时到达后自动取消
    pub fn with_timeout(timeout: Duration) -> Self {
        let ctx = Self {
            token: CancellationToken::new(),
            cause: Arc::new(OnceLock::new()),
        };

        let watchdog = ctx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    let _ = watchdog.cause.set(CancelCause::DeadlineExceeded);
                    watchdog.token.cancel();
                }
                _ = watchdog.token.cancelled() => {}
            }
        });
        ctx
    }

    /// 主动取消，幂等
    pub fn cancel(&self) {
        let _ = self.cause.set(CancelCause::Cancelled);
        self.token.cancel();
    }

    /// 等待上下文被取消
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 首个取消原因，未取消时为 None
    pub fn cause(&self) -> Option<CancelCause> {
        self.cause.get().copied()
    }

    /// 取消态对应的引擎错误
    pub fn error(&self) -> EngineError {
        match self.cause() {
            Some(CancelCause::DeadlineExceeded) => EngineError::DeadlineExceeded,
            _ => EngineError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_context() {
        let ctx = RunContext::with_timeout(Duration::from_secs(1));
        assert!(!ctx.is_cancelled());
        assert!(ctx.cause().is_none());

        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(CancelCause::DeadlineExceeded));
        assert_eq!(ctx.error(), EngineError::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_cancel_is_idempotent() {
        let ctx = RunContext::with_timeout(Duration::from_secs(3600));
        ctx.cancel();
        ctx.cancel();
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.cause(), Some(CancelCause::Cancelled));

        // 取消后的上下文保持取消态
        ctx.cancelled().await;
        assert_eq!(ctx.error(), EngineError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cause_is_preserved() {
        let ctx = RunContext::with_timeout(Duration::from_millis(10));
        ctx.cancelled().await;
        // 超时发生之后的主动取消不改变首个原因
        ctx.cancel();
        assert_eq!(ctx.cause(), Some(CancelCause::DeadlineExceeded));
    }
}
