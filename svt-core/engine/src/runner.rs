//! 检查执行器
//!
//! 在单一截止上下文内顺序执行检查列表，失败即停。每个被启动的
//! 检查都会在报告中留下一条结果；首个失败之后未执行的检查不产生
//! 结果。运行返回前始终等待清理协调器的完成信号。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{error, info};

use svt_cluster::ResourceClient;
use svt_common::{CheckResult, Report};

use crate::cleanup::CleanupCoordinator;
use crate::context::RunContext;
use crate::tracker::ResourceTracker;

/// 检查项抽象
///
/// 一个命名的验证单元。检查在执行期间创建零个或多个托管资源并
/// 登记到资源跟踪器，检查本身不删除已登记的资源。
#[async_trait]
pub trait Check: Send + Sync {
    /// 检查名称，进入报告
    fn name(&self) -> &str;

    /// 执行检查
    async fn execute(&self, ctx: &RunContext) -> Result<()>;
}

/// 一次验证运行的执行参数
#[derive(Debug, Clone)]
pub struct Run {
    /// 触发清理前允许检查序列运行的总时长
    pub timeout: Duration,

    /// 跳过资源清理
    pub skip_cleanup: bool,
}

impl Run {
    /// 执行完整的验证运行
    ///
    /// 建立截止上下文，启动清理协调器，顺序执行检查；序列结束后
    /// 显式取消上下文并阻塞等待清理完成，保证运行返回前清理已被
    /// 尝试。返回首个检查错误。
    pub async fn execute(
        &self,
        client: Arc<dyn ResourceClient>,
        tracker: Arc<ResourceTracker>,
        checks: Vec<Box<dyn Check>>,
        report: &mut Report,
    ) -> Result<()> {
        let ctx = RunContext::with_timeout(self.timeout);
        let (complete_tx, complete_rx) = oneshot::channel();

        let coordinator =
            CleanupCoordinator::new(client, Arc::clone(&tracker), self.skip_cleanup);
        tokio::spawn(coordinator.run(ctx.clone(), complete_tx));

        let mut first_error = None;
        for check in &checks {
            info!("开始检查: {}", check.name());
            let mut result = CheckResult::new(check.name());

            match check.execute(&ctx).await {
                Ok(()) => {
                    result.mark_success();
                    report.add_result(result);
                    info!("检查完成: {}", check.name());
                }
                Err(e) => {
                    result.add_failure_info(format!("{:#}", e));
                    report.add_result(result);
                    error!("检查失败: {}: {:#}", check.name(), e);
                    first_error = Some(e);
                    break;
                }
            }
        }

        // 显式取消以唤醒清理协调器；超时场景下为幂等操作
        ctx.cancel();
        let _ = complete_rx.await;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
