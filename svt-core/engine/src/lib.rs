//! 验证编排引擎
//!
//! 驱动一次存储验证运行：按固定顺序执行检查项、在全局截止时间内
//! 失败即停，并保证运行结束前对所有已创建资源完成一次逆序清理。
//!
//! 引擎只通过两个窄契约与外部协作：检查项抽象 [`Check`] 与托管
//! 资源客户端 [`svt_cluster::ResourceClient`]。

pub mod cleanup;
pub mod context;
pub mod runner;
pub mod tracker;
pub mod wait;

pub use cleanup::{delete_with_retry, CleanupCoordinator};
pub use context::{CancelCause, RunContext};
pub use runner::{Check, Run};
pub use tracker::ResourceTracker;
pub use wait::wait_until_ready;

use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("验证运行超时")]
    DeadlineExceeded,

    #[error("验证运行已取消")]
    Cancelled,
}

/// 引擎结果类型
pub type Result<T> = std::result::Result<T, EngineError>;
