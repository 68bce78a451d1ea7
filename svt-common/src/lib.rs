//! SVT 公共类型
//!
//! 存储验证工具的输入配置与输出报告结构，供引擎、检查项与 CLI 共用。

pub mod config;
pub mod report;

pub use config::{ClusterEndpoint, Configuration, VmConfig};
pub use report::{CheckResult, CheckStatus, EnvironmentInfo, Report};
