//! 存储验证应用
//!
//! 把验证编排引擎与集群客户端装配成完整的存储验证流程：加载配置、
//! 补全默认值、执行预检查，然后按固定顺序运行七项存储检查并输出
//! YAML 报告。

pub mod checks;
pub mod environment;
pub mod run;
pub mod settings;

pub use run::ValidationRun;
