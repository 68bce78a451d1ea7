//! 验证运行装配
//!
//! 串起配置加载、默认值补全、预检查、检查执行与报告输出的完整流程。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use svt_cluster::{ClusterClient, ClusterConfig, KindRegistry, ResourceClient};
use svt_common::Report;
use svt_engine::{ResourceTracker, Run};

use crate::checks::{self, CheckEnv};
use crate::environment;
use crate::settings::{self, DEFAULT_SKIP_CLEANUP, DEFAULT_TIMEOUT_SECS};

/// 一次完整的存储验证运行
pub struct ValidationRun {
    config_path: PathBuf,
}

impl ValidationRun {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// 执行验证并输出报告
    ///
    /// 报告总是在清理完成后输出到标准输出；任何检查失败时返回
    /// 首个错误。
    pub async fn execute(&self) -> Result<()> {
        let mut config = settings::load(&self.config_path)?;
        settings::fill_static_defaults(&mut config);

        let client = Arc::new(ClusterClient::new(
            &config.cluster,
            ClusterConfig::default(),
            Arc::new(KindRegistry::with_defaults()),
        )?);

        settings::resolve_storage_defaults(&mut config, &client).await?;
        let ready_nodes = settings::preflight(&config, &client).await?;
        let environment_info = environment::fetch(&client, ready_nodes).await?;
        let longhorn_v1 = settings::probe_longhorn_v1(&config, &client).await?;

        let tracker = Arc::new(ResourceTracker::new());
        let check_env = Arc::new(CheckEnv::new(
            Arc::clone(&client),
            Arc::clone(&tracker),
            config.clone(),
            longhorn_v1,
        ));
        let checks = checks::all(check_env);

        let run = Run {
            timeout: Duration::from_secs(config.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            skip_cleanup: config.skip_cleanup.unwrap_or(DEFAULT_SKIP_CLEANUP),
        };
        info!(
            "开始存储验证: 命名空间 {}, 存储策略 {}, 超时 {} 秒",
            config.namespace,
            config.storage_class,
            run.timeout.as_secs()
        );

        let dyn_client: Arc<dyn ResourceClient> = client;
        let mut report = Report::new(config, environment_info);
        let outcome = run.execute(dyn_client, tracker, checks, &mut report).await;

        report.finalize();
        println!("-------------------------------------");
        print!("{}", report.to_yaml().context("序列化验证报告失败")?);

        outcome
    }
}
