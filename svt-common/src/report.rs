//! 验证报告

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Configuration;

/// 验证报告
///
/// 汇总一次验证运行的输入配置、环境信息与按执行顺序排列的检查结果。
/// 报告在清理完成之后序列化一次，输出到标准输出。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// 补全默认值后的输入配置快照
    pub input_configuration: Configuration,

    /// 集群环境信息
    pub environment_info: EnvironmentInfo,

    /// 运行开始时间
    pub start_time: DateTime<Utc>,

    /// 运行结束时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    /// 检查结果列表，顺序与执行顺序一致
    pub results: Vec<CheckResult>,
}

impl Report {
    /// 创建新的验证报告
    pub fn new(configuration: Configuration, environment_info: EnvironmentInfo) -> Self {
        Self {
            input_configuration: configuration,
            environment_info,
            start_time: Utc::now(),
            end_time: None,
            results: Vec::new(),
        }
    }

    /// 按到达顺序追加检查结果，不重排也不去重
    pub fn add_result(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// 完成报告
    pub fn finalize(&mut self) {
        self.end_time = Some(Utc::now());
    }

    /// 全部检查是否成功
    pub fn is_success(&self) -> bool {
        !self.results.is_empty()
            && self
                .results
                .iter()
                .all(|r| r.status == CheckStatus::Success)
    }

    /// 导出为 YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// 集群环境信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    /// 集群节点数量
    pub node_count: usize,

    /// 平台版本
    pub platform_version: String,

    /// 验证器版本
    pub validator_version: String,
}

/// 单项检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// 检查名称
    pub name: String,

    /// 检查状态
    pub status: CheckStatus,

    /// 失败详情
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

impl CheckResult {
    /// 检查开始时创建结果记录，状态在检查结束时更新
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Failure,
            info: None,
        }
    }

    /// 标记检查成功
    pub fn mark_success(&mut self) {
        self.status = CheckStatus::Success;
        self.info = None;
    }

    /// 记录失败详情
    pub fn add_failure_info(&mut self, info: impl ToString) {
        self.status = CheckStatus::Failure;
        self.info = Some(info.to_string());
    }
}

/// 检查状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Success,
    Failure,
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> Report {
        Report::new(Configuration::default(), EnvironmentInfo::default())
    }

    #[test]
    fn test_result_failure_info() {
        let mut result = CheckResult::new("volume check");
        result.add_failure_info("error creating claim");
        assert_eq!(result.status, CheckStatus::Failure);
        assert_eq!(result.info.as_deref(), Some("error creating claim"));
    }

    #[test]
    fn test_report_success() {
        let mut report = sample_report();
        assert!(!report.is_success());

        let mut result = CheckResult::new("volume check");
        result.mark_success();
        report.add_result(result);
        assert!(report.is_success());

        let mut failed = CheckResult::new("snapshot check");
        failed.add_failure_info("timed out");
        report.add_result(failed);
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_yaml_output() {
        let mut report = sample_report();
        let mut result = CheckResult::new("volume check");
        result.mark_success();
        report.add_result(result);
        report.finalize();

        let yaml = report.to_yaml().unwrap();
        assert!(yaml.contains("volume check"));
        assert!(yaml.contains("status: success"));
        // 成功结果不携带失败详情
        assert!(!yaml.contains("info:"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CheckStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&CheckStatus::Skipped).unwrap(),
            "\"skipped\""
        );
    }
}
