//! 集群环境信息采集

use anyhow::Result;
use tracing::warn;

use svt_cluster::ClusterClient;
use svt_common::EnvironmentInfo;

/// 记录平台版本的设置项名称
const SERVER_VERSION_SETTING: &str = "server-version";

/// 采集写入报告的环境信息
///
/// 平台版本缺失不阻断验证，报告中留空。
pub async fn fetch(client: &ClusterClient, node_count: usize) -> Result<EnvironmentInfo> {
    let platform_version = match client.cluster().get_setting(SERVER_VERSION_SETTING).await {
        Ok(setting) => setting.value,
        Err(e) if e.is_not_found() => {
            warn!("平台未提供 {} 设置项", SERVER_VERSION_SETTING);
            String::new()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(EnvironmentInfo {
        node_count,
        platform_version,
        validator_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
