//! 集群客户端错误定义

use thiserror::Error;

/// 集群客户端错误类型
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("HTTP 错误: {0}")]
    Http(String),

    #[error("API 错误 [{0}]: {1}")]
    Api(u16, String),

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("资源不存在: {0}")]
    NotFound(String),

    #[error("资源类型未注册: {0}")]
    KindNotRegistered(String),

    #[error("配置错误: {0}")]
    Config(String),
}

impl ClusterError {
    /// 删除与查询路径上需要区分"资源不存在"的场景
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }
}

/// 集群客户端结果类型
pub type Result<T> = std::result::Result<T, ClusterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguishable() {
        assert!(ClusterError::NotFound("pvc-x".to_string()).is_not_found());
        assert!(!ClusterError::Http("connection refused".to_string()).is_not_found());
        assert!(!ClusterError::Api(500, "server error".to_string()).is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ClusterError::Api(409, "conflict".to_string());
        let text = format!("{}", err);
        assert!(text.contains("409"));
        assert!(text.contains("conflict"));
    }
}
