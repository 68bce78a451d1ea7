//! SVT CLI 应用

use clap::Parser;
use tracing::{error, info, Level};

use svt_validation::ValidationRun;

#[derive(Parser)]
#[command(name = "svt")]
#[command(about = "OCloudView SVT - 集群存储验证工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("SVT 存储验证启动");

    // 报告已在运行内部输出，这里只决定进程退出码
    if let Err(e) = ValidationRun::new(&cli.config).execute().await {
        error!("存储验证失败: {:#}", e);
        std::process::exit(1);
    }
}
