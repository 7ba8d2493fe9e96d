// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod challan; // 罚单系统
pub mod config; // 测速配置参数
pub mod detection; // 测速系统
pub mod error; // 错误类型
pub mod output; // 结果持久化
pub mod pipeline; // 检测回放流水线

pub use crate::challan::{fine, ChallanGenerator, FineSchedule};
pub use crate::config::SpeedConfig;
pub use crate::detection::{FrameDetections, Severity, Snapshot, SpeedEngine};
pub use crate::error::{ConfigError, SpeedcamError};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 当前本地时间字符串,日期部分以 `delimiter` 分隔
pub fn gen_time_string(delimiter: &str) -> String {
    let fmt = format!("%Y{}%m{}%d %H:%M:%S", delimiter, delimiter);
    chrono::Local::now().format(&fmt).to_string()
}

/// 初始化日志
///
/// `RUST_LOG` 控制级别 (默认 speedcam_rs=info),`LOG_FORMAT=json` 输出JSON
pub fn init_logging() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("speedcam_rs=info,speedcam=info,challan=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_string_delimiter() {
        let s = gen_time_string("/");
        assert_eq!(s.len(), "2024/01/01 00:00:00".len());
        assert_eq!(&s[4..5], "/");
        assert_eq!(&s[7..8], "/");
    }
}
