//! 错误类型

use std::path::PathBuf;

use thiserror::Error;

/// 配置前置条件错误 (在构造时暴露,避免除零等静默错误)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("fps must be a positive finite number, got {0}")]
    InvalidFps(f64),

    #[error("pixels_per_meter must be a positive finite number, got {0}")]
    InvalidPixelsPerMeter(f64),

    #[error("speed_calibration must be a positive finite number, got {0}")]
    InvalidCalibration(f64),

    #[error("speed_limit must be a non-negative finite number, got {0}")]
    InvalidSpeedLimit(f64),

    #[error("critical_speed must be a non-negative finite number, got {0}")]
    InvalidCriticalSpeed(f64),

    #[error("track_history_length must be at least 1")]
    EmptyTrackHistory,

    #[error("speed_history_length must be at least 1")]
    EmptySpeedHistory,

    #[error("frame_skip must be at least 1")]
    ZeroFrameSkip,

    #[error("vehicle_confidence must be within [0, 1], got {0}")]
    InvalidConfidence(f32),

    #[error("calibration distance and pixels must be positive, got {meters} m / {pixels} px")]
    InvalidCalibrationSample { meters: f64, pixels: f64 },
}

/// 测速系统错误
#[derive(Debug, Error)]
pub enum SpeedcamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open detections stream {path}: {source}")]
    InputStream {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpeedcamError>;
