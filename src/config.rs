//! 测速配置 - 通过JSON文件调整参数

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::detection::speed::SPEED_CALIBRATION_FACTOR;
use crate::detection::violation::CRITICAL_SPEED;
use crate::error::ConfigError;

/// 测速参数配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    // === 标定参数 ===
    pub fps: f64,               // 采样帧率
    pub pixels_per_meter: f64,  // 像素/米
    pub speed_calibration: f64, // 速度标定系数 K

    // === 判定参数 ===
    pub speed_limit: f64,    // 限速 (km/h)
    pub critical_speed: f64, // 红色显示阈值 (km/h)

    // === 历史长度 ===
    pub track_history_length: usize,      // 位置历史 H
    pub speed_history_length: usize,      // 速度历史 S
    pub max_screenshots_per_vehicle: u32, // 每车取证上限 C

    // === 输入过滤 ===
    pub vehicle_classes: Vec<u32>, // COCO类别: car, motorcycle, bus, truck
    pub vehicle_confidence: f32,   // 检测置信度阈值
    pub frame_skip: u64,           // 每N帧处理一帧
    pub center_threshold: f64,     // 画面中心判定半径(像素)

    // === 罚单 ===
    pub base_fine: u64,
    pub location: String,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            pixels_per_meter: 10.0,
            speed_calibration: SPEED_CALIBRATION_FACTOR,

            speed_limit: 80.0,
            critical_speed: CRITICAL_SPEED,

            track_history_length: 30,
            speed_history_length: 10,
            max_screenshots_per_vehicle: 3,

            vehicle_classes: vec![2, 3, 5, 7],
            vehicle_confidence: 0.5,
            frame_skip: 1,
            center_threshold: 50.0,

            base_fine: 1000,
            location: String::from("Main Road Checkpoint"),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl SpeedConfig {
    /// 从JSON文件加载配置
    ///
    /// 文件不存在时写入默认配置;读取或解析失败时使用默认值,不改动原文件
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    info!(path = %path.display(), "✅ 配置已加载");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "⚠️ 配置文件解析失败,使用默认值");
                    Self::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "📝 配置文件不存在,创建默认配置");
                let config = Self::default();
                config.save(path);
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "⚠️ 配置文件读取失败,使用默认值");
                Self::default()
            }
        }
    }

    /// 保存配置到JSON文件
    pub fn save(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    error!(path = %path.display(), error = %e, "❌ 保存配置失败");
                } else {
                    info!(path = %path.display(), "💾 配置已保存");
                }
            }
            Err(e) => error!(error = %e, "❌ 序列化配置失败"),
        }
    }

    /// 检查前置条件
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.fps) {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        if !positive(self.pixels_per_meter) {
            return Err(ConfigError::InvalidPixelsPerMeter(self.pixels_per_meter));
        }
        if !positive(self.speed_calibration) {
            return Err(ConfigError::InvalidCalibration(self.speed_calibration));
        }
        if !non_negative(self.speed_limit) {
            return Err(ConfigError::InvalidSpeedLimit(self.speed_limit));
        }
        if !non_negative(self.critical_speed) {
            return Err(ConfigError::InvalidCriticalSpeed(self.critical_speed));
        }
        if self.track_history_length == 0 {
            return Err(ConfigError::EmptyTrackHistory);
        }
        if self.speed_history_length == 0 {
            return Err(ConfigError::EmptySpeedHistory);
        }
        if self.frame_skip == 0 {
            return Err(ConfigError::ZeroFrameSkip);
        }
        if !(0.0..=1.0).contains(&self.vehicle_confidence) {
            return Err(ConfigError::InvalidConfidence(self.vehicle_confidence));
        }
        Ok(())
    }

    /// 打印当前配置
    pub fn print_summary(&self) {
        info!("🎛️ 当前测速配置:");
        info!(
            "  帧率: {:.1} fps | 像素/米: {:.2} | 标定系数: {:.2}",
            self.fps, self.pixels_per_meter, self.speed_calibration
        );
        info!(
            "  限速: {:.1} km/h | 临界速度: {:.1} km/h",
            self.speed_limit, self.critical_speed
        );
        info!(
            "  历史长度: 位置{} / 速度{} | 每车截图上限: {}",
            self.track_history_length, self.speed_history_length, self.max_screenshots_per_vehicle
        );
        info!(
            "  车辆类别: {:?} | 置信度: {:.2} | 跳帧: {}",
            self.vehicle_classes, self.vehicle_confidence, self.frame_skip
        );
    }
}
