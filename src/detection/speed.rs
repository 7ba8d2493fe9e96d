//! 速度估算 (Speed estimation)
//!
//! 累加相邻轨迹点的像素位移 → 米 → 除以历史时长 → km/h
//!
//! 时长按 `历史点数 / fps` 计算: 每个历史点视为一个等间隔采样,
//! 与实际视频经过的时间无关 (跳帧时同样如此)。

use super::types::TrackPoint;

/// 速度标定系数 K (经验值,非标准单位换算)
pub const SPEED_CALIBRATION_FACTOR: f64 = 2.0;

/// 速度估算器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedEstimator {
    fps: f64,
    pixels_per_meter: f64,
    calibration: f64,
}

impl SpeedEstimator {
    /// 参数由 `SpeedConfig::validate` 保证为正数
    pub fn new(fps: f64, pixels_per_meter: f64, calibration: f64) -> Self {
        Self {
            fps,
            pixels_per_meter,
            calibration,
        }
    }

    pub fn set_pixels_per_meter(&mut self, pixels_per_meter: f64) {
        self.pixels_per_meter = pixels_per_meter;
    }

    /// 根据位置历史估算瞬时速度 (km/h),少于2个点返回0
    pub fn estimate(&self, history: &[TrackPoint]) -> f64 {
        estimate_speed(history, self.fps, self.pixels_per_meter, self.calibration)
    }
}

/// 纯函数版本
pub fn estimate_speed(
    history: &[TrackPoint],
    fps: f64,
    pixels_per_meter: f64,
    calibration: f64,
) -> f64 {
    if history.len() < 2 {
        return 0.0;
    }

    let total_displacement: f64 = history.windows(2).map(|w| w[0].distance(&w[1])).sum();

    let distance_meters = total_displacement / pixels_per_meter;
    let time_seconds = history.len() as f64 / fps;

    (distance_meters / time_seconds) * calibration
}
