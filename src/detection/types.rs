//! 测速系统数据结构定义
//! Data structures for the speed detection system

use phf::phf_map;
use serde::{Deserialize, Serialize};

// ========== 公共类型 ==========

/// 跟踪ID (由外部跟踪器分配,单次运行内不复用)
pub type TrackId = u32;

/// 无法识别类别时的显示名称
pub const UNKNOWN_VEHICLE: &str = "vehicle";

/// COCO类别 → 车辆类型名称
static VEHICLE_NAMES: phf::Map<u32, &'static str> = phf_map! {
    2u32 => "car",
    3u32 => "motorcycle",
    5u32 => "bus",
    7u32 => "truck",
};

/// 根据COCO类别ID获取车辆类型名称
pub fn vehicle_name(class_id: u32) -> &'static str {
    VEHICLE_NAMES.get(&class_id).copied().unwrap_or(UNKNOWN_VEHICLE)
}

// ========== 数据结构 ==========

/// 轨迹点 (检测框中心,像素坐标)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

impl TrackPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 欧氏距离 (像素)
    pub fn distance(&self, other: &TrackPoint) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// 单个车辆检测 (已由外部检测器按置信度和类别过滤)
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleDetection {
    pub track_id: TrackId,
    pub center: TrackPoint,
    pub class_id: u32,
}

impl VehicleDetection {
    pub fn new(track_id: TrackId, center: TrackPoint, class_id: u32) -> Self {
        Self {
            track_id,
            center,
            class_id,
        }
    }

    pub fn vehicle_type(&self) -> &'static str {
        vehicle_name(self.class_id)
    }
}

/// 一帧的全部检测结果
#[derive(Clone, Debug, Default)]
pub struct FrameDetections {
    /// 输入帧序号
    pub frame: u64,
    /// 帧尺寸 (width, height),未知时为None
    pub frame_size: Option<(u32, u32)>,
    pub detections: Vec<VehicleDetection>,
}

impl FrameDetections {
    pub fn new(frame: u64, detections: Vec<VehicleDetection>) -> Self {
        Self {
            frame,
            frame_size: None,
            detections,
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.detections.iter().map(|d| d.track_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_name_lookup() {
        assert_eq!(vehicle_name(2), "car");
        assert_eq!(vehicle_name(3), "motorcycle");
        assert_eq!(vehicle_name(5), "bus");
        assert_eq!(vehicle_name(7), "truck");
        assert_eq!(vehicle_name(0), UNKNOWN_VEHICLE);
    }

    #[test]
    fn test_point_distance() {
        let a = TrackPoint::new(0.0, 0.0);
        let b = TrackPoint::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }
}
