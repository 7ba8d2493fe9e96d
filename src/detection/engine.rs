//! 测速引擎 (Speed engine)
//!
//! 单次运行拥有的全部状态: 轨迹、速度历史、取证计数、统计。
//! 每帧处理流程:
//! 1. 更新轨迹历史
//! 2. 估算瞬时速度
//! 3. 写入速度历史并计算滑动平均
//! 4. 分级 + 实时超速判定
//!
//! 帧必须按到达顺序逐帧处理 (`&mut self`),速度的时间基准依赖于此。

use serde::Serialize;
use tracing::{debug, info};

use super::aggregator::{ResultAggregator, Snapshot};
use super::evidence::EvidenceThrottle;
use super::smoother::SpeedSmoother;
use super::speed::SpeedEstimator;
use super::track_store::TrackStore;
use super::types::{FrameDetections, TrackId, TrackPoint};
use super::violation::{classify_with, is_speeding_live, Severity};
use crate::config::SpeedConfig;
use crate::error::ConfigError;

/// 单车单帧的速度读数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedReading {
    pub track_id: TrackId,
    pub vehicle_type: &'static str,
    /// 瞬时速度
    pub speed: f64,
    /// 滑动平均速度
    pub average_speed: f64,
    pub severity: Severity,
    /// 是否位于画面中心 (帧尺寸未知时为None)
    pub at_center: Option<bool>,
}

/// 实时超速车辆 (平滑速度超过限速)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedingVehicle {
    pub track_id: TrackId,
    /// 滑动平均速度
    pub speed: f64,
    pub vehicle_type: &'static str,
}

/// 单帧处理结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub readings: Vec<SpeedReading>,
    pub speeding: Vec<SpeedingVehicle>,
}

pub struct SpeedEngine {
    estimator: SpeedEstimator,
    tracks: TrackStore,
    smoother: SpeedSmoother,
    throttle: EvidenceThrottle,
    aggregator: ResultAggregator,

    speed_limit: f64,
    critical_speed: f64,
    center_threshold: f64,
}

impl SpeedEngine {
    /// 创建引擎,配置不合法时返回错误
    pub fn new(config: &SpeedConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cap = config.max_screenshots_per_vehicle;
        Ok(Self {
            estimator: SpeedEstimator::new(
                config.fps,
                config.pixels_per_meter,
                config.speed_calibration,
            ),
            tracks: TrackStore::new(config.track_history_length),
            smoother: SpeedSmoother::new(config.speed_history_length),
            throttle: EvidenceThrottle::new(cap),
            aggregator: ResultAggregator::new(cap as usize),
            speed_limit: config.speed_limit,
            critical_speed: config.critical_speed,
            center_threshold: config.center_threshold,
        })
    }

    /// 用已知距离标定像素/米,返回新值
    pub fn calibrate(
        &mut self,
        known_distance_meters: f64,
        known_pixels: f64,
    ) -> Result<f64, ConfigError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(known_distance_meters) || !valid(known_pixels) {
            return Err(ConfigError::InvalidCalibrationSample {
                meters: known_distance_meters,
                pixels: known_pixels,
            });
        }

        let pixels_per_meter = known_pixels / known_distance_meters;
        self.estimator.set_pixels_per_meter(pixels_per_meter);
        info!(pixels_per_meter, "📐 像素/米已标定");
        Ok(pixels_per_meter)
    }

    /// 处理一帧检测结果
    pub fn process_frame(&mut self, frame: &FrameDetections) -> FrameReport {
        self.aggregator.observe_frame();

        let mut report = FrameReport {
            frame: frame.frame,
            ..Default::default()
        };

        for detection in &frame.detections {
            let track_id = detection.track_id;
            let history = self.tracks.update(track_id, detection.center);
            let speed = self.estimator.estimate(history);

            // 速度为0 (轨迹点不足或静止) 时不参与判定
            if speed <= 0.0 {
                continue;
            }

            let average_speed = self.smoother.record(track_id, speed);
            let severity = classify_with(average_speed, self.speed_limit, self.critical_speed);
            let vehicle_type = detection.vehicle_type();

            if is_speeding_live(average_speed, self.speed_limit) {
                report.speeding.push(SpeedingVehicle {
                    track_id,
                    speed: average_speed,
                    vehicle_type,
                });
            }

            report.readings.push(SpeedReading {
                track_id,
                vehicle_type,
                speed,
                average_speed,
                severity,
                at_center: frame
                    .frame_size
                    .map(|size| self.is_at_center(detection.center, size)),
            });
        }

        self.aggregator.observe_tracks(frame.track_ids());

        debug!(
            frame = frame.frame,
            detections = frame.detections.len(),
            speeding = report.speeding.len(),
            "帧处理完成"
        );
        report
    }

    /// 取证闸门: 额度未用完时返回true并计数
    pub fn try_capture(&mut self, track_id: TrackId) -> bool {
        self.throttle.try_capture(track_id)
    }

    /// 车辆中心是否在画面中心附近
    pub fn is_at_center(&self, center: TrackPoint, frame_size: (u32, u32)) -> bool {
        let frame_center = ((frame_size.0 / 2) as f64, (frame_size.1 / 2) as f64);
        let vehicle_center = (center.x.trunc(), center.y.trunc());
        let distance = ((vehicle_center.0 - frame_center.0).powi(2)
            + (vehicle_center.1 - frame_center.1).powi(2))
        .sqrt();
        distance <= self.center_threshold
    }

    /// 导出快照 (只读)
    pub fn export_snapshot(&self) -> Snapshot {
        self.aggregator.snapshot(&self.smoother, self.speed_limit)
    }

    pub fn tracks(&self) -> &TrackStore {
        &self.tracks
    }

    pub fn smoother(&self) -> &SpeedSmoother {
        &self.smoother
    }

    pub fn throttle(&self) -> &EvidenceThrottle {
        &self.throttle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::types::VehicleDetection;

    fn frame(index: u64, dets: &[(TrackId, f64, f64)]) -> FrameDetections {
        FrameDetections::new(
            index,
            dets.iter()
                .map(|&(id, x, y)| VehicleDetection::new(id, TrackPoint::new(x, y), 2))
                .collect(),
        )
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SpeedConfig {
            fps: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            SpeedEngine::new(&config),
            Err(ConfigError::InvalidFps(_))
        ));
    }

    #[test]
    fn test_first_sighting_has_no_reading() {
        let mut engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        let report = engine.process_frame(&frame(1, &[(1, 0.0, 0.0)]));
        assert!(report.readings.is_empty());
        assert!(engine.export_snapshot().vehicle_speeds.is_empty());
        assert_eq!(engine.export_snapshot().counters.total_frames, 1);
    }

    #[test]
    fn test_straight_line_speed() {
        let mut engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        engine.process_frame(&frame(1, &[(1, 0.0, 0.0)]));
        engine.process_frame(&frame(2, &[(1, 10.0, 0.0)]));
        let report = engine.process_frame(&frame(3, &[(1, 20.0, 0.0)]));

        let reading = &report.readings[0];
        assert!((reading.speed - 40.0).abs() < 1e-9);
        assert_eq!(reading.vehicle_type, "car");
        assert_eq!(reading.severity, Severity::Normal);
        assert!(report.speeding.is_empty());
    }

    #[test]
    fn test_fast_vehicle_is_reported_and_throttled() {
        let mut engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        // 每帧40px: 两点时 40px/10 = 4m / (2/30)s = 60 m/s × 2 = 120 km/h
        let mut captures = 0;
        for i in 0..10u64 {
            let report = engine.process_frame(&frame(i, &[(5, i as f64 * 40.0, 0.0)]));
            for vehicle in &report.speeding {
                if engine.try_capture(vehicle.track_id) {
                    captures += 1;
                }
            }
        }

        assert_eq!(captures, 3);
        assert_eq!(engine.throttle().count(5), 3);

        let snapshot = engine.export_snapshot();
        assert_eq!(snapshot.counters.speeding_vehicle_ids, vec![5]);
        assert_eq!(snapshot.record(5).unwrap().speeds.len(), 3);
        assert_eq!(snapshot.counters.total_vehicles, 5);
        assert_eq!(snapshot.counters.total_frames, 10);
    }

    #[test]
    fn test_bounded_histories_under_load() {
        let config = SpeedConfig {
            track_history_length: 5,
            speed_history_length: 7,
            ..Default::default()
        };
        let mut engine = SpeedEngine::new(&config).unwrap();
        for i in 0..200u64 {
            let x = (i * 13 % 97) as f64;
            engine.process_frame(&frame(i, &[(1, x, 0.0), (2, 0.0, x)]));
        }

        for id in [1, 2] {
            assert!(engine.tracks().history_len(id) <= 5);
            assert!(engine.smoother().history(id).map_or(0, |h| h.len()) <= 7);
        }
    }

    #[test]
    fn test_calibrate_changes_speed_scale() {
        let mut engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        assert_eq!(engine.calibrate(5.0, 100.0), Ok(20.0));
        assert!(engine.calibrate(0.0, 100.0).is_err());

        engine.process_frame(&frame(1, &[(1, 0.0, 0.0)]));
        engine.process_frame(&frame(2, &[(1, 10.0, 0.0)]));
        let report = engine.process_frame(&frame(3, &[(1, 20.0, 0.0)]));
        assert!((report.readings[0].speed - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_center_check() {
        let engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        assert!(engine.is_at_center(TrackPoint::new(640.0, 360.0), (1280, 720)));
        assert!(engine.is_at_center(TrackPoint::new(680.9, 390.0), (1280, 720)));
        assert!(!engine.is_at_center(TrackPoint::new(700.0, 400.0), (1280, 720)));
    }

    #[test]
    fn test_at_center_only_with_frame_size() {
        let mut engine = SpeedEngine::new(&SpeedConfig::default()).unwrap();
        engine.process_frame(&frame(1, &[(1, 600.0, 360.0)]));
        let report =
            engine.process_frame(&frame(2, &[(1, 640.0, 360.0)]).with_frame_size(1280, 720));
        assert_eq!(report.readings[0].at_center, Some(true));

        let report = engine.process_frame(&frame(3, &[(1, 680.0, 360.0)]));
        assert_eq!(report.readings[0].at_center, None);
    }

    #[test]
    fn test_configured_limit_drives_live_and_export() {
        let config = SpeedConfig {
            speed_limit: 130.0,
            ..Default::default()
        };
        let mut engine = SpeedEngine::new(&config).unwrap();
        // 120 km/h,默认限速下超速,限速130时不超速
        for i in 0..6u64 {
            let report = engine.process_frame(&frame(i, &[(5, i as f64 * 40.0, 0.0)]));
            assert!(report.speeding.is_empty());
        }

        let snapshot = engine.export_snapshot();
        assert!(snapshot.record(5).is_some());
        assert!(snapshot.counters.speeding_vehicle_ids.is_empty());
    }
}
