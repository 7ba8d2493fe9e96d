//! 结果汇总 (Result aggregation)
//!
//! 统计处理帧数/车辆数,并从当前速度历史导出每辆车的速度记录。
//! 导出只读,可重复调用,每次都按当前状态重新计算。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::smoother::SpeedSmoother;
use super::types::TrackId;
use super::violation::is_speeding_recorded;

/// 单车速度记录 (导出快照)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpeedRecord {
    /// 速度历史的前 C 个样本
    pub speeds: Vec<f64>,
    /// `speeds` 的平均值
    pub average_speed: f64,
    /// 完整速度历史中的最高速度
    pub max_speed: f64,
}

/// 全局统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateCounters {
    pub total_frames: u64,
    /// 近似车辆数: 取最大跟踪ID,而不是真实去重计数
    pub total_vehicles: TrackId,
    pub speeding_vehicles: usize,
    pub speeding_vehicle_ids: Vec<TrackId>,
}

/// 导出快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub counters: AggregateCounters,
    pub vehicle_speeds: BTreeMap<TrackId, VehicleSpeedRecord>,
}

impl Snapshot {
    pub fn record(&self, track_id: TrackId) -> Option<&VehicleSpeedRecord> {
        self.vehicle_speeds.get(&track_id)
    }
}

#[derive(Debug, Clone)]
pub struct ResultAggregator {
    total_frames: u64,
    max_track_id: TrackId,
    capture_cap: usize,
}

impl ResultAggregator {
    pub fn new(capture_cap: usize) -> Self {
        Self {
            total_frames: 0,
            max_track_id: 0,
            capture_cap,
        }
    }

    /// 每处理一帧调用一次
    pub fn observe_frame(&mut self) {
        self.total_frames += 1;
    }

    /// 用本帧出现的跟踪ID更新车辆数 (取最大ID)
    pub fn observe_tracks<I>(&mut self, track_ids: I)
    where
        I: IntoIterator<Item = TrackId>,
    {
        if let Some(max_id) = track_ids.into_iter().max() {
            self.max_track_id = self.max_track_id.max(max_id);
        }
    }

    pub fn total_vehicles(&self) -> TrackId {
        self.max_track_id
    }

    /// 导出快照
    ///
    /// `speeds` 取速度历史的前 C 个 (不是最近 C 个);`max_speed` 取完整历史。
    /// 超速判定使用调用方传入的限速,与逐帧判定共用同一个值。
    pub fn snapshot(&self, smoother: &SpeedSmoother, speed_limit: f64) -> Snapshot {
        let mut vehicle_speeds = BTreeMap::new();
        for (track_id, history) in smoother.iter() {
            let speeds: Vec<f64> = history.iter().take(self.capture_cap).copied().collect();
            let average_speed = if speeds.is_empty() {
                0.0
            } else {
                speeds.iter().sum::<f64>() / speeds.len() as f64
            };
            let max_speed = history.iter().copied().fold(0.0, f64::max);

            vehicle_speeds.insert(
                track_id,
                VehicleSpeedRecord {
                    speeds,
                    average_speed,
                    max_speed,
                },
            );
        }

        let speeding_vehicle_ids: Vec<TrackId> = vehicle_speeds
            .iter()
            .filter(|(_, record)| is_speeding_recorded(record.max_speed, speed_limit))
            .map(|(id, _)| *id)
            .collect();

        Snapshot {
            counters: AggregateCounters {
                total_frames: self.total_frames,
                total_vehicles: self.max_track_id,
                speeding_vehicles: speeding_vehicle_ids.len(),
                speeding_vehicle_ids,
            },
            vehicle_speeds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_vehicles_is_max_track_id() {
        let mut agg = ResultAggregator::new(3);
        agg.observe_tracks([3, 17, 5]);
        agg.observe_tracks([2]);
        agg.observe_tracks(std::iter::empty());
        assert_eq!(agg.total_vehicles(), 17);
    }

    #[test]
    fn test_frames_counted() {
        let mut agg = ResultAggregator::new(3);
        for _ in 0..4 {
            agg.observe_frame();
        }
        assert_eq!(agg.snapshot(&SpeedSmoother::new(10), 80.0).counters.total_frames, 4);
    }

    #[test]
    fn test_export_uses_first_c_samples() {
        let mut smoother = SpeedSmoother::new(100);
        for speed in [50.0, 60.0, 70.0, 120.0, 130.0] {
            smoother.record(4, speed);
        }
        let agg = ResultAggregator::new(3);
        let snapshot = agg.snapshot(&smoother, 80.0);

        let record = snapshot.record(4).unwrap();
        assert_eq!(record.speeds, vec![50.0, 60.0, 70.0]);
        assert!((record.average_speed - 60.0).abs() < 1e-9);
        assert_eq!(record.max_speed, 130.0);
        // 按最高速度计入超速,即使前C个样本的平均值未超速
        assert_eq!(snapshot.counters.speeding_vehicle_ids, vec![4]);
        assert_eq!(snapshot.counters.speeding_vehicles, 1);
    }

    #[test]
    fn test_tracks_without_speeds_are_not_exported() {
        let mut smoother = SpeedSmoother::new(10);
        smoother.record(1, 0.0);
        smoother.record(2, 30.0);
        let snapshot = ResultAggregator::new(3).snapshot(&smoother, 80.0);

        assert!(snapshot.record(1).is_none());
        assert!(snapshot.record(2).is_some());
        assert!(snapshot.counters.speeding_vehicle_ids.is_empty());
    }

    #[test]
    fn test_export_is_idempotent() {
        let mut smoother = SpeedSmoother::new(10);
        for (id, speed) in [(1, 90.0), (2, 40.0), (3, 85.5), (1, 95.0)] {
            smoother.record(id, speed);
        }
        let mut agg = ResultAggregator::new(3);
        agg.observe_frame();
        agg.observe_tracks([1, 2, 3]);

        let first = serde_json::to_string(&agg.snapshot(&smoother, 80.0)).unwrap();
        let second = serde_json::to_string(&agg.snapshot(&smoother, 80.0)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_speeding_ids_follow_given_limit() {
        let mut smoother = SpeedSmoother::new(10);
        smoother.record(1, 70.0);
        smoother.record(2, 90.0);
        let agg = ResultAggregator::new(3);

        assert_eq!(agg.snapshot(&smoother, 80.0).counters.speeding_vehicle_ids, vec![2]);
        assert_eq!(agg.snapshot(&smoother, 60.0).counters.speeding_vehicle_ids, vec![1, 2]);
        // 恰好等于限速不算超速
        assert!(agg.snapshot(&smoother, 90.0).counters.speeding_vehicle_ids.is_empty());
    }
}
