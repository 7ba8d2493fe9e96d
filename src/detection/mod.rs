/// 测速系统 (Speed Detection System)
///
/// 逐帧消费外部跟踪器的检测结果,维护每辆车的有界状态
/// - TrackStore:        位置历史
/// - SpeedEstimator:    速度估算
/// - SpeedSmoother:     速度平滑
/// - violation:         超速分级与判定
/// - EvidenceThrottle:  取证限流
/// - ResultAggregator:  统计与导出
pub mod aggregator;
pub mod engine;
pub mod evidence;
pub mod smoother;
pub mod speed;
pub mod track_store;
pub mod types;
pub mod violation;

pub use aggregator::{AggregateCounters, ResultAggregator, Snapshot, VehicleSpeedRecord};
pub use engine::{FrameReport, SpeedEngine, SpeedReading, SpeedingVehicle};
pub use evidence::EvidenceThrottle;
pub use smoother::{SpeedSmoother, SMOOTHING_WINDOW};
pub use speed::{estimate_speed, SpeedEstimator, SPEED_CALIBRATION_FACTOR};
pub use track_store::TrackStore;
pub use types::{FrameDetections, TrackId, TrackPoint, VehicleDetection};
pub use violation::{classify, is_speeding_live, is_speeding_recorded, Severity, CRITICAL_SPEED};
