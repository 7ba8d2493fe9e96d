/// 检测回放流水线 (Detection replay pipeline)
///
/// 两线程架构,通过有界通道按顺序传递帧:
/// - FrameSource: 读取检测结果文件 (独立线程)
/// - run:         测速引擎逐帧处理 + 取证 (调用线程)
pub mod source;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::detection::{FrameDetections, SpeedEngine, TrackPoint, VehicleDetection};
use crate::gen_time_string;
use crate::output::{EvidenceCapture, EvidenceLog};

pub use source::FrameSource;

// ========== 输入消息类型 ==========

/// 单个检测框 (外部检测器/跟踪器输出)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// 跟踪ID,跟踪器未分配时为空
    #[serde(default)]
    pub track_id: Option<u32>,
    /// [cx, cy, w, h] 中心点格式
    pub bbox: [f64; 4],
    pub class_id: u32,
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// 一行输入 = 一帧
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub detections: Vec<DetectionRecord>,
}

// ========== 输入过滤 ==========

/// 按类别和置信度过滤检测框,丢弃无跟踪ID的框
#[derive(Clone, Debug)]
pub struct InputFilter {
    pub vehicle_classes: Vec<u32>,
    pub min_confidence: f32,
}

impl InputFilter {
    pub fn new(vehicle_classes: Vec<u32>, min_confidence: f32) -> Self {
        Self {
            vehicle_classes,
            min_confidence,
        }
    }

    pub fn accepts(&self, det: &DetectionRecord) -> bool {
        det.track_id.is_some()
            && self.vehicle_classes.contains(&det.class_id)
            && det.confidence >= self.min_confidence
    }

    pub fn to_frame(&self, record: &FrameRecord) -> FrameDetections {
        let detections = record
            .detections
            .iter()
            .filter(|det| self.accepts(det))
            .filter_map(|det| {
                let track_id = det.track_id?;
                let center = TrackPoint::new(det.bbox[0], det.bbox[1]);
                Some(VehicleDetection::new(track_id, center, det.class_id))
            })
            .collect();

        let frame = FrameDetections::new(record.frame, detections);
        match (record.width, record.height) {
            (Some(w), Some(h)) => frame.with_frame_size(w, h),
            _ => frame,
        }
    }
}

// ========== 运行循环 ==========

/// 运行参数
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub filter: InputFilter,
    /// 每N帧处理一帧
    pub frame_skip: u64,
    /// 处理帧数上限 (提前停止)
    pub max_frames: Option<u64>,
}

/// 运行统计
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub frames_received: u64,
    pub frames_processed: u64,
    pub captures: u64,
}

/// 逐帧处理,直到输入结束或达到帧数上限
///
/// 取证记录先写入清单,写入成功后才占用该车的截图额度;
/// 写入失败只记录错误,不中断处理
pub fn run(
    engine: &mut SpeedEngine,
    frames: &Receiver<FrameRecord>,
    options: &RunOptions,
    mut evidence: Option<&mut EvidenceLog>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let frame_skip = options.frame_skip.max(1);

    for record in frames.iter() {
        let index = summary.frames_received;
        summary.frames_received += 1;
        if index % frame_skip != 0 {
            continue;
        }

        let frame = options.filter.to_frame(&record);
        let report = engine.process_frame(&frame);
        summary.frames_processed += 1;

        for vehicle in &report.speeding {
            if engine.throttle().is_saturated(vehicle.track_id) {
                continue;
            }

            if let Some(log) = evidence.as_deref_mut() {
                let capture = EvidenceCapture {
                    track_id: vehicle.track_id,
                    speed: vehicle.speed,
                    vehicle_type: vehicle.vehicle_type.to_string(),
                    frame: record.frame,
                    file_name: EvidenceCapture::file_name_for(vehicle.track_id, vehicle.speed),
                    captured_at: gen_time_string("-"),
                };
                if let Err(e) = log.append(&capture) {
                    error!(track_id = vehicle.track_id, error = %e, "❌ 写入取证清单失败");
                    continue;
                }
            }

            if engine.try_capture(vehicle.track_id) {
                summary.captures += 1;
                info!(
                    track_id = vehicle.track_id,
                    speed = %format!("{:.1}", vehicle.speed),
                    vehicle_type = vehicle.vehicle_type,
                    "🚨 超速车辆"
                );
            }
        }

        if summary.frames_processed % 100 == 0 {
            debug!(
                processed = summary.frames_processed,
                received = summary.frames_received,
                tracks = engine.tracks().track_count(),
                "⏱️ 处理进度"
            );
        }

        if options
            .max_frames
            .is_some_and(|max| summary.frames_processed >= max)
        {
            info!(max_frames = summary.frames_processed, "⏹️ 达到帧数上限,提前停止");
            break;
        }
    }

    summary
}
