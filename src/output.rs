//! 结果持久化 (JSON)
//!
//! 目录结构:
//! ```text
//! <root>/speeding/speed_data.json
//! <root>/speeding/evidence.jsonl
//! <root>/detections/detection_results.json
//! <root>/plates/plate_data.json
//! <root>/challans/challan_data.json
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::detection::{AggregateCounters, Snapshot, TrackId, VehicleSpeedRecord};
use crate::error::Result;

/// speed_data.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedData {
    pub vehicle_speeds: BTreeMap<TrackId, VehicleSpeedRecord>,
}

/// 取证记录 (图像本身由外部模块保存)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCapture {
    pub track_id: TrackId,
    pub speed: f64,
    pub vehicle_type: String,
    pub frame: u64,
    pub file_name: String,
    pub captured_at: String,
}

impl EvidenceCapture {
    pub fn file_name_for(track_id: TrackId, speed: f64) -> String {
        format!("vehicle_{}_{:.1}kmh.jpg", track_id, speed)
    }
}

/// 输出目录布局
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn speeding_dir(&self) -> PathBuf {
        self.root.join("speeding")
    }

    pub fn speed_data(&self) -> PathBuf {
        self.speeding_dir().join("speed_data.json")
    }

    pub fn evidence_log(&self) -> PathBuf {
        self.speeding_dir().join("evidence.jsonl")
    }

    pub fn detection_results(&self) -> PathBuf {
        self.root.join("detections").join("detection_results.json")
    }

    pub fn plate_data(&self) -> PathBuf {
        self.root.join("plates").join("plate_data.json")
    }

    pub fn challan_data(&self) -> PathBuf {
        self.root.join("challans").join("challan_data.json")
    }

    /// 创建输出目录
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in ["speeding", "detections", "plates", "challans"] {
            fs::create_dir_all(self.root.join(dir))?;
        }
        Ok(())
    }
}

/// 写入格式化JSON
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// 读取JSON,文件缺失或损坏时返回默认值
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let parsed: std::result::Result<T, String> = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str(&json).map_err(|e| e.to_string()));

    match parsed {
        Ok(value) => value,
        Err(e) => {
            error!(path = %path.display(), error = %e, "❌ 读取数据失败,使用空数据");
            T::default()
        }
    }
}

/// 保存导出快照: 速度数据 + 检测统计
pub fn save_snapshot(layout: &OutputLayout, snapshot: &Snapshot) -> Result<()> {
    let speed_data = SpeedData {
        vehicle_speeds: snapshot.vehicle_speeds.clone(),
    };
    write_json_pretty(&layout.speed_data(), &speed_data)?;
    write_json_pretty(&layout.detection_results(), &snapshot.counters)?;

    let AggregateCounters {
        total_frames,
        total_vehicles,
        speeding_vehicles,
        speeding_vehicle_ids,
    } = &snapshot.counters;
    info!("💾 速度数据与检测结果已保存");
    info!(
        total_frames,
        total_vehicles,
        speeding_vehicles,
        speeding_vehicle_ids = ?speeding_vehicle_ids,
        "📊 运行统计"
    );
    Ok(())
}

/// 取证记录追加写入 (JSON Lines)
pub struct EvidenceLog {
    writer: BufWriter<File>,
}

impl EvidenceLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn append(&mut self, capture: &EvidenceCapture) -> Result<()> {
        serde_json::to_writer(&mut self.writer, capture)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
