//! 罚单生成 (Challan generation)
//! 职责: 读取速度数据 + 车牌数据 → 计算罚款 → 导出 challan_data.json

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::fine::FineSchedule;
use crate::detection::TrackId;
use crate::error::Result;
use crate::gen_time_string;
use crate::output::{read_json_or_default, write_json_pretty, OutputLayout, SpeedData};

/// 车牌未识别时的显示文本
pub const PLATE_NOT_RECOGNIZED: &str = "Not Recognized";

/// 单次车牌识别结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateDetection {
    #[serde(default)]
    pub plate_text: Option<String>,
    #[serde(default)]
    pub plate_path: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// plate_data.json 中一辆车的条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlateEntry {
    #[serde(default)]
    pub plates: Vec<PlateDetection>,
    #[serde(default)]
    pub average_speed: Option<f64>,
}

pub type PlateData = BTreeMap<TrackId, PlateEntry>;

/// 罚单记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallanRecord {
    pub vehicle_id: TrackId,
    pub plate_text: String,
    pub plate_image: Option<String>,
    pub average_speed: f64,
    pub max_speed: f64,
    pub fine_amount: u64,
    pub location: String,
    pub timestamp: String,
}

/// 罚款参数
#[derive(Debug, Clone, PartialEq)]
pub struct ChallanPolicy {
    pub base_limit: f64,
    pub base_fine: u64,
    pub location: String,
    pub schedule: FineSchedule,
}

pub struct ChallanGenerator {
    speed_data: SpeedData,
    plate_data: PlateData,
    policy: ChallanPolicy,
}

impl ChallanGenerator {
    pub fn new(speed_data: SpeedData, plate_data: PlateData, policy: ChallanPolicy) -> Self {
        Self {
            speed_data,
            plate_data,
            policy,
        }
    }

    /// 从输出目录加载,文件缺失或损坏时使用空数据
    pub fn load(layout: &OutputLayout, policy: ChallanPolicy) -> Self {
        let speed_data: SpeedData = read_json_or_default(&layout.speed_data());
        let plate_data: PlateData = read_json_or_default(&layout.plate_data());
        info!(
            speed_records = speed_data.vehicle_speeds.len(),
            plate_records = plate_data.len(),
            "📂 罚单数据已加载"
        );
        Self::new(speed_data, plate_data, policy)
    }

    /// 罚款金额
    pub fn calculate_fine(&self, speed: f64) -> u64 {
        self.policy
            .schedule
            .amount(speed, self.policy.base_limit, self.policy.base_fine)
    }

    /// 为单车生成罚单,没有车牌数据时返回None
    pub fn generate(&self, vehicle_id: TrackId) -> Option<ChallanRecord> {
        let Some(entry) = self.plate_data.get(&vehicle_id) else {
            warn!(vehicle_id, "⚠️ 没有该车的车牌数据");
            return None;
        };

        // 置信度最高的车牌
        let Some(best_plate) = entry
            .plates
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        else {
            warn!(vehicle_id, "⚠️ 该车没有识别到车牌");
            return None;
        };

        let speed_record = self.speed_data.vehicle_speeds.get(&vehicle_id);
        let average_speed = entry
            .average_speed
            .or_else(|| speed_record.map(|r| r.average_speed))
            .unwrap_or(0.0);
        let max_speed = speed_record.map_or(0.0, |r| r.max_speed);

        let plate_text = best_plate
            .plate_text
            .clone()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| PLATE_NOT_RECOGNIZED.to_string());

        let record = ChallanRecord {
            vehicle_id,
            plate_text,
            plate_image: best_plate.plate_path.clone(),
            average_speed,
            max_speed,
            fine_amount: self.calculate_fine(average_speed),
            location: self.policy.location.clone(),
            timestamp: gen_time_string("-"),
        };

        info!(
            vehicle_id,
            plate = %record.plate_text,
            fine = record.fine_amount,
            "🧾 罚单已生成"
        );
        Some(record)
    }

    /// 为所有有车牌数据的车辆生成罚单
    pub fn generate_all(&self) -> Vec<ChallanRecord> {
        self.plate_data
            .keys()
            .filter_map(|&vehicle_id| self.generate(vehicle_id))
            .collect()
    }

    /// 导出 challan_data.json
    pub fn export(&self, layout: &OutputLayout, records: &[ChallanRecord]) -> Result<()> {
        let data: BTreeMap<TrackId, &ChallanRecord> =
            records.iter().map(|r| (r.vehicle_id, r)).collect();
        write_json_pretty(&layout.challan_data(), &data)?;
        info!(count = records.len(), "💾 罚单数据已导出");
        Ok(())
    }
}
