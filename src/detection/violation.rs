//! 超速判定 (Violation classification)

use serde::{Deserialize, Serialize};

/// 显示分级的固定上限 (km/h),与限速参数无关
pub const CRITICAL_SPEED: f64 = 100.0;

/// 超速等级 (用于显示颜色)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 未超速 (绿色)
    Normal,
    /// 超过限速但不超过临界速度 (橙色)
    Elevated,
    /// 超过临界速度 (红色)
    Critical,
}

impl Severity {
    /// 显示颜色 (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Severity::Normal => (0, 255, 0),
            Severity::Elevated => (255, 165, 0),
            Severity::Critical => (255, 0, 0),
        }
    }
}

/// 按默认临界速度分级
pub fn classify(average_speed: f64, limit: f64) -> Severity {
    classify_with(average_speed, limit, CRITICAL_SPEED)
}

/// 分级: 先判临界速度,再判限速
pub fn classify_with(average_speed: f64, limit: f64, critical_speed: f64) -> Severity {
    if average_speed > critical_speed {
        Severity::Critical
    } else if average_speed > limit {
        Severity::Elevated
    } else {
        Severity::Normal
    }
}

/// 实时判定: 平滑速度超过限速 → 触发取证
pub fn is_speeding_live(average_speed: f64, limit: f64) -> bool {
    average_speed > limit
}

/// 导出判定: 历史最高速度超过限速 → 计入超速车辆
pub fn is_speeding_recorded(max_speed: f64, limit: f64) -> bool {
    max_speed > limit
}
