//! 取证限流: 每辆车最多截图 `max_captures` 次

use std::collections::HashMap;

use super::types::TrackId;

#[derive(Debug, Clone)]
pub struct EvidenceThrottle {
    counts: HashMap<TrackId, u32>,
    max_captures: u32,
}

impl EvidenceThrottle {
    pub fn new(max_captures: u32) -> Self {
        Self {
            counts: HashMap::new(),
            max_captures,
        }
    }

    /// 额度未用完时计数+1并返回true;已饱和时返回false,不修改状态
    pub fn try_capture(&mut self, track_id: TrackId) -> bool {
        if self.is_saturated(track_id) {
            return false;
        }
        *self.counts.entry(track_id).or_insert(0) += 1;
        true
    }

    /// 已截图次数
    pub fn count(&self, track_id: TrackId) -> u32 {
        self.counts.get(&track_id).copied().unwrap_or(0)
    }

    pub fn is_saturated(&self, track_id: TrackId) -> bool {
        self.count(track_id) >= self.max_captures
    }
}
