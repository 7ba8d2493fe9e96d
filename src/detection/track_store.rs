//! 轨迹存储 (每个跟踪ID一条有界位置历史)

use std::collections::{HashMap, VecDeque};

use super::types::{TrackId, TrackPoint};

/// 按跟踪ID保存最近的中心点,每条历史最多 `capacity` 个点 (FIFO)
#[derive(Debug, Clone)]
pub struct TrackStore {
    tracks: HashMap<TrackId, VecDeque<TrackPoint>>,
    capacity: usize,
}

impl TrackStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            tracks: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// 追加位置,超出容量时淘汰最旧的点,返回当前历史
    ///
    /// 未见过的ID自动创建新轨迹
    pub fn update(&mut self, track_id: TrackId, position: TrackPoint) -> &[TrackPoint] {
        let capacity = self.capacity;
        let history = self
            .tracks
            .entry(track_id)
            .or_insert_with(|| VecDeque::with_capacity(capacity + 1));

        history.push_back(position);
        while history.len() > capacity {
            history.pop_front();
        }

        history.make_contiguous()
    }

    /// 获取轨迹历史 (按到达顺序)
    pub fn history(&self, track_id: TrackId) -> Option<impl Iterator<Item = &TrackPoint>> {
        self.tracks.get(&track_id).map(|h| h.iter())
    }

    /// 最新位置
    pub fn last_position(&self, track_id: TrackId) -> Option<TrackPoint> {
        self.tracks.get(&track_id).and_then(|h| h.back().copied())
    }

    pub fn history_len(&self, track_id: TrackId) -> usize {
        self.tracks.get(&track_id).map_or(0, |h| h.len())
    }

    /// 当前跟踪数量
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
