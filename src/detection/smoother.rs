//! 速度平滑 (滑动平均)

use std::collections::{HashMap, VecDeque};

use super::types::TrackId;

/// 滑动平均窗口大小 (与速度历史容量无关)
pub const SMOOTHING_WINDOW: usize = 10;

/// 按跟踪ID保存有界速度历史并计算滑动平均
#[derive(Debug, Clone)]
pub struct SpeedSmoother {
    histories: HashMap<TrackId, VecDeque<f64>>,
    capacity: usize,
}

impl SpeedSmoother {
    pub fn new(capacity: usize) -> Self {
        Self {
            histories: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// 记录一次速度估算,返回最近 `min(10, len)` 个样本的平均值
    ///
    /// 只有正速度会写入历史;历史为空时返回0
    pub fn record(&mut self, track_id: TrackId, speed: f64) -> f64 {
        if speed > 0.0 {
            let capacity = self.capacity;
            let history = self
                .histories
                .entry(track_id)
                .or_insert_with(|| VecDeque::with_capacity(capacity + 1));
            history.push_back(speed);
            while history.len() > capacity {
                history.pop_front();
            }
        }

        self.average(track_id)
    }

    /// 当前滑动平均 (不修改状态)
    pub fn average(&self, track_id: TrackId) -> f64 {
        let Some(history) = self.histories.get(&track_id) else {
            return 0.0;
        };
        let window = history.len().min(SMOOTHING_WINDOW);
        if window == 0 {
            return 0.0;
        }
        history.iter().rev().take(window).sum::<f64>() / window as f64
    }

    /// 速度历史 (按到达顺序)
    pub fn history(&self, track_id: TrackId) -> Option<&VecDeque<f64>> {
        self.histories.get(&track_id)
    }

    /// 所有速度历史非空的跟踪
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &VecDeque<f64>)> {
        self.histories
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(id, h)| (*id, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_speeds_not_recorded() {
        let mut smoother = SpeedSmoother::new(10);
        assert_eq!(smoother.record(1, 0.0), 0.0);
        assert_eq!(smoother.record(1, -5.0), 0.0);
        assert!(smoother.history(1).is_none());

        smoother.record(1, 50.0);
        smoother.record(1, 0.0);
        assert_eq!(smoother.history(1).unwrap().len(), 1);
    }

    #[test]
    fn test_average_of_short_history() {
        let mut smoother = SpeedSmoother::new(100);
        smoother.record(3, 40.0);
        let avg = smoother.record(3, 60.0);
        assert!((avg - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_is_last_ten_samples() {
        let mut smoother = SpeedSmoother::new(100);
        for _ in 0..5 {
            smoother.record(1, 1000.0);
        }
        let mut avg = 0.0;
        for _ in 0..10 {
            avg = smoother.record(1, 20.0);
        }
        assert!((avg - 20.0).abs() < 1e-9);
        assert_eq!(smoother.history(1).unwrap().len(), 15);
    }

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut smoother = SpeedSmoother::new(4);
        for i in 1..=9 {
            smoother.record(2, i as f64);
            assert!(smoother.history(2).unwrap().len() <= 4);
        }
        let kept: Vec<f64> = smoother.history(2).unwrap().iter().copied().collect();
        assert_eq!(kept, vec![6.0, 7.0, 8.0, 9.0]);
        // 容量小于窗口时按实际长度求平均
        assert!((smoother.average(2) - 7.5).abs() < 1e-9);
    }
}
