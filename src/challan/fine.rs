//! 罚款分档 (Fine schedule)
//!
//! | 超速幅度 (km/h) | 罚款       |
//! |-----------------|------------|
//! | ≤ 0             | 0          |
//! | (0, 20]         | 基础罚款    |
//! | (20, 40]        | 基础罚款×2  |
//! | (40, 60]        | 基础罚款×4  |
//! | > 60            | 基础罚款×8  |

/// 一个罚款档位: 超速幅度上限 (含) → 基础罚款倍数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineBand {
    pub max_excess: f64,
    pub multiplier: u64,
}

const STANDARD_BANDS: [FineBand; 4] = [
    FineBand {
        max_excess: 20.0,
        multiplier: 1,
    },
    FineBand {
        max_excess: 40.0,
        multiplier: 2,
    },
    FineBand {
        max_excess: 60.0,
        multiplier: 4,
    },
    FineBand {
        max_excess: f64::INFINITY,
        multiplier: 8,
    },
];

/// 罚款分档表 (按 `max_excess` 升序)
#[derive(Debug, Clone, PartialEq)]
pub struct FineSchedule {
    bands: Vec<FineBand>,
}

impl Default for FineSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl FineSchedule {
    pub fn standard() -> Self {
        Self {
            bands: STANDARD_BANDS.to_vec(),
        }
    }

    /// 计算罚款金额,档位上限为闭区间
    pub fn amount(&self, speed: f64, base_limit: f64, base_fine: u64) -> u64 {
        let excess = speed - base_limit;
        if excess <= 0.0 {
            return 0;
        }

        let multiplier = self
            .bands
            .iter()
            .find(|band| excess <= band.max_excess)
            .or(self.bands.last())
            .map_or(0, |band| band.multiplier);

        base_fine.saturating_mul(multiplier)
    }
}

/// 按标准分档计算罚款
pub fn fine(speed: f64, base_limit: f64, base_fine: u64) -> u64 {
    FineSchedule::standard().amount(speed, base_limit, base_fine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_table() {
        assert_eq!(fine(95.0, 80.0, 1000), 1000);
        assert_eq!(fine(115.0, 80.0, 1000), 2000);
        assert_eq!(fine(135.0, 80.0, 1000), 4000);
        assert_eq!(fine(200.0, 80.0, 1000), 8000);
        assert_eq!(fine(70.0, 80.0, 1000), 0);
    }

    #[test]
    fn test_upper_edges_are_inclusive() {
        assert_eq!(fine(80.0, 80.0, 1000), 0);
        assert_eq!(fine(100.0, 80.0, 1000), 1000);
        assert_eq!(fine(120.0, 80.0, 1000), 2000);
        assert_eq!(fine(140.0, 80.0, 1000), 4000);
        assert_eq!(fine(140.5, 80.0, 1000), 8000);
        assert_eq!(fine(80.01, 80.0, 1000), 1000);
    }

    #[test]
    fn test_base_fine_scales() {
        assert_eq!(fine(125.0, 80.0, 500), 2000);
        assert_eq!(fine(125.0, 80.0, 0), 0);
    }
}
