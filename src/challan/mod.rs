/// 罚单系统 (Challan System)
///
/// - fine:      罚款分档计算
/// - generator: 读取导出的速度记录与车牌数据,生成罚单数据
pub mod fine;
pub mod generator;

pub use fine::{fine, FineBand, FineSchedule};
pub use generator::{ChallanGenerator, ChallanPolicy, ChallanRecord, PlateData, PlateEntry};
