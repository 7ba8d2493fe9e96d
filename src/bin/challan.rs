//! 罚单生成 (Challan Generation)
//!
//! 读取测速导出的速度数据与车牌识别数据,计算罚款并导出罚单数据

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use speedcam_rs::challan::{ChallanGenerator, ChallanPolicy};
use speedcam_rs::output::OutputLayout;
use speedcam_rs::{init_logging, FineSchedule, SpeedConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "罚单生成系统", long_about = None)]
struct Args {
    /// 只为指定车辆生成罚单
    #[arg(long)]
    vehicle_id: Option<u32>,

    /// 配置文件
    #[arg(short, long, default_value = "speed_config.json")]
    config: PathBuf,

    /// 输出目录 (测速结果所在目录)
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = SpeedConfig::load(&args.config);
    config.validate().context("invalid speed configuration")?;

    let layout = OutputLayout::new(&args.output_dir);
    layout
        .ensure_dirs()
        .with_context(|| format!("cannot create {}", args.output_dir.display()))?;

    let policy = ChallanPolicy {
        base_limit: config.speed_limit,
        base_fine: config.base_fine,
        location: config.location.clone(),
        schedule: FineSchedule::standard(),
    };
    let generator = ChallanGenerator::load(&layout, policy);

    let records: Vec<_> = match args.vehicle_id {
        Some(vehicle_id) => generator.generate(vehicle_id).into_iter().collect(),
        None => generator.generate_all(),
    };
    if records.is_empty() {
        warn!("⚠️ 没有生成任何罚单");
    }

    generator
        .export(&layout, &records)
        .context("failed to export challan data")?;
    info!("✅ 罚单生成完成");
    Ok(())
}
