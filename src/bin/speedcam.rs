//! 车辆测速 (Speed Camera)
//!
//! 回放外部检测器/跟踪器的逐帧结果,估算车速并记录超速取证
//!
//! 系统架构:
//! 1. 读取线程: 解析检测结果文件 (独立工作线程)
//! 2. 主线程:   测速引擎逐帧处理
//! 3. 结束时:   导出速度数据与检测统计

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use speedcam_rs::output::{save_snapshot, EvidenceLog, OutputLayout};
use speedcam_rs::pipeline::{self, FrameSource, InputFilter, RunOptions};
use speedcam_rs::{init_logging, SpeedConfig, SpeedEngine};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(author, version, about = "车辆测速 - 超速检测与取证", long_about = None)]
struct Args {
    /// 检测结果文件 (JSON Lines, 每行一帧)
    #[arg(short, long)]
    detections: PathBuf,

    /// 配置文件 (不存在时自动创建)
    #[arg(short, long, default_value = "speed_config.json")]
    config: PathBuf,

    /// 输出目录
    #[arg(short, long, default_value = "outputs")]
    output_dir: PathBuf,

    /// 处理帧数上限
    #[arg(long)]
    max_frames: Option<u64>,

    /// 标定: 已知距离 (米),需配合 --calibration-pixels
    #[arg(long, requires = "calibration_pixels")]
    calibration_meters: Option<f64>,

    /// 标定: 已知距离对应的像素数
    #[arg(long, requires = "calibration_meters")]
    calibration_pixels: Option<f64>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    info!("🚀 车辆测速启动");
    let config = SpeedConfig::load(&args.config);
    config.print_summary();

    let mut engine = SpeedEngine::new(&config).context("invalid speed configuration")?;
    if let (Some(meters), Some(pixels)) = (args.calibration_meters, args.calibration_pixels) {
        engine
            .calibrate(meters, pixels)
            .context("invalid calibration sample")?;
    }

    let layout = OutputLayout::new(&args.output_dir);
    layout
        .ensure_dirs()
        .with_context(|| format!("cannot create {}", args.output_dir.display()))?;

    let source = FrameSource::open(&args.detections)
        .with_context(|| format!("cannot open {}", args.detections.display()))?;
    let mut evidence = EvidenceLog::open(&layout.evidence_log())?;

    let options = RunOptions {
        filter: InputFilter::new(config.vehicle_classes.clone(), config.vehicle_confidence),
        frame_skip: config.frame_skip,
        max_frames: args.max_frames,
    };

    let (frames, reader) = source.spawn();
    let summary = pipeline::run(&mut engine, &frames, &options, Some(&mut evidence));
    // 关闭通道,读取线程随之退出
    drop(frames);
    if reader.join().is_err() {
        error!("❌ 读取线程异常退出");
    }

    let snapshot = engine.export_snapshot();
    save_snapshot(&layout, &snapshot).context("failed to save speed data")?;

    info!(
        received = summary.frames_received,
        processed = summary.frames_processed,
        captures = summary.captures,
        "✅ 车辆测速完成"
    );
    Ok(())
}
