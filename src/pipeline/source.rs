//! 检测结果读取 (FrameSource)
//! 职责: 逐行读取JSON Lines → 发送FrameRecord消息

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use tracing::{info, warn};

use super::FrameRecord;
use crate::error::{Result, SpeedcamError};

/// 通道容量 (帧)
pub const SOURCE_QUEUE_SIZE: usize = 120;

pub struct FrameSource {
    path: PathBuf,
    reader: BufReader<File>,
}

impl FrameSource {
    /// 打开输入文件,无法打开时返回致命错误
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SpeedcamError::InputStream {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            reader: BufReader::new(file),
        })
    }

    /// 在独立线程中读取,按行序发送到通道
    pub fn spawn(self) -> (Receiver<FrameRecord>, JoinHandle<u64>) {
        let (tx, rx) = crossbeam_channel::bounded(SOURCE_QUEUE_SIZE);
        let handle = thread::spawn(move || self.run(tx));
        (rx, handle)
    }

    /// 读取循环,返回发送的帧数
    ///
    /// 解析失败的行会被跳过;接收端关闭时停止
    pub fn run(self, tx: Sender<FrameRecord>) -> u64 {
        info!(path = %self.path.display(), "📹 检测结果读取启动");
        let mut sent = 0u64;

        for (line_no, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "⚠️ 读取失败,停止读取");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let record: FrameRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "⚠️ 跳过无法解析的行");
                    continue;
                }
            };

            if tx.send(record).is_err() {
                // 接收端已关闭 (提前停止)
                break;
            }
            sent += 1;
        }

        info!(frames = sent, "✅ 检测结果读取完成");
        sent
    }
}
