//! 回执归档服务 - 业务能力层
//!
//! 把输出目录里所有 PDF 打包成一个 zip

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::config::{Config, ReceiptCountPolicy};
use crate::error::{AppError, AppResult};

/// 归档结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
}

/// 回执归档服务
///
/// 条目按文件名排序，修改时间固定，同样的输入总是生成同样的字节
pub struct ReceiptArchiver {
    output_dir: PathBuf,
    archive_path: PathBuf,
    policy: ReceiptCountPolicy,
}

impl ReceiptArchiver {
    pub fn new(config: &Config) -> Self {
        Self::with_paths(
            config.output_path(),
            config.archive_path(),
            config.receipt_count_policy,
        )
    }

    pub fn with_paths(
        output_dir: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
        policy: ReceiptCountPolicy,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            archive_path: archive_path.into(),
            policy,
        }
    }

    /// 输出目录中的所有 PDF，按文件名排序
    ///
    /// 目录不存在时视为没有回执
    pub fn collect_receipts(&self) -> AppResult<Vec<PathBuf>> {
        if !self.output_dir.exists() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&self.output_dir).map_err(|e| self.write_error(&self.output_dir, e))?;

        let mut pdfs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| self.write_error(&self.output_dir, e))?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("pdf") {
                pdfs.push(path);
            }
        }
        pdfs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(pdfs)
    }

    /// 打包所有回执
    ///
    /// `expected` 是本次处理的订单数量，按校验策略与实际 PDF 数量比较
    pub fn archive(&self, expected: usize) -> AppResult<ArchiveSummary> {
        let pdfs = self.collect_receipts()?;
        self.check_count(expected, pdfs.len())?;

        if let Some(parent) = self.archive_path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(parent, e))?;
        }

        let file =
            File::create(&self.archive_path).map_err(|e| self.write_error(&self.archive_path, e))?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644);

        let mut names = Vec::with_capacity(pdfs.len());
        for pdf in &pdfs {
            let name = pdf
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| AppError::archive_write(pdf, "文件名不是合法的 UTF-8"))?
                .to_string();

            zip.start_file(name.as_str(), options)
                .map_err(|e| self.write_error(&self.archive_path, e))?;
            let mut source = File::open(pdf).map_err(|e| self.write_error(pdf, e))?;
            std::io::copy(&mut source, &mut zip).map_err(|e| self.write_error(pdf, e))?;
            names.push(name);
        }

        zip.finish()
            .map_err(|e| self.write_error(&self.archive_path, e))?;

        info!(
            "🗜️ 已归档 {} 个回执: {}",
            names.len(),
            self.archive_path.display()
        );

        Ok(ArchiveSummary {
            path: self.archive_path.clone(),
            entries: names,
        })
    }

    fn check_count(&self, expected: usize, found: usize) -> AppResult<()> {
        if expected == found {
            return Ok(());
        }
        match self.policy {
            ReceiptCountPolicy::Ignore => Ok(()),
            ReceiptCountPolicy::Warn => {
                warn!(
                    "⚠️ 回执数量不一致: 处理了 {} 个订单，找到 {} 个 PDF",
                    expected, found
                );
                Ok(())
            }
            ReceiptCountPolicy::Enforce => Err(AppError::ArchiveIncomplete { expected, found }),
        }
    }

    fn write_error(&self, path: &Path, reason: impl std::fmt::Display) -> AppError {
        AppError::archive_write(path, reason)
    }
}
