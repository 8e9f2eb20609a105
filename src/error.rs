use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
///
/// 每个组件都返回 `AppResult<T>`，编排层再用 anyhow 附加上下文
#[derive(Debug, Error)]
pub enum AppError {
    // ========== 输入文件 ==========
    /// 订单文件不存在
    #[error("订单文件不存在: {}", path.display())]
    MissingFile { path: PathBuf },

    /// 表头缺少必需的列
    #[error("订单文件缺少列 '{column}': {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// 某一行的字段数量或内容不合法
    #[error("订单文件第 {line} 行格式错误: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// 读取订单文件失败
    #[error("读取订单文件失败 ({}): {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// 下载订单文件失败
    #[error("下载 {url} 失败: {reason}")]
    Download { url: String, reason: String },

    // ========== 零件编号 ==========
    /// 型号信息表解析失败
    #[error("型号信息表第 {line} 行解析失败: {reason}")]
    TableParse { line: usize, reason: String },

    /// 订单引用了表中不存在的零件
    #[error("订单 {order_number} 的零件 '{part}' 不在型号信息表中")]
    UnknownPart { order_number: String, part: String },

    // ========== 页面 ==========
    /// 元素在限定时间内没有出现
    #[error("元素 {locator} 在 {timeout_ms}ms 内未显示")]
    RenderNotReady { locator: String, timeout_ms: u64 },

    /// 多次点击下单按钮后仍停留在表单页
    #[error("订单 {order_number} 提交 {attempts} 次后仍未成功")]
    SubmissionStuck { order_number: String, attempts: u32 },

    /// 浏览器 / CDP 调用失败
    #[error("浏览器错误: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// 页面脚本返回了意料之外的结果
    #[error("页面脚本执行失败: {0}")]
    Script(String),

    // ========== 回执 ==========
    /// 写入截图或 PDF 失败
    #[error("写入回执文件失败 ({}): {source}", path.display())]
    ReceiptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 把截图叠加到 PDF 失败
    #[error("截图叠加到 PDF 失败 ({}): {reason}", path.display())]
    PdfOverlay { path: PathBuf, reason: String },

    // ========== 归档 ==========
    /// 写入压缩包失败
    #[error("写入压缩包失败 ({}): {reason}", path.display())]
    ArchiveWrite { path: PathBuf, reason: String },

    /// 回执数量与已处理订单数量不一致
    #[error("回执数量不一致: 期望 {expected} 个 PDF，实际找到 {found} 个")]
    ArchiveIncomplete { expected: usize, found: usize },

    // ========== 配置 ==========
    /// 配置文件或环境变量不合法
    #[error("配置错误: {0}")]
    Config(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建行格式错误
    pub fn malformed_row(line: u64, reason: impl Into<String>) -> Self {
        AppError::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// 创建表格解析错误
    pub fn table_parse(line: usize, reason: impl Into<String>) -> Self {
        AppError::TableParse {
            line,
            reason: reason.into(),
        }
    }

    /// 创建 PDF 叠加错误
    pub fn pdf_overlay(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        AppError::PdfOverlay {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建压缩包写入错误
    pub fn archive_write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        AppError::ArchiveWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
