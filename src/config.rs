use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 默认配置文件名（存在时才会读取）
pub const DEFAULT_CONFIG_FILE: &str = "robot_order.toml";

/// 回执数量校验策略
///
/// 归档前比较输出目录里的 PDF 数量和已处理订单数量
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptCountPolicy {
    /// 不校验
    Ignore,
    /// 数量不一致时只打印警告
    #[default]
    Warn,
    /// 数量不一致时终止归档
    Enforce,
}

impl FromStr for ReceiptCountPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "warn" => Ok(Self::Warn),
            "enforce" => Ok(Self::Enforce),
            other => Err(AppError::Config(format!("未知的回执校验策略: {}", other))),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 下单页面
    pub order_page_url: String,
    /// 订单 CSV 下载地址
    pub orders_csv_url: String,
    /// 订单 CSV 本地路径
    pub orders_csv_path: String,
    /// 本地已有 CSV 时是否重新下载
    pub overwrite_orders_csv: bool,
    /// 截图、回执和压缩包的输出目录
    pub output_dir: String,
    /// 压缩包文件名（位于输出目录中）
    pub archive_name: String,
    /// 是否启动无头浏览器；为 false 时连接已打开的浏览器
    pub headless: bool,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 无头模式下使用的浏览器可执行文件
    pub chrome_executable: Option<String>,
    /// 等待元素显示的超时（毫秒）
    pub render_timeout_ms: u64,
    /// 下单按钮最多点击次数
    pub max_order_attempts: u32,
    /// 重试的初始等待（毫秒），每次翻倍
    pub order_retry_base_ms: u64,
    /// 重试等待的上限（毫秒）
    pub order_retry_max_ms: u64,
    pub receipt_count_policy: ReceiptCountPolicy,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order_page_url: "https://robotsparebinindustries.com/#/robot-order".to_string(),
            orders_csv_url: "https://robotsparebinindustries.com/orders.csv".to_string(),
            orders_csv_path: "orders.csv".to_string(),
            overwrite_orders_csv: true,
            output_dir: "output".to_string(),
            archive_name: "receipts.zip".to_string(),
            headless: true,
            browser_debug_port: 9222,
            chrome_executable: None,
            render_timeout_ms: 5000,
            max_order_attempts: 10,
            order_retry_base_ms: 250,
            order_retry_max_ms: 4000,
            receipt_count_policy: ReceiptCountPolicy::Warn,
            verbose_logging: false,
            output_log_file: "robot_order.log".to_string(),
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 读取 TOML 配置文件，缺省字段使用默认值
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("无法读取 {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("无法解析 {}: {}", path.display(), e)))
    }

    /// 配置文件（如果存在）+ 环境变量
    ///
    /// 配置文件路径由 `ROBOT_ORDER_CONFIG` 指定，默认 `robot_order.toml`
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("ROBOT_ORDER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let base = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 用环境变量覆盖已有的值
    pub fn with_env_overrides(self) -> Self {
        Self {
            order_page_url: std::env::var("ORDER_PAGE_URL").unwrap_or(self.order_page_url),
            orders_csv_url: std::env::var("ORDERS_CSV_URL").unwrap_or(self.orders_csv_url),
            orders_csv_path: std::env::var("ORDERS_CSV_PATH").unwrap_or(self.orders_csv_path),
            overwrite_orders_csv: env_or("OVERWRITE_ORDERS_CSV", self.overwrite_orders_csv),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            archive_name: std::env::var("ARCHIVE_NAME").unwrap_or(self.archive_name),
            headless: env_or("HEADLESS", self.headless),
            browser_debug_port: env_or("BROWSER_DEBUG_PORT", self.browser_debug_port),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().or(self.chrome_executable),
            render_timeout_ms: env_or("RENDER_TIMEOUT_MS", self.render_timeout_ms),
            max_order_attempts: env_or("MAX_ORDER_ATTEMPTS", self.max_order_attempts),
            order_retry_base_ms: env_or("ORDER_RETRY_BASE_MS", self.order_retry_base_ms),
            order_retry_max_ms: env_or("ORDER_RETRY_MAX_MS", self.order_retry_max_ms),
            receipt_count_policy: env_or("RECEIPT_COUNT_POLICY", self.receipt_count_policy),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 检查取值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.max_order_attempts == 0 {
            return Err(AppError::Config("max_order_attempts 必须大于 0".to_string()));
        }
        if self.render_timeout_ms == 0 {
            return Err(AppError::Config("render_timeout_ms 必须大于 0".to_string()));
        }
        if self.archive_name.trim().is_empty() {
            return Err(AppError::Config("archive_name 不能为空".to_string()));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_path().join(&self.archive_name)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }
}

/// 解析失败时保留原值
fn env_or<T: FromStr>(name: &str, current: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}
