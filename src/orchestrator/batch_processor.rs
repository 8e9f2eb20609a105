//! 应用与流水线 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责整条流水线的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、下载订单 CSV、打开浏览器
//! 2. **预检**：读取型号表，确认所有订单的型号都能翻译
//! 3. **订单循环**：委托 order_processor 逐张处理
//! 4. **归档**：把所有回执打包成 zip
//! 5. **全局统计**：输出处理结果
//!
//! 流水线本身只依赖 `OrderSurface`，不关心背后是真实浏览器还是测试替身。

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{OrderSurface, PageSurface};
use crate::models::{download_orders_csv, OrderSource};
use crate::orchestrator::order_processor::{process_orders, OrderStats};
use crate::services::{ArchiveSummary, PartNumberResolver, ReceiptArchiver};
use crate::utils::logging;
use crate::workflow::OrderFlow;

/// 一次完整运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: OrderStats,
    pub archive: ArchiveSummary,
}

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    surface: PageSurface,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(&config);

        download_orders_csv(
            &config.orders_csv_url,
            std::path::Path::new(&config.orders_csv_path),
            config.overwrite_orders_csv,
        )
        .await?;

        info!("🌐 正在打开下单页面: {}", config.order_page_url);
        let (browser, surface) = browser::open_order_surface(&config).await?;

        Ok(Self {
            config,
            _browser: browser,
            surface,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let outcome = run_pipeline(&self.config, &self.surface).await;

        let line = match &outcome {
            Ok(summary) => format!(
                "成功 {} 张订单，归档 {} 个回执",
                summary.stats.processed,
                summary.archive.entries.len()
            ),
            Err(e) => format!("运行失败: {}", e),
        };
        logging::append_summary(&self.config.output_log_file, &line)?;

        let summary = outcome?;
        logging::print_final_stats(&summary.stats, &summary.archive, &self.config);
        Ok(())
    }
}

/// 在已打开的下单页面上运行整条流水线
///
/// 关闭弹窗 → 读取型号表 → 加载订单并预检 → 逐张下单 → 归档
pub async fn run_pipeline(config: &Config, surface: &dyn OrderSurface) -> AppResult<RunSummary> {
    let flow = OrderFlow::new(config);

    surface.goto(&config.order_page_url).await?;
    flow.submitter().close_modal(surface).await?;

    let parts = PartNumberResolver::new(config).resolve(surface).await?;

    info!("\n📁 正在读取订单文件: {}", config.orders_csv_path);
    let records = OrderSource::new(&config.orders_csv_path).load_all()?;
    if records.is_empty() {
        warn!("⚠️ 订单文件中没有订单");
    } else {
        info!("✓ 找到 {} 张待处理的订单", records.len());
    }
    parts.check_covers(&records)?;

    let stats = process_orders(&flow, surface, &parts, &records).await?;
    let archive = ReceiptArchiver::new(config).archive(stats.processed)?;

    Ok(RunSummary { stats, archive })
}
