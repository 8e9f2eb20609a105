//! 订单处理流程 - 流程层
//!
//! 核心职责：定义"一张订单"的完整处理流程
//!
//! 流程顺序：
//! 1. 翻译型号 → 填表 → 预览 → 截图
//! 2. 下单（有限次重试）
//! 3. 打印回执 → 再来一单 → 把截图嵌入回执

use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::OrderSurface;
use crate::models::{OrderRecord, PartNumberMap, Receipt};
use crate::services::{FormSubmitter, ReceiptExporter};
use crate::workflow::order_ctx::OrderCtx;

/// 单张订单的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderOutcome {
    pub receipt: Receipt,
    /// 下单按钮实际点击次数
    pub attempts: u32,
}

/// 订单处理流程
///
/// - 编排单张订单从填表到回执的全部步骤
/// - 不持有任何资源（page）
/// - 只依赖业务能力（services）
pub struct OrderFlow {
    submitter: FormSubmitter,
    exporter: ReceiptExporter,
}

impl OrderFlow {
    pub fn new(config: &Config) -> Self {
        Self::with_services(FormSubmitter::new(config), ReceiptExporter::new(config))
    }

    pub fn with_services(submitter: FormSubmitter, exporter: ReceiptExporter) -> Self {
        Self {
            submitter,
            exporter,
        }
    }

    pub fn submitter(&self) -> &FormSubmitter {
        &self.submitter
    }

    pub async fn run(
        &self,
        surface: &dyn OrderSurface,
        parts: &PartNumberMap,
        record: &OrderRecord,
        ctx: &OrderCtx,
    ) -> AppResult<OrderOutcome> {
        let order = parts.resolve(record)?;
        let receipt = self.exporter.receipt_for(&record.order_number);
        info!(
            "{} 🤖 {} / {} / {} 条腿",
            ctx, order.head, order.body, order.legs
        );

        self.submitter.fill_form(surface, &order).await?;
        self.submitter.preview(surface).await?;

        // 下单后预览图会被回执替换，必须先截图
        self.exporter.capture_preview(surface, &receipt).await?;

        let attempts = self.submitter.submit(surface, &order).await?;
        debug!("{} 下单完成，点击 {} 次", ctx, attempts);

        self.exporter.export_receipt(surface, &receipt).await?;
        self.submitter.order_another(surface).await?;
        self.exporter.embed_screenshot(&receipt)?;

        info!("{} ✓ 回执已生成: {}", ctx, receipt.pdf_path.display());
        Ok(OrderOutcome { receipt, attempts })
    }
}
