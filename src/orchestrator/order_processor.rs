//! 订单循环 - 编排层
//!
//! 逐张处理订单并累计统计。页面同一时刻只能填写一张表单，
//! 所以这里没有并发。

use tracing::{error, info};

use crate::error::AppResult;
use crate::infrastructure::OrderSurface;
use crate::models::{OrderRecord, PartNumberMap};
use crate::workflow::{OrderCtx, OrderFlow};

/// 订单处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrderStats {
    /// 成功生成回执的订单数
    pub processed: usize,
    /// 下单按钮的总点击次数
    pub submit_clicks: u32,
    /// 需要重试才提交成功的订单数
    pub retried: usize,
}

/// 按顺序处理所有订单
///
/// 任意一张订单失败都会立即返回错误，后面的订单不再处理
pub async fn process_orders(
    flow: &OrderFlow,
    surface: &dyn OrderSurface,
    parts: &PartNumberMap,
    records: &[OrderRecord],
) -> AppResult<OrderStats> {
    let total = records.len();
    let mut stats = OrderStats::default();

    for (index, record) in records.iter().enumerate() {
        let ctx = OrderCtx::new(record.order_number.clone(), index + 1, total);

        let outcome = match flow.run(surface, parts, record, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} ❌ 处理失败: {}", ctx, e);
                return Err(e);
            }
        };

        stats.processed += 1;
        stats.submit_clicks += outcome.attempts;
        if outcome.attempts > 1 {
            stats.retried += 1;
        }
    }

    info!("✓ {} 张订单全部处理完成", stats.processed);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::error::AppError;
    use crate::infrastructure::fake::FakeSurface;
    use crate::infrastructure::Locator;
    use crate::services::{FormSubmitter, ReceiptExporter, RetryPolicy};

    fn flow(dir: &std::path::Path) -> OrderFlow {
        let timeout = Duration::from_millis(50);
        OrderFlow::with_services(
            FormSubmitter::with_policy(
                RetryPolicy {
                    max_attempts: 3,
                    base_delay: Duration::ZERO,
                    max_delay: Duration::ZERO,
                },
                timeout,
            ),
            ReceiptExporter::with_output_dir(dir.join("output"), timeout),
        )
    }

    fn record(order_number: &str, body: &str) -> OrderRecord {
        OrderRecord {
            order_number: order_number.to_string(),
            head: "Roll-a-thor".to_string(),
            body: body.to_string(),
            legs: 2,
            address: "Address 123".to_string(),
        }
    }

    fn parts() -> PartNumberMap {
        PartNumberMap::parse("Model name\tPart number\n1\tRoll-a-thor\n2\tPeanut crusher").unwrap()
    }

    #[tokio::test]
    async fn test_counts_retries() {
        let dir = tempfile::tempdir().unwrap();
        // 第一张点一次成功，第二张点两次
        let surface = FakeSurface::new()
            .with_visibility(Locator::css("#order"), &[false, true, false])
            .with_text(Locator::css("#receipt"), "ok");
        let records = vec![record("1", "Roll-a-thor"), record("2", "Peanut crusher")];

        let stats = process_orders(&flow(dir.path()), &surface, &parts(), &records)
            .await
            .unwrap();

        assert_eq!(
            stats,
            OrderStats {
                processed: 2,
                submit_clicks: 3,
                retried: 1,
            }
        );
        assert!(dir.path().join("output/1.pdf").is_file());
        assert!(dir.path().join("output/2.pdf").is_file());
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let surface = FakeSurface::new()
            .with_visibility(Locator::css("#order"), &[false])
            .with_text(Locator::css("#receipt"), "ok");
        let records = vec![
            record("1", "Unknown"),
            record("2", "Peanut crusher"),
        ];

        let err = process_orders(&flow(dir.path()), &surface, &parts(), &records)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownPart { ref order_number, .. } if order_number == "1"));
        assert!(surface.actions().is_empty());
        assert!(!dir.path().join("output/2.pdf").exists());
    }

    #[tokio::test]
    async fn test_no_orders() {
        let dir = tempfile::tempdir().unwrap();
        let surface = FakeSurface::new();

        let stats = process_orders(&flow(dir.path()), &surface, &parts(), &[])
            .await
            .unwrap();
        assert_eq!(stats, OrderStats::default());
        assert!(surface.actions().is_empty());
    }
}
