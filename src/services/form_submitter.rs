//! 表单提交服务 - 业务能力层
//!
//! 只负责"把一张已翻译的订单填进表单并提交"，不关心回执和文件

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Locator, OrderSurface};
use crate::models::ResolvedOrder;

/// 下单按钮的重试策略
///
/// 第 n 次点击之后等待 `base_delay * 2^(n-1)`，不超过 `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_order_attempts.max(1),
            base_delay: Duration::from_millis(config.order_retry_base_ms),
            max_delay: Duration::from_millis(config.order_retry_max_ms),
        }
    }

    /// 第 `attempt` 次（从 1 开始）点击之后的等待时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// 表单提交服务
///
/// 职责：
/// - 关闭弹窗、填写表单、预览、下单、再来一单
/// - 只处理单个订单
/// - 下单按钮的点击次数有上限
pub struct FormSubmitter {
    retry: RetryPolicy,
    timeout: Duration,
}

impl FormSubmitter {
    pub fn new(config: &Config) -> Self {
        Self::with_policy(RetryPolicy::from_config(config), config.render_timeout())
    }

    pub fn with_policy(retry: RetryPolicy, timeout: Duration) -> Self {
        Self { retry, timeout }
    }

    /// 关闭打开页面和每次下单后出现的提示弹窗
    pub async fn close_modal(&self, surface: &dyn OrderSurface) -> AppResult<()> {
        let ok_button = Locator::button_containing("OK");
        surface.wait_for_visible(&ok_button, self.timeout).await?;
        surface.click(&ok_button).await?;
        debug!("已关闭弹窗");
        Ok(())
    }

    /// 按固定顺序填写表单
    pub async fn fill_form(&self, surface: &dyn OrderSurface, order: &ResolvedOrder) -> AppResult<()> {
        debug!(
            "填写订单 {}: head={}, body={}, legs={}",
            order.order_number, order.head, order.body, order.legs
        );

        surface
            .select_option(&Locator::css("#head"), &order.head_option_label())
            .await?;
        surface
            .click(&Locator::label_containing(&order.body_label()))
            .await?;
        surface
            .fill(
                &Locator::input_after_label("3. Legs:"),
                &order.legs.to_string(),
            )
            .await?;
        surface
            .fill(&Locator::css("#address"), &order.address)
            .await?;
        Ok(())
    }

    /// 点击预览，生成机器人图片
    pub async fn preview(&self, surface: &dyn OrderSurface) -> AppResult<()> {
        surface.click(&Locator::css("#preview")).await
    }

    /// 点击下单，直到下单按钮消失
    ///
    /// 返回实际点击次数；超过上限返回 `SubmissionStuck`
    pub async fn submit(&self, surface: &dyn OrderSurface, order: &ResolvedOrder) -> AppResult<u32> {
        let order_button = Locator::css("#order");

        for attempt in 1..=self.retry.max_attempts {
            surface.click(&order_button).await?;
            sleep(self.retry.delay_for(attempt)).await;

            if !surface.is_visible(&order_button).await? {
                if attempt > 1 {
                    info!("订单 {} 第 {} 次点击后提交成功", order.order_number, attempt);
                }
                return Ok(attempt);
            }

            warn!(
                "⚠️ 订单 {} 提交未生效 (尝试 {}/{})",
                order.order_number, attempt, self.retry.max_attempts
            );
        }

        Err(AppError::SubmissionStuck {
            order_number: order.order_number.clone(),
            attempts: self.retry.max_attempts,
        })
    }

    /// 回到空白表单
    pub async fn order_another(&self, surface: &dyn OrderSurface) -> AppResult<()> {
        surface.click(&Locator::css("#order-another")).await?;
        self.close_modal(surface).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake::{Action, FakeSurface};
    use crate::models::{OrderRecord, PartNumberMap};

    fn instant_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    fn scenario_order() -> ResolvedOrder {
        let map: PartNumberMap = [
            ("2".to_string(), "Head-X".to_string()),
            ("3".to_string(), "Body-Y".to_string()),
        ]
        .into_iter()
        .collect();
        let record = OrderRecord {
            order_number: "1".to_string(),
            head: "2".to_string(),
            body: "3".to_string(),
            legs: 4,
            address: "Main St 1".to_string(),
        };
        map.resolve(&record).unwrap()
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_millis(4000),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(5), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn test_fill_form_uses_translated_labels() {
        let surface = FakeSurface::new();
        let submitter = FormSubmitter::with_policy(instant_policy(3), Duration::from_millis(50));

        submitter.fill_form(&surface, &scenario_order()).await.unwrap();

        assert_eq!(
            surface.actions(),
            vec![
                Action::Select(Locator::css("#head"), "Head-X head".to_string()),
                Action::Click(Locator::label_containing("Body-Y body")),
                Action::Fill(Locator::input_after_label("3. Legs:"), "4".to_string()),
                Action::Fill(Locator::css("#address"), "Main St 1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_first_click() {
        let surface = FakeSurface::new().with_visibility(Locator::css("#order"), &[false]);
        let submitter = FormSubmitter::with_policy(instant_policy(3), Duration::from_millis(50));

        let attempts = submitter.submit(&surface, &scenario_order()).await.unwrap();
        assert_eq!(attempts, 1);
        assert_eq!(surface.clicks(&Locator::css("#order")), 1);
    }

    #[tokio::test]
    async fn test_submit_retries_until_button_disappears() {
        let surface =
            FakeSurface::new().with_visibility(Locator::css("#order"), &[true, true, false]);
        let submitter = FormSubmitter::with_policy(instant_policy(5), Duration::from_millis(50));

        let attempts = submitter.submit(&surface, &scenario_order()).await.unwrap();
        assert_eq!(attempts, 3);
        assert_eq!(surface.clicks(&Locator::css("#order")), 3);
    }

    #[tokio::test]
    async fn test_submit_gives_up_after_max_attempts() {
        let surface = FakeSurface::new().with_visibility(Locator::css("#order"), &[true]);
        let submitter = FormSubmitter::with_policy(instant_policy(4), Duration::from_millis(50));

        let err = submitter.submit(&surface, &scenario_order()).await.unwrap_err();
        match err {
            AppError::SubmissionStuck {
                order_number,
                attempts,
            } => {
                assert_eq!(order_number, "1");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(surface.clicks(&Locator::css("#order")), 4);
    }

    #[tokio::test]
    async fn test_order_another_closes_modal() {
        let surface = FakeSurface::new();
        let submitter = FormSubmitter::with_policy(instant_policy(1), Duration::from_millis(50));

        submitter.order_another(&surface).await.unwrap();
        assert_eq!(
            surface.actions(),
            vec![
                Action::Click(Locator::css("#order-another")),
                Action::Click(Locator::button_containing("OK")),
            ]
        );
    }

    #[tokio::test]
    async fn test_close_modal_times_out() {
        let surface = FakeSurface::new().hidden_by_default();
        let submitter = FormSubmitter::with_policy(instant_policy(1), Duration::from_millis(30));

        let err = submitter.close_modal(&surface).await.unwrap_err();
        assert!(matches!(err, AppError::RenderNotReady { .. }));
        assert!(surface.actions().is_empty());
    }
}
