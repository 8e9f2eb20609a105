//! 型号信息读取服务 - 业务能力层
//!
//! 只负责"把页面上的型号表读成 PartNumberMap"，不关心订单

use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{Locator, OrderSurface};
use crate::models::PartNumberMap;
use crate::utils::truncate_text;

pub struct PartNumberResolver {
    timeout: Duration,
}

impl PartNumberResolver {
    pub fn new(config: &Config) -> Self {
        Self::with_timeout(config.render_timeout())
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// 展开型号表并解析
    ///
    /// 表格在超时时间内没有显示时返回 `RenderNotReady`
    pub async fn resolve(&self, surface: &dyn OrderSurface) -> AppResult<PartNumberMap> {
        info!("📋 正在读取型号信息表...");

        surface
            .click(&Locator::button_containing("Show model info"))
            .await?;

        let table = Locator::css("#model-info");
        surface.wait_for_visible(&table, self.timeout).await?;

        let text = surface.inner_text(&table).await?;
        debug!("型号信息表原文: {:?}", truncate_text(&text, 200));

        let map = PartNumberMap::parse(&text)?;
        info!("✓ 读取到 {} 个型号", map.len());
        for (part_number, model) in map.iter() {
            debug!("  {} -> {}", part_number, model);
        }

        Ok(map)
    }
}
