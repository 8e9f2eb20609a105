pub mod connection;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;

use anyhow::{Context, Result};
use chromiumoxide::Browser;

use crate::config::Config;
use crate::infrastructure::PageSurface;

/// 按配置启动或连接浏览器，返回浏览器和下单页面
///
/// 调用方需要一直持有 `Browser`，它被 drop 后页面连接也会失效
pub async fn open_order_surface(config: &Config) -> Result<(Browser, PageSurface)> {
    let (browser, page) = if config.headless {
        launch_headless_browser(&config.order_page_url, config.chrome_executable.as_deref())
            .await?
    } else {
        connect_to_browser_and_page(config.browser_debug_port, &config.order_page_url).await?
    };

    let printer = browser
        .new_page("about:blank")
        .await
        .context("创建回执打印页面失败")?;

    Ok((browser, PageSurface::new(page, printer)))
}
