//! 下单页面能力 - 基础设施层
//!
//! 各个服务只通过 `OrderSurface` 操作页面，不直接接触浏览器对象

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::{AppError, AppResult};

/// 轮询元素状态的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 页面元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// 包含指定文本的按钮
    pub fn button_containing(text: &str) -> Self {
        Locator::XPath(format!("//button[contains(.,{})]", xpath_literal(text)))
    }

    /// 包含指定文本的 label
    pub fn label_containing(text: &str) -> Self {
        Locator::XPath(format!("//label[contains(.,{})]", xpath_literal(text)))
    }

    /// 包含指定文本的 label 旁边的 input
    pub fn input_after_label(text: &str) -> Self {
        Locator::XPath(format!(
            "//label[contains(.,{})]/../input",
            xpath_literal(text)
        ))
    }

    /// 转换为在页面中返回对应 DOM 节点（或 null）的 JS 表达式
    pub fn to_js(&self) -> String {
        // serde_json 负责把字符串转义成合法的 JS 字面量
        let quoted = |s: &str| serde_json::Value::String(s.to_string()).to_string();
        match self {
            Locator::Css(selector) => format!("document.querySelector({})", quoted(selector)),
            Locator::XPath(expr) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                quoted(expr)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(selector) => write!(f, "{}", selector),
            Locator::XPath(expr) => write!(f, "xpath={}", expr),
        }
    }
}

/// 把任意文本转成 XPath 字符串字面量
///
/// XPath 1.0 没有转义符，同时含单双引号时只能用 concat()
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text
            .split('\'')
            .map(|part| format!("'{}'", part))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// 下单页面
///
/// 职责：
/// - 暴露点击、填写、读取、截图、打印 PDF 的能力
/// - 不认识订单 / 零件 / 回执
/// - 由编排层创建后显式传给每个服务
#[async_trait]
pub trait OrderSurface: Send + Sync {
    /// 导航到指定 URL
    async fn goto(&self, url: &str) -> AppResult<()>;

    /// 点击元素
    async fn click(&self, locator: &Locator) -> AppResult<()>;

    /// 按可见文本选择 `<select>` 的选项
    async fn select_option(&self, locator: &Locator, label: &str) -> AppResult<()>;

    /// 填写输入框（覆盖原有内容）
    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()>;

    /// 元素是否存在且可见
    async fn is_visible(&self, locator: &Locator) -> AppResult<bool>;

    /// 元素的 innerText
    async fn inner_text(&self, locator: &Locator) -> AppResult<String>;

    /// 元素的 innerHTML
    async fn inner_html(&self, locator: &Locator) -> AppResult<String>;

    /// 元素截图（PNG 字节）
    async fn screenshot(&self, locator: &Locator) -> AppResult<Vec<u8>>;

    /// 把一段 HTML 打印成 PDF 字节
    async fn print_pdf(&self, html: &str) -> AppResult<Vec<u8>>;

    /// 等待元素可见，超时返回 `RenderNotReady`
    async fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> AppResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::RenderNotReady {
                    locator: locator.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
