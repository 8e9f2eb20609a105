//! 浏览器页面 - 基础设施层
//!
//! 持有唯一的下单 Page，把 `OrderSurface` 的能力翻译成 JS / CDP 调用

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::surface::{Locator, OrderSurface};

/// 截图前临时打在元素上的标记属性
const CAPTURE_ATTR: &str = "data-robot-capture";

/// 页面查询结果
#[derive(Debug, Deserialize)]
struct Probe {
    found: bool,
    #[serde(default)]
    value: String,
}

/// 基于 chromiumoxide 的下单页面
///
/// 职责：
/// - 持有下单 Page 和一个专门用来打印回执的 Page
/// - 暴露 eval() 能力
/// - 不处理业务流程
pub struct PageSurface {
    page: Page,
    printer: Page,
}

impl PageSurface {
    /// `printer` 只用来渲染回执 HTML，避免破坏下单页面的状态
    pub fn new(page: Page, printer: Page) -> Self {
        Self { page, printer }
    }

    /// 获取下单 page 的引用
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        self.eval_as(js_code).await
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let result = self.page.evaluate(js_code.into()).await?;
        result
            .into_value()
            .map_err(|e| AppError::Script(e.to_string()))
    }

    /// 执行一个动作脚本：脚本返回空字符串表示成功，否则返回错误描述
    async fn run_action(&self, locator: &Locator, body: &str) -> AppResult<()> {
        let js = format!(
            r#"
            (() => {{
                const el = {node};
                if (!el) return 'element not found';
                {body}
                return '';
            }})()
            "#,
            node = locator.to_js(),
            body = body
        );

        let outcome: String = self.eval_as(js).await?;
        if outcome.is_empty() {
            Ok(())
        } else {
            Err(AppError::Script(format!("{}: {}", locator, outcome)))
        }
    }

    /// 读取元素的某个属性
    async fn probe(&self, locator: &Locator, expr: &str) -> AppResult<Probe> {
        let js = format!(
            r#"
            (() => {{
                const el = {node};
                if (!el) return {{ found: false }};
                return {{ found: true, value: String({expr}) }};
            }})()
            "#,
            node = locator.to_js(),
            expr = expr
        );
        self.eval_as(js).await
    }

    async fn read(&self, locator: &Locator, expr: &str) -> AppResult<String> {
        let probe = self.probe(locator, expr).await?;
        if !probe.found {
            return Err(AppError::Script(format!("{}: element not found", locator)));
        }
        Ok(probe.value)
    }
}

#[async_trait]
impl OrderSurface for PageSurface {
    async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        debug!("点击: {}", locator);
        self.run_action(locator, "el.scrollIntoView({ block: 'center' }); el.click();")
            .await
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> AppResult<()> {
        debug!("选择: {} -> {}", locator, label);
        let label_js = serde_json::Value::String(label.to_string()).to_string();
        // React 受控组件需要走原生 setter 才能感知到变化
        let body = format!(
            r#"
                const option = Array.from(el.options || []).find(o => o.text.trim() === {label_js});
                if (!option) return 'option not found: ' + {label_js};
                const setter = Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set;
                setter.call(el, option.value);
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            "#
        );
        self.run_action(locator, &body).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        debug!("填写: {} -> {}", locator, value);
        let value_js = serde_json::Value::String(value.to_string()).to_string();
        let body = format!(
            r#"
                el.focus();
                const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set;
                setter.call(el, {value_js});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            "#
        );
        self.run_action(locator, &body).await
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        let probe = self
            .probe(
                locator,
                "!!(el.offsetWidth || el.offsetHeight || el.getClientRects().length) \
                 && getComputedStyle(el).visibility !== 'hidden'",
            )
            .await?;
        Ok(probe.found && probe.value == "true")
    }

    async fn inner_text(&self, locator: &Locator) -> AppResult<String> {
        self.read(locator, "el.innerText").await
    }

    async fn inner_html(&self, locator: &Locator) -> AppResult<String> {
        self.read(locator, "el.innerHTML").await
    }

    async fn screenshot(&self, locator: &Locator) -> AppResult<Vec<u8>> {
        debug!("截图: {}", locator);
        let element = match locator {
            Locator::Css(selector) => self.page.find_element(selector.as_str()).await?,
            Locator::XPath(_) => {
                // chromiumoxide 只支持 CSS 选择器，先给目标元素打上标记
                self.run_action(locator, &format!("el.setAttribute('{}', '1');", CAPTURE_ATTR))
                    .await?;
                self.page.find_element(format!("[{}]", CAPTURE_ATTR)).await?
            }
        };

        let bytes = element.screenshot(CaptureScreenshotFormat::Png).await?;

        if let Locator::XPath(_) = locator {
            self.run_action(locator, &format!("el.removeAttribute('{}');", CAPTURE_ATTR))
                .await?;
        }
        Ok(bytes)
    }

    async fn print_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        self.printer.set_content(html).await?;
        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        let bytes = self.printer.pdf(params).await?;
        debug!("回执 PDF 大小: {} 字节", bytes.len());
        Ok(bytes)
    }
}
