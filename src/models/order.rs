use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 订单号只允许出现在文件名里安全的字符
fn order_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"))
}

/// CSV 中的一行订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order number")]
    pub order_number: String,
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Legs")]
    pub legs: u32,
    #[serde(rename = "Address")]
    pub address: String,
}

impl OrderRecord {
    /// CSV 表头中必须出现的列
    pub const COLUMNS: [&'static str; 5] = ["Order number", "Head", "Body", "Legs", "Address"];

    /// 解析之后的字段检查
    pub fn validate(&self, line: u64) -> AppResult<()> {
        if !order_number_pattern().is_match(&self.order_number) {
            return Err(AppError::malformed_row(
                line,
                format!("订单号 '{}' 不能作为文件名", self.order_number),
            ));
        }
        if self.head.is_empty() || self.body.is_empty() {
            return Err(AppError::malformed_row(line, "Head / Body 不能为空"));
        }
        Ok(())
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} (head {}, body {}, legs {})",
            self.order_number, self.head, self.body, self.legs
        )
    }
}

/// 已经通过型号信息表翻译过的订单
///
/// 只能由 `PartNumberMap::resolve` 构造，表单提交只接受这个类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrder {
    pub order_number: String,
    pub head: String,
    pub body: String,
    pub legs: u32,
    pub address: String,
}

impl ResolvedOrder {
    pub(crate) fn new(record: &OrderRecord, head: String, body: String) -> Self {
        Self {
            order_number: record.order_number.clone(),
            head,
            body,
            legs: record.legs,
            address: record.address.clone(),
        }
    }

    /// 头部下拉框中选项的文本
    pub fn head_option_label(&self) -> String {
        format!("{} head", self.head)
    }

    /// 身体单选框 label 中包含的文本
    pub fn body_label(&self) -> String {
        format!("{} body", self.body)
    }
}
