//! 型号信息表
//!
//! 页面上的 "Show model info" 表格读成文本后是 TAB 分隔的两列，
//! 第一行是表头。每一行 `A<TAB>B` 产生一条 `B -> A`：
//! 第二列是订单 CSV 里出现的编号，第一列是表单需要的型号名。

use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::order::{OrderRecord, ResolvedOrder};

/// 单元格分隔符
pub const DELIMITER: char = '\t';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartNumberMap {
    header: String,
    entries: BTreeMap<String, String>,
}

impl PartNumberMap {
    /// 解析表格文本
    ///
    /// 每一数据行必须恰好两个非空单元格，否则返回 `TableParse`；
    /// 同一编号出现多次时以最后一次为准
    pub fn parse(text: &str) -> AppResult<Self> {
        let mut lines = text
            .trim()
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .enumerate();

        let header = match lines.next() {
            Some((_, line)) if !line.trim().is_empty() => line.to_string(),
            _ => return Err(AppError::table_parse(1, "表格为空")),
        };

        let mut entries = BTreeMap::new();
        for (idx, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = idx + 1;
            let cells: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
            match cells.as_slice() {
                [value, key] if !value.is_empty() && !key.is_empty() => {
                    entries.insert(key.to_string(), value.to_string());
                }
                [_, _] => return Err(AppError::table_parse(line_no, "单元格为空")),
                _ => {
                    return Err(AppError::table_parse(
                        line_no,
                        format!("应有 2 列，实际 {} 列", cells.len()),
                    ))
                }
            }
        }

        Ok(Self { header, entries })
    }

    /// 重新生成表格文本，`parse` 之后得到相同的映射
    pub fn to_table_text(&self) -> String {
        let mut text = self.header.clone();
        for (key, value) in &self.entries {
            text.push('\n');
            text.push_str(value);
            text.push(DELIMITER);
            text.push_str(key);
        }
        text
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 翻译订单的 head / body
    pub fn resolve(&self, record: &OrderRecord) -> AppResult<ResolvedOrder> {
        let head = self.lookup(record, &record.head)?;
        let body = self.lookup(record, &record.body)?;
        Ok(ResolvedOrder::new(record, head, body))
    }

    /// 提交之前确认所有订单都能被翻译
    pub fn check_covers(&self, records: &[OrderRecord]) -> AppResult<()> {
        for record in records {
            self.lookup(record, &record.head)?;
            self.lookup(record, &record.body)?;
        }
        Ok(())
    }

    fn lookup(&self, record: &OrderRecord, part: &str) -> AppResult<String> {
        self.get(part)
            .map(str::to_string)
            .ok_or_else(|| AppError::UnknownPart {
                order_number: record.order_number.clone(),
                part: part.to_string(),
            })
    }
}

impl FromIterator<(String, String)> for PartNumberMap {
    /// 由 (编号, 型号名) 构造，表头使用页面上的默认表头
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            header: format!("Model name{}Part number", DELIMITER),
            entries: iter.into_iter().collect(),
        }
    }
}
