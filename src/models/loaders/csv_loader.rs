use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ErrorKind, ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::order::OrderRecord;

/// 订单 CSV 文件
///
/// 每次调用 `records()` 都会重新打开文件，所以可以反复遍历
#[derive(Debug, Clone)]
pub struct OrderSource {
    path: PathBuf,
}

impl OrderSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 按文件顺序逐行读取订单
    ///
    /// 文件不存在返回 `MissingFile`，表头缺列返回 `MissingColumn`；
    /// 行级错误在迭代时返回
    pub fn records(&self) -> AppResult<OrderRecords> {
        if !self.path.is_file() {
            return Err(AppError::MissingFile {
                path: self.path.clone(),
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let headers = reader.headers().map_err(|e| self.read_error(e))?.clone();
        for column in OrderRecord::COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(AppError::MissingColumn {
                    path: self.path.clone(),
                    column: column.to_string(),
                });
            }
        }
        debug!("订单文件表头: {:?}", headers);

        Ok(OrderRecords {
            path: self.path.clone(),
            headers,
            inner: reader.into_records(),
        })
    }

    /// 读取全部订单，遇到第一条错误即返回
    pub fn load_all(&self) -> AppResult<Vec<OrderRecord>> {
        self.records()?.collect()
    }

    fn read_error(&self, source: csv::Error) -> AppError {
        match source.kind() {
            ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::NotFound => AppError::MissingFile {
                path: self.path.clone(),
            },
            _ => AppError::InputRead {
                path: self.path.clone(),
                source,
            },
        }
    }
}

/// 订单迭代器
pub struct OrderRecords {
    path: PathBuf,
    headers: StringRecord,
    inner: StringRecordsIntoIter<File>,
}

impl OrderRecords {
    fn decode(&self, row: StringRecord) -> AppResult<OrderRecord> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let record: OrderRecord = row
            .deserialize(Some(&self.headers))
            .map_err(|e| match row_error(&self.path, e) {
                AppError::MalformedRow { line: 0, reason } => AppError::MalformedRow { line, reason },
                other => other,
            })?;
        record.validate(line)?;
        Ok(record)
    }
}

impl Iterator for OrderRecords {
    type Item = AppResult<OrderRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.inner.next()?;
        Some(row.map_err(|e| row_error(&self.path, e)).and_then(|row| self.decode(row)))
    }
}

/// 把 csv 的行级错误归类
fn row_error(path: &Path, err: csv::Error) -> AppError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => AppError::malformed_row(
            line,
            format!("字段数量应为 {}，实际为 {}", expected_len, len),
        ),
        ErrorKind::Deserialize { err: de, .. } => AppError::malformed_row(line, de.to_string()),
        ErrorKind::Utf8 { .. } => AppError::malformed_row(line, "不是合法的 UTF-8"),
        _ => AppError::InputRead {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Order number,Head,Body,Legs,Address";

    fn write_csv(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("orders.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_rows_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            &format!("{HEADER}\n1,2,3,4,Main St 1\n2,1,6,2,\"Elm St, 5\"\n"),
        );

        let records = OrderSource::new(&path).load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            OrderRecord {
                order_number: "1".to_string(),
                head: "2".to_string(),
                body: "3".to_string(),
                legs: 4,
                address: "Main St 1".to_string(),
            }
        );
        assert_eq!(records[1].order_number, "2");
        assert_eq!(records[1].address, "Elm St, 5");
    }

    #[test]
    fn test_columns_matched_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "Address,Legs,Body,Head,Order number,Note\nMain St 1,4,3,2,1,rush\n",
        );

        let records = OrderSource::new(&path).load_all().unwrap();
        assert_eq!(records[0].order_number, "1");
        assert_eq!(records[0].head, "2");
        assert_eq!(records[0].legs, 4);
    }

    #[test]
    fn test_records_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n1,2,3,4,a\n2,2,3,4,b\n"));
        let source = OrderSource::new(&path);

        let first: Vec<_> = source.records().unwrap().map(|r| r.unwrap()).collect();
        let second: Vec<_> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(first, second);

        // 只消费一部分后重新开始仍然从第一行读起
        let mut partial = source.records().unwrap();
        partial.next();
        let again = source.records().unwrap().next().unwrap().unwrap();
        assert_eq!(again.order_number, "1");
    }

    #[test]
    fn test_header_only_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n"));
        assert!(OrderSource::new(&path).load_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = OrderSource::new(dir.path().join("nope.csv"))
            .records()
            .err()
            .unwrap();
        assert!(matches!(err, AppError::MissingFile { .. }));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "Order number,Head,Body,Address\n1,2,3,x\n");
        match OrderSource::new(&path).records().err().unwrap() {
            AppError::MissingColumn { column, .. } => assert_eq!(column, "Legs"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_row_with_wrong_field_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, &format!("{HEADER}\n1,2,3,4,a\n2,2,3,4\n"));

        let mut records = OrderSource::new(&path).records().unwrap();
        assert!(records.next().unwrap().is_ok());
        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(err, AppError::MalformedRow { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_row_with_bad_values() {
        let dir = tempfile::tempdir().unwrap();

        let path = write_csv(&dir, &format!("{HEADER}\n1,2,3,four,a\n"));
        let err = OrderSource::new(&path).load_all().unwrap_err();
        assert!(matches!(err, AppError::MalformedRow { line: 2, .. }), "{err:?}");

        let path = write_csv(&dir, &format!("{HEADER}\n1,2,3,4,a\n../x,2,3,4,b\n"));
        let err = OrderSource::new(&path).load_all().unwrap_err();
        assert!(matches!(err, AppError::MalformedRow { line: 3, .. }), "{err:?}");
    }
}
