use std::path::{Path, PathBuf};

/// 一张订单的回执：PDF 和机器人截图，文件名都是订单号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_number: String,
    pub pdf_path: PathBuf,
    pub png_path: PathBuf,
}

impl Receipt {
    pub fn new(output_dir: &Path, order_number: &str) -> Self {
        let stem = output_dir.join(order_number);
        Self {
            order_number: order_number.to_string(),
            pdf_path: stem.with_extension("pdf"),
            png_path: stem.with_extension("png"),
        }
    }
}
