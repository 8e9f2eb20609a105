//! 回执导出服务 - 业务能力层
//!
//! 截图、把回执打印成 PDF、把截图叠加到 PDF 上

use std::path::{Path, PathBuf};
use std::time::Duration;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Locator, OrderSurface};
use crate::models::Receipt;
use crate::utils::truncate_text;

/// 页面尺寸缺失时使用 Letter（Chrome 打印的默认纸张）
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);
/// 截图距页面底边的距离（pt）
const MARGIN: f32 = 36.0;
/// 截图像素到 pt 的最大比例
const MAX_SCALE: f32 = 0.75;

pub struct ReceiptExporter {
    output_dir: PathBuf,
    timeout: Duration,
}

impl ReceiptExporter {
    pub fn new(config: &Config) -> Self {
        Self::with_output_dir(config.output_path(), config.render_timeout())
    }

    pub fn with_output_dir(output_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            output_dir: output_dir.into(),
            timeout,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn receipt_for(&self, order_number: &str) -> Receipt {
        Receipt::new(&self.output_dir, order_number)
    }

    /// 预览图截图，保存为 `<订单号>.png`
    pub async fn capture_preview(
        &self,
        surface: &dyn OrderSurface,
        receipt: &Receipt,
    ) -> AppResult<()> {
        let preview = Locator::css("#robot-preview-image");
        surface.wait_for_visible(&preview, self.timeout).await?;

        let png = surface.screenshot(&preview).await?;
        self.write_file(&receipt.png_path, &png).await?;
        debug!("截图已保存: {}", receipt.png_path.display());
        Ok(())
    }

    /// 把页面上的回执打印成 `<订单号>.pdf`
    pub async fn export_receipt(
        &self,
        surface: &dyn OrderSurface,
        receipt: &Receipt,
    ) -> AppResult<()> {
        let receipt_el = Locator::css("#receipt");
        surface.wait_for_visible(&receipt_el, self.timeout).await?;

        let html = surface.inner_html(&receipt_el).await?;
        debug!("回执内容: {}", truncate_text(&html, 120));
        let pdf = surface
            .print_pdf(&receipt_document(&receipt.order_number, &html))
            .await?;
        self.write_file(&receipt.pdf_path, &pdf).await?;
        debug!("回执已保存: {}", receipt.pdf_path.display());
        Ok(())
    }

    /// 把截图叠加到回执 PDF 的最后一页，原地覆盖
    pub fn embed_screenshot(&self, receipt: &Receipt) -> AppResult<()> {
        overlay_png(&receipt.pdf_path, &receipt.png_path)?;
        info!("📎 截图已嵌入回执: {}", receipt.pdf_path.display());
        Ok(())
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> AppResult<()> {
        let write_error = |source| AppError::ReceiptWrite {
            path: path.to_path_buf(),
            source,
        };
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(write_error)?;
        tokio::fs::write(path, bytes).await.map_err(write_error)
    }
}

/// 把回执片段包装成完整的 HTML 文档
fn receipt_document(order_number: &str, inner_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Receipt {order_number}</title>
<style>body {{ font-family: sans-serif; margin: 32px; }}</style>
</head>
<body>
<div id="receipt">{inner_html}</div>
</body>
</html>"#
    )
}

/// 把 PNG 画到 PDF 最后一页底部居中，最多占半个页面
pub fn overlay_png(pdf_path: &Path, png_path: &Path) -> AppResult<()> {
    let img = image::open(png_path)
        .map_err(|e| AppError::pdf_overlay(pdf_path, e))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::pdf_overlay(pdf_path, "截图为空"));
    }

    let mut doc = Document::load(pdf_path).map_err(|e| AppError::pdf_overlay(pdf_path, e))?;
    let page_id = doc
        .get_pages()
        .values()
        .last()
        .copied()
        .ok_or_else(|| AppError::pdf_overlay(pdf_path, "PDF 没有页面"))?;

    let (page_w, page_h) = media_box(&doc, page_id).unwrap_or(DEFAULT_PAGE_SIZE);
    let scale = (page_w * 0.5 / width as f32)
        .min((page_h * 0.5 - MARGIN) / height as f32)
        .min(MAX_SCALE);
    let size = (width as f32 * scale, height as f32 * scale);
    let position = ((page_w - size.0) / 2.0, MARGIN);

    let xobject = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        },
        img.into_raw(),
    );

    doc.insert_image(page_id, xobject, position, size)
        .map_err(|e| AppError::pdf_overlay(pdf_path, e))?;
    doc.save(pdf_path)
        .map_err(|e| AppError::pdf_overlay(pdf_path, e))?;
    Ok(())
}

/// 页面宽高，MediaBox 可能继承自上级 Pages 节点
fn media_box(doc: &Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let mut current = page_id;
    // 页面树不会太深，限制层数防止循环引用
    for _ in 0..16 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(Object::Array(bbox)) = dict.get(b"MediaBox") {
            let nums: Vec<f32> = bbox
                .iter()
                .filter_map(|o| match o {
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r as f32),
                    _ => None,
                })
                .collect();
            if let &[x0, y0, x1, y1] = nums.as_slice() {
                return Some((x1 - x0, y1 - y0));
            }
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}
