//! 测试用的下单页面：记录所有操作，按脚本返回可见性和文本

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::{AppError, AppResult};
use crate::infrastructure::surface::{Locator, OrderSurface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Goto(String),
    Click(Locator),
    Select(Locator, String),
    Fill(Locator, String),
    Screenshot(Locator),
    PrintPdf(String),
}

#[derive(Default)]
pub(crate) struct FakeSurface {
    actions: Mutex<Vec<Action>>,
    /// 每个元素的可见性序列，最后一个值会一直保持
    visibility: Mutex<HashMap<Locator, VecDeque<bool>>>,
    texts: HashMap<Locator, String>,
    hidden_by_default: bool,
}

impl FakeSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 没有脚本的元素一律不可见
    pub(crate) fn hidden_by_default(mut self) -> Self {
        self.hidden_by_default = true;
        self
    }

    pub(crate) fn with_visibility(self, locator: Locator, sequence: &[bool]) -> Self {
        self.visibility
            .lock()
            .unwrap()
            .insert(locator, sequence.iter().copied().collect());
        self
    }

    pub(crate) fn with_text(mut self, locator: Locator, text: &str) -> Self {
        self.texts.insert(locator, text.to_string());
        self
    }

    pub(crate) fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub(crate) fn clicks(&self, locator: &Locator) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, Action::Click(l) if l == locator))
            .count()
    }

    fn record(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }

    fn text(&self, locator: &Locator) -> AppResult<String> {
        self.texts
            .get(locator)
            .cloned()
            .ok_or_else(|| AppError::Script(format!("{}: element not found", locator)))
    }
}

#[async_trait]
impl OrderSurface for FakeSurface {
    async fn goto(&self, url: &str) -> AppResult<()> {
        self.record(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> AppResult<()> {
        self.record(Action::Click(locator.clone()));
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> AppResult<()> {
        self.record(Action::Select(locator.clone(), label.to_string()));
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> AppResult<()> {
        self.record(Action::Fill(locator.clone(), value.to_string()));
        Ok(())
    }

    async fn is_visible(&self, locator: &Locator) -> AppResult<bool> {
        let mut visibility = self.visibility.lock().unwrap();
        match visibility.get_mut(locator) {
            Some(seq) if seq.len() > 1 => Ok(seq.pop_front().unwrap_or(false)),
            Some(seq) => Ok(seq.front().copied().unwrap_or(false)),
            None => Ok(!self.hidden_by_default),
        }
    }

    async fn inner_text(&self, locator: &Locator) -> AppResult<String> {
        self.text(locator)
    }

    async fn inner_html(&self, locator: &Locator) -> AppResult<String> {
        self.text(locator)
    }

    async fn screenshot(&self, locator: &Locator) -> AppResult<Vec<u8>> {
        self.record(Action::Screenshot(locator.clone()));
        Ok(sample_png())
    }

    async fn print_pdf(&self, html: &str) -> AppResult<Vec<u8>> {
        self.record(Action::PrintPdf(html.to_string()));
        Ok(sample_pdf())
    }
}

/// 一张 8x6 的 PNG
pub(crate) fn sample_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 6, image::Rgba([200, 30, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// 一页 Letter 尺寸的 PDF，MediaBox 放在 Pages 节点上
pub(crate) fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 24 Tf 72 700 Td (Receipt) Tj ET".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1_i64,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), 612_i64.into(), 792_i64.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
