//! In-memory page model
//!
//! Keeps page geometry plus a log of content operations instead of real
//! content streams. Useful for previewing an edit (or a whole macro) before
//! touching a file, and for asserting exactly what an engine did.

use super::{PageDocument, PageInfo, TextPlacement, check_index};
use crate::geometry::{Affine, Rect};
use crate::types::{EditError, Result, Rotation};

/// One recorded content operation
#[derive(Debug, Clone, PartialEq)]
pub enum ContentOp {
    Transform(Affine),
    Redact(Rect),
    Text(TextPlacement),
    /// Content of another page, snapshotted at placement time
    Placed {
        label: String,
        content: Vec<ContentOp>,
        transform: Affine,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPage {
    pub info: PageInfo,
    /// Free-form identifier, carried along when the page moves
    pub label: String,
    pub content: Vec<ContentOp>,
}

impl MemoryPage {
    pub fn new(label: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            info: PageInfo::new(Rect::from_size(width, height)),
            label: label.into(),
            content: Vec::new(),
        }
    }

    /// Net content transform: every `Transform` op composed in order
    pub fn net_transform(&self) -> Affine {
        self.content
            .iter()
            .filter_map(|op| match op {
                ContentOp::Transform(t) => Some(*t),
                _ => None,
            })
            .fold(Affine::identity(), |acc, t| acc.then(&t))
    }

    pub fn texts(&self) -> Vec<&TextPlacement> {
        self.content
            .iter()
            .filter_map(|op| match op {
                ContentOp::Text(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn redactions(&self) -> Vec<Rect> {
        self.content
            .iter()
            .filter_map(|op| match op {
                ContentOp::Redact(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryDocument {
    pub pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// `count` pages of identical size, labelled "1", "2", ...
    pub fn uniform(count: usize, width: f32, height: f32) -> Self {
        let pages = (0..count)
            .map(|i| MemoryPage::new((i + 1).to_string(), width, height))
            .collect();
        Self { pages }
    }

    pub fn from_pages(pages: Vec<MemoryPage>) -> Self {
        Self { pages }
    }

    /// Mirror the geometry of any other document (content is not copied)
    pub fn snapshot_of(doc: &impl PageDocument) -> Result<Self> {
        let mut pages = Vec::with_capacity(doc.page_count());
        for i in 0..doc.page_count() {
            pages.push(MemoryPage {
                info: doc.page(i)?,
                label: (i + 1).to_string(),
                content: Vec::new(),
            });
        }
        Ok(Self { pages })
    }

    pub fn get(&self, index: usize) -> Option<&MemoryPage> {
        self.pages.get(index)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.label.as_str()).collect()
    }

    fn page_mut(&mut self, index: usize) -> Result<&mut MemoryPage> {
        let count = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(EditError::PageIndex { index, count })
    }
}

impl PageDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: usize) -> Result<PageInfo> {
        check_index(index, self.pages.len())?;
        Ok(self.pages[index].info.clone())
    }

    fn set_page_box(&mut self, index: usize, kind: super::BoxKind, rect: Rect) -> Result<()> {
        use super::BoxKind;
        if rect.is_degenerate() {
            return Err(EditError::parameter(format!(
                "{} must have positive area",
                kind.pdf_key()
            )));
        }
        let info = &mut self.page_mut(index)?.info;
        match kind {
            BoxKind::MediaBox => info.mediabox = rect,
            BoxKind::CropBox => info.cropbox = Some(rect),
            BoxKind::TrimBox => info.trimbox = Some(rect),
            BoxKind::ArtBox => info.artbox = Some(rect),
        }
        Ok(())
    }

    fn apply_content_transform(&mut self, index: usize, transform: Affine) -> Result<()> {
        self.page_mut(index)?
            .content
            .push(ContentOp::Transform(transform));
        Ok(())
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
        self.page_mut(index)?.info.rotation = rotation;
        Ok(())
    }

    fn insert_page(&mut self, at: usize, width: f32, height: f32) -> Result<()> {
        if at > self.pages.len() {
            return Err(EditError::PageIndex {
                index: at,
                count: self.pages.len(),
            });
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(EditError::parameter("page size must be positive"));
        }
        self.pages.insert(at, MemoryPage::new("blank", width, height));
        Ok(())
    }

    fn delete_page(&mut self, index: usize) -> Result<()> {
        check_index(index, self.pages.len())?;
        self.pages.remove(index);
        Ok(())
    }

    fn redact_rect(&mut self, index: usize, rect: Rect) -> Result<()> {
        self.page_mut(index)?.content.push(ContentOp::Redact(rect));
        Ok(())
    }

    fn insert_text(&mut self, index: usize, text: &TextPlacement) -> Result<()> {
        self.page_mut(index)?
            .content
            .push(ContentOp::Text(text.clone()));
        Ok(())
    }

    fn place_page(&mut self, target: usize, source: usize, transform: Affine) -> Result<()> {
        check_index(source, self.pages.len())?;
        let (label, content) = {
            let src = &self.pages[source];
            (src.label.clone(), src.content.clone())
        };
        self.page_mut(target)?.content.push(ContentOp::Placed {
            label,
            content,
            transform,
        });
        Ok(())
    }
}
