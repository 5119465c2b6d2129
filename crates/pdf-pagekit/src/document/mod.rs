//! The document collaborator used by every engine
//!
//! Engines never look inside page content. They read page geometry through
//! [`PageDocument::page`] and push changes through the small set of
//! mutation primitives below.
//!
//! Two backends are provided:
//! - [`PdfDocument`]: a lopdf document, edited in place
//! - [`MemoryDocument`]: an in-memory page model used for previews and tests

mod memory;
mod pdf;

pub use memory::{ContentOp, MemoryDocument, MemoryPage};
pub use pdf::PdfDocument;

use crate::geometry::{Affine, Rect};
use crate::types::{EditError, Result, Rotation};

/// Page boundary boxes an engine can write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxKind {
    MediaBox,
    CropBox,
    TrimBox,
    ArtBox,
}

impl BoxKind {
    /// PDF key name for this box type
    pub fn pdf_key(self) -> &'static str {
        match self {
            BoxKind::MediaBox => "MediaBox",
            BoxKind::CropBox => "CropBox",
            BoxKind::TrimBox => "TrimBox",
            BoxKind::ArtBox => "ArtBox",
        }
    }
}

/// Geometry of a single page
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub mediabox: Rect,
    pub cropbox: Option<Rect>,
    pub trimbox: Option<Rect>,
    pub artbox: Option<Rect>,
    pub rotation: Rotation,
}

impl PageInfo {
    pub fn new(mediabox: Rect) -> Self {
        Self {
            mediabox,
            cropbox: None,
            trimbox: None,
            artbox: None,
            rotation: Rotation::None,
        }
    }

    /// The visible area: cropbox if set, otherwise mediabox
    pub fn visible_box(&self) -> Rect {
        self.cropbox.unwrap_or(self.mediabox)
    }

    /// Read a box, falling back to the mediabox for unset secondary boxes
    pub fn effective_box(&self, kind: BoxKind) -> Rect {
        match kind {
            BoxKind::MediaBox => self.mediabox,
            BoxKind::CropBox => self.visible_box(),
            BoxKind::TrimBox => self.trimbox.unwrap_or(self.mediabox),
            BoxKind::ArtBox => self.artbox.unwrap_or(self.mediabox),
        }
    }

    /// Displayed (width, height), accounting for quarter-turn rotations
    pub fn displayed_size(&self) -> (f32, f32) {
        let rect = self.visible_box();
        if self.rotation.is_quarter_turn() {
            (rect.height(), rect.width())
        } else {
            (rect.width(), rect.height())
        }
    }

    pub fn is_landscape(&self) -> bool {
        let (w, h) = self.displayed_size();
        w > h
    }

    pub fn is_portrait(&self) -> bool {
        !self.is_landscape()
    }
}

/// Text to draw on a page
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    /// Baseline origin in unrotated user space
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: String,
    pub size: f32,
    /// Counter-clockwise angle in degrees
    pub angle: i32,
}

/// All box and content changes for one page, applied as a unit
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageEdit {
    pub boxes: Vec<(BoxKind, Rect)>,
    pub transform: Option<Affine>,
}

impl PageEdit {
    pub fn set_box(mut self, kind: BoxKind, rect: Rect) -> Self {
        self.boxes.push((kind, rect));
        self
    }

    pub fn with_transform(mut self, transform: Affine) -> Self {
        if !transform.is_identity() {
            self.transform = Some(transform);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.transform.is_none()
    }
}

/// A paginated document that engines can edit in place.
///
/// Indices are zero-based. Implementations return
/// [`EditError::PageIndex`] for indices outside `0..page_count()`.
pub trait PageDocument {
    fn page_count(&self) -> usize;

    fn page(&self, index: usize) -> Result<PageInfo>;

    fn set_page_box(&mut self, index: usize, kind: BoxKind, rect: Rect) -> Result<()>;

    /// Compose `transform` onto everything currently drawn on the page
    fn apply_content_transform(&mut self, index: usize, transform: Affine) -> Result<()>;

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()>;

    /// Insert an empty page so that it ends up at index `at` (`at == page_count()` appends)
    fn insert_page(&mut self, at: usize, width: f32, height: f32) -> Result<()>;

    fn delete_page(&mut self, index: usize) -> Result<()>;

    /// Paint an opaque white cover over `rect`.
    ///
    /// Only the rendered page is hidden: content underneath stays in the
    /// stream and remains extractable.
    fn redact_rect(&mut self, index: usize, rect: Rect) -> Result<()>;

    fn insert_text(&mut self, index: usize, text: &TextPlacement) -> Result<()>;

    /// Draw the content of page `source` onto page `target` through `transform`
    fn place_page(&mut self, target: usize, source: usize, transform: Affine) -> Result<()>;

    /// Apply an edit all-or-nothing.
    ///
    /// The default validates everything up front and then applies the
    /// primitives in order. Backends whose primitives can fail half-way
    /// should override it.
    fn apply_edit(&mut self, index: usize, edit: &PageEdit) -> Result<()> {
        check_index(index, self.page_count())?;
        if let Some((kind, rect)) = edit.boxes.iter().find(|(_, r)| r.is_degenerate()) {
            return Err(EditError::parameter(format!(
                "{} would be empty: {:?}",
                kind.pdf_key(),
                rect
            )));
        }
        for (kind, rect) in &edit.boxes {
            self.set_page_box(index, *kind, *rect)?;
        }
        if let Some(transform) = edit.transform {
            self.apply_content_transform(index, transform)?;
        }
        Ok(())
    }
}

pub(crate) fn check_index(index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(EditError::PageIndex { index, count });
    }
    Ok(())
}
