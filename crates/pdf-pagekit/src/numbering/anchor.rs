//! Where a page number goes on a (possibly rotated) page
//!
//! Placement is decided in the displayed frame, the page as a reader sees
//! it, and then mapped back into unrotated user space. The text is turned
//! by the page rotation so it reads upright on screen.

use crate::constants::HELVETICA_CHAR_WIDTH_RATIO;
use crate::document::PageInfo;
use crate::options::{HorizontalAlign, VerticalPosition};
use crate::types::Rotation;

/// Horizontal margins and vertical offset in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub vertical: f32,
}

impl Margins {
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            ..self
        }
    }
}

/// Baseline origin in user space plus the text angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
    /// Counter-clockwise degrees
    pub angle: i32,
}

/// Approximate rendered width of `text` in Helvetica
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * HELVETICA_CHAR_WIDTH_RATIO
}

/// Offset of the text origin from the displayed frame's lower-left corner
fn displayed_offset(
    displayed: (f32, f32),
    align: HorizontalAlign,
    vertical: VerticalPosition,
    margins: Margins,
    width: f32,
    font_size: f32,
) -> (f32, f32) {
    let (w, h) = displayed;
    let dx = match align {
        HorizontalAlign::Left => margins.left,
        HorizontalAlign::Right => w - margins.right - width,
        // Centered between the margins
        HorizontalAlign::Center => margins.left + (w - margins.left - margins.right - width) / 2.0,
    };
    let dy = match vertical {
        VerticalPosition::Bottom => margins.vertical,
        VerticalPosition::Top => h - margins.vertical - font_size,
    };
    (dx, dy)
}

pub fn compute_anchor(
    page: &PageInfo,
    align: HorizontalAlign,
    vertical: VerticalPosition,
    margins: Margins,
    width: f32,
    font_size: f32,
) -> Anchor {
    let rect = page.visible_box();
    let (dx, dy) = displayed_offset(
        page.displayed_size(),
        align,
        vertical,
        margins,
        width,
        font_size,
    );
    let (x, y) = match page.rotation {
        Rotation::None => (rect.x0 + dx, rect.y0 + dy),
        Rotation::Clockwise90 => (rect.x1 - dy, rect.y0 + dx),
        Rotation::Clockwise180 => (rect.x1 - dx, rect.y1 - dy),
        Rotation::Clockwise270 => (rect.x0 + dy, rect.y1 - dx),
    };
    Anchor {
        x,
        y,
        angle: page.rotation.degrees(),
    }
}
