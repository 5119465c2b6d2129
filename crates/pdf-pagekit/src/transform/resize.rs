use super::{PageOutcome, for_each_page};
use crate::constants::mm_to_pt;
use crate::document::{BoxKind, PageDocument, PageEdit};
use crate::geometry::{Affine, Rect};
use crate::options::{OffsetMode, ResizeParams};
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::types::{OperationReport, Result};

/// Uniform scale plus placement offset for moving a page onto a new size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePlan {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl ResizePlan {
    /// Content transform for a page whose mediabox starts at `origin`
    pub fn transform(&self, origin: (f32, f32)) -> Affine {
        Affine::translate(-origin.0, -origin.1)
            .then(&Affine::scale(self.scale, self.scale))
            .then(&Affine::translate(self.offset_x, self.offset_y))
    }
}

/// Fit `original` inside `target`, preserving aspect ratio and centering
pub fn plan_scaled(original: (f32, f32), target: (f32, f32)) -> ResizePlan {
    let (ow, oh) = original;
    let (tw, th) = target;
    let scale = (tw / ow).min(th / oh);
    ResizePlan {
        scale,
        offset_x: (tw - ow * scale) / 2.0,
        offset_y: (th - oh * scale) / 2.0,
    }
}

/// Keep content at its size; `Custom` offsets are measured from the lower-left corner
pub fn plan_unscaled(
    original: (f32, f32),
    target: (f32, f32),
    position: &OffsetMode,
) -> ResizePlan {
    let (offset_x, offset_y) = match position {
        OffsetMode::Center => ((target.0 - original.0) / 2.0, (target.1 - original.1) / 2.0),
        OffsetMode::Custom { dx_mm, dy_mm } => (mm_to_pt(*dx_mm), mm_to_pt(*dy_mm)),
    };
    ResizePlan {
        scale: 1.0,
        offset_x,
        offset_y,
    }
}

/// Give each selected page the target size; the new mediabox starts at the origin
pub fn resize<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &ResizeParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;
    let target = params.target.dimensions_pt();
    let new_box = Rect::from_size(target.0, target.1);

    Ok(for_each_page(doc, selection, "resize", progress, |doc, index| {
        let page = doc.page(index)?;
        let media = page.mediabox;
        let original = (media.width(), media.height());
        let plan = if params.scale_content {
            plan_scaled(original, target)
        } else {
            plan_unscaled(original, target, &params.position)
        };
        log::debug!("page {}: {:?}", index + 1, plan);

        let mut edit = PageEdit::default()
            .set_box(BoxKind::MediaBox, new_box)
            .set_box(BoxKind::CropBox, new_box)
            .with_transform(plan.transform((media.x0, media.y0)));
        // Old trim/art boxes are in the old coordinate space
        if page.trimbox.is_some() {
            edit = edit.set_box(BoxKind::TrimBox, new_box);
        }
        if page.artbox.is_some() {
            edit = edit.set_box(BoxKind::ArtBox, new_box);
        }
        doc.apply_edit(index, &edit)?;
        Ok(PageOutcome::Applied)
    }))
}
