//! Soft crop (boxes only) and mask crop (mediabox too)

use super::{PageOutcome, for_each_page};
use crate::constants::mm_to_pt;
use crate::document::{BoxKind, PageDocument, PageEdit, PageInfo};
use crate::geometry::{Affine, Rect};
use crate::options::{CropParams, OffsetMode};
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::types::{OperationReport, Result, SkipReason};

/// The crop rectangle for a page, measured inward from its mediabox.
///
/// May be degenerate; callers must check before applying.
pub fn crop_rect(page: &PageInfo, params: &CropParams) -> Rect {
    let (left, bottom, right, top) = params.margins_pt();
    page.mediabox.inset(left, bottom, right, top)
}

/// Content translation (points) requested by a crop reposition mode
pub fn reposition_offset(mode: &OffsetMode) -> (f32, f32) {
    match mode {
        OffsetMode::Center => (0.0, 0.0),
        OffsetMode::Custom { dx_mm, dy_mm } => (mm_to_pt(*dx_mm), mm_to_pt(*dy_mm)),
    }
}

/// Hide the margins by setting crop, trim and art boxes. The mediabox is kept.
pub fn crop<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &CropParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;

    Ok(for_each_page(doc, selection, "crop", progress, |doc, index| {
        let page = doc.page(index)?;
        let rect = crop_rect(&page, params);
        if rect.is_degenerate() {
            return Ok(PageOutcome::Skipped(SkipReason::DegenerateCrop));
        }

        let mut edit = PageEdit::default()
            .set_box(BoxKind::CropBox, rect)
            .set_box(BoxKind::TrimBox, rect)
            .set_box(BoxKind::ArtBox, rect);
        if let Some(mode) = &params.reposition {
            let (dx, dy) = reposition_offset(mode);
            edit = edit.with_transform(Affine::translate(dx, dy));
        }
        doc.apply_edit(index, &edit)?;
        Ok(PageOutcome::Applied)
    }))
}

/// Cut the page down: mediabox and cropbox both become the crop rectangle,
/// so the removed margins can no longer be recovered by resetting boxes.
pub fn mask_crop<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &CropParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;

    Ok(for_each_page(doc, selection, "mask crop", progress, |doc, index| {
        let page = doc.page(index)?;
        let rect = crop_rect(&page, params);
        if rect.is_degenerate() {
            return Ok(PageOutcome::Skipped(SkipReason::DegenerateCrop));
        }

        let mut edit = PageEdit::default()
            .set_box(BoxKind::MediaBox, rect)
            .set_box(BoxKind::CropBox, rect);
        if page.trimbox.is_some() {
            edit = edit.set_box(BoxKind::TrimBox, rect);
        }
        if page.artbox.is_some() {
            edit = edit.set_box(BoxKind::ArtBox, rect);
        }
        doc.apply_edit(index, &edit)?;
        Ok(PageOutcome::Applied)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::progress::NoProgress;
    use crate::types::EditError;

    fn margins(left: f32, right: f32, top: f32, bottom: f32) -> CropParams {
        CropParams {
            left_mm: left,
            right_mm: right,
            top_mm: top,
            bottom_mm: bottom,
            reposition: None,
        }
    }

    #[test]
    fn test_soft_crop_sets_secondary_boxes_only() {
        let mut doc = MemoryDocument::uniform(2, 595.0, 842.0);
        let params = margins(10.0, 20.0, 30.0, 40.0);
        let report = crop(
            &mut doc,
            &PageSelection::from_indices([1]),
            &params,
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(report.applied, vec![1]);
        let expected = Rect::new(
            mm_to_pt(10.0),
            mm_to_pt(40.0),
            595.0 - mm_to_pt(20.0),
            842.0 - mm_to_pt(30.0),
        );
        let info = &doc.pages[1].info;
        assert_eq!(info.cropbox, Some(expected));
        assert_eq!(info.trimbox, Some(expected));
        assert_eq!(info.artbox, Some(expected));
        assert_eq!(info.mediabox, Rect::from_size(595.0, 842.0));
        assert_eq!(doc.pages[0].info.cropbox, None);
    }

    #[test]
    fn test_degenerate_crop_leaves_page_untouched() {
        let mut doc = MemoryDocument::uniform(2, 100.0, 100.0);
        doc.pages[1] = crate::document::MemoryPage::new("wide", 1000.0, 1000.0);
        // 20mm + 20mm ≈ 113pt > 100pt on the small page only
        let params = margins(20.0, 20.0, 0.0, 0.0);

        let report = crop(&mut doc, &PageSelection::all(2), &params, &mut NoProgress).unwrap();

        assert_eq!(report.applied, vec![1]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 0);
        assert_eq!(report.skipped[0].reason, SkipReason::DegenerateCrop);
        assert_eq!(doc.pages[0].info.cropbox, None);
    }

    #[test]
    fn test_negative_margin_rejected_before_mutation() {
        let mut doc = MemoryDocument::uniform(1, 100.0, 100.0);
        let params = margins(-1.0, 0.0, 0.0, 0.0);
        let result = crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress);
        assert!(matches!(result, Err(EditError::Parameter(_))));
        assert_eq!(doc.pages[0].info.cropbox, None);
    }

    #[test]
    fn test_reposition_composes_translation() {
        let mut doc = MemoryDocument::uniform(1, 500.0, 500.0);
        let mut params = CropParams::uniform(5.0);
        params.reposition = Some(OffsetMode::Custom {
            dx_mm: 25.4,
            dy_mm: -25.4,
        });
        crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();

        let t = doc.pages[0].net_transform();
        assert!((t.tx - 72.0).abs() < 1e-3);
        assert!((t.ty + 72.0).abs() < 1e-3);

        // Center leaves content where it is
        let mut doc = MemoryDocument::uniform(1, 500.0, 500.0);
        params.reposition = Some(OffsetMode::Center);
        crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();
        assert!(doc.pages[0].content.is_empty());
    }

    #[test]
    fn test_mask_crop_cannot_be_undone_by_box_reset() {
        let mut doc = MemoryDocument::uniform(1, 600.0, 800.0);
        let params = CropParams::uniform(10.0);
        mask_crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();

        let cut = doc.pages[0].info.mediabox;
        assert_ne!(cut, Rect::from_size(600.0, 800.0));
        assert_eq!(doc.pages[0].info.cropbox, Some(cut));

        // "Resetting" the cropbox to the mediabox no longer recovers the original page
        doc.set_page_box(0, BoxKind::CropBox, doc.pages[0].info.mediabox)
            .unwrap();
        assert_eq!(doc.pages[0].info.visible_box(), cut);

        // A later soft crop works from the reduced mediabox
        crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();
        let again = doc.pages[0].info.cropbox.unwrap();
        assert!((again.x0 - (cut.x0 + mm_to_pt(10.0))).abs() < 1e-3);
    }
}
