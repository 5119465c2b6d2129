//! Shift, rotate, blank-page insertion and deletion

use super::{PageOutcome, for_each_page};
use crate::constants::mm_to_pt;
use crate::document::{PageDocument, PageEdit};
use crate::geometry::Affine;
use crate::options::{BlankPageParams, InsertPosition, RotateParams, ShiftParams};
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::types::{EditError, OperationReport, Result, SkipReason};

/// Translate page content; boxes are unchanged, so content can move off-page
pub fn shift<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &ShiftParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;
    let edit = PageEdit::default()
        .with_transform(Affine::translate(mm_to_pt(params.dx_mm), mm_to_pt(params.dy_mm)));

    Ok(for_each_page(doc, selection, "shift", progress, |doc, index| {
        doc.apply_edit(index, &edit)?;
        Ok(PageOutcome::Applied)
    }))
}

/// Add `angle` (clockwise, multiple of 90) to each page's display rotation
pub fn rotate<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &RotateParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;

    Ok(for_each_page(doc, selection, "rotate", progress, |doc, index| {
        let current = doc.page(index)?.rotation;
        let next = current.rotate_by(params.angle).ok_or_else(|| {
            EditError::parameter(format!("cannot rotate by {} degrees", params.angle))
        })?;
        doc.set_rotation(index, next)?;
        Ok(PageOutcome::Applied)
    }))
}

/// Insert one blank page next to each selected page.
///
/// Anchors are processed in ascending order and shifted by the pages
/// already inserted, so every blank lands next to the page it was meant
/// for. Returns the indices of the new pages in `created`.
pub fn insert_blank_pages<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &BlankPageParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;
    let fixed_size = params.size.map(|s| s.dimensions_pt());

    let (anchors, dropped) = selection.resolve(doc.page_count());
    let mut report = OperationReport::with_dropped(dropped);
    let total = anchors.len();
    let mut inserted = 0;

    progress.status(&format!("insert blank: {} page(s)", total));
    for (done, anchor) in anchors.into_iter().enumerate() {
        let current = anchor + inserted;
        let result = insert_next_to(doc, current, fixed_size, params.position);

        match result {
            Ok(at) => {
                inserted += 1;
                report.applied.push(anchor);
                report.created.push(at);
            }
            Err(e) => {
                log::warn!("insert blank: page {} failed: {}", anchor + 1, e);
                report.skip(anchor, SkipReason::PageError(e.to_string()));
            }
        }
        progress.progress(done + 1, total);
    }

    log::info!("Inserted {} blank page(s)", inserted);
    Ok(report)
}

fn insert_next_to<D: PageDocument>(
    doc: &mut D,
    anchor: usize,
    fixed_size: Option<(f32, f32)>,
    position: InsertPosition,
) -> Result<usize> {
    let (width, height) = match fixed_size {
        Some(size) => size,
        None => {
            let media = doc.page(anchor)?.mediabox;
            (media.width(), media.height())
        }
    };
    let at = match position {
        InsertPosition::Before => anchor,
        InsertPosition::After => anchor + 1,
    };
    doc.insert_page(at, width, height)?;
    Ok(at)
}

/// Remove the selected pages, highest index first
pub fn delete_pages<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    let (targets, dropped) = selection.resolve(doc.page_count());
    let mut report = OperationReport::with_dropped(dropped);
    let total = targets.len();

    progress.status(&format!("delete: {} page(s)", total));
    for (done, index) in targets.into_iter().rev().enumerate() {
        match doc.delete_page(index) {
            Ok(()) => report.applied.push(index),
            Err(e) => {
                log::warn!("delete: page {} failed: {}", index + 1, e);
                report.skip(index, SkipReason::PageError(e.to_string()));
            }
        }
        progress.progress(done + 1, total);
    }
    report.applied.reverse();
    Ok(report)
}
