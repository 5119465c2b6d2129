use crate::constants::mm_to_pt;
use crate::document::{PageDocument, PageInfo};
use crate::geometry::Rect;
use crate::options::RemovalParams;
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::transform::{PageOutcome, for_each_page};
use crate::types::{OperationReport, Result, SkipReason};

/// Header and footer bands to erase, in unrotated user space.
///
/// Rotation is ignored: on a rotated page the bands run along the box's
/// own top and bottom edges, not the displayed ones. Empty bands are left out.
pub fn removal_bands(page: &PageInfo, params: &RemovalParams) -> Vec<Rect> {
    let area = page.visible_box();
    let x0 = area.x0 + mm_to_pt(params.left_mm);
    let x1 = area.x1 - mm_to_pt(params.right_mm);
    let top = mm_to_pt(params.top_mm).min(area.height());
    let bottom = mm_to_pt(params.bottom_mm).min(area.height());

    [
        Rect::new(x0, area.y1 - top, x1, area.y1),
        Rect::new(x0, area.y0, x1, area.y0 + bottom),
    ]
    .into_iter()
    .filter(|band| !band.is_degenerate())
    .collect()
}

/// Erase everything drawn in the header and footer bands of each selected page
pub fn remove_page_numbers<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &RemovalParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;

    Ok(for_each_page(doc, selection, "remove numbers", progress, |doc, index| {
        let page = doc.page(index)?;
        let bands = removal_bands(&page, params);
        if bands.is_empty() {
            return Ok(PageOutcome::Skipped(SkipReason::DegenerateCrop));
        }
        for band in bands {
            doc.redact_rect(index, band)?;
        }
        Ok(PageOutcome::Applied)
    }))
}
