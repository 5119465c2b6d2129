//! Page number insertion and removal

mod anchor;
mod removal;

pub use anchor::{Anchor, Margins, compute_anchor, text_width};
pub use removal::{remove_page_numbers, removal_bands};

use crate::constants::{NUMBER_FONT_BASE, mm_to_pt};
use crate::document::{PageDocument, PageInfo, TextPlacement};
use crate::options::{CountingMode, NumberingParams};
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::transform::{PageOutcome, for_each_page};
use crate::types::{OperationReport, Result};

/// Text and position for the `position`-th selected page (zero-based).
///
/// `total` is the last number that will be printed, used by the
/// "Page N of M" format.
pub fn plan_number(
    page: &PageInfo,
    position: usize,
    total: usize,
    params: &NumberingParams,
) -> TextPlacement {
    let number = params.start + position;
    let text = params.format.render(number, total);

    let second = position % 2 == 1;
    let align = match params.mode {
        CountingMode::Mirrored if second => params.align.mirrored(),
        _ => params.align,
    };
    let mut margins = Margins {
        left: mm_to_pt(params.left_mm),
        right: mm_to_pt(params.right_mm),
        vertical: mm_to_pt(params.vertical_mm),
    };
    if params.mirror_margins && second {
        margins = margins.swapped();
    }

    let width = text_width(&text, params.font_size);
    let anchor = compute_anchor(
        page,
        align,
        params.vertical,
        margins,
        width,
        params.font_size,
    );
    TextPlacement {
        x: anchor.x,
        y: anchor.y,
        text,
        font: NUMBER_FONT_BASE.to_string(),
        size: params.font_size,
        angle: anchor.angle,
    }
}

/// Stamp consecutive numbers on the selected pages.
///
/// Numbers follow selection order, not page index: the k-th selected page
/// gets `start + k`. A skipped page still consumes its number.
pub fn insert_page_numbers<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &NumberingParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;

    let (valid, _) = selection.resolve(doc.page_count());
    let total = valid.len() + params.start - 1;
    log::debug!(
        "numbering {} page(s) from {} ({:?})",
        valid.len(),
        params.start,
        params.format
    );

    let mut position = 0;
    Ok(for_each_page(doc, selection, "number", progress, |doc, index| {
        let this = position;
        position += 1;
        let page = doc.page(index)?;
        let placement = plan_number(&page, this, total, params);
        doc.insert_text(index, &placement)?;
        Ok(PageOutcome::Applied)
    }))
}
