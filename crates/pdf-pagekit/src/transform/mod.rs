//! Geometric page transforms
//!
//! Every operation follows the same contract:
//! 1. Validate parameters (nothing is touched if they are bad)
//! 2. Resolve the selection against the current page count
//! 3. Compute each page's edit purely, then apply it atomically
//! 4. Log and skip pages that cannot be edited, and keep going

mod crop;
mod grid;
mod pages;
mod resize;

pub use crop::{crop, crop_rect, mask_crop, reposition_offset};
pub use grid::{cell_position, cell_rect, cell_transform, grid_merge};
pub use pages::{delete_pages, insert_blank_pages, rotate, shift};
pub use resize::{ResizePlan, plan_scaled, plan_unscaled, resize};

use crate::document::PageDocument;
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::types::{OperationReport, Result, SkipReason};

/// What happened to one page
pub(crate) enum PageOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Run `edit` on every selected page, in ascending order.
///
/// Errors from a single page become skips; the batch itself only fails
/// if `edit` is never reached.
pub(crate) fn for_each_page<D, F>(
    doc: &mut D,
    selection: &PageSelection,
    operation: &str,
    progress: &mut dyn ProgressSink,
    mut edit: F,
) -> OperationReport
where
    D: PageDocument,
    F: FnMut(&mut D, usize) -> Result<PageOutcome>,
{
    let (indices, dropped) = selection.resolve(doc.page_count());
    let mut report = OperationReport::with_dropped(dropped);
    let total = indices.len();

    progress.status(&format!("{}: {} page(s)", operation, total));
    for (done, index) in indices.into_iter().enumerate() {
        match edit(doc, index) {
            Ok(PageOutcome::Applied) => report.applied.push(index),
            Ok(PageOutcome::Skipped(reason)) => {
                log::warn!("{}: skipped page {} ({:?})", operation, index + 1, reason);
                report.skip(index, reason);
            }
            Err(e) => {
                log::warn!("{}: page {} failed: {}", operation, index + 1, e);
                report.skip(index, SkipReason::PageError(e.to_string()));
            }
        }
        progress.progress(done + 1, total);
    }

    log::info!(
        "{}: {} applied, {} skipped, {} dropped",
        operation,
        report.applied.len(),
        report.skipped.len(),
        report.dropped
    );
    report
}
