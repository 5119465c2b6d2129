//! N-up grid merge
//!
//! Selected pages are stamped, in order, onto new sheets of `rows x cols`
//! cells. Cells fill row by row from the top-left. Each source page is
//! stretched to its cell on both axes.

use crate::document::PageDocument;
use crate::geometry::{Affine, Rect};
use crate::options::GridParams;
use crate::progress::ProgressSink;
use crate::selection::PageSelection;
use crate::types::{OperationReport, Result, SkipReason};

/// (row, col) of the `i`-th page on its sheet
pub fn cell_position(i: usize, cols: usize) -> (usize, usize) {
    (i / cols, i % cols)
}

/// Cell rectangle on a sheet; row 0 is the top row
pub fn cell_rect(row: usize, col: usize, params: &GridParams, sheet: (f32, f32)) -> Rect {
    let cell_w = sheet.0 / params.cols as f32;
    let cell_h = sheet.1 / params.rows as f32;
    let x = col as f32 * cell_w;
    let y = sheet.1 - (row + 1) as f32 * cell_h;
    Rect::new(x, y, x + cell_w, y + cell_h)
}

/// Map `source` (a page's visible box) exactly onto `cell`
pub fn cell_transform(source: &Rect, cell: &Rect) -> Affine {
    let sx = cell.width() / source.width();
    let sy = cell.height() / source.height();
    Affine::translate(-source.x0, -source.y0)
        .then(&Affine::scale(sx, sy))
        .then(&Affine::translate(cell.x0, cell.y0))
}

/// Merge the selected pages onto new sheets.
///
/// Sheets are inserted where the first selected page was. Unless
/// `keep_originals` is set, the pages that made it onto a sheet are then
/// removed. `created` lists the sheet indices in the resulting document.
///
/// Page-level failures never abort the merge: a sheet that
/// cannot be inserted skips its remaining sources, and a source that
/// cannot be removed is reported as skipped and left in place.
pub fn grid_merge<D: PageDocument>(
    doc: &mut D,
    selection: &PageSelection,
    params: &GridParams,
    progress: &mut dyn ProgressSink,
) -> Result<OperationReport> {
    params.validate()?;
    let sheet = params.sheet.dimensions_pt();
    let per_sheet = params.cells_per_sheet();

    let (sources, dropped) = selection.resolve(doc.page_count());
    let mut report = OperationReport::with_dropped(dropped);
    let Some(&first) = sources.first() else {
        return Ok(report);
    };
    let total = sources.len();

    progress.status(&format!(
        "grid {}x{}: {} page(s) onto {} sheet(s)",
        params.rows,
        params.cols,
        total,
        total.div_ceil(per_sheet)
    ));

    let mut sheets = 0;
    for (done, &source) in sources.iter().enumerate() {
        let slot = done % per_sheet;
        if slot == 0 {
            if let Err(e) = doc.insert_page(first + sheets, sheet.0, sheet.1) {
                log::warn!("grid: sheet {} not created: {}", sheets + 1, e);
                for &rest in &sources[done..] {
                    report.skip(rest, SkipReason::PageError(e.to_string()));
                }
                break;
            }
            report.created.push(first + sheets);
            sheets += 1;
        }
        let target = first + sheets - 1;
        // Every source sits at or after `first`, so each sheet shifts it by one
        let shifted = source + sheets;

        let (row, col) = cell_position(slot, params.cols);
        let cell = cell_rect(row, col, params, sheet);
        let placed = doc
            .page(shifted)
            .map(|page| cell_transform(&page.visible_box(), &cell))
            .and_then(|transform| doc.place_page(target, shifted, transform));
        match placed {
            Ok(()) => report.applied.push(source),
            Err(e) => {
                log::warn!("grid: page {} not placed: {}", source + 1, e);
                report.skip(source, SkipReason::PageError(e.to_string()));
            }
        }
        progress.progress(done + 1, total);
    }

    if !params.keep_originals {
        let placed = report.applied.clone();
        for &source in placed.iter().rev() {
            if let Err(e) = doc.delete_page(source + sheets) {
                log::warn!("grid: page {} placed but not removed: {}", source + 1, e);
                report.applied.retain(|&i| i != source);
                report.skip(
                    source,
                    SkipReason::PageError(format!("placed but not removed: {}", e)),
                );
            }
        }
    }

    log::info!("grid: {} sheet(s) created at page {}", sheets, first + 1);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BoxKind, ContentOp, MemoryDocument, PageInfo, TextPlacement};
    use crate::progress::NoProgress;
    use crate::types::{EditError, Orientation, PageSize, PaperSize, Rotation};

    /// Memory document whose page insertions and deletions can be made to fail
    struct Flaky {
        inner: MemoryDocument,
        inserts_left: usize,
        undeletable: Option<&'static str>,
    }

    impl PageDocument for Flaky {
        fn page_count(&self) -> usize {
            self.inner.page_count()
        }

        fn page(&self, index: usize) -> Result<PageInfo> {
            self.inner.page(index)
        }

        fn set_page_box(&mut self, index: usize, kind: BoxKind, rect: Rect) -> Result<()> {
            self.inner.set_page_box(index, kind, rect)
        }

        fn apply_content_transform(&mut self, index: usize, transform: Affine) -> Result<()> {
            self.inner.apply_content_transform(index, transform)
        }

        fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
            self.inner.set_rotation(index, rotation)
        }

        fn insert_page(&mut self, at: usize, width: f32, height: f32) -> Result<()> {
            if self.inserts_left == 0 {
                return Err(EditError::Structure("page tree is read-only".into()));
            }
            self.inserts_left -= 1;
            self.inner.insert_page(at, width, height)
        }

        fn delete_page(&mut self, index: usize) -> Result<()> {
            if self.undeletable == Some(self.inner.pages[index].label.as_str()) {
                return Err(EditError::Structure("page is locked".into()));
            }
            self.inner.delete_page(index)
        }

        fn redact_rect(&mut self, index: usize, rect: Rect) -> Result<()> {
            self.inner.redact_rect(index, rect)
        }

        fn insert_text(&mut self, index: usize, text: &TextPlacement) -> Result<()> {
            self.inner.insert_text(index, text)
        }

        fn place_page(&mut self, target: usize, source: usize, transform: Affine) -> Result<()> {
            self.inner.place_page(target, source, transform)
        }
    }

    fn params(rows: usize, cols: usize, keep_originals: bool) -> GridParams {
        GridParams {
            rows,
            cols,
            sheet: PageSize::new(
                PaperSize::Custom {
                    width_mm: 254.0,
                    height_mm: 254.0,
                },
                Orientation::Portrait,
            ),
            keep_originals,
        }
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    fn placed_labels(doc: &MemoryDocument, index: usize) -> Vec<(String, Affine)> {
        doc.pages[index]
            .content
            .iter()
            .filter_map(|op| match op {
                ContentOp::Placed {
                    label, transform, ..
                } => Some((label.clone(), *transform)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cell_order_row_major_from_top() {
        assert_eq!(cell_position(0, 2), (0, 0));
        assert_eq!(cell_position(1, 2), (0, 1));
        assert_eq!(cell_position(2, 2), (1, 0));

        let p = params(2, 2, false);
        let top_left = cell_rect(0, 0, &p, (720.0, 720.0));
        assert_eq!(top_left, Rect::new(0.0, 360.0, 360.0, 720.0));
        let bottom_right = cell_rect(1, 1, &p, (720.0, 720.0));
        assert_eq!(bottom_right, Rect::new(360.0, 0.0, 720.0, 360.0));
    }

    #[test]
    fn test_cell_transform_maps_corners() {
        let source = Rect::new(10.0, 20.0, 110.0, 220.0);
        let cell = Rect::new(360.0, 0.0, 720.0, 360.0);
        let t = cell_transform(&source, &cell);
        assert!(close(t.apply(10.0, 20.0), (360.0, 0.0)));
        assert!(close(t.apply(110.0, 220.0), (720.0, 360.0)));
    }

    #[test]
    fn test_five_pages_two_by_two() {
        let mut doc = MemoryDocument::uniform(5, 100.0, 200.0);
        let report = grid_merge(
            &mut doc,
            &PageSelection::all(5),
            &params(2, 2, false),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(report.created, vec![0, 1]);
        assert_eq!(report.applied, vec![0, 1, 2, 3, 4]);

        let first: Vec<String> = placed_labels(&doc, 0).into_iter().map(|(l, _)| l).collect();
        assert_eq!(first, vec!["1", "2", "3", "4"]);
        let second = placed_labels(&doc, 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].0, "5");
        // The lone page on the last sheet goes top-left
        assert!(close(second[0].1.apply(0.0, 200.0), (0.0, 720.0)));
    }

    #[test]
    fn test_keep_originals_inserts_before_first_selected() {
        let mut doc = MemoryDocument::uniform(4, 100.0, 200.0);
        let report = grid_merge(
            &mut doc,
            &PageSelection::from_indices([1, 3]),
            &params(1, 2, true),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(doc.labels(), vec!["1", "blank", "2", "3", "4"]);
        assert_eq!(report.created, vec![1]);
        let placed: Vec<String> = placed_labels(&doc, 1).into_iter().map(|(l, _)| l).collect();
        assert_eq!(placed, vec!["2", "4"]);
    }

    #[test]
    fn test_sources_removed_around_sheet() {
        let mut doc = MemoryDocument::uniform(4, 100.0, 200.0);
        grid_merge(
            &mut doc,
            &PageSelection::from_indices([1, 3]),
            &params(1, 2, false),
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(doc.labels(), vec!["1", "blank", "3"]);
    }

    #[test]
    fn test_failed_sheet_keeps_its_sources() {
        let mut doc = Flaky {
            inner: MemoryDocument::uniform(3, 100.0, 200.0),
            inserts_left: 1,
            undeletable: None,
        };
        let report = grid_merge(
            &mut doc,
            &PageSelection::all(3),
            &params(1, 2, false),
            &mut NoProgress,
        )
        .unwrap();

        // The first sheet holds pages 1 and 2; page 3 had no sheet and stays
        assert_eq!(report.created, vec![0]);
        assert_eq!(report.applied, vec![0, 1]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 2);
        assert_eq!(doc.inner.labels(), vec!["blank", "3"]);
    }

    #[test]
    fn test_failed_removal_is_reported() {
        let mut doc = Flaky {
            inner: MemoryDocument::uniform(3, 100.0, 200.0),
            inserts_left: usize::MAX,
            undeletable: Some("2"),
        };
        let report = grid_merge(
            &mut doc,
            &PageSelection::all(3),
            &params(1, 3, false),
            &mut NoProgress,
        )
        .unwrap();

        assert_eq!(report.applied, vec![0, 2]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(matches!(
            &report.skipped[0].reason,
            SkipReason::PageError(msg) if msg.contains("not removed")
        ));
        assert_eq!(doc.inner.labels(), vec!["blank", "2"]);
    }

    #[test]
    fn test_zero_rows_rejected() {
        let mut doc = MemoryDocument::uniform(2, 100.0, 200.0);
        let result = grid_merge(
            &mut doc,
            &PageSelection::all(2),
            &params(0, 2, false),
            &mut NoProgress,
        );
        assert!(result.is_err());
        assert_eq!(doc.page_count(), 2);
    }
}
