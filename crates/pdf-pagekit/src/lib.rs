//! Page-level PDF editing: geometric transforms, page numbering and
//! recordable macros, all driven through the [`PageDocument`] trait.

pub mod constants;
mod document;
mod geometry;
mod io;
pub mod macros;
mod numbering;
mod options;
mod progress;
mod selection;
mod transform;
mod types;

pub use constants::{mm_to_pt, pt_to_mm};
pub use document::{
    BoxKind, ContentOp, MemoryDocument, MemoryPage, PageDocument, PageEdit, PageInfo,
    PdfDocument, TextPlacement,
};
pub use geometry::{Affine, Rect};
pub use io::{MergeReport, load_pdf, merge_documents, merge_files, save_pdf};
pub use macros::{
    Action, EditSession, Macro, MacroAction, MacroLibrary, Recorder, RecorderState, StopOutcome,
    load_macros, save_macros,
};
pub use numbering::{
    Anchor, Margins, compute_anchor, insert_page_numbers, plan_number, removal_bands,
    remove_page_numbers, text_width,
};
pub use options::*;
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use selection::{PageSelection, ResolvedSelection, SelectionSpec};
pub use transform::{
    ResizePlan, cell_position, cell_rect, cell_transform, crop, crop_rect, delete_pages,
    grid_merge, insert_blank_pages, mask_crop, plan_scaled, plan_unscaled, reposition_offset,
    resize, rotate, shift,
};
pub use types::*;
