//! Macro recording, storage and replay

mod action;
mod library;
mod recorder;
mod session;

pub use action::{Action, Macro, MacroAction};
pub use library::MacroLibrary;
pub use recorder::{Recorder, RecorderState, StopOutcome};
pub use session::EditSession;

/// Action tags as written to macro files
pub mod tags {
    pub use super::action::{
        CROP, DELETE_PAGES, GRID_MERGE, INSERT_BLANK, INSERT_NUMBERS, MASK_CROP, REMOVE_NUMBERS,
        RESIZE, ROTATE, ROTATE_LEFT, ROTATE_RIGHT, SELECT_PAGES, SHIFT,
    };
}

use crate::types::Result;
use std::path::Path;

/// Load a macro library, treating a missing file as empty
pub async fn load_macros(path: impl AsRef<Path>) -> Result<MacroLibrary> {
    MacroLibrary::load_or_default(path).await
}

pub async fn save_macros(library: &MacroLibrary, path: impl AsRef<Path>) -> Result<()> {
    library.save(path).await
}
