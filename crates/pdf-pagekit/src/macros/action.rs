//! Recorded actions
//!
//! On disk an action is a tag plus a free-form parameter object, so a
//! library written by a newer version still loads. In memory it is decoded
//! into [`Action`]; tags this version does not know become
//! [`Action::Unknown`] and are skipped on replay.

use crate::options::{
    BlankPageParams, CropParams, GridParams, NumberingParams, RemovalParams, ResizeParams,
    RotateParams, ShiftParams,
};
use crate::selection::SelectionSpec;
use crate::types::{EditError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One stored macro step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroAction {
    pub action: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl MacroAction {
    pub fn new(action: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }
}

/// A named, ordered list of actions
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Macro {
    pub name: String,
    pub actions: Vec<MacroAction>,
}

impl Macro {
    pub fn new(name: impl Into<String>, actions: Vec<MacroAction>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Every operation that can be dispatched and recorded
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectPages(SelectionSpec),
    Crop(CropParams),
    MaskCrop(CropParams),
    Resize(ResizeParams),
    Shift(ShiftParams),
    Rotate(RotateParams),
    RotateRight,
    RotateLeft,
    InsertBlank(BlankPageParams),
    GridMerge(GridParams),
    InsertNumbers(NumberingParams),
    RemoveNumbers(RemovalParams),
    DeletePages,
    /// A tag this version does not understand
    Unknown(String),
}

pub const SELECT_PAGES: &str = "select_pages";
pub const CROP: &str = "crop";
pub const MASK_CROP: &str = "mask_crop";
pub const RESIZE: &str = "resize";
pub const SHIFT: &str = "shift";
pub const ROTATE: &str = "rotate";
pub const ROTATE_RIGHT: &str = "rotate_right";
pub const ROTATE_LEFT: &str = "rotate_left";
pub const INSERT_BLANK: &str = "insert_blank";
pub const GRID_MERGE: &str = "grid_merge";
pub const INSERT_NUMBERS: &str = "insert_numbers";
pub const REMOVE_NUMBERS: &str = "remove_numbers";
pub const DELETE_PAGES: &str = "delete_pages";

impl Action {
    pub fn tag(&self) -> &str {
        match self {
            Action::SelectPages(_) => SELECT_PAGES,
            Action::Crop(_) => CROP,
            Action::MaskCrop(_) => MASK_CROP,
            Action::Resize(_) => RESIZE,
            Action::Shift(_) => SHIFT,
            Action::Rotate(_) => ROTATE,
            Action::RotateRight => ROTATE_RIGHT,
            Action::RotateLeft => ROTATE_LEFT,
            Action::InsertBlank(_) => INSERT_BLANK,
            Action::GridMerge(_) => GRID_MERGE,
            Action::InsertNumbers(_) => INSERT_NUMBERS,
            Action::RemoveNumbers(_) => REMOVE_NUMBERS,
            Action::DeletePages => DELETE_PAGES,
            Action::Unknown(tag) => tag,
        }
    }

    /// Encode for storage
    pub fn to_record(&self) -> Result<MacroAction> {
        let params = match self {
            Action::SelectPages(spec) => to_params(spec)?,
            Action::Crop(p) | Action::MaskCrop(p) => to_params(p)?,
            Action::Resize(p) => to_params(p)?,
            Action::Shift(p) => to_params(p)?,
            Action::Rotate(p) => to_params(p)?,
            Action::InsertBlank(p) => to_params(p)?,
            Action::GridMerge(p) => to_params(p)?,
            Action::InsertNumbers(p) => to_params(p)?,
            Action::RemoveNumbers(p) => to_params(p)?,
            Action::RotateRight | Action::RotateLeft | Action::DeletePages | Action::Unknown(_) => {
                Map::new()
            }
        };
        Ok(MacroAction::new(self.tag(), params))
    }

    /// Decode a stored step; `macro_name` is only used for error messages
    pub fn from_record(record: &MacroAction, macro_name: &str) -> Result<Action> {
        let p = &record.params;
        let decoded = match record.action.as_str() {
            SELECT_PAGES => from_params(p).map(Action::SelectPages),
            CROP => from_params(p).map(Action::Crop),
            MASK_CROP => from_params(p).map(Action::MaskCrop),
            RESIZE => from_params(p).map(Action::Resize),
            SHIFT => from_params(p).map(Action::Shift),
            ROTATE => from_params(p).map(Action::Rotate),
            ROTATE_RIGHT => Ok(Action::RotateRight),
            ROTATE_LEFT => Ok(Action::RotateLeft),
            INSERT_BLANK => from_params(p).map(Action::InsertBlank),
            GRID_MERGE => from_params(p).map(Action::GridMerge),
            INSERT_NUMBERS => from_params(p).map(Action::InsertNumbers),
            REMOVE_NUMBERS => from_params(p).map(Action::RemoveNumbers),
            DELETE_PAGES => Ok(Action::DeletePages),
            other => Ok(Action::Unknown(other.to_string())),
        };
        decoded.map_err(|e| {
            EditError::macro_format(
                macro_name,
                format!("bad parameters for '{}': {}", record.action, e),
            )
        })
    }
}

fn to_params<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(EditError::Structure(format!(
            "action parameters must encode as an object, got {}",
            other
        ))),
    }
}

fn from_params<T: DeserializeOwned>(params: &Map<String, Value>) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(params.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_selection_record_shape() {
        let action = Action::SelectPages(SelectionSpec::Pages {
            indices: vec![0, 2, 4],
            source_page_count: 6,
        });
        let record = action.to_record().unwrap();
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "action": "select_pages",
                "params": {"kind": "pages", "indices": [0, 2, 4], "source_page_count": 6}
            })
        );
    }

    #[test]
    fn test_unknown_tag_decodes_as_unknown() {
        let record = MacroAction::new("sharpen", Map::new());
        assert_eq!(
            Action::from_record(&record, "m").unwrap(),
            Action::Unknown("sharpen".to_string())
        );
    }

    #[test]
    fn test_missing_params_use_defaults() {
        let record: MacroAction =
            serde_json::from_value(json!({"action": "insert_numbers"})).unwrap();
        match Action::from_record(&record, "m").unwrap() {
            Action::InsertNumbers(p) => assert_eq!(p, NumberingParams::default()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_params_name_the_macro() {
        let value = json!({"action": "rotate", "params": {"angle": "left"}});
        let record: MacroAction = serde_json::from_value(value).unwrap();
        match Action::from_record(&record, "turny") {
            Err(EditError::MacroFormat { name, .. }) => assert_eq!(name, "turny"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
