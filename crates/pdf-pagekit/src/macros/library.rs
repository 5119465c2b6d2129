//! Named macro storage
//!
//! The file is a JSON object mapping each macro name to
//! `{"actions": [{"action": "...", "params": {...}}, ...]}`. A bare list
//! of actions is also accepted in place of the object. Everything is
//! checked on load so a broken entry is reported up front instead of
//! half-way through a replay.

use super::action::{Action, Macro, MacroAction};
use crate::types::{EditError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Name used in errors about the file as a whole
const LIBRARY: &str = "<library>";

#[derive(Serialize)]
struct StoredMacro<'a> {
    actions: &'a [MacroAction],
}

#[derive(Deserialize)]
struct StoredMacroOwned {
    actions: Vec<MacroAction>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacroLibrary {
    macros: BTreeMap<String, Vec<MacroAction>>,
}

impl MacroLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| EditError::macro_format(LIBRARY, format!("not valid JSON: {}", e)))?;
        let Value::Object(entries) = root else {
            return Err(EditError::macro_format(
                LIBRARY,
                "expected an object mapping macro names to macros",
            ));
        };

        let mut macros = BTreeMap::new();
        for (name, entry) in entries {
            let actions = parse_entry(&name, entry)?;
            validate_actions(&name, &actions)?;
            macros.insert(name, actions);
        }
        Ok(Self { macros })
    }

    pub fn to_json_string(&self) -> Result<String> {
        let stored: BTreeMap<&str, StoredMacro<'_>> = self
            .macros
            .iter()
            .map(|(name, actions)| (name.as_str(), StoredMacro { actions }))
            .collect();
        Ok(serde_json::to_string_pretty(&stored)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&text)
    }

    /// Like [`MacroLibrary::load`], but a missing file is an empty library
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match tokio::fs::read_to_string(path.as_ref()).await {
            Ok(text) => Self::from_json_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No macro file at {}", path.as_ref().display());
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json_string()?;
        tokio::fs::write(path.as_ref(), json).await?;
        log::info!(
            "Saved {} macro(s) to {}",
            self.macros.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Macro names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.macros.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<Macro> {
        self.macros
            .get(name)
            .map(|actions| Macro::new(name, actions.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Add or replace a macro; returns the one it replaced
    pub fn insert(&mut self, m: Macro) -> Result<Option<Macro>> {
        validate_name(&m.name)?;
        validate_actions(&m.name, &m.actions)?;
        let previous = self.macros.insert(m.name.clone(), m.actions);
        Ok(previous.map(|actions| Macro::new(m.name, actions)))
    }

    /// Replace the actions of an existing macro
    pub fn edit(&mut self, name: &str, actions: Vec<MacroAction>) -> Result<()> {
        validate_actions(name, &actions)?;
        let slot = self
            .macros
            .get_mut(name)
            .ok_or_else(|| EditError::UnknownMacro(name.to_string()))?;
        *slot = actions;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Macro> {
        self.macros
            .remove(name)
            .map(|actions| Macro::new(name, actions))
            .ok_or_else(|| EditError::UnknownMacro(name.to_string()))
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        validate_name(to)?;
        if from != to && self.macros.contains_key(to) {
            return Err(EditError::parameter(format!(
                "a macro named '{}' already exists",
                to
            )));
        }
        let actions = self
            .macros
            .remove(from)
            .ok_or_else(|| EditError::UnknownMacro(from.to_string()))?;
        self.macros.insert(to.to_string(), actions);
        Ok(())
    }
}

fn parse_entry(name: &str, entry: Value) -> Result<Vec<MacroAction>> {
    let list = match entry {
        Value::Object(_) => {
            let stored: StoredMacroOwned = serde_json::from_value(entry)
                .map_err(|e| EditError::macro_format(name, e.to_string()))?;
            return Ok(stored.actions);
        }
        Value::Array(list) => list,
        _ => {
            return Err(EditError::macro_format(
                name,
                "expected {\"actions\": [...]} or a list of actions",
            ));
        }
    };

    list.into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .map_err(|e| EditError::macro_format(name, format!("action {}: {}", i + 1, e)))
        })
        .collect()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EditError::parameter("macro name must not be empty"));
    }
    Ok(())
}

/// Known tags must carry decodable parameters; unknown tags are kept as-is
fn validate_actions(name: &str, actions: &[MacroAction]) -> Result<()> {
    for action in actions {
        if action.action.trim().is_empty() {
            return Err(EditError::macro_format(name, "action tag must not be empty"));
        }
        if let Action::Unknown(tag) = Action::from_record(action, name)? {
            log::warn!("Macro '{}' uses unknown action '{}'", name, tag);
        }
    }
    Ok(())
}
