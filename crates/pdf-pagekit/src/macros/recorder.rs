use super::action::{Macro, MacroAction};
use crate::types::{EditError, Result};
use std::mem;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording {
        name: String,
        buffer: Vec<MacroAction>,
    },
}

/// Result of stopping a recording
#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Saved(Macro),
    /// Nothing was recorded; no macro is created
    Empty { name: String },
}

/// Idle/Recording state machine.
///
/// Transitions take `&mut self`, so there is exactly one writer.
#[derive(Debug, Default)]
pub struct Recorder {
    state: RecorderState,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    pub fn recording_name(&self) -> Option<&str> {
        match &self.state {
            RecorderState::Recording { name, .. } => Some(name),
            RecorderState::Idle => None,
        }
    }

    pub fn start(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(EditError::parameter("macro name must not be empty"));
        }
        if let RecorderState::Recording { name: active, .. } = &self.state {
            return Err(EditError::RecorderBusy(active.clone()));
        }
        log::info!("Recording macro '{}'", name);
        self.state = RecorderState::Recording {
            name,
            buffer: Vec::new(),
        };
        Ok(())
    }

    /// Append an action; a no-op while idle
    pub fn record(&mut self, action: MacroAction) {
        if let RecorderState::Recording { buffer, .. } = &mut self.state {
            log::debug!("recorded '{}'", action.action);
            buffer.push(action);
        }
    }

    pub fn stop(&mut self) -> Result<StopOutcome> {
        match mem::take(&mut self.state) {
            RecorderState::Idle => Err(EditError::NotRecording),
            RecorderState::Recording { name, buffer } if buffer.is_empty() => {
                log::info!("Macro '{}' recorded nothing, discarded", name);
                Ok(StopOutcome::Empty { name })
            }
            RecorderState::Recording { name, buffer } => {
                log::info!("Macro '{}' recorded {} action(s)", name, buffer.len());
                Ok(StopOutcome::Saved(Macro::new(name, buffer)))
            }
        }
    }

    /// Drop the recording; returns how many actions were discarded
    pub fn cancel(&mut self) -> Result<usize> {
        match mem::take(&mut self.state) {
            RecorderState::Idle => Err(EditError::NotRecording),
            RecorderState::Recording { name, buffer } => {
                log::info!("Recording of '{}' cancelled", name);
                Ok(buffer.len())
            }
        }
    }

    /// Pause recording (for replay); hand the result back to [`Recorder::resume`]
    pub fn suspend(&mut self) -> RecorderState {
        mem::take(&mut self.state)
    }

    pub fn resume(&mut self, state: RecorderState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn step(tag: &str) -> MacroAction {
        MacroAction::new(tag, Map::new())
    }

    #[test]
    fn test_start_record_stop() {
        let mut rec = Recorder::new();
        rec.start("tidy").unwrap();
        rec.record(step("rotate_right"));
        rec.record(step("delete_pages"));

        match rec.stop().unwrap() {
            StopOutcome::Saved(m) => {
                assert_eq!(m.name, "tidy");
                assert_eq!(m.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!rec.is_recording());
    }

    #[test]
    fn test_start_while_recording_is_rejected() {
        let mut rec = Recorder::new();
        rec.start("a").unwrap();
        assert!(matches!(rec.start("b"), Err(EditError::RecorderBusy(n)) if n == "a"));
        assert_eq!(rec.recording_name(), Some("a"));
    }

    #[test]
    fn test_stop_when_idle_or_empty() {
        let mut rec = Recorder::new();
        assert!(matches!(rec.stop(), Err(EditError::NotRecording)));

        rec.start("nothing").unwrap();
        assert_eq!(
            rec.stop().unwrap(),
            StopOutcome::Empty {
                name: "nothing".to_string()
            }
        );
    }

    #[test]
    fn test_idle_ignores_actions_and_cancel_discards() {
        let mut rec = Recorder::new();
        rec.record(step("crop"));
        assert_eq!(rec.state(), &RecorderState::Idle);

        rec.start("x").unwrap();
        rec.record(step("crop"));
        assert_eq!(rec.cancel().unwrap(), 1);
        assert!(!rec.is_recording());
    }

    #[test]
    fn test_suspend_resume() {
        let mut rec = Recorder::new();
        rec.start("outer").unwrap();
        let saved = rec.suspend();
        rec.record(step("crop"));
        rec.resume(saved);
        rec.record(step("shift"));

        match rec.stop().unwrap() {
            StopOutcome::Saved(m) => assert_eq!(m.actions, vec![step("shift")]),
            other => panic!("unexpected {:?}", other),
        }
    }
}
