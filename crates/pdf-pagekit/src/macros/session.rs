use super::action::{Action, Macro};
use super::library::MacroLibrary;
use super::recorder::{Recorder, StopOutcome};
use crate::document::PageDocument;
use crate::numbering::{insert_page_numbers, remove_page_numbers};
use crate::options::RotateParams;
use crate::progress::ProgressSink;
use crate::selection::{PageSelection, SelectionSpec};
use crate::transform::{
    crop, delete_pages, grid_merge, insert_blank_pages, mask_crop, resize, rotate, shift,
};
use crate::types::{EditError, OperationReport, Result};

/// An editing session: the current selection, the recorder and the macro library.
///
/// Every operation goes through [`EditSession::dispatch`], which runs it and,
/// if a recording is active, appends it to the recording.
#[derive(Debug, Default)]
pub struct EditSession {
    library: MacroLibrary,
    recorder: Recorder,
    /// `None` means every page, resolved when an action runs
    selection: Option<PageSelection>,
    /// How `selection` was made, replayed at the head of a new recording
    selection_spec: Option<SelectionSpec>,
}

impl EditSession {
    pub fn new(library: MacroLibrary) -> Self {
        Self {
            library,
            ..Default::default()
        }
    }

    pub fn library(&self) -> &MacroLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut MacroLibrary {
        &mut self.library
    }

    pub fn into_library(self) -> MacroLibrary {
        self.library
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// The current selection resolved against `doc`
    pub fn selection(&self, doc: &impl PageDocument) -> PageSelection {
        match &self.selection {
            Some(selection) => selection.clone(),
            None => PageSelection::all(doc.page_count()),
        }
    }

    /// Start recording. A selection already in effect becomes the first step,
    /// so the macro acts on the same pages when replayed.
    pub fn start_recording(&mut self, name: impl Into<String>) -> Result<()> {
        let seed = match &self.selection_spec {
            Some(spec) => Some(Action::SelectPages(spec.clone()).to_record()?),
            None => None,
        };
        self.recorder.start(name)?;
        if let Some(record) = seed {
            self.recorder.record(record);
        }
        Ok(())
    }

    /// Stop recording; a non-empty recording is stored in the library
    pub fn stop_recording(&mut self) -> Result<StopOutcome> {
        let outcome = self.recorder.stop()?;
        if let StopOutcome::Saved(m) = &outcome {
            if self.library.insert(m.clone())?.is_some() {
                log::info!("Replaced existing macro '{}'", m.name);
            }
        }
        Ok(outcome)
    }

    pub fn cancel_recording(&mut self) -> Result<usize> {
        self.recorder.cancel()
    }

    /// Run one action against `doc`, recording it if a recording is active.
    ///
    /// Actions that fail validation are not recorded.
    pub fn dispatch<D: PageDocument>(
        &mut self,
        doc: &mut D,
        action: Action,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        let record = action.to_record()?;
        let report = self.execute(doc, &action, progress)?;
        self.recorder.record(record);
        Ok(report)
    }

    /// Make an explicit selection on `doc` (recorded with its page count)
    pub fn select_pages<D: PageDocument>(
        &mut self,
        doc: &mut D,
        selection: &PageSelection,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        let spec = SelectionSpec::pages(selection, &*doc);
        self.dispatch(doc, Action::SelectPages(spec), progress)
    }

    /// Replay a macro from the library
    pub fn replay<D: PageDocument>(
        &mut self,
        doc: &mut D,
        name: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        let m = self
            .library
            .get(name)
            .ok_or_else(|| EditError::UnknownMacro(name.to_string()))?;
        self.replay_macro(doc, &m, progress)
    }

    /// Replay `m` step by step.
    ///
    /// Recording is suspended for the duration, and the selection in effect
    /// before the replay is restored afterwards, whether or not it succeeded.
    /// Unknown steps are skipped with a warning.
    pub fn replay_macro<D: PageDocument>(
        &mut self,
        doc: &mut D,
        m: &Macro,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        log::info!("Replaying macro '{}' ({} action(s))", m.name, m.len());
        let recording = self.recorder.suspend();
        let selection = self.selection.clone();
        let selection_spec = self.selection_spec.clone();

        let result = self.run_steps(doc, m, progress);

        self.selection = selection;
        self.selection_spec = selection_spec;
        self.recorder.resume(recording);
        result
    }

    fn run_steps<D: PageDocument>(
        &mut self,
        doc: &mut D,
        m: &Macro,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        let mut report = OperationReport::default();
        for (i, record) in m.actions.iter().enumerate() {
            let action = Action::from_record(record, &m.name)?;
            if let Action::Unknown(tag) = &action {
                log::warn!(
                    "Macro '{}' step {}: unknown action '{}', skipped",
                    m.name,
                    i + 1,
                    tag
                );
                continue;
            }
            progress.status(&format!("{} [{}/{}]: {}", m.name, i + 1, m.len(), action.tag()));
            report.merge(self.execute(doc, &action, progress)?);
        }
        Ok(report)
    }

    fn execute<D: PageDocument>(
        &mut self,
        doc: &mut D,
        action: &Action,
        progress: &mut dyn ProgressSink,
    ) -> Result<OperationReport> {
        if let Action::SelectPages(spec) = action {
            let resolved = spec.resolve(&*doc)?;
            log::debug!("selected {} page(s)", resolved.selection.len());
            self.selection = Some(resolved.selection);
            self.selection_spec = Some(spec.clone());
            return Ok(OperationReport {
                dropped: resolved.dropped,
                ..Default::default()
            });
        }

        let selection = self.selection(&*doc);
        match action {
            Action::Crop(p) => crop(doc, &selection, p, progress),
            Action::MaskCrop(p) => mask_crop(doc, &selection, p, progress),
            Action::Resize(p) => resize(doc, &selection, p, progress),
            Action::Shift(p) => shift(doc, &selection, p, progress),
            Action::Rotate(p) => rotate(doc, &selection, p, progress),
            Action::RotateRight => rotate(doc, &selection, &RotateParams { angle: 90 }, progress),
            Action::RotateLeft => rotate(doc, &selection, &RotateParams { angle: -90 }, progress),
            Action::InsertBlank(p) => insert_blank_pages(doc, &selection, p, progress),
            Action::GridMerge(p) => grid_merge(doc, &selection, p, progress),
            Action::InsertNumbers(p) => insert_page_numbers(doc, &selection, p, progress),
            Action::RemoveNumbers(p) => remove_page_numbers(doc, &selection, p, progress),
            Action::DeletePages => delete_pages(doc, &selection, progress),
            Action::SelectPages(_) => Ok(OperationReport::default()),
            Action::Unknown(tag) => Err(EditError::parameter(format!(
                "unknown action '{}'",
                tag
            ))),
        }
    }
}
