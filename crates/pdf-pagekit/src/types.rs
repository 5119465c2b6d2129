use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed document: {0}")]
    Structure(String),
    #[error("Invalid parameter: {0}")]
    Parameter(String),
    #[error("Page index {index} out of range (document has {count} pages)")]
    PageIndex { index: usize, count: usize },
    #[error("Malformed macro '{name}': {message}")]
    MacroFormat { name: String, message: String },
    #[error("Macro '{0}' not found")]
    UnknownMacro(String),
    #[error("Already recording macro '{0}'")]
    RecorderBusy(String),
    #[error("No macro is being recorded")]
    NotRecording,
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to edit")]
    NoPages,
}

impl EditError {
    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        EditError::Parameter(message.into())
    }

    pub(crate) fn macro_format(name: &str, message: impl Into<String>) -> Self {
        EditError::MacroFormat {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;

/// Paper orientation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Portrait: height > width (default for most paper sizes)
    #[default]
    Portrait,
    /// Landscape: width > height
    Landscape,
}

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaperSize {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// Get base dimensions (always portrait: width < height for standard sizes)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Tabloid => (279.4, 431.8),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn dimensions_with_orientation(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Dimensions in points with orientation applied
    pub fn dimensions_pt(self, orientation: Orientation) -> (f32, f32) {
        let (w, h) = self.dimensions_with_orientation(orientation);
        (crate::mm_to_pt(w), crate::mm_to_pt(h))
    }
}

/// Target page size: a paper size plus its orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub paper: PaperSize,
    #[serde(default)]
    pub orientation: Orientation,
}

impl PageSize {
    pub fn new(paper: PaperSize, orientation: Orientation) -> Self {
        Self { paper, orientation }
    }

    /// (width, height) in points
    pub fn dimensions_pt(&self) -> (f32, f32) {
        self.paper.dimensions_pt(self.orientation)
    }

    pub(crate) fn validate(&self, what: &str) -> Result<()> {
        let (w, h) = self.paper.dimensions_mm();
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(EditError::parameter(format!(
                "{} size must be positive, got {}x{} mm",
                what, w, h
            )));
        }
        Ok(())
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::new(PaperSize::A4, Orientation::Portrait)
    }
}

/// Page rotation, always one of the four right angles (clockwise, as displayed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// Normalize any multiple of 90 (negative allowed) into a rotation.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Clockwise90),
            180 => Some(Rotation::Clockwise180),
            270 => Some(Rotation::Clockwise270),
            _ => None,
        }
    }

    /// Add `angle` degrees, wrapping mod 360.
    pub fn rotate_by(self, angle: i32) -> Option<Self> {
        Self::from_degrees(self.degrees() + angle.rem_euclid(360))
    }

    /// True when displayed width and height are swapped relative to the page box
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }
}

/// Why a page was left untouched by an operation
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Crop rectangle came out inverted or empty
    DegenerateCrop,
    /// The page could not be read or written
    PageError(String),
}

/// A page that an operation skipped
#[derive(Debug, Clone, PartialEq)]
pub struct PageSkip {
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of a batch operation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationReport {
    /// Pages that were modified (indices at the time of modification)
    pub applied: Vec<usize>,
    /// Pages left unmodified
    pub skipped: Vec<PageSkip>,
    /// Number of selected indices dropped because they were out of range
    pub dropped: usize,
    /// Indices of newly created pages in the resulting document
    pub created: Vec<usize>,
}

impl OperationReport {
    pub(crate) fn with_dropped(dropped: usize) -> Self {
        Self {
            dropped,
            ..Default::default()
        }
    }

    pub(crate) fn skip(&mut self, index: usize, reason: SkipReason) {
        self.skipped.push(PageSkip { index, reason });
    }

    /// Fold another report into this one (used when replaying several actions)
    pub fn merge(&mut self, other: OperationReport) {
        self.applied.extend(other.applied);
        self.skipped.extend(other.skipped);
        self.dropped += other.dropped;
        self.created.extend(other.created);
    }
}
