use crate::constants::{PAGE_NUMBER_FONT_SIZE, mm_to_pt};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Where content goes when a page's geometry changes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OffsetMode {
    /// Centered (or left in place, for crop repositioning)
    #[default]
    Center,
    /// Explicit offset in millimeters
    Custom { dx_mm: f32, dy_mm: f32 },
}

impl OffsetMode {
    fn validate(&self) -> Result<()> {
        if let OffsetMode::Custom { dx_mm, dy_mm } = self {
            require_finite("offset", *dx_mm)?;
            require_finite("offset", *dy_mm)?;
        }
        Ok(())
    }
}

/// Margins to cut from each page, measured from the mediabox
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropParams {
    pub left_mm: f32,
    pub right_mm: f32,
    pub top_mm: f32,
    pub bottom_mm: f32,
    /// Shift content after a soft crop
    pub reposition: Option<OffsetMode>,
}

impl CropParams {
    pub fn uniform(margin_mm: f32) -> Self {
        Self {
            left_mm: margin_mm,
            right_mm: margin_mm,
            top_mm: margin_mm,
            bottom_mm: margin_mm,
            reposition: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("left", self.left_mm),
            ("right", self.right_mm),
            ("top", self.top_mm),
            ("bottom", self.bottom_mm),
        ] {
            require_non_negative(&format!("{} crop margin", name), value)?;
        }
        if let Some(mode) = &self.reposition {
            mode.validate()?;
        }
        Ok(())
    }

    /// (left, bottom, right, top) in points
    pub fn margins_pt(&self) -> (f32, f32, f32, f32) {
        (
            mm_to_pt(self.left_mm),
            mm_to_pt(self.bottom_mm),
            mm_to_pt(self.right_mm),
            mm_to_pt(self.top_mm),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeParams {
    pub target: PageSize,
    /// Scale content to fit the target (aspect preserved, always centered)
    pub scale_content: bool,
    /// Placement when content is not scaled
    pub position: OffsetMode,
}

impl ResizeParams {
    pub fn validate(&self) -> Result<()> {
        self.target.validate("target page")?;
        self.position.validate()
    }
}

/// Translate page content
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftParams {
    pub dx_mm: f32,
    pub dy_mm: f32,
}

impl ShiftParams {
    pub fn validate(&self) -> Result<()> {
        require_finite("shift", self.dx_mm)?;
        require_finite("shift", self.dy_mm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateParams {
    /// Clockwise degrees; must be a multiple of 90
    pub angle: i32,
}

impl RotateParams {
    pub fn validate(&self) -> Result<()> {
        if self.angle % 90 != 0 {
            return Err(EditError::parameter(format!(
                "rotation must be a multiple of 90 degrees, got {}",
                self.angle
            )));
        }
        Ok(())
    }
}

/// Side of the anchor page a blank page is inserted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    #[default]
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlankPageParams {
    /// Page size; `None` copies the anchor page's mediabox size
    pub size: Option<PageSize>,
    pub position: InsertPosition,
}

impl BlankPageParams {
    pub fn validate(&self) -> Result<()> {
        match &self.size {
            Some(size) => size.validate("blank page"),
            None => Ok(()),
        }
    }
}

/// N-up merge of selected pages onto new sheets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub rows: usize,
    pub cols: usize,
    pub sheet: PageSize,
    /// Leave the source pages in the document
    pub keep_originals: bool,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            rows: 2,
            cols: 2,
            sheet: PageSize::default(),
            keep_originals: false,
        }
    }
}

impl GridParams {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(EditError::parameter(format!(
                "grid must have at least one row and column, got {}x{}",
                self.rows, self.cols
            )));
        }
        self.sheet.validate("sheet")
    }

    pub fn cells_per_sheet(&self) -> usize {
        self.rows * self.cols
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlign {
    /// Left and right swap; center stays
    pub fn mirrored(self) -> Self {
        match self {
            HorizontalAlign::Left => HorizontalAlign::Right,
            HorizontalAlign::Center => HorizontalAlign::Center,
            HorizontalAlign::Right => HorizontalAlign::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalPosition {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    #[default]
    Normal,
    /// Alignment alternates with position in the selection (facing pages)
    Mirrored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// "N"
    #[default]
    Number,
    /// "Page N of M"
    PageOfTotal,
}

impl NumberFormat {
    pub fn render(self, number: usize, total: usize) -> String {
        match self {
            NumberFormat::Number => number.to_string(),
            NumberFormat::PageOfTotal => format!("Page {} of {}", number, total),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingParams {
    pub start: usize,
    pub mode: CountingMode,
    pub align: HorizontalAlign,
    pub vertical: VerticalPosition,
    pub left_mm: f32,
    pub right_mm: f32,
    pub vertical_mm: f32,
    /// Swap left/right margins on every other selected page
    pub mirror_margins: bool,
    pub font_size: f32,
    pub format: NumberFormat,
}

impl Default for NumberingParams {
    fn default() -> Self {
        Self {
            start: 1,
            mode: CountingMode::Normal,
            align: HorizontalAlign::Center,
            vertical: VerticalPosition::Bottom,
            left_mm: 10.0,
            right_mm: 10.0,
            vertical_mm: 10.0,
            mirror_margins: false,
            font_size: PAGE_NUMBER_FONT_SIZE,
            format: NumberFormat::Number,
        }
    }
}

impl NumberingParams {
    pub fn validate(&self) -> Result<()> {
        if self.start == 0 {
            return Err(EditError::parameter("numbering starts at 1 or higher"));
        }
        require_non_negative("left margin", self.left_mm)?;
        require_non_negative("right margin", self.right_mm)?;
        require_non_negative("vertical margin", self.vertical_mm)?;
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(EditError::parameter(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Header/footer bands to erase, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemovalParams {
    pub top_mm: f32,
    pub bottom_mm: f32,
    pub left_mm: f32,
    pub right_mm: f32,
}

impl Default for RemovalParams {
    fn default() -> Self {
        Self {
            top_mm: 15.0,
            bottom_mm: 15.0,
            left_mm: 0.0,
            right_mm: 0.0,
        }
    }
}

impl RemovalParams {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("top band", self.top_mm)?;
        require_non_negative("bottom band", self.bottom_mm)?;
        require_non_negative("left inset", self.left_mm)?;
        require_non_negative("right inset", self.right_mm)
    }
}

fn require_finite(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(EditError::parameter(format!(
            "{} must be a finite number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: f32) -> Result<()> {
    require_finite(name, value)?;
    if value < 0.0 {
        return Err(EditError::parameter(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

mod serde_impls {
    use super::*;
    use serde::{Deserialize, Serialize};

    impl Serialize for PaperSize {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            use serde::ser::SerializeStruct;
            match self {
                PaperSize::A3 => serializer.serialize_str("A3"),
                PaperSize::A4 => serializer.serialize_str("A4"),
                PaperSize::A5 => serializer.serialize_str("A5"),
                PaperSize::Letter => serializer.serialize_str("Letter"),
                PaperSize::Legal => serializer.serialize_str("Legal"),
                PaperSize::Tabloid => serializer.serialize_str("Tabloid"),
                PaperSize::Custom {
                    width_mm,
                    height_mm,
                } => {
                    let mut s = serializer.serialize_struct("Custom", 2)?;
                    s.serialize_field("width_mm", width_mm)?;
                    s.serialize_field("height_mm", height_mm)?;
                    s.end()
                }
            }
        }
    }

    impl<'de> Deserialize<'de> for PaperSize {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            use serde::de::{self, MapAccess, Visitor};
            use std::fmt;

            struct PaperSizeVisitor;

            impl<'de> Visitor<'de> for PaperSizeVisitor {
                type Value = PaperSize;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("a paper size name or {width_mm, height_mm}")
                }

                fn visit_str<E>(self, value: &str) -> std::result::Result<PaperSize, E>
                where
                    E: de::Error,
                {
                    match value {
                        "A3" => Ok(PaperSize::A3),
                        "A4" => Ok(PaperSize::A4),
                        "A5" => Ok(PaperSize::A5),
                        "Letter" => Ok(PaperSize::Letter),
                        "Legal" => Ok(PaperSize::Legal),
                        "Tabloid" => Ok(PaperSize::Tabloid),
                        _ => Err(de::Error::unknown_variant(
                            value,
                            &["A3", "A4", "A5", "Letter", "Legal", "Tabloid", "Custom"],
                        )),
                    }
                }

                fn visit_map<M>(self, mut map: M) -> std::result::Result<PaperSize, M::Error>
                where
                    M: MapAccess<'de>,
                {
                    let mut width_mm = None;
                    let mut height_mm = None;

                    while let Some(key) = map.next_key::<String>()? {
                        match key.as_str() {
                            "width_mm" => width_mm = Some(map.next_value()?),
                            "height_mm" => height_mm = Some(map.next_value()?),
                            _ => {
                                let _: serde::de::IgnoredAny = map.next_value()?;
                            }
                        }
                    }

                    match (width_mm, height_mm) {
                        (Some(w), Some(h)) => Ok(PaperSize::Custom {
                            width_mm: w,
                            height_mm: h,
                        }),
                        _ => Err(de::Error::missing_field("width_mm or height_mm")),
                    }
                }
            }

            deserializer.deserialize_any(PaperSizeVisitor)
        }
    }
}
