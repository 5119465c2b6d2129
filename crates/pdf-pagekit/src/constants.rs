//! Shared constants for page editing
//!
//! This module centralizes magic numbers and constants used throughout
//! the transform and numbering engines.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Page Numbers
// =============================================================================

/// Default font size for page numbers (points)
pub const PAGE_NUMBER_FONT_SIZE: f32 = 10.0;

/// Approximate character width ratio for Helvetica
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Resource name under which the numbering font is registered on a page
pub const NUMBER_FONT_RESOURCE: &str = "FPgNum";

/// Base font used for page numbers
pub const NUMBER_FONT_BASE: &str = "Helvetica";

// =============================================================================
// Content Streams
// =============================================================================

/// Resource name prefix for stamped source pages (grid merge)
pub const PLACED_PAGE_PREFIX: &str = "PgCell";

/// Fill color used to cover redacted areas (RGB, 0-1)
pub const REDACTION_FILL: (f32, f32, f32) = (1.0, 1.0, 1.0);

// =============================================================================
// Macros
// =============================================================================

/// Default file name of the macro library
pub const DEFAULT_MACRO_FILE: &str = "macros.json";
