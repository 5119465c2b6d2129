//! Page selection
//!
//! A [`PageSelection`] is a normalized set of zero-based page indices. It is
//! order-independent: engines always walk it in ascending order. Indices are
//! checked against the document only when an operation resolves the
//! selection, and out-of-range indices are dropped, never clamped.
//!
//! A [`SelectionSpec`] describes *how* a selection was made, so a recorded
//! macro can rebuild it against a different document.

use crate::document::PageDocument;
use crate::types::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageSelection {
    indices: BTreeSet<usize>,
}

impl PageSelection {
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }

    pub fn all(page_count: usize) -> Self {
        Self::from_indices(0..page_count)
    }

    /// Odd page numbers (1, 3, 5, ...), i.e. even indices
    pub fn odd(page_count: usize) -> Self {
        Self::from_indices((0..page_count).step_by(2))
    }

    /// Even page numbers (2, 4, 6, ...), i.e. odd indices
    pub fn even(page_count: usize) -> Self {
        Self::from_indices((1..page_count).step_by(2))
    }

    pub fn portrait(doc: &impl PageDocument) -> Result<Self> {
        Self::all(doc.page_count()).filter_portrait(doc)
    }

    pub fn landscape(doc: &impl PageDocument) -> Result<Self> {
        Self::all(doc.page_count()).filter_landscape(doc)
    }

    /// Parse 1-based ranges such as `"1-3,5,8-"`.
    ///
    /// An open end (`"8-"`) runs to `page_count`. Pages past `page_count`
    /// are left out (and logged), so a huge range costs nothing.
    pub fn parse_ranges(text: &str, page_count: usize) -> Result<Self> {
        let mut indices = BTreeSet::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => {
                    let start = if a.trim().is_empty() {
                        1
                    } else {
                        parse_page_number(a)?
                    };
                    let end = if b.trim().is_empty() {
                        page_count.max(start - 1)
                    } else {
                        parse_page_number(b)?
                    };
                    (start, end)
                }
                None => {
                    let n = parse_page_number(part)?;
                    (n, n)
                }
            };
            if start > end {
                return Err(EditError::parameter(format!(
                    "inverted page range '{}'",
                    part
                )));
            }
            let kept_end = end.min(page_count);
            if kept_end < end {
                log::warn!(
                    "pages {}-{} are past the end of the document ({} pages)",
                    start.max(kept_end + 1),
                    end,
                    page_count
                );
            }
            if start <= kept_end {
                indices.extend((start - 1)..kept_end);
            }
        }
        Ok(Self { indices })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Split into in-range indices (ascending) and the number dropped
    pub fn resolve(&self, page_count: usize) -> (Vec<usize>, usize) {
        let valid: Vec<usize> = self.indices.range(..page_count).copied().collect();
        let dropped = self.indices.len() - valid.len();
        if dropped > 0 {
            log::warn!(
                "Dropped {} selected page(s) outside a {}-page document",
                dropped,
                page_count
            );
        }
        (valid, dropped)
    }

    /// Keep indices that are odd page numbers
    pub fn filter_odd(&self) -> Self {
        Self::from_indices(self.iter().filter(|i| i % 2 == 0))
    }

    /// Keep indices that are even page numbers
    pub fn filter_even(&self) -> Self {
        Self::from_indices(self.iter().filter(|i| i % 2 == 1))
    }

    pub fn filter_portrait(&self, doc: &impl PageDocument) -> Result<Self> {
        self.filter_by(doc, |landscape| !landscape)
    }

    pub fn filter_landscape(&self, doc: &impl PageDocument) -> Result<Self> {
        self.filter_by(doc, |landscape| landscape)
    }

    fn filter_by(&self, doc: &impl PageDocument, keep: impl Fn(bool) -> bool) -> Result<Self> {
        let (valid, _) = self.resolve(doc.page_count());
        let mut indices = BTreeSet::new();
        for index in valid {
            if keep(doc.page(index)?.is_landscape()) {
                indices.insert(index);
            }
        }
        Ok(Self { indices })
    }
}

impl FromIterator<usize> for PageSelection {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self::from_indices(iter)
    }
}

fn parse_page_number(text: &str) -> Result<usize> {
    let n: usize = text
        .trim()
        .parse()
        .map_err(|_| EditError::parameter(format!("'{}' is not a page number", text.trim())))?;
    if n == 0 {
        return Err(EditError::parameter("page numbers start at 1"));
    }
    Ok(n)
}

/// How a selection was made, re-resolvable against any document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionSpec {
    #[default]
    All,
    Odd,
    Even,
    Portrait,
    Landscape,
    /// Explicit indices, remembered with the page count they were picked from
    Pages {
        indices: Vec<usize>,
        source_page_count: usize,
    },
}

/// A selection rebuilt against a concrete document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub selection: PageSelection,
    pub dropped: usize,
}

impl SelectionSpec {
    /// Record an explicit selection made on `doc`
    pub fn pages(selection: &PageSelection, doc: &impl PageDocument) -> Self {
        SelectionSpec::Pages {
            indices: selection.to_vec(),
            source_page_count: doc.page_count(),
        }
    }

    pub fn resolve(&self, doc: &impl PageDocument) -> Result<ResolvedSelection> {
        let count = doc.page_count();
        let selection = match self {
            SelectionSpec::All => PageSelection::all(count),
            SelectionSpec::Odd => PageSelection::odd(count),
            SelectionSpec::Even => PageSelection::even(count),
            SelectionSpec::Portrait => PageSelection::portrait(doc)?,
            SelectionSpec::Landscape => PageSelection::landscape(doc)?,
            SelectionSpec::Pages {
                indices,
                source_page_count,
            } => {
                if *source_page_count != count {
                    log::info!(
                        "Selection recorded on a {}-page document, replaying on {} pages",
                        source_page_count,
                        count
                    );
                }
                let (valid, dropped) = PageSelection::from_indices(indices.iter().copied())
                    .resolve(count);
                return Ok(ResolvedSelection {
                    selection: PageSelection::from_indices(valid),
                    dropped,
                });
            }
        };
        Ok(ResolvedSelection {
            selection,
            dropped: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, MemoryPage};

    #[test]
    fn test_normalized_and_order_independent() {
        let a = PageSelection::from_indices([4, 0, 2, 2]);
        let b = PageSelection::from_indices([0, 2, 4]);
        assert_eq!(a, b);
        assert_eq!(a.to_vec(), vec![0, 2, 4]);
    }

    #[test]
    fn test_odd_even() {
        assert_eq!(PageSelection::odd(5).to_vec(), vec![0, 2, 4]);
        assert_eq!(PageSelection::even(5).to_vec(), vec![1, 3]);
        let sel = PageSelection::from_indices([1, 2, 3, 6]);
        assert_eq!(sel.filter_odd().to_vec(), vec![2, 6]);
        assert_eq!(sel.filter_even().to_vec(), vec![1, 3]);
    }

    #[test]
    fn test_resolve_drops_out_of_range() {
        let sel = PageSelection::from_indices([0, 3, 5, 9]);
        let (valid, dropped) = sel.resolve(5);
        assert_eq!(valid, vec![0, 3]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn test_parse_ranges() {
        let sel = PageSelection::parse_ranges("1-3, 5, 8-", 9).unwrap();
        assert_eq!(sel.to_vec(), vec![0, 1, 2, 4, 7, 8]);

        let sel = PageSelection::parse_ranges("-2", 9).unwrap();
        assert_eq!(sel.to_vec(), vec![0, 1]);

        assert!(PageSelection::parse_ranges("5-2", 9).is_err());
        assert!(PageSelection::parse_ranges("0", 9).is_err());
        assert!(PageSelection::parse_ranges("x", 9).is_err());
    }

    #[test]
    fn test_parse_ranges_past_the_end_are_left_out() {
        let sel = PageSelection::parse_ranges("1-4000000000", 3).unwrap();
        assert_eq!(sel.to_vec(), vec![0, 1, 2]);

        let sel = PageSelection::parse_ranges("2, 7, 9-12", 5).unwrap();
        assert_eq!(sel.to_vec(), vec![1]);

        // Still rejected when inverted, even if both ends are out of range
        assert!(PageSelection::parse_ranges("12-9", 5).is_err());
    }

    #[test]
    fn test_portrait_landscape_follow_rotation() {
        let mut doc = MemoryDocument::from_pages(vec![
            MemoryPage::new("p", 100.0, 200.0),
            MemoryPage::new("l", 200.0, 100.0),
            MemoryPage::new("p-rotated", 100.0, 200.0),
        ]);
        doc.pages[2].info.rotation = crate::Rotation::Clockwise90;

        assert_eq!(PageSelection::portrait(&doc).unwrap().to_vec(), vec![0]);
        assert_eq!(PageSelection::landscape(&doc).unwrap().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_spec_pages_resolve_against_smaller_document() {
        let doc = MemoryDocument::uniform(5, 100.0, 100.0);
        let spec = SelectionSpec::Pages {
            indices: vec![0, 4, 5, 9],
            source_page_count: 10,
        };
        let resolved = spec.resolve(&doc).unwrap();
        assert_eq!(resolved.selection.to_vec(), vec![0, 4]);
        assert_eq!(resolved.dropped, 2);
    }

    #[test]
    fn test_spec_serde_shape() {
        let spec = SelectionSpec::Pages {
            indices: vec![1, 2],
            source_page_count: 3,
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "pages");
        assert_eq!(json["source_page_count"], 3);

        let back: SelectionSpec = serde_json::from_str(r#"{"kind":"odd"}"#).unwrap();
        assert_eq!(back, SelectionSpec::Odd);
    }
}
