//! lopdf-backed document
//!
//! Content is never parsed. Transforms wrap the existing content streams in
//! `q <cm> ... Q`, and text, redaction covers and stamped pages are
//! appended as new streams.

use super::{BoxKind, PageDocument, PageEdit, PageInfo, TextPlacement, check_index};
use crate::constants::{
    DEFAULT_PAGE_DIMENSIONS, NUMBER_FONT_BASE, NUMBER_FONT_RESOURCE, PLACED_PAGE_PREFIX,
    REDACTION_FILL,
};
use crate::geometry::{Affine, Rect};
use crate::types::{EditError, Result, Rotation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// A PDF document edited in place through [`PageDocument`]
#[derive(Debug, Clone)]
pub struct PdfDocument {
    doc: Document,
    number_font: Option<ObjectId>,
}

impl PdfDocument {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            number_font: None,
        }
    }

    /// An empty document with a single page tree root
    pub fn empty() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(Vec::new())),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);
        Self::new(doc)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(Document::load_mem(bytes)?))
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut writer = Vec::new();
        self.doc.save_to(&mut writer)?;
        Ok(writer)
    }

    pub fn inner(&self) -> &Document {
        &self.doc
    }

    pub fn into_inner(self) -> Document {
        self.doc
    }

    fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().values().copied().collect()
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        let ids = self.page_ids();
        check_index(index, ids.len())?;
        Ok(ids[index])
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Look up a page attribute, walking up the page tree for inherited keys
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current = page_id;
        // Bounded walk guards against Parent cycles in broken files.
        for _ in 0..64 {
            let dict = self.doc.get_dictionary(current)?;
            if let Ok(value) = dict.get(key) {
                return Ok(Some(self.resolve(value)?.clone()));
            }
            match dict.get(b"Parent").and_then(|p| p.as_reference()) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Err(EditError::Structure("page tree is too deep".to_string()))
    }

    fn read_box(&self, page_id: ObjectId, key: &[u8], inheritable: bool) -> Result<Option<Rect>> {
        let obj = if inheritable {
            self.inherited(page_id, key)?
        } else {
            match self.doc.get_dictionary(page_id)?.get(key) {
                Ok(value) => Some(self.resolve(value)?.clone()),
                Err(_) => None,
            }
        };
        let Some(Object::Array(values)) = obj else {
            return Ok(None);
        };
        if values.len() < 4 {
            return Ok(None);
        }
        let mut nums = [0.0f32; 4];
        for (slot, value) in nums.iter_mut().zip(values.iter()) {
            match extract_number(self.resolve(value)?) {
                Some(n) => *slot = n,
                None => return Ok(None),
            }
        }
        let rect = Rect::from_corners(nums[0], nums[1], nums[2], nums[3]);
        Ok((!rect.is_degenerate()).then_some(rect))
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        Ok(self.doc.get_dictionary_mut(page_id)?)
    }

    /// Content stream references of a page, in drawing order
    fn content_refs(&self, page_id: ObjectId) -> Result<Vec<Object>> {
        let dict = self.doc.get_dictionary(page_id)?;
        let contents = match dict.get(b"Contents") {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()), // No content = blank page
        };
        match contents {
            Object::Reference(id) => match self.doc.get_object(*id)? {
                Object::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![Object::Reference(*id)]),
            },
            Object::Array(arr) => Ok(arr.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn set_content_refs(&mut self, page_id: ObjectId, refs: Vec<Object>) -> Result<()> {
        self.page_dict_mut(page_id)?
            .set("Contents", Object::Array(refs));
        Ok(())
    }

    fn add_content_stream(&mut self, content: String) -> Object {
        let id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        Object::Reference(id)
    }

    fn append_content(&mut self, page_id: ObjectId, content: String) -> Result<()> {
        let mut refs = self.content_refs(page_id)?;
        refs.push(self.add_content_stream(content));
        self.set_content_refs(page_id, refs)
    }

    /// Decoded content of a page, all streams concatenated
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let mut result = Vec::new();
        for obj in self.content_refs(page_id)? {
            if let Object::Reference(id) = obj {
                if let Ok(stream) = self.doc.get_object(id)?.as_stream() {
                    let content = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    result.extend_from_slice(&content);
                    result.push(b'\n');
                }
            }
        }
        Ok(result)
    }

    /// Give the page its own resource dictionary and add `name` to `category`.
    ///
    /// Shared or inherited resources are copied onto the page first, so other
    /// pages never see the new entry.
    fn add_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        name: &str,
        value: Object,
    ) -> Result<()> {
        let mut resources = match self.inherited(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => dict,
            _ => Dictionary::new(),
        };
        let mut entries = match resources.get(category.as_bytes()) {
            Ok(obj) => match self.resolve(obj)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };
        entries.set(name, value);
        resources.set(category, Object::Dictionary(entries));
        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    fn resource_names(&self, page_id: ObjectId, category: &[u8]) -> Result<Vec<Vec<u8>>> {
        let Some(Object::Dictionary(resources)) = self.inherited(page_id, b"Resources")? else {
            return Ok(Vec::new());
        };
        let Ok(obj) = resources.get(category) else {
            return Ok(Vec::new());
        };
        match self.resolve(obj)? {
            Object::Dictionary(dict) => Ok(dict.iter().map(|(k, _)| k.clone()).collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn number_font_id(&mut self) -> ObjectId {
        if let Some(id) = self.number_font {
            return id;
        }
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(NUMBER_FONT_BASE.as_bytes().to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let id = self.doc.add_object(font_dict);
        self.number_font = Some(id);
        id
    }

    fn root_pages_id(&self) -> Result<ObjectId> {
        let catalog_id = self.doc.trailer.get(b"Root")?.as_reference()?;
        let catalog = self.doc.get_dictionary(catalog_id)?;
        Ok(catalog.get(b"Pages")?.as_reference()?)
    }

    fn parent_of(&self, node: ObjectId) -> Result<ObjectId> {
        let dict = self.doc.get_dictionary(node)?;
        dict.get(b"Parent")
            .and_then(|p| p.as_reference())
            .map_err(|_| EditError::Structure(format!("page {:?} has no parent", node)))
    }

    fn kids_of(&self, node: ObjectId) -> Result<Vec<Object>> {
        let dict = self.doc.get_dictionary(node)?;
        match dict.get(b"Kids") {
            Ok(obj) => match self.resolve(obj)? {
                Object::Array(arr) => Ok(arr.clone()),
                _ => Err(EditError::Structure(
                    "Pages Kids is not an array".to_string(),
                )),
            },
            Err(_) => Err(EditError::Structure(
                "Pages Kids array not found".to_string(),
            )),
        }
    }

    /// Add `delta` to Count on `node` and every ancestor
    fn adjust_counts(&mut self, mut node: ObjectId, delta: i64) -> Result<()> {
        for _ in 0..64 {
            let dict = self.doc.get_dictionary_mut(node)?;
            let count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
            dict.set("Count", Object::Integer((count + delta).max(0)));
            match dict.get(b"Parent").and_then(|p| p.as_reference()) {
                Ok(parent) => node = parent,
                Err(_) => return Ok(()),
            }
        }
        Err(EditError::Structure("page tree is too deep".to_string()))
    }

    /// Flatten inheritable attributes onto the page so it no longer depends on its parent
    fn pin_inherited(&mut self, page_id: ObjectId) -> Result<()> {
        for key in ["MediaBox", "CropBox", "Rotate", "Resources"] {
            let own = self.doc.get_dictionary(page_id)?.has(key.as_bytes());
            if !own {
                if let Some(value) = self.inherited(page_id, key.as_bytes())? {
                    self.page_dict_mut(page_id)?.set(key, value);
                }
            }
        }
        Ok(())
    }

    fn apply_edit_unchecked(&mut self, index: usize, edit: &PageEdit) -> Result<()> {
        for (kind, rect) in &edit.boxes {
            self.set_page_box(index, *kind, *rect)?;
        }
        if let Some(transform) = edit.transform {
            self.apply_content_transform(index, transform)?;
        }
        Ok(())
    }
}

impl PdfDocument {
    /// Append every page of `other` after the last page; returns how many were added
    pub fn append(&mut self, mut other: PdfDocument) -> Result<usize> {
        for id in other.page_ids() {
            other.pin_inherited(id)?;
        }
        let mut src = other.doc;
        src.renumber_objects_with(self.doc.max_id + 1);
        let page_ids: Vec<ObjectId> = src.get_pages().values().copied().collect();
        let max_id = src.max_id;

        for (id, object) in src.objects {
            // The source tree nodes are replaced by our own root
            if matches!(dict_type(&object), Some(b"Catalog" | b"Pages")) {
                continue;
            }
            self.doc.objects.insert(id, object);
        }
        self.doc.max_id = self.doc.max_id.max(max_id);

        let root = self.root_pages_id()?;
        let mut kids = self.kids_of(root)?;
        for &id in &page_ids {
            self.page_dict_mut(id)?.set("Parent", Object::Reference(root));
            kids.push(Object::Reference(id));
        }
        self.doc
            .get_dictionary_mut(root)?
            .set("Kids", Object::Array(kids));
        self.adjust_counts(root, page_ids.len() as i64)?;
        Ok(page_ids.len())
    }
}

impl From<Document> for PdfDocument {
    fn from(doc: Document) -> Self {
        Self::new(doc)
    }
}

impl PageDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn page(&self, index: usize) -> Result<PageInfo> {
        let page_id = self.page_id(index)?;
        let mediabox = self
            .read_box(page_id, b"MediaBox", true)?
            .unwrap_or_else(|| {
                Rect::from_size(DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1)
            });
        let rotation = self
            .inherited(page_id, b"Rotate")?
            .and_then(|r| r.as_i64().ok())
            .and_then(|deg| Rotation::from_degrees(deg as i32))
            .unwrap_or_default();

        Ok(PageInfo {
            mediabox,
            cropbox: self.read_box(page_id, b"CropBox", true)?,
            trimbox: self.read_box(page_id, b"TrimBox", false)?,
            artbox: self.read_box(page_id, b"ArtBox", false)?,
            rotation,
        })
    }

    fn set_page_box(&mut self, index: usize, kind: BoxKind, rect: Rect) -> Result<()> {
        if rect.is_degenerate() {
            return Err(EditError::parameter(format!(
                "{} must have positive area",
                kind.pdf_key()
            )));
        }
        let page_id = self.page_id(index)?;
        self.page_dict_mut(page_id)?
            .set(kind.pdf_key(), rect_object(&rect));
        Ok(())
    }

    fn apply_content_transform(&mut self, index: usize, transform: Affine) -> Result<()> {
        let page_id = self.page_id(index)?;
        let existing = self.content_refs(page_id)?;
        let open = self.add_content_stream(format!("q {} cm\n", matrix_operands(&transform)));
        let close = self.add_content_stream("\nQ\n".to_string());

        let mut refs = Vec::with_capacity(existing.len() + 2);
        refs.push(open);
        refs.extend(existing);
        refs.push(close);
        self.set_content_refs(page_id, refs)
    }

    fn set_rotation(&mut self, index: usize, rotation: Rotation) -> Result<()> {
        let page_id = self.page_id(index)?;
        self.page_dict_mut(page_id)?
            .set("Rotate", Object::Integer(rotation.degrees() as i64));
        Ok(())
    }

    fn insert_page(&mut self, at: usize, width: f32, height: f32) -> Result<()> {
        if width <= 0.0 || height <= 0.0 {
            return Err(EditError::parameter("page size must be positive"));
        }
        let ids = self.page_ids();
        if at > ids.len() {
            return Err(EditError::PageIndex {
                index: at,
                count: ids.len(),
            });
        }

        // Find the Kids array and slot the new page goes into
        let (parent_id, slot) = if ids.is_empty() {
            let root = self.root_pages_id()?;
            (root, self.kids_of(root)?.len())
        } else {
            let (anchor, after) = if at < ids.len() {
                (ids[at], false)
            } else {
                (ids[ids.len() - 1], true)
            };
            let parent = self.parent_of(anchor)?;
            let pos = self
                .kids_of(parent)?
                .iter()
                .position(|k| k.as_reference().ok() == Some(anchor))
                .ok_or_else(|| EditError::Structure("page missing from its parent".to_string()))?;
            (parent, if after { pos + 1 } else { pos })
        };

        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(parent_id));
        page_dict.set("MediaBox", rect_object(&Rect::from_size(width, height)));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(Dictionary::new()));
        let page_id = self.doc.add_object(page_dict);

        let mut kids = self.kids_of(parent_id)?;
        kids.insert(slot, Object::Reference(page_id));
        self.doc
            .get_dictionary_mut(parent_id)?
            .set("Kids", Object::Array(kids));
        self.adjust_counts(parent_id, 1)
    }

    fn delete_page(&mut self, index: usize) -> Result<()> {
        let page_id = self.page_id(index)?;
        let parent_id = self.parent_of(page_id)?;
        let kids: Vec<Object> = self
            .kids_of(parent_id)?
            .into_iter()
            .filter(|k| k.as_reference().ok() != Some(page_id))
            .collect();
        self.doc
            .get_dictionary_mut(parent_id)?
            .set("Kids", Object::Array(kids));
        self.adjust_counts(parent_id, -1)?;
        self.doc.objects.remove(&page_id);
        Ok(())
    }

    fn redact_rect(&mut self, index: usize, rect: Rect) -> Result<()> {
        let page_id = self.page_id(index)?;
        let (r, g, b) = REDACTION_FILL;
        self.append_content(
            page_id,
            format!(
                "q {} {} {} rg {} {} {} {} re f Q\n",
                r,
                g,
                b,
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height()
            ),
        )
    }

    fn insert_text(&mut self, index: usize, text: &TextPlacement) -> Result<()> {
        let page_id = self.page_id(index)?;
        let font_id = self.number_font_id();
        self.add_resource(
            page_id,
            "Font",
            NUMBER_FONT_RESOURCE,
            Object::Reference(font_id),
        )?;

        let (cos, sin) = unit_vector(text.angle);
        self.append_content(
            page_id,
            format!(
                "q 0 g BT /{} {} Tf {} {} {} {} {} {} Tm ({}) Tj ET Q\n",
                NUMBER_FONT_RESOURCE,
                text.size,
                cos,
                sin,
                -sin,
                cos,
                text.x,
                text.y,
                escape_pdf_string(&text.text)
            ),
        )
    }

    fn place_page(&mut self, target: usize, source: usize, transform: Affine) -> Result<()> {
        let source_id = self.page_id(source)?;
        let target_id = self.page_id(target)?;

        // Form XObject holding the source page's content, clipped to what is visible
        let bbox = self.page(source)?.visible_box();
        let mut xobject_dict = Dictionary::new();
        xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
        xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
        xobject_dict.set("BBox", rect_object(&bbox));
        xobject_dict.set("FormType", Object::Integer(1));
        if let Some(resources) = self.inherited(source_id, b"Resources")? {
            xobject_dict.set("Resources", resources);
        }
        let content = self.page_content(source_id)?;
        let xobject_id = self.doc.add_object(Stream::new(xobject_dict, content));

        let taken = self.resource_names(target_id, b"XObject")?;
        let name = (0..)
            .map(|n| format!("{}{}", PLACED_PAGE_PREFIX, n))
            .find(|candidate| !taken.iter().any(|t| t == candidate.as_bytes()))
            .unwrap_or_else(|| PLACED_PAGE_PREFIX.to_string());
        self.add_resource(target_id, "XObject", &name, Object::Reference(xobject_id))?;

        self.append_content(
            target_id,
            format!("q {} cm /{} Do Q\n", matrix_operands(&transform), name),
        )
    }

    fn apply_edit(&mut self, index: usize, edit: &PageEdit) -> Result<()> {
        let page_id = self.page_id(index)?;
        // Flatten first so restoring the page dictionary restores everything.
        self.pin_inherited(page_id)?;
        let backup = self.doc.get_object(page_id)?.clone();
        let result = self.apply_edit_unchecked(index, edit);
        if result.is_err() {
            self.doc.objects.insert(page_id, backup);
        }
        result
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn rect_object(rect: &Rect) -> Object {
    Object::Array(rect.to_array().iter().map(|v| Object::Real(*v)).collect())
}

fn matrix_operands(transform: &Affine) -> String {
    transform
        .to_pdf_matrix()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// (cos, sin) of a counter-clockwise angle, exact for right angles
fn unit_vector(angle: i32) -> (f32, f32) {
    match angle.rem_euclid(360) {
        0 => (1.0, 0.0),
        90 => (0.0, 1.0),
        180 => (-1.0, 0.0),
        270 => (0.0, -1.0),
        other => {
            let rad = (other as f32).to_radians();
            (rad.cos(), rad.sin())
        }
    }
}

fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// The /Type name of a dictionary object
fn dict_type(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Dictionary(dict) => dict.get(b"Type").and_then(Object::as_name).ok(),
        _ => None,
    }
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Page (1)"), "Page \\(1\\)");
        assert_eq!(escape_pdf_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_unit_vector_right_angles_are_exact() {
        assert_eq!(unit_vector(0), (1.0, 0.0));
        assert_eq!(unit_vector(90), (0.0, 1.0));
        assert_eq!(unit_vector(-90), (0.0, -1.0));
        assert_eq!(unit_vector(540), (-1.0, 0.0));
    }

    #[test]
    fn test_matrix_operands() {
        let t = Affine {
            sx: 0.5,
            sy: 2.0,
            tx: 10.0,
            ty: -3.0,
        };
        assert_eq!(matrix_operands(&t), "0.5 0 0 2 10 -3");
    }

    #[test]
    fn test_empty_document_accepts_pages() {
        let mut doc = PdfDocument::empty();
        assert_eq!(doc.page_count(), 0);
        doc.insert_page(0, 200.0, 100.0).unwrap();
        doc.insert_page(1, 300.0, 300.0).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(0).unwrap().mediabox, Rect::from_size(200.0, 100.0));
        assert_eq!(doc.page(1).unwrap().mediabox, Rect::from_size(300.0, 300.0));
    }
}
