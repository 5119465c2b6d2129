use lopdf::{Dictionary, Document, Object, Stream};
use pdf_pagekit::*;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // MediaBox lives on the tree root so every page inherits it
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

fn page_content(doc: &PdfDocument, index: usize) -> String {
    let pages = doc.inner().get_pages();
    let id = pages[&(index as u32 + 1)];
    String::from_utf8_lossy(&doc.inner().get_page_content(id).unwrap()).into_owned()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_inherited_mediabox_is_read() {
    let doc = PdfDocument::new(create_test_pdf(3));
    assert_eq!(doc.page_count(), 3);
    let page = doc.page(1).unwrap();
    assert_eq!(page.mediabox, Rect::from_size(612.0, 792.0));
    assert_eq!(page.cropbox, None);
    assert_eq!(page.rotation, Rotation::None);
}

#[test]
fn test_crop_then_read_back() {
    let mut doc = PdfDocument::new(create_test_pdf(2));
    let params = CropParams::uniform(10.0);
    let report = crop(&mut doc, &PageSelection::all(2), &params, &mut NoProgress).unwrap();
    assert_eq!(report.applied, vec![0, 1]);

    let m = mm_to_pt(10.0);
    let page = doc.page(0).unwrap();
    let cropbox = page.cropbox.unwrap();
    assert!(close(cropbox.x0, m));
    assert!(close(cropbox.y0, m));
    assert!(close(cropbox.x1, 612.0 - m));
    assert!(close(cropbox.y1, 792.0 - m));
    assert_eq!(page.trimbox, Some(cropbox));
    assert_eq!(page.mediabox, Rect::from_size(612.0, 792.0));
}

#[test]
fn test_mask_crop_replaces_mediabox() {
    let mut doc = PdfDocument::new(create_test_pdf(1));
    mask_crop(
        &mut doc,
        &PageSelection::all(1),
        &CropParams::uniform(20.0),
        &mut NoProgress,
    )
    .unwrap();
    let page = doc.page(0).unwrap();
    assert!(close(page.mediabox.x0, mm_to_pt(20.0)));
    assert_eq!(page.cropbox, Some(page.mediabox));
}

#[test]
fn test_degenerate_crop_skips_without_touching_page() {
    let mut doc = PdfDocument::new(create_test_pdf(1));
    let params = CropParams {
        left_mm: 150.0,
        right_mm: 150.0,
        ..Default::default()
    };
    let report = crop(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::DegenerateCrop);
    assert_eq!(doc.page(0).unwrap().cropbox, None);
}

#[test]
fn test_rotate_writes_rotate_key() {
    let mut doc = PdfDocument::new(create_test_pdf(2));
    rotate(
        &mut doc,
        &PageSelection::from_indices([1]),
        &RotateParams { angle: 270 },
        &mut NoProgress,
    )
    .unwrap();
    assert_eq!(doc.page(0).unwrap().rotation, Rotation::None);
    assert_eq!(doc.page(1).unwrap().rotation, Rotation::Clockwise270);
}

#[test]
fn test_shift_wraps_existing_content() {
    let mut doc = PdfDocument::new(create_test_pdf(1));
    shift(
        &mut doc,
        &PageSelection::all(1),
        &ShiftParams {
            dx_mm: 25.4,
            dy_mm: 0.0,
        },
        &mut NoProgress,
    )
    .unwrap();

    let content = page_content(&doc, 0);
    let open = content.find("cm").unwrap();
    let original = content.find("q Q").unwrap();
    assert!(open < original);
    assert!(content.trim_end().ends_with('Q'));
}

#[test]
fn test_resize_normalizes_mediabox() {
    let mut doc = PdfDocument::new(create_test_pdf(1));
    let params = ResizeParams {
        target: PageSize::new(PaperSize::A4, Orientation::Landscape),
        scale_content: true,
        position: OffsetMode::Center,
    };
    resize(&mut doc, &PageSelection::all(1), &params, &mut NoProgress).unwrap();

    let (w, h) = params.target.dimensions_pt();
    let page = doc.page(0).unwrap();
    assert!(close(page.mediabox.width(), w));
    assert!(close(page.mediabox.height(), h));
    assert_eq!(page.mediabox.x0, 0.0);
    assert!(page_content(&doc, 0).contains(" cm"));
}

#[test]
fn test_insert_and_delete_pages() {
    let mut doc = PdfDocument::new(create_test_pdf(3));
    let report = insert_blank_pages(
        &mut doc,
        &PageSelection::from_indices([0, 2]),
        &BlankPageParams::default(),
        &mut NoProgress,
    )
    .unwrap();
    assert_eq!(doc.page_count(), 5);
    assert_eq!(report.created, vec![1, 4]);
    assert_eq!(doc.page(1).unwrap().mediabox, Rect::from_size(612.0, 792.0));

    delete_pages(&mut doc, &PageSelection::from_indices([1, 4]), &mut NoProgress).unwrap();
    assert_eq!(doc.page_count(), 3);
}

#[test]
fn test_numbers_are_drawn_with_shared_font() {
    let mut doc = PdfDocument::new(create_test_pdf(3));
    insert_page_numbers(
        &mut doc,
        &PageSelection::all(3),
        &NumberingParams {
            format: NumberFormat::PageOfTotal,
            ..Default::default()
        },
        &mut NoProgress,
    )
    .unwrap();

    let content = page_content(&doc, 2);
    assert!(content.contains("(Page 3 of 3) Tj"));
    assert!(content.contains(&format!("/{}", constants::NUMBER_FONT_RESOURCE)));

    // One font object, referenced from every page
    let fonts = doc
        .inner()
        .objects
        .values()
        .filter(|o| {
            o.as_dict()
                .ok()
                .and_then(|d| d.get(b"BaseFont").ok())
                .is_some()
        })
        .count();
    assert_eq!(fonts, 1);
}

#[test]
fn test_remove_numbers_covers_bands() {
    let mut doc = PdfDocument::new(create_test_pdf(1));
    remove_page_numbers(
        &mut doc,
        &PageSelection::all(1),
        &RemovalParams::default(),
        &mut NoProgress,
    )
    .unwrap();
    let content = page_content(&doc, 0);
    assert_eq!(content.matches(" re f").count(), 2);
    // The covers are painted on top; the original operators stay in the stream
    assert!(content.starts_with("q Q"));
}

#[test]
fn test_grid_merge_stamps_pages() {
    let mut doc = PdfDocument::new(create_test_pdf(4));
    let report = grid_merge(
        &mut doc,
        &PageSelection::all(4),
        &GridParams::default(),
        &mut NoProgress,
    )
    .unwrap();

    assert_eq!(doc.page_count(), 1);
    assert_eq!(report.created, vec![0]);
    let content = page_content(&doc, 0);
    assert_eq!(content.matches(" Do").count(), 4);

    let (w, h) = GridParams::default().sheet.dimensions_pt();
    let sheet = doc.page(0).unwrap();
    assert!(close(sheet.mediabox.width(), w));
    assert!(close(sheet.mediabox.height(), h));
}

#[test]
fn test_grid_merge_clips_cropped_sources() {
    let mut doc = PdfDocument::new(create_test_pdf(2));
    crop(
        &mut doc,
        &PageSelection::all(2),
        &CropParams::uniform(50.0),
        &mut NoProgress,
    )
    .unwrap();
    let visible = doc.page(0).unwrap().visible_box();

    let params = GridParams {
        rows: 1,
        cols: 2,
        ..Default::default()
    };
    grid_merge(&mut doc, &PageSelection::all(2), &params, &mut NoProgress).unwrap();
    assert_eq!(doc.page_count(), 1);

    let bboxes: Vec<Vec<f32>> = doc
        .inner()
        .objects
        .values()
        .filter_map(|object| match object {
            Object::Stream(stream) => Some(stream),
            _ => None,
        })
        .filter(|stream| {
            matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Form")
        })
        .map(|stream| {
            stream
                .dict
                .get(b"BBox")
                .unwrap()
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_float().unwrap())
                .collect()
        })
        .collect();

    // Only the cropped area of each source may show on the sheet
    assert_eq!(bboxes.len(), 2);
    for bbox in bboxes {
        assert!(close(bbox[0], visible.x0));
        assert!(close(bbox[1], visible.y0));
        assert!(close(bbox[2], visible.x1));
        assert!(close(bbox[3], visible.y1));
    }
}

#[test]
fn test_saved_document_reloads() {
    let mut doc = PdfDocument::new(create_test_pdf(2));
    rotate(
        &mut doc,
        &PageSelection::all(2),
        &RotateParams { angle: 90 },
        &mut NoProgress,
    )
    .unwrap();
    let bytes = doc.to_bytes().unwrap();
    let reloaded = PdfDocument::from_bytes(&bytes).unwrap();
    assert_eq!(reloaded.page_count(), 2);
    assert_eq!(reloaded.page(1).unwrap().rotation, Rotation::Clockwise90);
}
