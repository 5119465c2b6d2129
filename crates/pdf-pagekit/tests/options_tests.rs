use pdf_pagekit::*;
use serde_json::json;

#[test]
fn test_crop_validation_rejects_negative_margin() {
    assert!(CropParams::uniform(5.0).validate().is_ok());

    let params = CropParams {
        left_mm: -1.0,
        ..Default::default()
    };
    match params.validate() {
        Err(EditError::Parameter(msg)) => assert!(msg.contains("left crop margin")),
        other => panic!("Expected Parameter error, got {:?}", other),
    }

    let params = CropParams {
        top_mm: f32::NAN,
        ..Default::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_rotate_validation() {
    assert!(RotateParams { angle: 90 }.validate().is_ok());
    assert!(RotateParams { angle: -270 }.validate().is_ok());
    assert!(RotateParams { angle: 0 }.validate().is_ok());
    assert!(RotateParams { angle: 45 }.validate().is_err());
}

#[test]
fn test_grid_validation() {
    assert!(GridParams::default().validate().is_ok());
    assert_eq!(GridParams::default().cells_per_sheet(), 4);

    let params = GridParams {
        rows: 0,
        ..Default::default()
    };
    assert!(params.validate().is_err());

    let params = GridParams {
        sheet: PageSize::new(
            PaperSize::Custom {
                width_mm: 0.0,
                height_mm: 100.0,
            },
            Orientation::Portrait,
        ),
        ..Default::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_numbering_validation() {
    assert!(NumberingParams::default().validate().is_ok());

    let params = NumberingParams {
        start: 0,
        ..Default::default()
    };
    assert!(params.validate().is_err());

    let params = NumberingParams {
        font_size: 0.0,
        ..Default::default()
    };
    assert!(params.validate().is_err());
}

#[test]
fn test_number_format_render() {
    assert_eq!(NumberFormat::Number.render(4, 10), "4");
    assert_eq!(NumberFormat::PageOfTotal.render(4, 10), "Page 4 of 10");
}

#[test]
fn test_alignment_mirror() {
    assert_eq!(HorizontalAlign::Left.mirrored(), HorizontalAlign::Right);
    assert_eq!(HorizontalAlign::Right.mirrored(), HorizontalAlign::Left);
    assert_eq!(HorizontalAlign::Center.mirrored(), HorizontalAlign::Center);
}

#[test]
fn test_params_serialize_round_trip() {
    let params = ResizeParams {
        target: PageSize::new(
            PaperSize::Custom {
                width_mm: 120.0,
                height_mm: 180.0,
            },
            Orientation::Landscape,
        ),
        scale_content: false,
        position: OffsetMode::Custom {
            dx_mm: 5.0,
            dy_mm: -2.0,
        },
    };
    let value = serde_json::to_value(params).unwrap();
    assert_eq!(value["position"]["mode"], "custom");
    assert_eq!(value["target"]["paper"]["width_mm"], 120.0);

    let back: ResizeParams = serde_json::from_value(value).unwrap();
    assert_eq!(back, params);
}

#[test]
fn test_params_fill_missing_fields_with_defaults() {
    let params: NumberingParams =
        serde_json::from_value(json!({"format": "page_of_total", "start": 3})).unwrap();
    assert_eq!(params.format, NumberFormat::PageOfTotal);
    assert_eq!(params.start, 3);
    assert_eq!(params.align, HorizontalAlign::Center);

    let grid: GridParams = serde_json::from_value(json!({"sheet": {"paper": "A3"}})).unwrap();
    assert_eq!(grid.rows, 2);
    assert_eq!(grid.sheet.paper, PaperSize::A3);
    assert_eq!(grid.sheet.orientation, Orientation::Portrait);
}
