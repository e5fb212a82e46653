//! Integration tests for the paginating renderer.
//!
//! These run entirely offline: no pdfium, no network, no API key. They
//! exercise the layout contract through the public `render_document` API and
//! its `LayoutSummary`, which records the page and cursor position of every
//! placed block.

use notepress::{render_document, BlockKind, ContentBlock, NoteDocument, PageGeometry};

// A4 defaults: 180 mm content width, 257 mm usable height.
const CONTENT_WIDTH_MM: f32 = 180.0;

/// Small page used to force breaks: 100 mm of usable height.
fn small_page() -> PageGeometry {
    PageGeometry {
        page_width_mm: 210.0,
        page_height_mm: 120.0,
        margin_top_mm: 10.0,
        margin_bottom_mm: 10.0,
        margin_left_mm: 15.0,
        margin_right_mm: 15.0,
    }
}

/// A paragraph of `n` repeated words; roughly 0.4 mm of height per word at
/// body size on a 180 mm line.
fn prose(n: usize) -> String {
    vec!["lorem"; n].join(" ")
}

fn heading_and_paragraph() -> NoteDocument {
    NoteDocument {
        title: "Notes".into(),
        content: vec![
            ContentBlock::Heading1 {
                text: "Intro".into(),
            },
            ContentBlock::Paragraph { text: prose(200) },
        ],
    }
}

#[test]
fn output_is_a_pdf() {
    let (bytes, _) = render_document(&heading_and_paragraph(), &PageGeometry::default(), 2.0)
        .expect("render succeeds");
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[..4], b"%PDF");
}

#[test]
fn sufficient_page_height_yields_single_page() {
    let (_, summary) = render_document(&heading_and_paragraph(), &PageGeometry::default(), 2.0)
        .expect("render succeeds");
    assert_eq!(summary.page_count, 1);
    assert_eq!(summary.placements.len(), 2);
    assert!(summary.placements.iter().all(|p| p.page == 1));
}

#[test]
fn reduced_page_height_breaks_with_heading_on_page_one() {
    let geometry = small_page();
    let (_, summary) =
        render_document(&heading_and_paragraph(), &geometry, 2.0).expect("render succeeds");

    assert_eq!(summary.page_count, 2);

    let heading = &summary.placements[0];
    assert_eq!(heading.kind, BlockKind::Heading1);
    assert_eq!(heading.page, 1);

    // The paragraph would cross the bottom margin, so it moved whole to the
    // top of page 2 — no mid-paragraph loss.
    let paragraph = &summary.placements[1];
    assert_eq!(paragraph.kind, BlockKind::Paragraph);
    assert_eq!(paragraph.page, 2);
    assert!((paragraph.y_mm - geometry.margin_top_mm).abs() < 1e-3);
}

#[test]
fn layout_is_idempotent() {
    let doc = NoteDocument {
        title: "Revision".into(),
        content: vec![
            ContentBlock::Heading1 {
                text: "Week 3".into(),
            },
            ContentBlock::Paragraph { text: prose(150) },
            ContentBlock::Heading2 {
                text: "Key points".into(),
            },
            ContentBlock::List {
                items: (0..12).map(|i| format!("point number {i}")).collect(),
            },
            ContentBlock::Paragraph { text: prose(220) },
        ],
    };
    let geometry = small_page();

    let (_, first) = render_document(&doc, &geometry, 2.0).expect("first render");
    let (_, second) = render_document(&doc, &geometry, 2.0).expect("second render");

    assert_eq!(first, second);
    // Placement order follows content order.
    let indices: Vec<usize> = first.placements.iter().map(|p| p.block_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
}

#[test]
fn long_list_flows_across_pages() {
    let doc = NoteDocument {
        title: String::new(),
        content: vec![ContentBlock::List {
            items: (0..60).map(|i| format!("item {i}")).collect(),
        }],
    };
    let (_, summary) = render_document(&doc, &small_page(), 2.0).expect("render succeeds");
    // 60 items at 5.6 mm each cannot fit in 100 mm pages.
    assert!(summary.page_count >= 3, "got {} pages", summary.page_count);
}

#[test]
fn equation_breaks_before_bottom_margin() {
    let doc = NoteDocument {
        title: String::new(),
        content: vec![
            ContentBlock::Paragraph { text: prose(230) },
            ContentBlock::Equation {
                text: "e^{i pi} + 1 = 0".into(),
            },
        ],
    };
    let geometry = small_page();
    let (_, summary) = render_document(&doc, &geometry, 2.0).expect("render succeeds");

    let equation = &summary.placements[1];
    assert_eq!(equation.kind, BlockKind::Equation);
    assert_eq!(equation.page, 2);
    assert!((equation.y_mm - geometry.margin_top_mm).abs() < 1e-3);
}

#[test]
fn square_fallback_for_dimensionless_diagram() {
    // No width/height/viewBox on the root: aspect defaults to 1:1, so the
    // reserved image box is content-width square. The next block's cursor
    // position exposes the reserved height.
    let doc = NoteDocument {
        title: String::new(),
        content: vec![
            ContentBlock::Diagram {
                text: "cap".into(),
                svg: r#"<svg><rect x="0" y="0" width="10" height="10" fill="red"/></svg>"#.into(),
            },
            ContentBlock::Paragraph {
                text: "after".into(),
            },
        ],
    };
    let (_, summary) =
        render_document(&doc, &PageGeometry::default(), 2.0).expect("render succeeds");

    let diagram = &summary.placements[0];
    let after = &summary.placements[1];
    assert_eq!(diagram.kind, BlockKind::Diagram);
    assert_eq!(diagram.page, after.page);

    // caption line (5.2) + square image (180) + spacing (3).
    let reserved = after.y_mm - diagram.y_mm;
    assert!(
        (reserved - (5.2 + CONTENT_WIDTH_MM + 3.0)).abs() < 0.5,
        "reserved {reserved} mm"
    );
}

#[test]
fn wide_diagram_reserves_less_height() {
    let doc = NoteDocument {
        title: String::new(),
        content: vec![
            ContentBlock::Diagram {
                text: "cap".into(),
                svg: r#"<svg viewBox="0 0 300 100"><rect width="300" height="100"/></svg>"#.into(),
            },
            ContentBlock::Paragraph {
                text: "after".into(),
            },
        ],
    };
    let (_, summary) =
        render_document(&doc, &PageGeometry::default(), 2.0).expect("render succeeds");

    let reserved = summary.placements[1].y_mm - summary.placements[0].y_mm;
    // 3:1 aspect: image height is a third of the content width.
    assert!(
        (reserved - (5.2 + CONTENT_WIDTH_MM / 3.0 + 3.0)).abs() < 0.5,
        "reserved {reserved} mm"
    );
}

#[test]
fn failed_diagram_degrades_to_one_marked_line() {
    let doc = NoteDocument {
        title: "Sketchbook".into(),
        content: vec![
            ContentBlock::Paragraph {
                text: "before".into(),
            },
            ContentBlock::Diagram {
                text: "broken sketch".into(),
                svg: "<svg".into(),
            },
            ContentBlock::Paragraph {
                text: "after".into(),
            },
            ContentBlock::List {
                items: vec!["still here".into()],
            },
        ],
    };
    let (_, summary) =
        render_document(&doc, &PageGeometry::default(), 2.0).expect("render succeeds");

    let kinds: Vec<BlockKind> = summary.placements.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Paragraph,
            BlockKind::DiagramError,
            BlockKind::Paragraph,
            BlockKind::List
        ]
    );
    let error_count = kinds
        .iter()
        .filter(|k| **k == BlockKind::DiagramError)
        .count();
    assert_eq!(error_count, 1);

    // The substituted marker is one body line; the document keeps flowing
    // right below it.
    let gap = summary.placements[2].y_mm - summary.placements[1].y_mm;
    assert!(gap < 10.0, "marker should reserve one line, got {gap} mm");
}

#[test]
fn empty_document_renders_one_blank_page() {
    let doc = NoteDocument {
        title: String::new(),
        content: vec![],
    };
    let (bytes, summary) =
        render_document(&doc, &PageGeometry::default(), 2.0).expect("render succeeds");
    assert_eq!(summary.page_count, 1);
    assert!(summary.placements.is_empty());
    assert_eq!(&bytes[..4], b"%PDF");
}

#[test]
fn unusable_geometry_is_rejected() {
    let geometry = PageGeometry {
        page_height_mm: 20.0,
        margin_top_mm: 15.0,
        margin_bottom_mm: 15.0,
        ..PageGeometry::default()
    };
    let doc = NoteDocument {
        title: "T".into(),
        content: vec![],
    };
    assert!(render_document(&doc, &geometry, 2.0).is_err());
}
