//! End-to-end tests over PDFs generated with lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdfoutline::model::HeadingLevel;
use pdfoutline::{
    extract_bytes, extract_file, extract_reader, BlockProvider, Error, JsonFormat, LopdfBackend,
};

/// (font resource, size, x, y, text)
type Run = (&'static str, i64, i64, i64, &'static str);

fn page_ops(runs: &[Run]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for &(font, size, x, y, text) in runs {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

fn build_pdf(pages: &[Vec<Run>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = lopdf::Dictionary::new();
    for (key, base) in [
        ("F1", "Helvetica-Bold"),
        ("F2", "Helvetica"),
        ("F3", "Helvetica-Oblique"),
    ] {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
        });
        fonts.set(key, id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids = Vec::new();
    for runs in pages {
        let content = Content {
            operations: page_ops(runs),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn report_pdf() -> Vec<u8> {
    build_pdf(&[
        vec![
            ("F1", 24, 72, 700, "Quarterly Business Review"),
            ("F2", 11, 72, 650, "Confidential draft"),
        ],
        vec![
            ("F1", 16, 72, 720, "Table of Contents"),
            ("F2", 11, 72, 690, "1. Overview"),
            ("F2", 11, 72, 666, "2. Markets"),
            ("F2", 11, 72, 642, "3. Operations"),
            ("F2", 11, 72, 618, "4. Outlook"),
            ("F2", 11, 72, 594, "5. Appendix"),
        ],
        vec![
            ("F1", 20, 72, 720, "1. Introduction"),
            ("F1", 14, 72, 680, "1.1 Background"),
            (
                "F2",
                10,
                72,
                650,
                "revenue grew in every region during the quarter and margins held up well",
            ),
            ("F2", 10, 72, 620, "Phase II: Rollout"),
            ("F3", 11, 320, 590, "Side note"),
        ],
    ])
}

#[test]
fn test_backend_reads_generated_pages() {
    let backend = LopdfBackend::load_bytes(&report_pdf()).unwrap();
    assert_eq!(backend.page_count(), 3);
    assert_eq!(backend.page_width(2).unwrap(), 612.0);

    let blocks = backend.page_blocks(2).unwrap();
    let texts: Vec<_> = blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Table of Contents",
            "1. Overview",
            "2. Markets",
            "3. Operations",
            "4. Outlook",
            "5. Appendix"
        ]
    );
    assert!(blocks[0].spans[0].is_bold());
    assert_eq!(blocks[1].font_size(), 11.0);
}

#[test]
fn test_extract_generated_report() {
    let result = extract_bytes(&report_pdf()).unwrap();

    assert_eq!(result.title, "Quarterly Business Review");
    let summary: Vec<_> = result
        .outline
        .iter()
        .map(|h| (h.level, h.text.as_str(), h.page))
        .collect();
    assert_eq!(
        summary,
        vec![
            (HeadingLevel::H1, "1. Introduction", 3),
            (HeadingLevel::H2, "1.1 Background", 3),
            (HeadingLevel::H3, "Phase II: Rollout", 3),
        ]
    );
}

#[test]
fn test_file_and_reader_entry_points_agree() {
    let data = report_pdf();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, &data).unwrap();

    let from_file = extract_file(&path).unwrap();
    let from_reader = extract_reader(std::io::Cursor::new(data)).unwrap();
    assert_eq!(from_file, from_reader);

    let json = pdfoutline::to_json(&path, JsonFormat::Compact).unwrap();
    assert!(json.starts_with(r#"{"title":"Quarterly Business Review","outline":[{"level":"H1""#));
}

#[test]
fn test_open_failures() {
    let dir = tempfile::tempdir().unwrap();

    let missing = extract_file(dir.path().join("missing.pdf")).unwrap_err();
    assert!(matches!(missing, Error::Io(_)));

    let fake = dir.path().join("fake.pdf");
    std::fs::write(&fake, b"plain text, not a document").unwrap();
    assert!(matches!(extract_file(&fake), Err(Error::UnknownFormat)));

    let truncated = dir.path().join("truncated.pdf");
    std::fs::write(&truncated, b"%PDF-1.4\n1 0 obj\n<<").unwrap();
    assert!(extract_file(&truncated).is_err());
}
