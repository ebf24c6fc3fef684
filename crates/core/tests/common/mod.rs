//! In-memory PDF fixtures.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const PAGE_WIDTH: i64 = 600;
pub const PAGE_HEIGHT: i64 = 500;

/// A label shown in 12pt Helvetica with its baseline at (`x`, `y`) in PDF
/// user space.
pub struct Label<'a> {
    pub text: &'a str,
    pub x: i64,
    pub y: i64,
}

/// Baseline that puts a 12pt label's center on top-left `y` of the fixture
/// page. Helvetica without a descriptor spans -2.4..9.6 around its baseline.
pub fn baseline_for(top_left_y: i64) -> i64 {
    PAGE_HEIGHT - top_left_y - 4
}

/// Label centered in `area_id` of a fixture page.
pub fn in_area(text: &str, area_id: u8) -> Label<'_> {
    let x = if area_id < 4 { 138 } else { 438 };
    let y = 100 + i64::from(area_id % 4) * 100;
    Label {
        text,
        x,
        y: baseline_for(y),
    }
}

fn page_content(labels: &[Label<'_>]) -> Vec<u8> {
    let mut operations = Vec::new();
    for label in labels {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        operations.push(Operation::new("Td", vec![label.x.into(), label.y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(label.text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }.encode().unwrap()
}

/// Builds a PDF whose pages carry `pages[i]`, with resources inherited from
/// the page tree root.
pub fn build_pdf(pages: &[Vec<Label<'_>>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for labels in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(labels)));
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
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
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

/// Raw, decompressed content of every stream a page draws, in order.
pub fn page_streams(pdf: &[u8], page_index: usize) -> Vec<Vec<u8>> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&(page_index as u32 + 1)).unwrap();
    doc.get_page_contents(page_id)
        .into_iter()
        .map(|id| {
            let stream = doc.get_object(id).unwrap().as_stream().unwrap();
            stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone())
        })
        .collect()
}
