//! `lopdf`-backed document: page boxes, text runs, overlay compositing.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::debug;

use super::objects::{as_rect, get_dict, inherited, resolve_dict};
use super::overlay::{circle_ops, gstate_name, line_ops};
use super::text::extract_runs;
use crate::compose::{MarkCanvas, Stroke};
use crate::error::{PanelError, Result};
use crate::grid::PageGeometry;
use crate::scan::TextRun;
use crate::utils::{Point, Rect};

/// US Letter, used when a page has no usable box.
const DEFAULT_PAGE_BOX: Rect = (0.0, 0.0, 612.0, 792.0);

#[derive(Debug, Clone)]
struct PageSlot {
    id: ObjectId,
    page_box: Rect,
    overlay: Vec<Operation>,
    /// Opacities used by the overlay, one ExtGState each.
    opacities: Vec<f64>,
}

/// A loaded PDF that can report its text runs and take overlay marks.
///
/// Marks are buffered per page and written into the document by
/// [`PanelDocument::save`]; the original page content is wrapped in
/// `q ... Q` and otherwise left untouched.
pub struct PanelDocument {
    doc: Document,
    pages: Vec<PageSlot>,
}

impl PanelDocument {
    /// Parses PDF bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        if data.len() < 8 || !data.starts_with(b"%PDF-") {
            return Err(PanelError::Parse("invalid PDF header".to_string()));
        }
        let doc = Document::load_mem(data).map_err(|e| PanelError::Parse(e.to_string()))?;

        let pages: Vec<PageSlot> = doc
            .get_pages()
            .into_values()
            .map(|id| PageSlot {
                id,
                page_box: page_box(&doc, id),
                overlay: Vec::new(),
                opacities: Vec::new(),
            })
            .collect();
        if pages.is_empty() {
            return Err(PanelError::Parse("document has no pages".to_string()));
        }
        debug!(pages = pages.len(), "loaded PDF");
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn slot(&self, page: usize) -> Result<&PageSlot> {
        self.pages.get(page).ok_or(PanelError::PageNotFound(page))
    }

    fn slot_mut(&mut self, page: usize) -> Result<&mut PageSlot> {
        self.pages.get_mut(page).ok_or(PanelError::PageNotFound(page))
    }

    /// Size of a page's visible box.
    pub fn geometry(&self, page: usize) -> Result<PageGeometry> {
        let (x0, y0, x1, y1) = self.slot(page)?.page_box;
        Ok(PageGeometry::new(x1 - x0, y1 - y0))
    }

    /// Text runs of a page, in top-left-origin coordinates.
    pub fn text_runs(&self, page: usize) -> Result<Vec<TextRun>> {
        let slot = self.slot(page)?;
        let content = self
            .doc
            .get_page_content(slot.id)
            .map_err(|e| PanelError::Content {
                page,
                msg: e.to_string(),
            })?;
        let resources = inherited(&self.doc, slot.id, b"Resources")
            .and_then(|obj| resolve_dict(&self.doc, obj));
        extract_runs(&self.doc, page, &content, resources, slot.page_box)
    }

    /// Converts a top-left-origin point on `slot` into PDF user space.
    fn to_user_space(slot: &PageSlot, p: Point) -> Point {
        let (x0, _, _, y1) = slot.page_box;
        (x0 + p.0, y1 - p.1)
    }

    fn push_ops(&mut self, page: usize, ops: Vec<Operation>, opacity: f64) -> Result<()> {
        let slot = self.slot_mut(page)?;
        if !slot.opacities.iter().any(|o| gstate_name(*o) == gstate_name(opacity)) {
            slot.opacities.push(opacity);
        }
        slot.overlay.extend(ops);
        Ok(())
    }

    /// Writes buffered overlays into the page tree and serializes the
    /// document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.flush_overlays()?;
        self.doc
            .save_to(&mut out)
            .map_err(|e| PanelError::Write(e.to_string()))?;
        Ok(out)
    }

    /// Like [`PanelDocument::save`], writing into `writer`.
    pub fn save_to<W: Write>(self, writer: &mut W) -> Result<()> {
        let bytes = self.save()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    fn flush_overlays(&mut self) -> Result<()> {
        let slots = std::mem::take(&mut self.pages);
        for slot in &slots {
            if slot.overlay.is_empty() {
                continue;
            }
            attach_overlay(&mut self.doc, slot)?;
        }
        self.pages = slots;
        for slot in &mut self.pages {
            slot.overlay.clear();
            slot.opacities.clear();
        }
        Ok(())
    }
}

impl MarkCanvas for PanelDocument {
    fn draw_line(&mut self, page: usize, from: Point, to: Point, stroke: &Stroke) -> Result<()> {
        let slot = self.slot(page)?;
        let ops = line_ops(
            Self::to_user_space(slot, from),
            Self::to_user_space(slot, to),
            stroke,
        );
        self.push_ops(page, ops, stroke.opacity)
    }

    fn draw_circle(
        &mut self,
        page: usize,
        center: Point,
        radius: f64,
        stroke: &Stroke,
    ) -> Result<()> {
        let slot = self.slot(page)?;
        let ops = circle_ops(Self::to_user_space(slot, center), radius, stroke);
        self.push_ops(page, ops, stroke.opacity)
    }
}

/// CropBox if present, else MediaBox, else US Letter.
fn page_box(doc: &Document, page_id: ObjectId) -> Rect {
    let media = inherited(doc, page_id, b"MediaBox").and_then(|o| as_rect(doc, o));
    let crop = inherited(doc, page_id, b"CropBox").and_then(|o| as_rect(doc, o));
    crop.or(media)
        .filter(|(x0, y0, x1, y1)| x1 > x0 && y1 > y0)
        .unwrap_or(DEFAULT_PAGE_BOX)
}

/// Current Contents of a page as a list of stream references.
fn content_refs(doc: &Document, page: &Dictionary) -> Vec<Object> {
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Resolved copy of the page's resources with the overlay's ExtGStates added.
///
/// Shared resource dictionaries are copied rather than edited, so other pages
/// never see the overlay's entries.
fn overlay_resources(doc: &Document, slot: &PageSlot) -> Dictionary {
    let mut resources = inherited(doc, slot.id, b"Resources")
        .and_then(|o| resolve_dict(doc, o))
        .cloned()
        .unwrap_or_else(Dictionary::new);
    let mut gstates = get_dict(doc, &resources, b"ExtGState")
        .cloned()
        .unwrap_or_else(Dictionary::new);
    for opacity in &slot.opacities {
        gstates.set(
            gstate_name(*opacity),
            dictionary! {
                "Type" => "ExtGState",
                "CA" => Object::Real(*opacity as f32),
            },
        );
    }
    resources.set("ExtGState", gstates);
    resources
}

fn attach_overlay(doc: &mut Document, slot: &PageSlot) -> Result<()> {
    let mut ops = Vec::with_capacity(slot.overlay.len() + 1);
    ops.push(Operation::new("Q", vec![]));
    ops.extend(slot.overlay.iter().cloned());
    let body = Content { operations: ops }
        .encode()
        .map_err(|e| PanelError::Compose(e.to_string()))?;

    let page = doc
        .get_dictionary(slot.id)
        .map_err(|e| PanelError::Compose(e.to_string()))?;
    let mut contents = content_refs(doc, page);
    let resources = overlay_resources(doc, slot);

    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, body));
    contents.insert(0, Object::Reference(save_id));
    contents.push(Object::Reference(overlay_id));
    let resources_id = doc.add_object(resources);

    let page = doc
        .get_dictionary_mut(slot.id)
        .map_err(|e| PanelError::Compose(e.to_string()))?;
    page.set("Contents", contents);
    page.set("Resources", resources_id);
    Ok(())
}
