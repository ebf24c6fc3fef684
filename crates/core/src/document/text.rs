//! Positioned text runs from a page's content stream.
//!
//! A small interpreter tracks the graphics and text state needed to place
//! shown strings: the CTM stack, the text and line matrices, and the text
//! state parameters. Each text-showing operator yields one run; consecutive
//! runs in the same font and size that continue along the same baseline are
//! merged, so a label split over several `Tj` operators still reads as one
//! string.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::font::PageFont;
use super::objects::{as_matrix, as_number, get_dict, get_name, resolve};
use crate::error::{PanelError, Result};
use crate::scan::TextRun;
use crate::utils::{
    MATRIX_IDENTITY, Matrix, Point, Rect, apply_matrix_pt, bounding_rect, mult_matrix,
    translate_matrix, union_rect,
};

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: u8 = 8;

/// Largest gap, in ems, between two shows that still continue one run.
const MERGE_GAP_EM: f64 = 0.5;

/// Text state parameters saved and restored with `q`/`Q`.
#[derive(Debug, Clone)]
struct TextParams {
    font: Option<Vec<u8>>,
    size: f64,
    charspace: f64,
    wordspace: f64,
    scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// A run in unflipped PDF user space, before merging.
#[derive(Debug, Clone)]
struct RawRun {
    text: String,
    bbox: Rect,
    font: Vec<u8>,
    size: f64,
    origin: Point,
    end: Point,
    /// Device-space length of one em, used for merge tolerances.
    em: f64,
}

impl RawRun {
    fn continues(&self, next: &RawRun) -> bool {
        let tolerance = self.em * MERGE_GAP_EM;
        self.font == next.font
            && (self.size - next.size).abs() < 1e-6
            && (self.end.1 - next.origin.1).abs() < tolerance
            && (next.origin.0 - self.end.0).abs() < tolerance
    }

    fn absorb(&mut self, next: RawRun) {
        self.text.push_str(&next.text);
        self.bbox = union_rect(self.bbox, next.bbox);
        self.end = next.end;
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    page: usize,
    runs: Vec<RawRun>,
}

struct Frame<'a> {
    fonts: FxHashMap<Vec<u8>, PageFont<'a>>,
    resources: Option<&'a Dictionary>,
    ctm: Matrix,
    params: TextParams,
    stack: Vec<(Matrix, TextParams)>,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl<'a> Frame<'a> {
    fn new(doc: &'a Document, resources: Option<&'a Dictionary>, ctm: Matrix) -> Self {
        Self {
            fonts: load_fonts(doc, resources),
            resources,
            ctm,
            params: TextParams::default(),
            stack: Vec::new(),
            text_matrix: MATRIX_IDENTITY,
            line_matrix: MATRIX_IDENTITY,
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = translate_matrix(self.line_matrix, (tx, ty));
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.params.leading;
        self.move_line(0.0, -leading);
    }
}

fn load_fonts<'a>(
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
) -> FxHashMap<Vec<u8>, PageFont<'a>> {
    let Some(fonts) = resources.and_then(|r| get_dict(doc, r, b"Font")) else {
        return FxHashMap::default();
    };
    fonts
        .iter()
        .filter_map(|(name, obj)| {
            let dict = super::objects::resolve_dict(doc, obj)?;
            Some((name.clone(), PageFont::new(doc, dict)))
        })
        .collect()
}

fn number(operands: &[Object], i: usize) -> f64 {
    operands.get(i).and_then(as_number).unwrap_or(0.0)
}

impl<'a> Interpreter<'a> {
    fn execute(&mut self, ops: &[Operation], frame: &mut Frame<'a>, depth: u8) {
        for op in ops {
            let args = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => frame.stack.push((frame.ctm, frame.params.clone())),
                "Q" => {
                    if let Some((ctm, params)) = frame.stack.pop() {
                        frame.ctm = ctm;
                        frame.params = params;
                    }
                }
                "cm" => {
                    if let Some(m) = as_matrix(args) {
                        frame.ctm = mult_matrix(m, frame.ctm);
                    }
                }
                "BT" => {
                    frame.text_matrix = MATRIX_IDENTITY;
                    frame.line_matrix = MATRIX_IDENTITY;
                }
                "Tf" => {
                    if let Some(Object::Name(name)) = args.first() {
                        frame.params.font = Some(name.clone());
                    }
                    frame.params.size = number(args, 1);
                }
                "Tc" => frame.params.charspace = number(args, 0),
                "Tw" => frame.params.wordspace = number(args, 0),
                "Tz" => frame.params.scaling = number(args, 0),
                "TL" => frame.params.leading = number(args, 0),
                "Ts" => frame.params.rise = number(args, 0),
                "Td" => frame.move_line(number(args, 0), number(args, 1)),
                "TD" => {
                    frame.params.leading = -number(args, 1);
                    frame.move_line(number(args, 0), number(args, 1));
                }
                "Tm" => {
                    if let Some(m) = as_matrix(args) {
                        frame.text_matrix = m;
                        frame.line_matrix = m;
                    }
                }
                "T*" => frame.next_line(),
                "Tj" => self.show(frame, args),
                "'" => {
                    frame.next_line();
                    self.show(frame, args);
                }
                "\"" => {
                    frame.params.wordspace = number(args, 0);
                    frame.params.charspace = number(args, 1);
                    frame.next_line();
                    self.show(frame, args.get(2..).unwrap_or_default());
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = args.first() {
                        self.show(frame, items);
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = args.first() {
                        self.do_form(frame, name, depth);
                    }
                }
                _ => {}
            }
        }
    }

    /// Shows a sequence of strings and kerning adjustments as one run.
    fn show(&mut self, frame: &mut Frame<'a>, items: &[Object]) {
        let params = &frame.params;
        let Some(font_name) = params.font.clone() else {
            return;
        };
        let Some(font) = frame.fonts.get(&font_name) else {
            return;
        };

        let scale = params.scaling / 100.0;
        let start = frame.text_matrix;
        let mut text = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    for code in font.codes(bytes) {
                        let mut tx = font.width(code) / 1000.0 * params.size + params.charspace;
                        if font.is_word_space(code) {
                            tx += params.wordspace;
                        }
                        advance += tx * scale;
                    }
                    text.push_str(&font.decode(bytes));
                }
                other => {
                    if let Some(adjust) = as_number(other) {
                        advance -= adjust / 1000.0 * params.size * scale;
                    }
                }
            }
        }

        let trm = mult_matrix(start, frame.ctm);
        let low = font.descent / 1000.0 * params.size + params.rise;
        let high = font.ascent / 1000.0 * params.size + params.rise;
        let corners = [(0.0, low), (advance, low), (advance, high), (0.0, high)];
        let bbox = bounding_rect(corners.map(|p| apply_matrix_pt(trm, p)));
        let origin = apply_matrix_pt(trm, (0.0, params.rise));
        let end = apply_matrix_pt(trm, (advance, params.rise));
        let unit = apply_matrix_pt(trm, (0.0, params.size + params.rise));
        let em = ((unit.0 - origin.0).powi(2) + (unit.1 - origin.1).powi(2)).sqrt();

        frame.text_matrix = translate_matrix(start, (advance, 0.0));

        if let Some(bbox) = bbox
            && !text.is_empty()
        {
            self.push(RawRun {
                text,
                bbox,
                font: font_name,
                size: params.size,
                origin,
                end,
                em,
            });
        }
    }

    fn push(&mut self, run: RawRun) {
        match self.runs.last_mut() {
            Some(last) if last.continues(&run) => last.absorb(run),
            _ => self.runs.push(run),
        }
    }

    fn do_form(&mut self, frame: &mut Frame<'a>, name: &[u8], depth: u8) {
        if depth >= MAX_FORM_DEPTH {
            warn!(page = self.page, "form XObject nesting too deep, skipping");
            return;
        }
        let doc = self.doc;
        let Some(xobjects) = frame.resources.and_then(|r| get_dict(doc, r, b"XObject")) else {
            return;
        };
        let Some(Object::Stream(stream)) = xobjects.get(name).ok().and_then(|o| resolve(doc, o))
        else {
            return;
        };
        if get_name(doc, &stream.dict, b"Subtype") != Some(b"Form".as_slice()) {
            return;
        }
        let data = match stream.decompressed_content() {
            Ok(data) => data,
            Err(_) => stream.content.clone(),
        };
        let Ok(content) = Content::decode(&data) else {
            warn!(page = self.page, "undecodable form XObject, skipping");
            return;
        };

        let form_matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|o| match resolve(doc, o) {
                Some(Object::Array(items)) => as_matrix(items),
                _ => None,
            })
            .unwrap_or(MATRIX_IDENTITY);
        let resources = get_dict(doc, &stream.dict, b"Resources").or(frame.resources);

        let mut inner = Frame::new(doc, resources, mult_matrix(form_matrix, frame.ctm));
        inner.params = frame.params.clone();
        self.execute(&content.operations, &mut inner, depth + 1);
    }
}

/// Extracts the text runs of one page.
///
/// `resources` are the page's resolved resources and `page_box` its visible
/// box in PDF user space. Runs come back in top-left-origin coordinates
/// relative to the box.
pub(crate) fn extract_runs(
    doc: &Document,
    page: usize,
    content: &[u8],
    resources: Option<&Dictionary>,
    page_box: Rect,
) -> Result<Vec<TextRun>> {
    let content = Content::decode(content).map_err(|e| PanelError::Content {
        page,
        msg: e.to_string(),
    })?;

    let mut interp = Interpreter {
        doc,
        page,
        runs: Vec::new(),
    };
    let mut frame = Frame::new(doc, resources, MATRIX_IDENTITY);
    interp.execute(&content.operations, &mut frame, 0);

    let (bx0, _, _, by1) = page_box;
    let runs: Vec<TextRun> = interp
        .runs
        .into_iter()
        .map(|run| {
            let (x0, y0, x1, y1) = run.bbox;
            TextRun::new(run.text, (x0 - bx0, by1 - y1, x1 - bx0, by1 - y0))
        })
        .collect();
    debug!(page, runs = runs.len(), "extracted text runs");
    Ok(runs)
}
