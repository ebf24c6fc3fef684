//! High-level panel marking API.
//!
//! Provides the main public entry points:
//! - `analyze_pdf()` - extract labels and plan marks without drawing
//! - `process_pdf()` - plan marks and composite them onto the PDF
//! - `process_pdf_to()` - same, writing to a writer
//! - `analyze_runs()` - the planning pipeline over already-extracted text

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::boundary::{MarkPlan, plan_marks};
use crate::compose::compose;
use crate::document::PanelDocument;
use crate::error::Result;
use crate::grid::PageGeometry;
use crate::pack::Sequence;
use crate::scan::{TextRun, scan_page};
use crate::template::{GridTemplate, MarkStyle};

/// Options for panel marking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOptions {
    /// Grid placement on the page.
    pub template: GridTemplate,

    /// Stroke parameters for the composited marks.
    pub style: MarkStyle,
}

/// Text of one page together with its size.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub geometry: PageGeometry,
    pub runs: Vec<TextRun>,
}

/// Everything decided for a document before any drawing happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub template: GridTemplate,
    pub pages: Vec<PageGeometry>,
    pub sequence: Sequence,
    pub plan: MarkPlan,
}

/// Runs scanning, grouping and both boundary passes over extracted text.
///
/// `pages[i]` is page `i` of the document.
pub fn analyze_runs(pages: &[PageText], options: &ProcessOptions) -> Analysis {
    let template = &options.template;
    let occurrences: Vec<_> = pages
        .iter()
        .enumerate()
        .map(|(page_index, page)| {
            let found = scan_page(&page.runs, page_index, page.geometry, template);
            debug!(
                page = page_index,
                runs = page.runs.len(),
                labels = found.len(),
                "scanned page"
            );
            found
        })
        .collect();

    let geometries: Vec<PageGeometry> = pages.iter().map(|p| p.geometry).collect();
    let sequence = Sequence::build(occurrences);
    let plan = plan_marks(&sequence, &geometries, template);
    debug!(
        cells = sequence.len(),
        marks = plan.marks.len(),
        "planned marks"
    );

    Analysis {
        template: template.clone(),
        pages: geometries,
        sequence,
        plan,
    }
}

/// Extracts every page's text from a loaded document and plans its marks.
pub fn analyze_document(doc: &PanelDocument, options: &ProcessOptions) -> Result<Analysis> {
    let pages = (0..doc.page_count())
        .map(|page| {
            Ok(PageText {
                geometry: doc.geometry(page)?,
                runs: doc.text_runs(page)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(analyze_runs(&pages, options))
}

/// Parses PDF data and plans its marks without drawing them.
///
/// # Example
/// ```ignore
/// use panelmark_core::high_level::analyze_pdf;
///
/// let pdf_bytes = std::fs::read("floor.pdf")?;
/// let analysis = analyze_pdf(&pdf_bytes, None)?;
/// println!("{} marks", analysis.plan.marks.len());
/// ```
pub fn analyze_pdf(pdf_data: &[u8], options: Option<ProcessOptions>) -> Result<Analysis> {
    let options = options.unwrap_or_default();
    let doc = PanelDocument::load(pdf_data)?;
    analyze_document(&doc, &options)
}

/// Parses PDF data, composites the planned marks and returns the new PDF.
///
/// Either the whole document is processed or an error is returned; no
/// partially marked output is ever produced.
pub fn process_pdf(pdf_data: &[u8], options: Option<ProcessOptions>) -> Result<Vec<u8>> {
    let options = options.unwrap_or_default();
    let mut doc = PanelDocument::load(pdf_data)?;
    let analysis = analyze_document(&doc, &options)?;
    compose(&analysis.plan, &options.style, &mut doc)?;
    doc.save()
}

/// Like [`process_pdf`], writing the marked PDF into `writer`.
///
/// # Example
/// ```ignore
/// use panelmark_core::high_level::process_pdf_to;
/// use std::fs::File;
///
/// let pdf_bytes = std::fs::read("floor.pdf")?;
/// let mut output = File::create("marked.pdf")?;
/// process_pdf_to(&pdf_bytes, &mut output, None)?;
/// ```
pub fn process_pdf_to<W: Write>(
    pdf_data: &[u8],
    writer: &mut W,
    options: Option<ProcessOptions>,
) -> Result<()> {
    let options = options.unwrap_or_default();
    let mut doc = PanelDocument::load(pdf_data)?;
    let analysis = analyze_document(&doc, &options)?;
    compose(&analysis.plan, &options.style, &mut doc)?;
    doc.save_to(writer)
}
