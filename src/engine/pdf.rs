//! Paginated PDF output
//!
//! Lays the table out page by page and draws it with `printpdf` using the
//! built-in Helvetica faces, so no fonts are embedded. Each page repeats the
//! title block and column headers and ends with a "Page i of n" footer.

use crate::engine::data::CellValue;
use crate::engine::template::{ReportConfiguration, ReportContent, Template};
use crate::engine::OutputProcessor;
use crate::error::EngineError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt};
use std::fmt;
use std::io::Write;
use std::ops::Range;
use tracing::debug;

/// Line height as a multiple of the font size.
const LEADING: f64 = 1.4;
/// Average Helvetica advance width in em.
const CHAR_WIDTH: f64 = 0.55;
const TITLE_GROWTH: f64 = 6.0;

/// Paginated fixed-layout processor.
pub struct PdfOutputProcessor<'a> {
    configuration: ReportConfiguration,
    sink: &'a mut dyn Write,
    pages: usize,
}

impl<'a> PdfOutputProcessor<'a> {
    pub fn new(configuration: ReportConfiguration, sink: &'a mut dyn Write) -> Self {
        Self {
            configuration,
            sink,
            pages: 0,
        }
    }

    /// Pages written by the last `process` call.
    pub fn page_count(&self) -> usize {
        self.pages
    }
}

impl OutputProcessor for PdfOutputProcessor<'_> {
    fn process(&mut self, template: &Template) -> Result<(), EngineError> {
        let content = template.content()?;
        let layout = PageLayout::new(&self.configuration, content.header.is_some());
        let pages = layout.paginate(content.table.rows.len());
        let bytes = render_document(&content, &layout, &pages)?;
        self.sink.write_all(&bytes)?;
        self.pages = pages.len();
        debug!(pages = self.pages, bytes = bytes.len(), "PDF document written");
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.sink.flush()?;
        Ok(())
    }
}

/// Positions in points, origin at the bottom-left corner.
struct PageLayout {
    width: f64,
    height: f64,
    margin: f64,
    font_size: f64,
    title_size: f64,
    leading: f64,
    has_header: bool,
    rows_per_page: usize,
}

impl PageLayout {
    fn new(configuration: &ReportConfiguration, has_header: bool) -> Self {
        let (width, height) = configuration.page_dimensions();
        let font_size = configuration.font_size;
        let leading = font_size * LEADING;
        let title_size = font_size + TITLE_GROWTH;
        let mut layout = Self {
            width,
            height,
            margin: configuration.margin,
            font_size,
            title_size,
            leading,
            has_header,
            rows_per_page: 1,
        };
        let available = layout.first_row_y() - (layout.margin + leading * 1.5);
        layout.rows_per_page = ((available / leading).floor() as usize).max(1);
        layout
    }

    fn title_y(&self) -> f64 {
        self.height - self.margin - self.title_size
    }

    fn header_y(&self) -> f64 {
        self.title_y() - self.leading * 1.2
    }

    fn columns_y(&self) -> f64 {
        let above = if self.has_header {
            self.header_y()
        } else {
            self.title_y()
        };
        above - self.leading * 1.5
    }

    fn first_row_y(&self) -> f64 {
        self.columns_y() - self.leading * 1.2
    }

    fn table_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Row ranges per page; at least one (possibly empty) page.
    fn paginate(&self, rows: usize) -> Vec<Range<usize>> {
        if rows == 0 {
            return vec![0..0];
        }
        (0..rows)
            .step_by(self.rows_per_page)
            .map(|start| start..(start + self.rows_per_page).min(rows))
            .collect()
    }

    fn max_chars(&self, column_width: f64) -> usize {
        let chars = (column_width / (self.font_size * CHAR_WIDTH)).floor() as usize;
        chars.saturating_sub(1).max(1)
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * CHAR_WIDTH
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn render_document(
    content: &ReportContent,
    layout: &PageLayout,
    pages: &[Range<usize>],
) -> Result<Vec<u8>, EngineError> {
    let (width, height) = (mm(layout.width), mm(layout.height));
    let (doc, first_page, first_layer) =
        PdfDocument::new(content.title.clone(), width, height, "Page 1");
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?,
    };

    for (i, rows) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(width, height, format!("Page {}", i + 1));
            doc.get_page(page).get_layer(layer)
        };
        let canvas = Canvas {
            layer,
            fonts: &fonts,
            layout,
        };
        canvas.draw_page(content, rows.clone(), i + 1, pages.len());
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// One page layer plus what it needs to place text.
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    layout: &'a PageLayout,
}

impl Canvas<'_> {
    fn draw_page(&self, content: &ReportContent, rows: Range<usize>, page: usize, page_count: usize) {
        let layout = self.layout;
        let margin = layout.margin;

        self.text(&content.title, &self.fonts.bold, layout.title_size, margin, layout.title_y());
        if let Some(header) = &content.header {
            self.text(header, &self.fonts.regular, layout.font_size, margin, layout.header_y());
        }

        let columns_y = layout.columns_y();
        let mut x = margin;
        for column in &content.columns {
            let width = layout.table_width() * column.width;
            let label = truncate(&column.header, layout.max_chars(width));
            self.text(&label, &self.fonts.bold, layout.font_size, x, columns_y);
            x += width;
        }

        let mut y = layout.first_row_y();
        for row in &content.table.rows[rows] {
            let mut x = margin;
            for column in &content.columns {
                let width = layout.table_width() * column.width;
                self.cell(ReportContent::cell(row, column), x, y, width);
                x += width;
            }
            y -= layout.leading;
        }

        if let Some(footer) = &content.footer {
            self.text(footer, &self.fonts.regular, layout.font_size, margin, margin);
        }
        let label = format!("Page {} of {}", page, page_count);
        let label_x = layout.width - margin - layout.text_width(&label, layout.font_size);
        self.text(&label, &self.fonts.regular, layout.font_size, label_x, margin);
    }

    fn cell(&self, value: &CellValue, x: f64, y: f64, width: f64) {
        let layout = self.layout;
        let text = truncate(&value.to_string(), layout.max_chars(width));
        if text.is_empty() {
            return;
        }
        let x = if value.is_numeric() {
            // right-align numbers inside the column
            (x + width - layout.text_width(&text, layout.font_size) - layout.font_size).max(x)
        } else {
            x
        };
        self.text(&text, &self.fonts.regular, layout.font_size, x, y);
    }

    fn text(&self, text: &str, font: &IndirectFontRef, size: f64, x: f64, y: f64) {
        self.layer.use_text(text, size as f32, mm(x), mm(y), font);
    }
}

fn mm(points: f64) -> Mm {
    Mm::from(Pt(points as f32))
}

fn pdf_error(err: impl fmt::Display) -> EngineError {
    EngineError::Render(format!("PDF encoding failed: {}", err))
}

fn truncate(text: &str, max_chars: usize) -> String {
    let single_line = text.replace(['\n', '\r', '\t'], " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let mut out: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('.');
        out
    }
}
