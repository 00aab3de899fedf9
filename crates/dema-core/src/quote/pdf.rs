//! A4 PDF layout of a [`QuoteDocument`], attached to both quote mails.
//!
//! Coordinates are in PostScript points from the bottom-left corner and
//! converted to millimetres at the drawing call.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};

use super::document::{QuoteDocument, COMPANY_LINES, COMPANY_NAME, FOOTER_LINES, TITLE};
use crate::QuoteError;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
/// A new page starts once the cursor drops below this.
const BOTTOM_LIMIT: f32 = 100.0;

const SKU_X: f32 = 300.0;
const QTY_X: f32 = 450.0;

const MAX_COMMENT_CHARS: usize = 200;
const COMMENT_LINE_CHARS: usize = 95;

const BRAND: (f32, f32, f32) = (0.0, 0.68, 0.94);
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GREY: (f32, f32, f32) = (0.5, 0.5, 0.5);
const HEADER_FILL: (f32, f32, f32) = (0.9, 0.9, 0.9);
const ROW_FILL: (f32, f32, f32) = (0.98, 0.98, 0.98);

fn pt(value: f32) -> Mm {
    Mm(value * 25.4 / 72.0)
}

fn color((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn pdf_error(e: &printpdf::Error) -> QuoteError {
    QuoteError::Pdf(e.to_string())
}

/// Drawing cursor over the current page.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Canvas {
    fn new(title: &str) -> Result<Self, QuoteError> {
        let (doc, page, layer) =
            PdfDocument::new(title, pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error(&e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error(&e))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, y: f32, bold: bool, rgb: (f32, f32, f32)) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(color(rgb));
        self.layer.use_text(text, size, pt(x), pt(y), font);
    }

    fn band(&self, y: f32, height: f32, rgb: (f32, f32, f32)) {
        self.layer.set_fill_color(color(rgb));
        self.layer.add_rect(Rect::new(
            pt(MARGIN),
            pt(y),
            pt(PAGE_WIDTH - MARGIN),
            pt(y + height),
        ));
    }

    fn ensure_room(&mut self) {
        if self.y < BOTTOM_LIMIT {
            let (page, layer) = self
                .doc
                .add_page(pt(PAGE_WIDTH), pt(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn finish(self) -> Result<Vec<u8>, QuoteError> {
        self.doc.save_to_bytes().map_err(|e| pdf_error(&e))
    }
}

impl QuoteDocument {
    /// Render the document as a single- or multi-page A4 PDF.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Pdf`] if the PDF cannot be assembled.
    pub fn to_pdf(&self) -> Result<Vec<u8>, QuoteError> {
        let mut canvas = Canvas::new(TITLE)?;

        canvas.text(COMPANY_NAME, 16.0, MARGIN, canvas.y, true, BRAND);
        for (index, line) in COMPANY_LINES.iter().enumerate() {
            canvas.y -= if index == 0 { 15.0 } else { 12.0 };
            let size = if index + 1 == COMPANY_LINES.len() { 8.0 } else { 9.0 };
            canvas.text(line, size, MARGIN, canvas.y, false, BLACK);
        }

        canvas.y -= 40.0;
        canvas.text(TITLE, 20.0, MARGIN, canvas.y, true, BRAND);
        canvas.y -= 20.0;
        canvas.text(&format!("Date: {}", self.date), 10.0, MARGIN, canvas.y, false, BLACK);

        canvas.y -= 30.0;
        canvas.text("CUSTOMER INFORMATION", 12.0, MARGIN, canvas.y, true, BLACK);
        canvas.y -= 20.0;
        for row in &self.customer_rows {
            let line = format!("{}: {}", row.label, row.value);
            canvas.text(&line, 10.0, MARGIN, canvas.y, false, BLACK);
            canvas.y -= 15.0;
        }

        canvas.y -= 20.0;
        canvas.text("REQUESTED PRODUCTS", 12.0, MARGIN, canvas.y, true, BLACK);
        canvas.y -= 25.0;
        canvas.band(canvas.y - 15.0, 20.0, HEADER_FILL);
        let header_y = canvas.y - 10.0;
        canvas.text("Product", 10.0, MARGIN + 10.0, header_y, true, BLACK);
        canvas.text("SKU", 10.0, SKU_X, header_y, true, BLACK);
        canvas.text("Qty", 10.0, QTY_X, header_y, true, BLACK);
        canvas.y -= 30.0;

        for (index, item) in self.items.iter().enumerate() {
            canvas.ensure_room();
            if index % 2 == 0 {
                canvas.band(canvas.y - 12.0, 18.0, ROW_FILL);
            }
            let row_y = canvas.y - 7.0;
            let sku = if item.sku.is_empty() { "N/A" } else { &item.sku };
            canvas.text(&item.name, 9.0, MARGIN + 10.0, row_y, false, BLACK);
            canvas.text(sku, 9.0, SKU_X, row_y, false, BLACK);
            canvas.text(&item.quantity.to_string(), 9.0, QTY_X + 10.0, row_y, false, BLACK);
            canvas.y -= 20.0;
        }

        if !self.message.is_empty() {
            canvas.ensure_room();
            canvas.y -= 20.0;
            canvas.text("ADDITIONAL COMMENTS", 12.0, MARGIN, canvas.y, true, BLACK);
            canvas.y -= 20.0;
            let comment: String = self.message.chars().take(MAX_COMMENT_CHARS).collect();
            for line in wrap(&comment, COMMENT_LINE_CHARS) {
                canvas.text(&line, 9.0, MARGIN, canvas.y, false, BLACK);
                canvas.y -= 12.0;
            }
        }

        if let [notice, thanks] = FOOTER_LINES {
            canvas.text(notice, 9.0, MARGIN, 50.0, false, GREY);
            canvas.text(thanks, 9.0, MARGIN, 35.0, true, BRAND);
        }

        canvas.finish()
    }
}

/// Greedy word wrap on character counts. Words longer than `width` stay
/// whole on their own line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + word.chars().count() + 1;
        if !current.is_empty() && needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::QuoteRequest;

    fn request(items: usize) -> QuoteRequest {
        let items: Vec<_> = (0..items)
            .map(|i| json!({"sku": format!("SK-{i}"), "name": format!("Slangklem {i}"), "quantity": 1}))
            .collect();
        serde_json::from_value(json!({
            "items": items,
            "customer": {
                "name": "Jan Peeters",
                "email": "jan@example.be",
                "phone": "051000000",
                "message": "Graag levering voor het einde van de maand, bij voorkeur op een dinsdag of donderdag in de voormiddag."
            }
        }))
        .expect("request")
    }

    #[test]
    fn pdf_has_pdf_header() {
        let bytes = QuoteDocument::new(&request(2), Utc::now())
            .to_pdf()
            .expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_item_lists_span_pages() {
        let bytes = QuoteDocument::new(&request(60), Utc::now())
            .to_pdf()
            .expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap("een twee drie vier", 9);
        assert_eq!(lines, ["een twee", "drie vier"]);
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap("kogelkraanhendel x", 5), ["kogelkraanhendel", "x"]);
        assert!(wrap("   ", 10).is_empty());
    }
}
