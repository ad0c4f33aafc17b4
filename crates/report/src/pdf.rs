//! Minimal PDF 1.4 writer.
//!
//! Supports what the reports need: letter-sized pages, the base-14
//! Helvetica, Helvetica-Bold and Courier fonts, stroked lines and polylines,
//! filled rectangles and text. Page content streams are Flate-compressed.
//!
//! Page methods take coordinates with the origin at the top-left corner, the
//! same convention as [`renderer::ChartLayout`]; they are flipped to PDF's
//! bottom-left origin when written.

use std::fmt::Write as _;
use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use renderer::Color;

use crate::error::ReportResult;

/// US Letter, portrait, in points.
pub const LETTER_WIDTH: f64 = 612.0;
pub const LETTER_HEIGHT: f64 = 792.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Mono];

    fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Mono => "F3",
        }
    }

    fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Mono => "Courier",
        }
    }

    /// Approximate advance width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        let ems: f64 = match self {
            Font::Mono => text.chars().count() as f64 * 0.6,
            Font::Regular | Font::Bold => text.chars().map(helvetica_em).sum(),
        };
        let bold = if *self == Font::Bold { 1.05 } else { 1.0 };
        ems * size * bold
    }
}

fn helvetica_em(c: char) -> f64 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' => 0.33,
        'm' | 'w' | 'M' | 'W' | '%' | '@' => 0.85,
        c if c.is_ascii_uppercase() => 0.68,
        c if c.is_ascii_digit() => 0.556,
        _ => 0.52,
    }
}

/// Horizontal anchor for text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// One page being drawn.
#[derive(Debug, Clone)]
pub struct Page {
    width: f64,
    height: f64,
    content: String,
}

impl Page {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: String::new(),
        }
    }

    pub fn letter() -> Self {
        Self::new(LETTER_WIDTH, LETTER_HEIGHT)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Raw content stream operators written so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Text with its baseline at `y`.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Color,
        align: Align,
        text: &str,
    ) {
        let width = font.text_width(text, size);
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.text_with_matrix([1.0, 0.0, 0.0, 1.0, x, self.flip(y)], size, font, color, text);
    }

    /// Text running bottom-to-top, centered on `(x, y)`.
    pub fn text_vertical(&mut self, x: f64, y: f64, size: f64, font: Font, color: Color, text: &str) {
        let width = font.text_width(text, size);
        let matrix = [0.0, 1.0, -1.0, 0.0, x, self.flip(y) - width / 2.0];
        self.text_with_matrix(matrix, size, font, color, text);
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, width: f64, dashed: bool) {
        self.polyline(&[from, to], color, width, dashed);
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], color: Color, width: f64, dashed: bool) {
        let Some(((x0, y0), rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let [r, g, b] = color.to_unit_rgb();
        let dash = if dashed { "[6 4] 0 d" } else { "[] 0 d" };
        let _ = writeln!(
            self.content,
            "q {} {} {} RG {} w {} 1 J 1 j",
            num(r),
            num(g),
            num(b),
            num(width),
            dash
        );
        let _ = writeln!(self.content, "{} {} m", num(*x0), num(self.flip(*y0)));
        for (x, y) in rest {
            let _ = writeln!(self.content, "{} {} l", num(*x), num(self.flip(*y)));
        }
        self.content.push_str("S Q\n");
    }

    /// Rectangle with `(x, y)` at its top-left corner.
    pub fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
    ) {
        let op = match (fill, stroke) {
            (None, None) => return,
            (Some(_), None) => "f",
            (None, Some(_)) => "S",
            (Some(_), Some(_)) => "B",
        };
        self.content.push_str("q ");
        if let Some(fill) = fill {
            let [r, g, b] = fill.to_unit_rgb();
            let _ = write!(self.content, "{} {} {} rg ", num(r), num(g), num(b));
        }
        if let Some(stroke) = stroke {
            let [r, g, b] = stroke.to_unit_rgb();
            let _ = write!(self.content, "{} {} {} RG 0.75 w ", num(r), num(g), num(b));
        }
        let _ = writeln!(
            self.content,
            "{} {} {} {} re {} Q",
            num(x),
            num(self.flip(y + height)),
            num(width),
            num(height),
            op
        );
    }

    fn text_with_matrix(&mut self, matrix: [f64; 6], size: f64, font: Font, color: Color, text: &str) {
        let [r, g, b] = color.to_unit_rgb();
        let _ = writeln!(
            self.content,
            "BT /{} {} Tf {} {} {} rg {} {} {} {} {} {} Tm ({}) Tj ET",
            font.resource_name(),
            num(size),
            num(r),
            num(g),
            num(b),
            num(matrix[0]),
            num(matrix[1]),
            num(matrix[2]),
            num(matrix[3]),
            num(matrix[4]),
            num(matrix[5]),
            encode_text(text)
        );
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }
}

/// A document under construction.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    title: Option<String>,
    pages: Vec<Page>,
}

impl PdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Serialize the document.
    pub fn to_bytes(&self) -> ReportResult<Vec<u8>> {
        // Object numbers: 1 catalog, 2 page tree, 3 info, 4.. fonts,
        // then a page object and its content stream per page.
        let font_base = 4;
        let first_page = font_base + Font::ALL.len();
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| first_page + i * 2).collect();

        let mut out: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        let kids: Vec<String> = page_ids.iter().map(|id| format!("{} 0 R", id)).collect();
        write_object(
            &mut out,
            &mut offsets,
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        );
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                self.pages.len()
            )
            .into_bytes(),
        );

        let title = self.title.as_deref().unwrap_or("DFOS Report");
        write_object(
            &mut out,
            &mut offsets,
            format!(
                "<< /Title ({}) /Producer (dfos-monitor) >>",
                encode_text(title)
            )
            .into_bytes(),
        );

        for font in Font::ALL {
            write_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .into_bytes(),
            );
        }

        let font_resources: Vec<String> = Font::ALL
            .iter()
            .enumerate()
            .map(|(i, font)| format!("/{} {} 0 R", font.resource_name(), font_base + i))
            .collect();

        for (page, id) in self.pages.iter().zip(&page_ids) {
            write_object(
                &mut out,
                &mut offsets,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {} >> >> /Contents {} 0 R >>",
                    num(page.width),
                    num(page.height),
                    font_resources.join(" "),
                    id + 1
                )
                .into_bytes(),
            );

            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(page.content.as_bytes())?;
            let compressed = encoder.finish()?;

            let mut stream =
                format!("<< /Length {} /Filter /FlateDecode >>\nstream\n", compressed.len())
                    .into_bytes();
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            write_object(&mut out, &mut offsets, stream);
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 3 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_offset
        );
        out.extend_from_slice(xref.as_bytes());

        Ok(out)
    }
}

fn write_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, body: Vec<u8>) {
    offsets.push(out.len());
    out.extend_from_slice(format!("{} 0 obj\n", offsets.len()).as_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(b"\nendobj\n");
}

/// Escape `text` for a PDF literal string in WinAnsi encoding.
///
/// Latin-1 characters map to their byte value and are written as octal
/// escapes. Greek epsilon becomes `e`; anything else outside Latin-1 becomes
/// `?`.
pub fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let c = match c {
            'ε' => 'e',
            '─' | '—' | '–' => '-',
            c if (c as u32) > 0xFF => '?',
            c => c,
        };
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
        }
    }
    out
}

/// Number formatting for content streams: at most three decimals.
fn num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a (b) \\c"), "a \\(b\\) \\\\c");
        assert_eq!(encode_text("°C"), "\\260C");
        assert_eq!(encode_text("µε"), "\\265e");
        assert_eq!(encode_text("日"), "?");
    }

    #[test]
    fn test_num() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(0.12345), "0.123");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(f64::NAN), "0");
    }

    #[test]
    fn test_y_is_flipped() {
        let mut page = Page::letter();
        page.line((0.0, 0.0), (10.0, 92.0), Color::BLACK, 1.0, false);
        assert!(page.content().contains("0 792 m"));
        assert!(page.content().contains("10 700 l"));
    }

    #[test]
    fn test_single_point_polyline_draws_nothing() {
        let mut page = Page::letter();
        page.polyline(&[(1.0, 1.0)], Color::BLACK, 1.0, true);
        assert!(page.content().is_empty());
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w10 = Font::Regular.text_width("Temperature", 10.0);
        let w20 = Font::Regular.text_width("Temperature", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 1e-9);
        assert!((Font::Mono.text_width("abcd", 10.0) - 24.0).abs() < 1e-9);
    }
}
