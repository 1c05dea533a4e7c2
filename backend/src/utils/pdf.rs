//! Minimal text-only PDF writer used for report downloads.
//!
//! Produces PDF 1.4 with the standard Helvetica fonts (no embedding), A4
//! pages, and automatic page breaks. Characters outside printable ASCII are
//! replaced with `?` because the standard fonts use WinAnsi encoding.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 56.0;
const BODY_SIZE: f32 = 11.0;
const HEADING_SIZE: f32 = 16.0;
const LINE_SPACING: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    size: f32,
    weight: Weight,
}

/// Flowing document of text lines.
#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    title: String,
    lines: Vec<Line>,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line {
            text: text.into(),
            size: HEADING_SIZE,
            weight: Weight::Bold,
        });
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(Line {
            text: text.into(),
            size: BODY_SIZE,
            weight: Weight::Regular,
        });
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line(String::new())
    }

    /// Number of pages the document lays out to.
    pub fn page_count(&self) -> usize {
        self.paginate().len()
    }

    fn paginate(&self) -> Vec<Vec<(f32, &Line)>> {
        let mut pages: Vec<Vec<(f32, &Line)>> = vec![Vec::new()];
        let mut cursor = PAGE_HEIGHT - MARGIN;
        for line in &self.lines {
            let advance = line.size * LINE_SPACING;
            if cursor - advance < MARGIN {
                pages.push(Vec::new());
                cursor = PAGE_HEIGHT - MARGIN;
            }
            cursor -= advance;
            if let Some(page) = pages.last_mut() {
                page.push((cursor, line));
            }
        }
        pages
    }

    pub fn render(&self) -> Vec<u8> {
        let pages = self.paginate();
        // 1 catalog, 2 page tree, 3 regular font, 4 bold font, 5 info,
        // then a (page, content) pair per page.
        let first_page_obj = 6;
        let kids = (0..pages.len())
            .map(|idx| format!("{} 0 R", first_page_obj + idx * 2))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects: Vec<String> = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
            format!(
                "<< /Title ({}) /Producer (artisan-connect) >>",
                escape_text(&self.title)
            ),
        ];

        for (idx, page) in pages.iter().enumerate() {
            let content_obj = first_page_obj + idx * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                PAGE_WIDTH, PAGE_HEIGHT, content_obj
            ));
            let stream = content_stream(page);
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ));
        }

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", idx + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );
        out.into_bytes()
    }
}

fn content_stream(lines: &[(f32, &Line)]) -> String {
    let mut stream = String::new();
    for (y, line) in lines {
        if line.text.is_empty() {
            continue;
        }
        let font = match line.weight {
            Weight::Regular => "F1",
            Weight::Bold => "F2",
        };
        let _ = write!(
            stream,
            "BT /{} {} Tf 1 0 0 1 {} {:.2} Tm ({}) Tj ET\n",
            font,
            line.size,
            MARGIN,
            y,
            escape_text(&line.text)
        );
    }
    stream
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            ' '..='~' => escaped.push(ch),
            '\t' => escaped.push(' '),
            _ => escaped.push('?'),
        }
    }
    escaped
}
