//! Minimal PDF 1.4 writer.
//!
//! Produces US Letter pages set in the standard Helvetica faces, so no fonts
//! are embedded. Text is encoded as WinAnsi; characters outside Latin-1 are
//! written as `?`. Lines are wrapped with the Helvetica advance widths and
//! flowed onto as many pages as needed.

use std::fmt::Write;

use crate::ExportDocument;

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 20.0;
const SUBTITLE_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;
const BODY_LEADING: f32 = 15.0;
const PARAGRAPH_GAP: f32 = 6.0;

/// Standard font resource names, in object order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
    Oblique,
}

impl Face {
    const ALL: [Face; 3] = [Face::Regular, Face::Bold, Face::Oblique];

    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Oblique => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
            Face::Oblique => "Helvetica-Oblique",
        }
    }

    // Bold glyphs run wider; scaling the regular metrics keeps wrapping safe.
    fn width_scale(self) -> f32 {
        match self {
            Face::Bold => 1.08,
            Face::Regular | Face::Oblique => 1.0,
        }
    }
}

/// One line of text placed at a baseline.
#[derive(Debug, Clone)]
struct Placed {
    face: Face,
    size: f32,
    y: f32,
    text: Vec<u8>,
}

/// Render `document` to PDF bytes.
pub fn render(document: &ExportDocument) -> Vec<u8> {
    let pages = layout(document);
    write_pdf(&pages, document.heading())
}

fn layout(document: &ExportDocument) -> Vec<Vec<Placed>> {
    let mut flow = Flow::new();

    for line in wrap(&encode(document.heading()), Face::Bold, TITLE_SIZE) {
        flow.push(Face::Bold, TITLE_SIZE, TITLE_SIZE * 1.3, line);
    }
    flow.push(
        Face::Oblique,
        SUBTITLE_SIZE,
        SUBTITLE_SIZE * 1.5,
        encode(&document.subtitle()),
    );
    flow.gap(BODY_LEADING);

    for paragraph in document.paragraphs() {
        let encoded = encode(paragraph);
        if encoded.iter().all(|b| *b == b' ') {
            flow.gap(BODY_LEADING);
            continue;
        }
        for line in wrap(&encoded, Face::Regular, BODY_SIZE) {
            flow.push(Face::Regular, BODY_SIZE, BODY_LEADING, line);
        }
        flow.gap(PARAGRAPH_GAP);
    }

    flow.finish()
}

/// Top-down cursor that starts a new page when the bottom margin is reached.
struct Flow {
    pages: Vec<Vec<Placed>>,
    current: Vec<Placed>,
    y: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn push(&mut self, face: Face, size: f32, leading: f32, text: Vec<u8>) {
        if self.y - leading < MARGIN && !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= leading;
        self.current.push(Placed {
            face,
            size,
            y: self.y,
            text,
        });
    }

    // Gaps never carry over to the top of a fresh page.
    fn gap(&mut self, amount: f32) {
        if !self.current.is_empty() {
            self.y -= amount;
        }
    }

    fn finish(mut self) -> Vec<Vec<Placed>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Latin-1 bytes for `text`. Anything else, and C1 controls, become `?`;
/// tabs and other C0 controls become spaces.
fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x00..=0x1F => b' ',
            0x20..=0x7E => c as u8,
            0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Helvetica advance width in 1/1000 em.
fn glyph_width(byte: u8) -> u16 {
    const ASCII: [u16; 95] = [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // :..@
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // [..`
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // {..~
    ];
    match byte {
        0x20..=0x7E => ASCII[(byte - 0x20) as usize],
        _ => 556,
    }
}

fn text_width(text: &[u8], face: Face, size: f32) -> f32 {
    let units: u32 = text.iter().map(|b| glyph_width(*b) as u32).sum();
    units as f32 / 1000.0 * size * face.width_scale()
}

/// Greedy word wrap to [`TEXT_WIDTH`]. Words wider than a line are split.
fn wrap(text: &[u8], face: Face, size: f32) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();

    for word in text.split(|b| *b == b' ').filter(|w| !w.is_empty()) {
        let mut candidate = line.clone();
        if !candidate.is_empty() {
            candidate.push(b' ');
        }
        candidate.extend_from_slice(word);
        if text_width(&candidate, face, size) <= TEXT_WIDTH {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        let mut rest = word;
        while text_width(rest, face, size) > TEXT_WIDTH {
            let mut cut = 1;
            while cut < rest.len() && text_width(&rest[..cut + 1], face, size) <= TEXT_WIDTH {
                cut += 1;
            }
            lines.push(rest[..cut].to_vec());
            rest = &rest[cut..];
        }
        line = rest.to_vec();
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Escape a byte string for a PDF literal string.
fn escape(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    for b in text {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(*b);
    }
    out
}

fn content_stream(page: &[Placed]) -> Vec<u8> {
    let mut out = Vec::new();
    for placed in page {
        out.extend_from_slice(
            format!(
                "BT /{} {} Tf {} {:.2} Td (",
                placed.face.resource(),
                placed.size,
                MARGIN,
                placed.y
            )
            .as_bytes(),
        );
        out.extend_from_slice(&escape(&placed.text));
        out.extend_from_slice(b") Tj ET\n");
    }
    out
}

/// Object layout: 1 catalog, 2 page tree, 3 info, 4..=6 fonts, then a
/// (page, contents) pair per page.
fn write_pdf(pages: &[Vec<Placed>], title: &str) -> Vec<u8> {
    const FIRST_PAGE_OBJ: usize = 7;
    let page_obj = |i: usize| FIRST_PAGE_OBJ + 2 * i;

    let mut objects: Vec<Vec<u8>> = Vec::new();
    objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

    let mut kids = String::new();
    for i in 0..pages.len() {
        let _ = write!(kids, "{} 0 R ", page_obj(i));
    }
    objects.push(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.trim_end(),
            pages.len()
        )
        .into_bytes(),
    );

    let mut info = b"<< /Title (".to_vec();
    info.extend_from_slice(&escape(&encode(title)));
    info.extend_from_slice(b") /Producer (memoir) >>");
    objects.push(info);

    for face in Face::ALL {
        objects.push(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                face.base_font()
            )
            .into_bytes(),
        );
    }

    let mut fonts = String::new();
    for (i, face) in Face::ALL.iter().enumerate() {
        let _ = write!(fonts, "/{} {} 0 R ", face.resource(), 4 + i);
    }

    for (i, page) in pages.iter().enumerate() {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << {}>> >> /Contents {} 0 R >>",
                PAGE_WIDTH,
                PAGE_HEIGHT,
                fonts,
                page_obj(i) + 1
            )
            .into_bytes(),
        );
        let stream = content_stream(page);
        let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        obj.extend_from_slice(&stream);
        obj.extend_from_slice(b"endstream");
        objects.push(obj);
    }

    let mut out: Vec<u8> = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", i + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R /Info 3 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::WritingStyle;

    fn doc(title: &str, story: &str) -> ExportDocument {
        ExportDocument {
            title: title.to_string(),
            style: WritingStyle::Emotional,
            story: story.to_string(),
        }
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn test_header_and_trailer() {
        let bytes = render(&doc("My Life Story", "Hello world."));
        assert!(bytes.starts_with(b"%PDF-1.4"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_startxref_points_at_xref_table() {
        let bytes = render(&doc("T", "Body"));
        let text = String::from_utf8_lossy(&bytes).to_string();
        let tail = &text[text.rfind("startxref").unwrap()..];
        let offset: usize = tail.lines().nth(1).unwrap().trim().parse().unwrap();
        assert!(bytes[offset..].starts_with(b"xref"));
    }

    #[test]
    fn test_blank_title_uses_generic_heading() {
        let bytes = render(&doc("", "Hello"));
        assert!(contains(&bytes, b"(Autobiography) Tj"));
    }

    #[test]
    fn test_title_subtitle_and_body_are_drawn() {
        let bytes = render(&doc("Notes", "I was born in London."));
        assert!(contains(&bytes, b"/F2 20 Tf"));
        assert!(contains(&bytes, b"(Notes) Tj"));
        assert!(contains(&bytes, b"(Emotional style) Tj"));
        assert!(contains(&bytes, b"(I was born in London.) Tj"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_non_latin1_replaced() {
        let bytes = render(&doc("T", "café 日本"));
        assert!(contains(&bytes, b"(caf\xE9 ??) Tj"));
    }

    #[test]
    fn test_parentheses_escaped() {
        let bytes = render(&doc("T", "a (b) c\\d"));
        assert!(contains(&bytes, b"(a \\(b\\) c\\\\d) Tj"));
    }

    #[test]
    fn test_long_story_paginates() {
        let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let story = vec![paragraph; 30].join("\n");
        let bytes = render(&doc("Long", &story));
        let pages = count(&bytes, b"/Type /Page ");
        assert!(pages > 1, "expected several pages, got {}", pages);
        assert!(contains(&bytes, format!("/Count {}", pages).as_bytes()));
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = encode(&"word ".repeat(200));
        let lines = wrap(&text, Face::Regular, BODY_SIZE);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Face::Regular, BODY_SIZE) <= TEXT_WIDTH);
        }
    }

    #[test]
    fn test_wrap_splits_oversized_word() {
        let text = vec![b'W'; 200];
        let lines = wrap(&text, Face::Regular, BODY_SIZE);
        assert!(lines.len() > 1);
        assert_eq!(lines.iter().map(|l| l.len()).sum::<usize>(), 200);
    }

    #[test]
    fn test_glyph_table_spot_checks() {
        assert_eq!(glyph_width(b' '), 278);
        assert_eq!(glyph_width(b'0'), 556);
        assert_eq!(glyph_width(b'@'), 1015);
        assert_eq!(glyph_width(b'A'), 667);
        assert_eq!(glyph_width(b'W'), 944);
        assert_eq!(glyph_width(b'a'), 556);
        assert_eq!(glyph_width(b'm'), 833);
        assert_eq!(glyph_width(b'~'), 584);
    }
}
