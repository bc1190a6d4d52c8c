//! Office Open XML (DOCX) writer.
//!
//! The package holds the three parts Word needs to open a document:
//! `[Content_Types].xml`, `_rels/.rels` and `word/document.xml`. Formatting
//! is applied directly on runs, so no styles part is required.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use memoir_core::{Error, Result};

use crate::ExportDocument;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Half-points, as Word measures font size.
const TITLE_SIZE: u32 = 48;
const SUBTITLE_SIZE: u32 = 24;

/// Render `document` to DOCX bytes.
pub fn render(document: &ExportDocument) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", PACKAGE_RELS.to_string()),
        ("word/document.xml", document_xml(document)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(body.as_bytes())?;
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn zip_error(e: zip::result::ZipError) -> Error {
    Error::Export(format!("Failed to write DOCX package: {}", e))
}

fn document_xml(document: &ExportDocument) -> String {
    let mut body = String::new();
    body.push_str(&paragraph(
        document.heading(),
        r#"<w:jc w:val="center"/>"#,
        &format!(r#"<w:b/><w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, TITLE_SIZE),
    ));
    body.push_str(&paragraph(
        &document.subtitle(),
        r#"<w:jc w:val="center"/>"#,
        &format!(r#"<w:i/><w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, SUBTITLE_SIZE),
    ));
    for line in document.paragraphs() {
        body.push_str(&paragraph(line, "", ""));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body>{}",
            r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440"/></w:sectPr>"#,
            "</w:body></w:document>"
        ),
        body
    )
}

fn paragraph(text: &str, paragraph_props: &str, run_props: &str) -> String {
    let mut out = String::from("<w:p>");
    if !paragraph_props.is_empty() {
        out.push_str("<w:pPr>");
        out.push_str(paragraph_props);
        out.push_str("</w:pPr>");
    }
    if !text.is_empty() {
        out.push_str("<w:r>");
        if !run_props.is_empty() {
            out.push_str("<w:rPr>");
            out.push_str(run_props);
            out.push_str("</w:rPr>");
        }
        out.push_str(r#"<w:t xml:space="preserve">"#);
        out.push_str(&escape_xml(text));
        out.push_str("</w:t></w:r>");
    }
    out.push_str("</w:p>");
    out
}

/// Escape text content and drop characters XML 1.0 forbids.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push(' '),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::WritingStyle;
    use std::io::Read;

    fn doc(title: &str, story: &str) -> ExportDocument {
        ExportDocument {
            title: title.to_string(),
            style: WritingStyle::Professional,
            story: story.to_string(),
        }
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn test_package_contains_required_parts() {
        let bytes = render(&doc("My Life Story", "Hello")).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["[Content_Types].xml", "_rels/.rels", "word/document.xml"]
        );
        assert!(archive.by_name("word/document.xml").is_ok());
    }

    #[test]
    fn test_document_has_title_and_one_paragraph_per_line() {
        let bytes = render(&doc("Notes", "First line\n\nSecond line")).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(">Notes</w:t>"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(">Professional style</w:t>"));
        assert!(xml.contains(">First line</w:t>"));
        assert!(xml.contains(">Second line</w:t>"));
        // title + subtitle + three story lines
        assert_eq!(xml.matches("<w:p>").count(), 5);
    }

    #[test]
    fn test_blank_title_uses_generic_heading() {
        let bytes = render(&doc("", "Hello")).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(">Autobiography</w:t>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let bytes = render(&doc("A & B", "1 < 2 \"quoted\"")).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains(">A &amp; B</w:t>"));
        assert!(xml.contains(">1 &lt; 2 &quot;quoted&quot;</w:t>"));
    }

    #[test]
    fn test_unicode_preserved() {
        let bytes = render(&doc("T", "café 日本")).unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("café 日本"));
    }
}
