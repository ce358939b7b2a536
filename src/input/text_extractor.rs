//! Text extraction from various file formats

use crate::error::{Result, SkillGapError};
use crate::input::file_detector::FileType;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::io::{Cursor, Read};
use zip::ZipArchive;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static DOCX_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("static regex"));
static DOCX_TEXT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").expect("static regex"));

const DOCX_BODY: &str = "word/document.xml";

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            SkillGapError::ExtractionFailed(format!("Failed to extract text from PDF: {}", e))
        })
    }
}

/// UTF-8, falling back to Latin-1 so any byte sequence decodes
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let markdown_content = PlainTextExtractor.extract(bytes)?;

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n");
        let text = decode_entities(&HTML_TAG.replace_all(&text, ""));

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Word documents: the text runs of `word/document.xml`, one line per paragraph
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            SkillGapError::ExtractionFailed(format!("Invalid DOCX archive: {}", e))
        })?;

        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY)
            .map_err(|e| SkillGapError::ExtractionFailed(format!("Missing {}: {}", DOCX_BODY, e)))?
            .read_to_string(&mut xml)
            .map_err(|e| SkillGapError::ExtractionFailed(format!("Failed to read {}: {}", DOCX_BODY, e)))?;

        Ok(self.paragraphs(&xml).join("\n"))
    }
}

impl DocxExtractor {
    fn paragraphs(&self, xml: &str) -> Vec<String> {
        DOCX_PARAGRAPH
            .captures_iter(xml)
            .map(|paragraph| {
                DOCX_TEXT_RUN
                    .captures_iter(&paragraph[1])
                    .map(|run| decode_entities(&run[1]))
                    .collect::<String>()
            })
            .filter(|line| !line.trim().is_empty())
            .collect()
    }
}

/// Collapse every whitespace run to a single space and trim
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Decode `bytes` of the given type into cleaned plain text
pub fn extract_text(bytes: &[u8], file_type: FileType) -> Result<String> {
    let raw = match file_type {
        FileType::Pdf => PdfExtractor.extract(bytes)?,
        FileType::Text => PlainTextExtractor.extract(bytes)?,
        FileType::Markdown => MarkdownExtractor.extract(bytes)?,
        FileType::Docx => DocxExtractor.extract(bytes)?,
        FileType::Unknown => {
            return Err(SkillGapError::UnsupportedFormat(
                "Supported types: PDF, DOCX, TXT, Markdown".to_string(),
            ))
        }
    };
    Ok(clean_text(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn docx_with_body(xml: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        writer.start_file(DOCX_BODY, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_joins_runs_by_paragraph() {
        let xml = concat!(
            r#"<w:document><w:body>"#,
            r#"<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Skills</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Python, </w:t></w:r><w:r><w:t>SQL &amp; Tableau</w:t></w:r></w:p>"#,
            r#"<w:p/>"#,
            r#"<w:p><w:r><w:tab/><w:t>Git</w:t></w:r></w:p>"#,
            r#"</w:body></w:document>"#
        );

        let raw = DocxExtractor.extract(&docx_with_body(xml)).unwrap();
        assert_eq!(raw, "Skills\nPython, SQL & Tableau\nGit");

        let cleaned = extract_text(&docx_with_body(xml), FileType::Docx).unwrap();
        assert_eq!(cleaned, "Skills Python, SQL & Tableau Git");
    }

    #[test]
    fn test_docx_without_body_fails() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/styles.xml", FileOptions::default()).unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        assert!(matches!(
            extract_text(&bytes, FileType::Docx),
            Err(SkillGapError::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_plain_text_latin1_fallback() {
        let bytes = b"Caf\xe9 owner, Python";
        let text = extract_text(bytes, FileType::Text).unwrap();
        assert_eq!(text, "Café owner, Python");
    }

    #[test]
    fn test_markdown_strips_markup() {
        let text = extract_text(b"# Skills\n\n- **Rust** & Go\n- SQL", FileType::Markdown).unwrap();
        assert_eq!(text, "Skills Rust & Go SQL");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn test_unsupported_and_corrupt_formats() {
        assert!(matches!(
            extract_text(b"PK..", FileType::Docx),
            Err(SkillGapError::ExtractionFailed(_))
        ));
        assert!(matches!(
            extract_text(b"", FileType::Unknown),
            Err(SkillGapError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_failure() {
        let err = extract_text(b"not a pdf at all", FileType::Pdf).unwrap_err();
        assert!(matches!(err, SkillGapError::ExtractionFailed(_)));
    }
}
