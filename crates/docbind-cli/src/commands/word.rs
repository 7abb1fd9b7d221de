//! Text extraction from Word documents before upload.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Main document part inside a `.docx` package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the plain text of a `.docx` file, one line per paragraph.
pub fn docx_text(bytes: &[u8]) -> anyhow::Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| anyhow::anyhow!("Not a valid .docx file: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| anyhow::anyhow!("{} not found in .docx file: {}", DOCUMENT_PART, e))?
        .read_to_string(&mut xml)?;
    debug!("{} is {} bytes", DOCUMENT_PART, xml.len());

    let text = document_text(&xml)?;
    if text.trim().is_empty() {
        anyhow::bail!("The .docx file contains no text");
    }
    Ok(text)
}

/// Collect `w:t` runs; paragraphs end lines, tabs and breaks are kept.
fn document_text(xml: &str) -> anyhow::Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => current.push_str(&e.unescape()?),
            Ok(Event::Eof) => break,
            Err(e) => anyhow::bail!("Invalid {}: {}", DOCUMENT_PART, e),
            _ => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>合同编号：</w:t></w:r><w:r><w:t xml:space="preserve">HT-001 </w:t></w:r></w:p>
    <w:p><w:r><w:t>A &amp; B</w:t><w:tab/><w:t>Ltd</w:t></w:r></w:p>
    <w:p/>
  </w:body>
</w:document>"#;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_and_runs() {
        let text = docx_text(&package(&[(DOCUMENT_PART, BODY)])).unwrap();
        assert_eq!(text, "合同编号：HT-001 \nA & B\tLtd");
    }

    #[test]
    fn test_missing_document_part() {
        let err = docx_text(&package(&[("word/other.xml", BODY)])).unwrap_err();
        assert!(err.to_string().contains("word/document.xml not found"));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(docx_text(b"plain text").is_err());
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let empty = r#"<w:document xmlns:w="x"><w:body><w:p/></w:body></w:document>"#;
        assert!(docx_text(&package(&[(DOCUMENT_PART, empty)])).is_err());
    }
}
