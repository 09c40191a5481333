//! DOCX reader - paragraph text from `word/document.xml`

use std::io::Read;
use std::path::Path;

use crate::error::ExtractionError;

/// Extract paragraph text from a DOCX file, one line per paragraph
pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = std::fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExtractionError::failed(path, e))?;

    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|_| ExtractionError::failed(path, "no word/document.xml in archive"))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::failed(path, e))?;

    Ok(plaintext_from_document_xml(&xml).trim().to_string())
}

/// Text of `<w:t>` runs, with a line break before each new `<w:p>`
pub fn plaintext_from_document_xml(xml: &str) -> String {
    let mut result = String::new();
    let mut in_text = false;
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        if in_text {
            result.push_str(&decode_entities(&rest[..open]));
        }
        let Some(close) = rest[open..].find('>') else {
            break;
        };
        let tag = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        let self_closing = tag.ends_with('/');
        let name = tag
            .trim_end_matches('/')
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or("");

        match name {
            "w:t" if !self_closing => in_text = true,
            "/w:t" => in_text = false,
            "w:p" => {
                if !result.is_empty() && !result.ends_with('\n') {
                    result.push('\n');
                }
            }
            "w:tab" if self_closing => result.push('\t'),
            "w:br" | "w:cr" if self_closing => result.push('\n'),
            _ => {}
        }
    }

    result
}

/// Decode the predefined XML entities and numeric character references
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document><w:body>
<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Memory</w:t></w:r><w:r><w:t xml:space="preserve"> notes</w:t></w:r></w:p>
<w:p><w:r><w:t>Fish &amp; chips &lt;3</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
<w:p/>
<w:p><w:r><w:t>Tab</w:t><w:tab/><w:t>bed &#233;&#x41;</w:t></w:r></w:p>
</w:body></w:document>"#;

    #[test]
    fn test_paragraphs_become_lines() {
        let text = plaintext_from_document_xml(DOCUMENT_XML);
        assert_eq!(text, "Memory notes\nFish & chips <3\nCell\nTab\tbed éA");
    }

    #[test]
    fn test_tags_with_w_t_prefix_are_not_text() {
        // <w:tbl>, <w:tc> and <w:tab/> share the "w:t" prefix
        let xml = "<w:p><w:tbl>skip</w:tbl><w:t>keep</w:t></w:p>";
        assert_eq!(plaintext_from_document_xml(xml), "keep");
    }

    #[test]
    fn test_unknown_entity_left_alone() {
        assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_extract_docx_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.docx");

        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(DOCUMENT_XML.as_bytes()).unwrap();
        zip.finish().unwrap();

        let text = extract_docx(&path).unwrap();
        assert!(text.starts_with("Memory notes\nFish & chips"));
    }

    #[test]
    fn test_not_a_zip_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "plain text, not a zip").unwrap();

        assert!(matches!(
            extract_docx(&path),
            Err(ExtractionError::Failed { .. })
        ));
    }
}
