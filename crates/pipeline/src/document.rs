//! PDF text extraction.

use clausemind_common::error::{ClauseError, ClauseResult};

use crate::deadline::Deadline;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// An uploaded policy document. Borrowed for the duration of one request.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    pub bytes: &'a [u8],
    /// File name shown as the clause `source`.
    pub source: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(bytes: &'a [u8], source: &'a str) -> Self {
        Self { bytes, source }
    }
}

/// Extract the text of each page, in page order.
///
/// Fails with `InvalidDocument` when the bytes are not a loadable PDF or no
/// page yields any text (e.g. a scanned image without a text layer).
pub fn extract_pages(bytes: &[u8], deadline: &Deadline) -> ClauseResult<Vec<String>> {
    if !bytes.starts_with(PDF_SIGNATURE) {
        return Err(ClauseError::InvalidDocument(
            "not a PDF (missing %PDF- header)".to_string(),
        ));
    }

    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ClauseError::InvalidDocument(format!("unreadable PDF: {e}")))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Err(ClauseError::InvalidDocument("PDF has no pages".to_string()));
    }

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in page_numbers {
        deadline.check("segmentation")?;
        match doc.extract_text(&[page]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                tracing::warn!(page, error = %e, "skipping page without extractable text");
                pages.push(String::new());
            }
        }
    }

    if pages.iter().all(|p| p.trim().is_empty()) {
        return Err(ClauseError::InvalidDocument(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(pages)
}

#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    //! Builds small text PDFs in memory for tests.

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// One page per entry; each line becomes its own text object so
    /// extraction yields one line per entry.
    pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![50.into(), (780 - 14 * i as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save pdf");
        bytes
    }

    pub fn pdf_with_lines(lines: &[&str]) -> Vec<u8> {
        pdf_with_pages(&[lines])
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{pdf_with_lines, pdf_with_pages};
    use super::*;

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = extract_pages(b"PK\x03\x04 zip archive", &Deadline::none()).unwrap_err();
        assert!(matches!(err, ClauseError::InvalidDocument(_)), "err={err:?}");
    }

    #[test]
    fn rejects_truncated_pdf() {
        let err = extract_pages(b"%PDF-1.5\n%garbage", &Deadline::none()).unwrap_err();
        assert!(matches!(err, ClauseError::InvalidDocument(_)), "err={err:?}");
    }

    #[test]
    fn extracts_text_in_page_order() {
        let bytes = pdf_with_pages(&[&["First page clause text"], &["Second page clause text"]]);
        let pages = extract_pages(&bytes, &Deadline::none()).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("First page"), "page0={:?}", pages[0]);
        assert!(pages[1].contains("Second page"), "page1={:?}", pages[1]);
    }

    #[test]
    fn blank_pdf_is_invalid() {
        let bytes = pdf_with_lines(&[]);
        let err = extract_pages(&bytes, &Deadline::none()).unwrap_err();
        assert!(matches!(err, ClauseError::InvalidDocument(_)), "err={err:?}");
    }

    #[test]
    fn expired_deadline_times_out() {
        let bytes = pdf_with_lines(&["Some clause text"]);
        let deadline = Deadline::after(std::time::Duration::ZERO);
        let err = extract_pages(&bytes, &deadline).unwrap_err();
        assert!(matches!(err, ClauseError::Timeout { .. }), "err={err:?}");
    }
}
