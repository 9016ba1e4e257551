//! PDF text extraction, one document per page.

use crate::document::{Document, PAGE_KEY};
use crate::error::{RagError, Result};
use lopdf::Document as PdfDocument;
use std::path::Path;

/// Extract the text of every page of a PDF.
///
/// Pages are emitted in page order with a 0-based `page` metadata entry.
/// Pages without extractable text still produce an (empty) document.
pub fn parse_pdf(path: &Path) -> Result<Vec<Document>> {
    let pdf = PdfDocument::load(path).map_err(|e| RagError::load(path, e))?;

    pdf.get_pages()
        .keys()
        .map(|&page_number| {
            let text = pdf
                .extract_text(&[page_number])
                .map_err(|e| RagError::load(path, format!("page {}: {}", page_number, e)))?;
            Ok(Document::from_file(text, path).with_metadata(PAGE_KEY, page_number - 1))
        })
        .collect()
}

/// Write a PDF with one Courier text line per page.
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, pages: &[&str]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    let mut pdf = PdfDocument::with_version("1.5");
    let pages_id = pdf.new_object_id();
    let font_id = pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            pdf.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    pdf.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.save(path).unwrap();
}
