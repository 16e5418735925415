use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, info};

use crate::types::{AppError, AppResult};

/// Pages beyond this are ignored.
pub const MAX_PAGES: usize = 200;

/// Extract the text of the first `max_pages` pages, joined by blank lines.
///
/// A page that fails to decode contributes an empty string. Parsing runs on
/// the blocking pool since lopdf is synchronous.
pub async fn extract_text(path: &Path, max_pages: usize) -> AppResult<String> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text_blocking(&path, max_pages))
        .await
        .map_err(|e| AppError::Extraction(format!("PDF parser task failed: {}", e)))?
}

fn extract_text_blocking(path: &Path, max_pages: usize) -> AppResult<String> {
    let doc = Document::load(path)
        .map_err(|e| AppError::Extraction(format!("Failed to load PDF: {}", e)))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().take(max_pages).collect();
    let mut pages = Vec::with_capacity(page_numbers.len());

    for number in &page_numbers {
        match doc.extract_text(&[*number]) {
            Ok(text) => pages.push(text),
            Err(e) => {
                debug!(page = number, error = %e, "Skipping unreadable page");
                pages.push(String::new());
            }
        }
    }

    let text = pages.join("\n\n");
    info!(pages = page_numbers.len(), chars = text.chars().count(), "PDF text extracted");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tempfile::TempDir;

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_extracts_page_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &["Scope 1 emissions fell 12 percent"]);

        let text = extract_text(&path, MAX_PAGES).await.unwrap();
        assert!(text.contains("Scope 1 emissions"), "got: {text:?}");
    }

    #[tokio::test]
    async fn test_page_limit_is_respected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &["FirstPage", "SecondPage", "ThirdPage"]);

        let text = extract_text(&path, 2).await.unwrap();
        assert!(text.contains("FirstPage"));
        assert!(text.contains("SecondPage"));
        assert!(!text.contains("ThirdPage"));
    }

    #[tokio::test]
    async fn test_garbage_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"<html>not a pdf</html>").unwrap();

        let err = extract_text(&path, MAX_PAGES).await.unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_extraction_error() {
        let dir = TempDir::new().unwrap();
        let err = extract_text(&dir.path().join("absent.pdf"), MAX_PAGES)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }
}
