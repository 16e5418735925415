//! Document acquisition
//!
//! Downloads the report referenced by a webhook and turns it into plain text.
//! Every failure in here is recoverable: the pipeline treats an error as
//! "no text available" and keeps going.

pub mod fetch;
pub mod pdf;

pub use fetch::download_to;
pub use pdf::{extract_text, MAX_PAGES};

/// True when the reference points straight at a PDF file.
///
/// Only the URL path is inspected, so query strings and fragments do not
/// hide the extension.
pub fn looks_like_pdf(reference: &str) -> bool {
    match reqwest::Url::parse(reference.trim()) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.path().to_ascii_lowercase().ends_with(".pdf")
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf("https://x/report.pdf"));
        assert!(looks_like_pdf("https://cdn.example.com/files/Relatorio-2023.PDF"));
        assert!(looks_like_pdf("http://example.com/a/b.pdf?token=abc#page=2"));
        assert!(looks_like_pdf("  https://x/report.pdf  "));
    }

    #[test]
    fn test_generic_links_are_not_pdfs() {
        assert!(!looks_like_pdf("https://drive.google.com/file/d/abc/view"));
        assert!(!looks_like_pdf("https://example.com/report.pdf.html"));
        assert!(!looks_like_pdf("https://example.com/?file=report.pdf"));
        assert!(!looks_like_pdf("report.pdf"));
        assert!(!looks_like_pdf("ftp://example.com/report.pdf"));
        assert!(!looks_like_pdf(""));
    }
}
