//! Wiki document library.
//!
//! Documents live flat in a single directory. Search is a case-insensitive
//! filename substring match; extraction pulls the text layer out of a PDF
//! page by page.

use std::{fs, io::ErrorKind, path::PathBuf};

use lopdf::Document;
use tracing::{debug, instrument, warn};

use crate::base::{
    config::Config,
    error::{ToolError, ToolRes},
    types::{DocumentRecord, DocumentSearch, DocumentText},
};

const EMPTY_TEXT_WARNING: &str = "No text could be extracted from this document. It might be image-based or corrupted.";

/// Read-only view over the wiki document directory.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    dir: PathBuf,
    extension: String,
}

impl DocumentLibrary {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into().to_lowercase(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.document_dir.clone(), config.document_extension.clone())
    }

    fn is_document_name(&self, name: &str) -> bool {
        name.to_lowercase().ends_with(&self.extension)
    }

    /// Returns up to `max_results` documents whose filename contains `topic`,
    /// ignoring case, in directory enumeration order.
    #[instrument(skip(self))]
    pub fn find(&self, topic: &str, max_results: usize) -> ToolRes<DocumentSearch> {
        if max_results == 0 {
            return Err(ToolError::invalid("max_results must be at least 1."));
        }

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ToolError::not_found(format!("Wiki directory not found: {}", self.dir.display())));
            }
            Err(err) => return Err(ToolError::failed(format!("Failed to read wiki directory {}: {err}", self.dir.display()))),
        };

        let needle = topic.to_lowercase();
        let mut found = Vec::new();

        for entry in entries.flatten() {
            let filename = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            if !path.is_file() || !self.is_document_name(&filename) {
                continue;
            }

            if filename.to_lowercase().contains(&needle) {
                found.push(DocumentRecord {
                    filename,
                    path: path.display().to_string(),
                });

                if found.len() >= max_results {
                    break;
                }
            }
        }

        debug!("Found {} documents for topic `{}`.", found.len(), topic);

        if found.is_empty() {
            return Ok(DocumentSearch::NoMatches {
                message: format!("No wiki documents found matching topic '{topic}'."),
            });
        }

        Ok(DocumentSearch::Found(found))
    }

    /// Extracts the text layer of a single document, concatenated page by page.
    #[instrument(skip(self))]
    pub fn extract(&self, filename: &str) -> ToolRes<DocumentText> {
        if !self.is_document_name(filename) {
            return Err(ToolError::invalid(format!("Filename must be a {} file.", self.extension)));
        }

        if filename.contains(['/', '\\']) {
            return Err(ToolError::invalid("Filename must not contain path separators."));
        }

        let path = self.dir.join(filename);

        if !path.is_file() {
            return Err(ToolError::not_found(format!("Wiki document '{filename}' not found in {}.", self.dir.display())));
        }

        let document = Document::load(&path).map_err(|err| ToolError::failed(format!("Failed to extract text from '{filename}': {err}")))?;

        let mut content = String::new();

        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) if !text.is_empty() => {
                    content.push_str(&text);
                    content.push('\n');
                }
                Ok(_) => {}
                Err(err) => debug!("Page {} of `{}` has no extractable text: {}", page_number, filename, err),
            }
        }

        if content.trim().is_empty() {
            warn!("Document `{}` yielded no text.", filename);

            return Ok(DocumentText::Empty {
                filename: filename.to_string(),
                content: String::new(),
                warning: EMPTY_TEXT_WARNING.to_string(),
            });
        }

        Ok(DocumentText::Text {
            filename: filename.to_string(),
            content,
        })
    }

    /// Sorted names of every document in the directory; empty if the directory is missing.
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| self.is_document_name(name))
            .collect();

        names.sort();
        names
    }

    /// Markdown listing served as the `documents://available` resource.
    pub fn available_markdown(&self) -> String {
        let names = self.list();
        let mut out = String::from("# Available Wiki Documents for Ads Diagnostics\n\n");

        if names.is_empty() {
            out.push_str("No wiki documents found in the wiki directory.\n");
            return out;
        }

        for name in &names {
            out.push_str(&format!("- `{name}`\n"));
        }

        out.push_str("\nUse the `find_documents` tool with a topic, or `extract_document` with a filename from this list.\n");
        out
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::path::Path;

    use lopdf::{
        Object, Stream,
        content::{Content, Operation},
        dictionary,
    };

    use super::*;

    /// Writes a one-page PDF; `text` of `None` leaves the page blank.
    fn write_pdf(path: &Path, text: Option<&str>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    fn library_with(files: &[&str]) -> (tempfile::TempDir, DocumentLibrary) {
        let dir = tempfile::tempdir().unwrap();

        for file in files {
            fs::write(dir.path().join(file), b"").unwrap();
        }

        let library = DocumentLibrary::new(dir.path(), ".pdf");
        (dir, library)
    }

    #[test]
    fn test_find_matches_case_insensitively() {
        let (_dir, library) = library_with(&["Cloud_Computing_Guide.pdf", "cloud-costs.PDF", "Notes.txt", "Web.pdf"]);

        let DocumentSearch::Found(found) = library.find("CLOUD", 5).unwrap() else {
            panic!("expected matches");
        };

        let mut names: Vec<_> = found.iter().map(|d| d.filename.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Cloud_Computing_Guide.pdf", "cloud-costs.PDF"]);
    }

    #[test]
    fn test_find_respects_max_results() {
        let (_dir, library) = library_with(&["a_ads.pdf", "b_ads.pdf", "c_ads.pdf"]);

        let DocumentSearch::Found(found) = library.find("ads", 2).unwrap() else {
            panic!("expected matches");
        };

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_find_without_matches_is_not_an_error() {
        let (_dir, library) = library_with(&["Web.pdf"]);

        let result = library.find("Blockchain", 5).unwrap();

        assert!(matches!(result, DocumentSearch::NoMatches { ref message } if message.contains("Blockchain")));
    }

    #[test]
    fn test_find_missing_directory_is_error() {
        let library = DocumentLibrary::new("/definitely/not/here", ".pdf");

        assert!(matches!(library.find("ads", 5), Err(ToolError::NotFound(_))));
    }

    #[test]
    fn test_find_rejects_zero_results() {
        let (_dir, library) = library_with(&["Web.pdf"]);

        assert!(matches!(library.find("Web", 0), Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_extract_text() {
        let (dir, library) = library_with(&[]);
        write_pdf(&dir.path().join("Guide.pdf"), Some("Hello World"));

        let DocumentText::Text { filename, content } = library.extract("Guide.pdf").unwrap() else {
            panic!("expected text");
        };

        assert_eq!(filename, "Guide.pdf");
        assert!(content.contains("Hello World"));
    }

    #[test]
    fn test_extract_blank_document_warns() {
        let (dir, library) = library_with(&[]);
        write_pdf(&dir.path().join("Scanned.pdf"), None);

        let result = library.extract("Scanned.pdf").unwrap();

        assert!(matches!(result, DocumentText::Empty { ref content, ref warning, .. } if content.is_empty() && warning == EMPTY_TEXT_WARNING));
    }

    #[test]
    fn test_extract_rejects_wrong_extension() {
        let (_dir, library) = library_with(&["notes.txt"]);

        assert!(matches!(library.extract("notes.txt"), Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_extract_rejects_path_separators() {
        let (_dir, library) = library_with(&[]);

        assert!(matches!(library.extract("../secret.pdf"), Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_extract_missing_file() {
        let (_dir, library) = library_with(&[]);

        let err = library.extract("Missing.pdf").unwrap_err();

        assert!(matches!(err, ToolError::NotFound(_)));
        assert!(err.to_string().contains("Missing.pdf"));
    }

    #[test]
    fn test_extract_corrupt_file_reports_failure() {
        let (dir, library) = library_with(&[]);
        fs::write(dir.path().join("Broken.pdf"), b"this is not a pdf").unwrap();

        let err = library.extract("Broken.pdf").unwrap_err();

        assert!(err.to_string().starts_with("Failed to extract text from 'Broken.pdf'"));
    }

    #[test]
    fn test_markdown_listing() {
        let (_dir, library) = library_with(&["b.pdf", "a.pdf", "skip.txt"]);

        let markdown = library.available_markdown();

        assert!(markdown.starts_with("# Available Wiki Documents"));
        assert!(markdown.contains("- `a.pdf`\n- `b.pdf`\n"));
        assert!(!markdown.contains("skip.txt"));
    }

    #[test]
    fn test_markdown_listing_when_empty() {
        let library = DocumentLibrary::new("/definitely/not/here", ".pdf");

        assert!(library.available_markdown().contains("No wiki documents found"));
    }
}
