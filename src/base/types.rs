use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Sentinel returned when a ticket has no stored topic.
pub const UNKNOWN_TOPIC: &str = "Unknown Topic";

/// A ticket and the topic label it was classified under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTopic {
    pub ticket_id: i64,
    pub topic: String,
}

impl TicketTopic {
    pub fn new(ticket_id: i64, topic: impl Into<String>) -> Self {
        Self { ticket_id, topic: topic.into() }
    }
}

/// A wiki document found in the document directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub filename: String,
    pub path: String,
}

/// Outcome of a document search.
///
/// An empty search is a valid result and is kept apart from a missing directory,
/// which is reported as an error instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSearch {
    Found(Vec<DocumentRecord>),
    NoMatches { message: String },
}

/// Outcome of text extraction from a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentText {
    /// Some text was recovered.
    Text { filename: String, content: String },
    /// The document parsed, but yielded no usable text.
    Empty { filename: String, content: String, warning: String },
}

/// Outcome of a recursive code file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodeListing {
    Found { project_subfolder: String, files: Vec<String> },
    Empty { message: String, files: Vec<String> },
}

/// A code file read from inside the code root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFileRecord {
    pub path: String,
    pub content: String,
}

/// Result of writing a derived "fixed" code file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCodeFile {
    pub status: String,
    pub saved_path: String,
}
