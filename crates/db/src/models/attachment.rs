//! A stored file as recorded on a document, expense or contract row.

/// Location and metadata of a file written to the upload store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// Path relative to the storage root, e.g. `documents/3f2a....pdf`.
    pub path: String,
    pub size: i64,
    pub mime_type: Option<String>,
}

/// An updated row together with the file it stopped pointing at.
#[derive(Debug, Clone)]
pub struct Replaced<T> {
    pub row: T,
    /// Set only when the update swapped in a new file and an old one existed.
    pub previous_file: Option<String>,
}
