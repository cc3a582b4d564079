//! Upload policies for file-backed entities.
//!
//! A policy bounds the size of an upload and, optionally, the set of file
//! extensions and declared MIME types it may have.

/// One mebibyte.
const MIB: u64 = 1024 * 1024;

/// Constraints applied to an uploaded file.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    /// Storage subdirectory for files accepted under this policy.
    pub directory: &'static str,
    pub max_bytes: u64,
    /// Lowercase extensions without the dot. Empty accepts any extension.
    pub allowed_extensions: &'static [&'static str],
}

/// Project documents: any file type, up to 10 MiB.
pub const DOCUMENT_POLICY: UploadPolicy = UploadPolicy {
    directory: "documents",
    max_bytes: 10 * MIB,
    allowed_extensions: &[],
};

/// Expense receipts: images or PDF, up to 10 MiB.
pub const RECEIPT_POLICY: UploadPolicy = UploadPolicy {
    directory: "receipts",
    max_bytes: 10 * MIB,
    allowed_extensions: &["jpg", "jpeg", "png", "pdf"],
};

/// Contract files: PDF or Word, up to 20 MiB.
pub const CONTRACT_POLICY: UploadPolicy = UploadPolicy {
    directory: "contracts",
    max_bytes: 20 * MIB,
    allowed_extensions: &["pdf", "doc", "docx"],
};

/// MIME type a client is expected to declare for a known extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Lowercased extension of `file_name`, or an empty string if it has none.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

impl UploadPolicy {
    /// Check an upload against this policy.
    ///
    /// `content_type` is the MIME type declared by the client. Generic
    /// `application/octet-stream` is not held against the file; anything else
    /// must agree with the extension. Returns the lowercased extension on
    /// success, or a user-facing message for `field`.
    pub fn check(
        &self,
        field: &str,
        file_name: &str,
        content_type: Option<&str>,
        size: u64,
    ) -> Result<String, String> {
        let name = crate::validation::rules::label(field);

        if size == 0 {
            return Err(format!("The {name} must not be empty."));
        }
        if size > self.max_bytes {
            return Err(format!(
                "The {name} may not be greater than {} kilobytes.",
                self.max_bytes / 1024
            ));
        }

        let ext = extension_of(file_name);
        if self.allowed_extensions.is_empty() {
            return Ok(ext);
        }

        let allowed = self.allowed_extensions.join(", ");
        if !self.allowed_extensions.contains(&ext.as_str()) {
            return Err(format!("The {name} must be a file of type: {allowed}."));
        }

        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");
        if let (Some(declared), Some(expected)) = (declared, mime_for_extension(&ext)) {
            if declared != expected {
                return Err(format!("The {name} must be a file of type: {allowed}."));
            }
        }

        Ok(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_accepts_png_with_matching_mime() {
        let ext = RECEIPT_POLICY
            .check("receipt", "IMG_2041.PNG", Some("image/png"), 2048)
            .unwrap();
        assert_eq!(ext, "png");
    }

    #[test]
    fn receipt_rejects_word_document() {
        let err = RECEIPT_POLICY
            .check("receipt", "notes.docx", None, 2048)
            .unwrap_err();
        assert_eq!(err, "The receipt must be a file of type: jpg, jpeg, png, pdf.");
    }

    #[test]
    fn mismatched_mime_is_rejected() {
        assert!(CONTRACT_POLICY
            .check("file", "contract.pdf", Some("image/png"), 100)
            .is_err());
    }

    #[test]
    fn octet_stream_is_not_held_against_the_file() {
        assert!(CONTRACT_POLICY
            .check("file", "contract.docx", Some("application/octet-stream"), 100)
            .is_ok());
    }

    #[test]
    fn size_limits_differ_per_policy() {
        let eleven_mib = 11 * MIB;
        assert!(DOCUMENT_POLICY
            .check("file", "site.dwg", None, eleven_mib)
            .is_err());
        assert!(CONTRACT_POLICY
            .check("file", "signed.pdf", Some("application/pdf"), eleven_mib)
            .is_ok());
        assert!(CONTRACT_POLICY
            .check("file", "signed.pdf", None, 21 * MIB)
            .is_err());
    }

    #[test]
    fn documents_accept_any_extension() {
        assert_eq!(
            DOCUMENT_POLICY.check("file", "survey.dwg", None, 10).unwrap(),
            "dwg"
        );
        assert_eq!(DOCUMENT_POLICY.check("file", "README", None, 10).unwrap(), "");
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(DOCUMENT_POLICY.check("file", "a.txt", None, 0).is_err());
    }

    #[test]
    fn extension_of_handles_dotfiles() {
        assert_eq!(extension_of(".env"), "");
        assert_eq!(extension_of("a.tar.GZ"), "gz");
    }
}
