//! PDF documents as a password oracle, backed by `lopdf`.

use std::path::{Path, PathBuf};

use lopdf::Document;
use lopdf::Error as LopdfError;
use lopdf::encryption::DecryptionError;
use tracing::trace;

use crate::error::SearchError;
use crate::oracle::EncryptedDocument;

/// A PDF loaded read-only into memory.
///
/// Attempts authenticate against the in-memory copy, so the file on disk is
/// never touched.
#[derive(Clone, Debug)]
pub struct PdfDocument {
    path: PathBuf,
    inner: Document,
}

impl PdfDocument {
    /// Loads the PDF at `path`; any read or parse failure is a resource error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref().to_path_buf();
        match Document::load(&path) {
            Ok(inner) => Ok(Self { path, inner }),
            Err(source) => Err(SearchError::Resource { path, source }),
        }
    }

    /// Path the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EncryptedDocument for PdfDocument {
    fn is_encrypted(&self) -> bool {
        self.inner.is_encrypted()
    }

    fn try_password(&mut self, candidate: &str) -> bool {
        if !self.inner.is_encrypted() {
            return false;
        }

        match self.inner.authenticate_password(candidate) {
            Ok(()) => true,
            Err(LopdfError::Decryption(DecryptionError::IncorrectPassword)) => false,
            Err(e) => {
                trace!(error = %e, "candidate rejected by decryption error");
                false
            }
        }
    }
}
