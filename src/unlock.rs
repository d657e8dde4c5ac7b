//! Writes a decrypted copy of a PDF once its password is known.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::xref::XrefEntry;
use lopdf::{Document, ObjectId, Reader};
use tracing::{debug, info};

use crate::error::UnlockError;

/// Prefix given to the output file when no output path is supplied.
pub const UNLOCKED_PREFIX: &str = "unlocked_";

/// `<dir>/unlocked_<file name>` next to `input`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{UNLOCKED_PREFIX}{file_name}"))
}

/// Decrypts `input` with `password` and saves the result to `output`.
///
/// Refuses documents that are not encrypted, since there is nothing to remove,
/// and never writes a copy whose catalog or page tree did not survive.
pub fn unlock_file(input: &Path, output: &Path, password: &str) -> Result<PathBuf, UnlockError> {
    let load_error = |source: lopdf::Error| UnlockError::Load {
        path: input.to_path_buf(),
        source,
    };

    let bytes = fs::read(input).map_err(|e| load_error(e.into()))?;
    let mut doc = load_with_encrypted_objects(&bytes).map_err(load_error)?;

    if !doc.is_encrypted() {
        return Err(UnlockError::NotEncrypted(input.to_path_buf()));
    }

    doc.decrypt(password).map_err(UnlockError::Decrypt)?;

    let pages = doc.get_pages().len();
    if doc.catalog().is_err() || pages == 0 {
        return Err(UnlockError::Incomplete(input.to_path_buf()));
    }

    doc.save(output).map_err(|source| UnlockError::Save {
        path: output.to_path_buf(),
        source,
    })?;

    info!(input = %input.display(), output = %output.display(), pages, "unlocked copy written");
    Ok(output.to_path_buf())
}

/// Loads a PDF with every indirect object parsed but left encrypted.
///
/// `Document::load` only materializes the objects of an encrypted file when
/// the empty password opens it, and decrypts them on the spot when it does.
/// Here the objects are always re-read from `bytes` as stored, so a later
/// `Document::decrypt` sees each one exactly once.
fn load_with_encrypted_objects(bytes: &[u8]) -> lopdf::Result<Document> {
    let document = Document::load_mem(bytes)?;
    if !document.is_encrypted() {
        return Ok(document);
    }

    // Xref offsets count from the header, like the loader does.
    let start = bytes.windows(5).position(|w| w == b"%PDF-").unwrap_or(0);
    let reader = Reader {
        buffer: &bytes[start..],
        document,
        encryption_state: None,
        raw_objects: BTreeMap::new(),
    };

    let ids: Vec<ObjectId> = reader
        .document
        .reference_table
        .entries
        .iter()
        .filter_map(|(&number, entry)| match *entry {
            XrefEntry::Normal { generation, .. } => Some((number, generation)),
            _ => None,
        })
        .collect();

    let mut objects = BTreeMap::new();
    for id in ids {
        match reader.get_object(id, &mut HashSet::new()) {
            Ok(object) => {
                objects.insert(id, object);
            }
            Err(e) => debug!(object = ?id, error = %e, "skipping unreadable object"),
        }
    }

    let mut document = reader.document;
    document.objects = objects;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/reports/q3.pdf")),
            PathBuf::from("/tmp/reports/unlocked_q3.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("plain.pdf")),
            PathBuf::from("unlocked_plain.pdf")
        );
    }
}
