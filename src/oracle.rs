//! The decryption check the search engine submits candidates to.

/// An opened, possibly encrypted document that can test candidate passwords.
///
/// Implementations keep whatever per-handle state they need so that many
/// attempts can be made without reopening the file. A handle is not assumed
/// to be safe to share between threads; parallel searches clone one per worker.
pub trait EncryptedDocument {
    /// Whether the document needs a password at all.
    fn is_encrypted(&self) -> bool;

    /// Returns `true` only if `candidate` opens the document.
    ///
    /// Never fails: a wrong password, a malformed key or a corrupt stream are
    /// all reported as `false`. Must not modify the file on disk.
    fn try_password(&mut self, candidate: &str) -> bool;
}
