//! Recovers the password of an encrypted PDF by exhaustive search and writes
//! an unlocked copy.

pub mod cancel;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod oracle;
pub mod parallel;
pub mod pdf;
pub mod progress;
pub mod search;
pub mod unlock;

pub use cancel::CancelToken;
pub use config::{Alphabet, SearchConfig, SearchOptions};
pub use error::{ConfigError, SearchError, UnlockError};
pub use generator::{Candidates, generate};
pub use oracle::EncryptedDocument;
pub use pdf::PdfDocument;
pub use progress::{ConsoleProgress, ProgressSink, ProgressSnapshot};
pub use search::{SearchOutcome, SearchStats, find_password, find_password_in_file};
