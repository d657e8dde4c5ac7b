//! The search controller: feeds candidates to the oracle until one opens the
//! document, the keyspace runs out, or the run is cancelled.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::{SearchConfig, SearchOptions};
use crate::error::{ConfigError, SearchError};
use crate::generator;
use crate::oracle::EncryptedDocument;
use crate::parallel;
use crate::pdf::PdfDocument;
use crate::progress::{ProgressSink, Reporter};

/// Counters describing a finished search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchStats {
    pub attempts: u64,
    pub total_space: u64,
    pub elapsed: Duration,
}

/// How a search ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SearchOutcome {
    Found { password: String, stats: SearchStats },
    /// Every candidate was rejected.
    NotFound { stats: SearchStats },
    Cancelled { stats: SearchStats },
    /// The document has no password; nothing was attempted.
    AlreadyUnencrypted,
}

impl SearchOutcome {
    /// The recovered password, if the search found one.
    pub fn password(&self) -> Option<&str> {
        match self {
            SearchOutcome::Found { password, .. } => Some(password),
            _ => None,
        }
    }

    /// Counters of the run; `None` when no search took place.
    pub fn stats(&self) -> Option<&SearchStats> {
        match self {
            SearchOutcome::Found { stats, .. }
            | SearchOutcome::NotFound { stats }
            | SearchOutcome::Cancelled { stats } => Some(stats),
            SearchOutcome::AlreadyUnencrypted => None,
        }
    }
}

/// Mutable bookkeeping for one sequential run.
#[derive(Debug)]
struct SearchState {
    attempts: u64,
    start: Instant,
    current: String,
    total_space: u64,
}

impl SearchState {
    fn stats(&self) -> SearchStats {
        SearchStats {
            attempts: self.attempts,
            total_space: self.total_space,
            elapsed: self.start.elapsed(),
        }
    }
}

/// Tries every candidate of `config` in order against `document`, one at a time.
///
/// `cancel` is checked once before each attempt, so a stop request costs at
/// most the oracle call already in flight. A candidate that succeeds is
/// returned even if cancellation arrived during its attempt.
pub fn find_password<D, S>(
    document: &mut D,
    config: &SearchConfig,
    cancel: &CancelToken,
    options: &SearchOptions,
    sink: &mut S,
) -> Result<SearchOutcome, SearchError>
where
    D: EncryptedDocument + ?Sized,
    S: ProgressSink + ?Sized,
{
    if !document.is_encrypted() {
        info!("document is not encrypted, nothing to search");
        return Ok(SearchOutcome::AlreadyUnencrypted);
    }

    let mut state = SearchState {
        attempts: 0,
        start: Instant::now(),
        current: String::new(),
        total_space: config.total_space(),
    };
    let mut reporter = Reporter::new(state.start, options.report_interval, state.total_space);

    info!(
        total_space = state.total_space,
        min_length = config.min_length(),
        max_length = config.max_length(),
        alphabet = config.alphabet().len(),
        "starting sequential search"
    );

    for candidate in generator::generate(config) {
        if cancel.is_cancelled() {
            info!(attempts = state.attempts, "search cancelled");
            return Ok(SearchOutcome::Cancelled {
                stats: state.stats(),
            });
        }

        state.attempts += 1;
        state.current = candidate;

        if document.try_password(&state.current) {
            let stats = state.stats();
            info!(attempts = stats.attempts, elapsed = ?stats.elapsed, "password found");
            return Ok(SearchOutcome::Found {
                password: state.current,
                stats,
            });
        }

        reporter.maybe_report(sink, state.attempts, &state.current);
    }

    info!(attempts = state.attempts, "keyspace exhausted");
    Ok(SearchOutcome::NotFound {
        stats: state.stats(),
    })
}

/// Opens the PDF at `path` and searches it, sequentially or with a worker
/// pool depending on `options.threads`.
///
/// The document is released on every return path.
pub fn find_password_in_file<S>(
    path: impl AsRef<Path>,
    config: &SearchConfig,
    cancel: &CancelToken,
    options: &SearchOptions,
    sink: &mut S,
) -> Result<SearchOutcome, SearchError>
where
    S: ProgressSink + ?Sized,
{
    if options.threads == 0 {
        return Err(ConfigError::NoWorkers.into());
    }

    let mut document = PdfDocument::open(path)?;
    debug!(path = %document.path().display(), threads = options.threads, "document opened");

    if options.threads == 1 {
        find_password(&mut document, config, cancel, options, sink)
    } else {
        parallel::find_password_parallel(&document, config, cancel, options, sink)
    }
}
