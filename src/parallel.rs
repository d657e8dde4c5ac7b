//! Multi-worker search over a `rayon` pool.
//!
//! Lengths are searched in increasing order. Each length's index space is cut
//! into contiguous chunks that workers take independently; inside a chunk the
//! candidates are tried in order. Every rayon job owns its own clone of the
//! document, so the oracle is never shared across threads.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::{debug, info};

use crate::cancel::CancelToken;
use crate::config::{SearchConfig, SearchOptions};
use crate::error::SearchError;
use crate::generator::candidate_at;
use crate::oracle::EncryptedDocument;
use crate::progress::{ProgressSink, Reporter};
use crate::search::{SearchOutcome, SearchStats};

/// Smallest slice of a length's index space handed to one worker at a time.
const MIN_CHUNK_SIZE: u64 = 1000;

/// Upper bound on how long the reporting loop sleeps between checks.
const MAX_POLL: Duration = Duration::from_millis(50);

/// Shared between workers and the reporting thread.
struct Shared<'a> {
    cancel: &'a CancelToken,
    found_flag: AtomicBool,
    attempts: AtomicU64,
    current: Mutex<String>,
}

impl Shared<'_> {
    fn should_stop(&self) -> bool {
        self.found_flag.load(Ordering::Acquire) || self.cancel.is_cancelled()
    }

    fn set_current(&self, candidate: &str) {
        if let Ok(mut current) = self.current.lock() {
            current.clear();
            current.push_str(candidate);
        }
    }

    fn current(&self) -> String {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Same contract as [`crate::search::find_password`], spread over
/// `options.threads` workers.
///
/// When several candidates would open the document, which one is returned
/// is unspecified. Workers stop after at most one further attempt each once
/// the password is found or `cancel` is raised.
pub fn find_password_parallel<D, S>(
    document: &D,
    config: &SearchConfig,
    cancel: &CancelToken,
    options: &SearchOptions,
    sink: &mut S,
) -> Result<SearchOutcome, SearchError>
where
    D: EncryptedDocument + Clone + Send + Sync,
    S: ProgressSink + ?Sized,
{
    if !document.is_encrypted() {
        info!("document is not encrypted, nothing to search");
        return Ok(SearchOutcome::AlreadyUnencrypted);
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .thread_name(|index| format!("search-worker-{index}"))
        .build()?;

    let total_space = config.total_space();
    let start = Instant::now();
    let shared = Shared {
        cancel,
        found_flag: AtomicBool::new(false),
        attempts: AtomicU64::new(0),
        current: Mutex::new(String::new()),
    };
    let mut reporter = Reporter::new(start, options.report_interval, total_space);
    let poll = options.report_interval.clamp(Duration::from_millis(1), MAX_POLL);

    info!(
        total_space,
        threads = pool.current_num_threads(),
        "starting parallel search"
    );

    let found = thread::scope(|scope| {
        let worker = scope.spawn(|| brute_force(&pool, document, config, &shared));

        while !worker.is_finished() {
            thread::sleep(poll);
            let attempts = shared.attempts.load(Ordering::Relaxed);
            reporter.maybe_report(sink, attempts, &shared.current());
        }

        worker
            .join()
            .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
    });

    let stats = SearchStats {
        attempts: shared.attempts.load(Ordering::Acquire),
        total_space,
        elapsed: start.elapsed(),
    };

    let outcome = match found {
        Some(password) => SearchOutcome::Found { password, stats },
        // A stop request that lands after the last candidate changes nothing.
        None if cancel.is_cancelled() && stats.attempts < total_space => {
            SearchOutcome::Cancelled { stats }
        }
        None => SearchOutcome::NotFound { stats },
    };
    info!(attempts = outcome.stats().map(|s| s.attempts), "parallel search finished");
    Ok(outcome)
}

/// Iterate over candidate lengths and delegate the search per length.
fn brute_force<D>(
    pool: &ThreadPool,
    document: &D,
    config: &SearchConfig,
    shared: &Shared<'_>,
) -> Option<String>
where
    D: EncryptedDocument + Clone + Send + Sync,
{
    if config.include_empty() && !shared.should_stop() {
        shared.attempts.fetch_add(1, Ordering::Relaxed);
        if document.clone().try_password("") {
            shared.found_flag.store(true, Ordering::Release);
            return Some(String::new());
        }
    }

    let symbols = config.alphabet().symbols();
    for target_len in config.min_length()..=config.max_length() {
        if shared.should_stop() {
            return None;
        }
        if let Some(found) = brute_force_length(pool, document, symbols, target_len, shared) {
            return Some(found);
        }
    }

    None
}

/// Exhaustively tries all passwords of `target_len`, returning the first success.
fn brute_force_length<D>(
    pool: &ThreadPool,
    document: &D,
    symbols: &[char],
    target_len: usize,
    shared: &Shared<'_>,
) -> Option<String>
where
    D: EncryptedDocument + Clone + Send + Sync,
{
    // Fits: the config already proved the whole keyspace fits in u64.
    let combos = (symbols.len() as u64).pow(target_len as u32);

    // Chunk size balances worker utilization and keeps cancellation responsive.
    let workers = pool.current_num_threads() as u64;
    let chunk_size = std::cmp::max(MIN_CHUNK_SIZE, combos / (workers * 4));
    let num_chunks = combos.div_ceil(chunk_size);
    debug!(target_len, combos, chunk_size, num_chunks, "searching length");

    pool.install(|| {
        (0..num_chunks)
            .into_par_iter()
            .map_init(
                || (document.clone(), String::with_capacity(target_len)),
                |(oracle, buffer), chunk_idx| {
                    let start = chunk_idx * chunk_size;
                    let end = std::cmp::min(start + chunk_size, combos);

                    for index in start..end {
                        if shared.should_stop() {
                            return None;
                        }

                        candidate_at(index, target_len, symbols, buffer);
                        if index == start {
                            shared.set_current(buffer);
                        }
                        shared.attempts.fetch_add(1, Ordering::Relaxed);

                        if oracle.try_password(buffer) {
                            shared.found_flag.store(true, Ordering::Release);
                            return Some(buffer.clone());
                        }
                    }
                    None
                },
            )
            .find_map_any(|found| found)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Alphabet;
    use crate::oracle::testing::{CancelAfter, FixedPassword};
    use crate::progress::ProgressSnapshot;

    fn config(symbols: &str, min: usize, max: usize) -> SearchConfig {
        SearchConfig::new(Alphabet::new(symbols.chars()).unwrap(), min, max).unwrap()
    }

    fn options(threads: usize) -> SearchOptions {
        SearchOptions {
            threads,
            ..SearchOptions::default()
        }
    }

    #[test]
    fn test_parallel_finds_password() {
        let doc = FixedPassword::new("1011010110");
        let outcome = find_password_parallel(
            &doc,
            &config("01", 1, 12),
            &CancelToken::new(),
            &options(4),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        assert_eq!(outcome.password(), Some("1011010110"));
        let stats = outcome.stats().unwrap();
        assert_eq!(stats.attempts, doc.calls());
        assert!(stats.attempts <= stats.total_space);
    }

    #[test]
    fn test_parallel_exhaustion_counts_every_candidate() {
        let config = config("abc", 1, 7);
        let doc = FixedPassword::unbreakable();
        let outcome = find_password_parallel(
            &doc,
            &config,
            &CancelToken::new(),
            &options(3),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        let SearchOutcome::NotFound { stats } = outcome else {
            panic!("expected NotFound, got {outcome:?}");
        };
        assert_eq!(stats.attempts, config.total_space());
        assert_eq!(doc.calls(), config.total_space());
    }

    #[test]
    fn test_parallel_honors_cancellation() {
        let token = CancelToken::new();
        token.cancel();
        let doc = FixedPassword::new("zz");

        let outcome = find_password_parallel(
            &doc,
            &config("xyz", 1, 3),
            &token,
            &options(2),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        assert!(matches!(outcome, SearchOutcome::Cancelled { .. }));
        assert_eq!(doc.calls(), 0);
    }

    #[test]
    fn test_parallel_cancel_after_last_candidate_is_not_found() {
        // A single chunk, so one worker tries both candidates in order.
        let token = CancelToken::new();
        let inner = FixedPassword::unbreakable();
        let doc = CancelAfter::new(inner.clone(), 2, token.clone());

        let outcome = find_password_parallel(
            &doc,
            &config("ab", 1, 1),
            &token,
            &options(2),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        assert!(token.is_cancelled());
        let SearchOutcome::NotFound { stats } = outcome else {
            panic!("expected NotFound, got {outcome:?}");
        };
        assert_eq!(stats.attempts, 2);
        assert_eq!(inner.calls(), 2);
    }

    #[test]
    fn test_parallel_cancel_mid_search() {
        let token = CancelToken::new();
        let inner = FixedPassword::unbreakable();
        let doc = CancelAfter::new(inner.clone(), 10, token.clone());

        let outcome = find_password_parallel(
            &doc,
            &config("ab", 1, 12),
            &token,
            &options(2),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        let SearchOutcome::Cancelled { stats } = outcome else {
            panic!("expected Cancelled, got {outcome:?}");
        };
        assert!(stats.attempts < stats.total_space);
        assert_eq!(stats.attempts, inner.calls());
    }

    #[test]
    fn test_parallel_unencrypted() {
        let doc = FixedPassword::unencrypted();
        let outcome = find_password_parallel(
            &doc,
            &config("ab", 1, 2),
            &CancelToken::new(),
            &options(2),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        assert_eq!(outcome, SearchOutcome::AlreadyUnencrypted);
        assert_eq!(doc.calls(), 0);
    }

    #[test]
    fn test_parallel_empty_candidate() {
        let config =
            SearchConfig::with_empty_candidate(Alphabet::new("ab".chars()).unwrap(), 1, 3).unwrap();
        let doc = FixedPassword::new("");
        let outcome = find_password_parallel(
            &doc,
            &config,
            &CancelToken::new(),
            &options(2),
            &mut |_: &ProgressSnapshot| {},
        )
        .unwrap();

        assert_eq!(outcome.password(), Some(""));
        assert_eq!(doc.calls(), 1);
    }
}
