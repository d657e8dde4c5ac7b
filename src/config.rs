//! Search settings: the candidate alphabet, the length range and run options.

use std::time::Duration;

use crate::error::ConfigError;
use crate::generator;

/// Extended symbol characters that can be included in the candidate alphabet.
pub const SYMBOLS: &[char] = &[
    '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '=', '+', '[', ']', '{', '}', '|',
    '\\', ':', ';', '"', '\'', ',', '.', '<', '>', '/', '?', '`', '~',
];

/// Default shortest password length tried.
pub const DEFAULT_MIN_LENGTH: usize = 4;

/// Default longest password length tried.
pub const DEFAULT_MAX_LENGTH: usize = 6;

/// Default wall-clock gap between two progress snapshots.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_millis(50);

/// Ordered, duplicate-free set of symbols candidates are built from.
///
/// The position of a symbol is its digit value when a candidate is read as a
/// base-`len()` number, so the order here is the enumeration order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alphabet(Vec<char>);

impl Alphabet {
    /// Takes the symbols in enumeration order; rejects an empty or repeating set.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, ConfigError> {
        let mut seen = Vec::new();
        for ch in symbols {
            if seen.contains(&ch) {
                return Err(ConfigError::DuplicateSymbol(ch));
            }
            seen.push(ch);
        }

        if seen.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }

        Ok(Self(seen))
    }

    /// Lowercase letters, uppercase letters, then digits: 62 symbols.
    pub fn alphanumeric() -> Self {
        Self(('a'..='z').chain('A'..='Z').chain('0'..='9').collect())
    }

    /// Builds an alphabet from character classes, in letters / digits / symbols order.
    pub fn from_classes(letters: bool, digits: bool, symbols: bool) -> Result<Self, ConfigError> {
        let mut charset: Vec<char> = Vec::new();
        if letters {
            charset.extend(('a'..='z').chain('A'..='Z'));
        }
        if digits {
            charset.extend('0'..='9');
        }
        if symbols {
            charset.extend(SYMBOLS.iter().copied());
        }
        Self::new(charset)
    }

    /// Number of symbols, the base candidates are counted in.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for a constructed alphabet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The symbols in enumeration order.
    pub fn symbols(&self) -> &[char] {
        &self.0
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::alphanumeric()
    }
}

/// What to enumerate. Immutable once built; every instance is valid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchConfig {
    alphabet: Alphabet,
    min_length: usize,
    max_length: usize,
    include_empty: bool,
    total_space: u64,
}

impl SearchConfig {
    /// Validates the length range and sizes the keyspace.
    ///
    /// Fails if `min_length` is 0, exceeds `max_length`, or the keyspace does
    /// not fit in a `u64`.
    pub fn new(alphabet: Alphabet, min_length: usize, max_length: usize) -> Result<Self, ConfigError> {
        Self::build(alphabet, min_length, max_length, false)
    }

    /// Same as [`SearchConfig::new`], but the empty password is tried first.
    pub fn with_empty_candidate(
        alphabet: Alphabet,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self, ConfigError> {
        Self::build(alphabet, min_length, max_length, true)
    }

    fn build(
        alphabet: Alphabet,
        min_length: usize,
        max_length: usize,
        include_empty: bool,
    ) -> Result<Self, ConfigError> {
        if min_length == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if min_length > max_length {
            return Err(ConfigError::InvertedRange {
                min: min_length,
                max: max_length,
            });
        }

        let mut total_space = generator::total_space(alphabet.len(), min_length, max_length)?;
        if include_empty {
            total_space = total_space
                .checked_add(1)
                .ok_or(ConfigError::SearchSpaceTooLarge(max_length))?;
        }

        Ok(Self {
            alphabet,
            min_length,
            max_length,
            include_empty,
            total_space,
        })
    }

    /// Symbols candidates are built from.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Shortest non-empty candidate length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Longest candidate length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Whether `""` is tried before the first real candidate.
    pub fn include_empty(&self) -> bool {
        self.include_empty
    }

    /// Number of candidates the generator yields for this config.
    pub fn total_space(&self) -> u64 {
        self.total_space
    }
}

/// How to run a search, as opposed to what to search.
#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Minimum wall-clock gap between progress snapshots.
    pub report_interval: Duration,
    /// Worker threads; 1 selects the sequential controller.
    pub threads: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            report_interval: DEFAULT_REPORT_INTERVAL,
            threads: 1,
        }
    }
}
