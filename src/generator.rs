//! Exhaustive candidate enumeration.
//!
//! Candidates come out shortest first. Within one length they are ordered as
//! base-`|alphabet|` numbers whose leftmost character is the most significant
//! digit, so `"ab"` over lengths 1..=2 gives `a b aa ab ba bb`.

use std::iter::FusedIterator;

use crate::config::SearchConfig;
use crate::error::ConfigError;

/// Size of the keyspace spanned by `alphabet_len` symbols over `min_len..=max_len`.
pub fn total_space(alphabet_len: usize, min_len: usize, max_len: usize) -> Result<u64, ConfigError> {
    if alphabet_len == 0 {
        return Err(ConfigError::EmptyAlphabet);
    }
    if min_len > max_len {
        return Ok(0);
    }

    // One symbol gives one candidate per length.
    if alphabet_len == 1 {
        let count = (max_len - min_len)
            .checked_add(1)
            .ok_or(ConfigError::SearchSpaceTooLarge(max_len))?;
        return u64::try_from(count).map_err(|_| ConfigError::SearchSpaceTooLarge(max_len));
    }

    let base = alphabet_len as u128;
    let mut total: u128 = 0;
    for len in min_len..=max_len {
        let exponent = u32::try_from(len).map_err(|_| ConfigError::SearchSpaceTooLarge(len))?;
        let combos = base
            .checked_pow(exponent)
            .ok_or(ConfigError::SearchSpaceTooLarge(len))?;
        total = total
            .checked_add(combos)
            .filter(|&total| total <= u64::MAX as u128)
            .ok_or(ConfigError::SearchSpaceTooLarge(len))?;
    }

    Ok(total as u64)
}

/// Starts a fresh enumeration of every candidate described by `config`.
pub fn generate(config: &SearchConfig) -> Candidates {
    Candidates {
        symbols: config.alphabet().symbols().to_vec(),
        max_len: config.max_length(),
        digits: vec![0; config.min_length()],
        pending_empty: config.include_empty(),
        remaining: config.total_space(),
    }
}

/// Lazy candidate sequence returned by [`generate`].
///
/// Only the current odometer position is held in memory. The sequence can
/// not be rewound; call [`generate`] again to start over.
#[derive(Clone, Debug)]
pub struct Candidates {
    symbols: Vec<char>,
    max_len: usize,
    digits: Vec<usize>,
    pending_empty: bool,
    remaining: u64,
}

impl Candidates {
    /// Candidates not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn advance(&mut self) {
        let base = self.symbols.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }

        // Every position wrapped: move on to the next length, all zeros.
        if self.digits.len() < self.max_len {
            self.digits.push(0);
        }
    }
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if self.pending_empty {
            self.pending_empty = false;
            return Some(String::new());
        }

        let candidate = self.digits.iter().map(|&d| self.symbols[d]).collect();
        self.advance();
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for Candidates {}

/// Translate an index within one length into the candidate at that position.
///
/// `index` must be below `symbols.len().pow(target_len)`.
pub fn candidate_at(mut index: u64, target_len: usize, symbols: &[char], buffer: &mut String) {
    buffer.clear();
    if target_len == 0 {
        return;
    }

    buffer.reserve(target_len);
    let base = symbols.len() as u64;
    let mut chars_reversed = Vec::with_capacity(target_len);

    for _ in 0..target_len {
        chars_reversed.push(symbols[(index % base) as usize]);
        index /= base;
    }

    buffer.extend(chars_reversed.iter().rev());
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::Alphabet;

    fn config(symbols: &str, min: usize, max: usize) -> SearchConfig {
        SearchConfig::new(Alphabet::new(symbols.chars()).unwrap(), min, max).unwrap()
    }

    #[test]
    fn test_two_symbol_order() {
        let passwords: Vec<String> = generate(&config("ab", 1, 2)).collect();
        assert_eq!(passwords, ["a", "b", "aa", "ab", "ba", "bb"]);
    }

    #[test]
    fn test_binary_order_up_to_three() {
        let passwords: Vec<String> = generate(&config("01", 1, 3)).collect();
        assert_eq!(
            passwords,
            [
                "0", "1", "00", "01", "10", "11", "000", "001", "010", "011", "100", "101", "110",
                "111",
            ]
        );
        assert_eq!(passwords[4], "10");
    }

    #[test]
    fn test_count_and_uniqueness() {
        for (symbols, min, max) in [("abc", 1, 3), ("xyz01", 2, 4), ("q", 1, 5), ("ab", 3, 3)] {
            let config = config(symbols, min, max);
            let passwords: Vec<String> = generate(&config).collect();
            assert_eq!(passwords.len() as u64, config.total_space());

            let unique: HashSet<&String> = passwords.iter().collect();
            assert_eq!(unique.len(), passwords.len());

            for pw in &passwords {
                let len = pw.chars().count();
                assert!((min..=max).contains(&len), "{pw} out of range");
            }
        }
    }

    #[test]
    fn test_single_symbol_alphabet() {
        let passwords: Vec<String> = generate(&config("z", 2, 4)).collect();
        assert_eq!(passwords, ["zz", "zzz", "zzzz"]);
    }

    #[test]
    fn test_empty_candidate_comes_first() {
        let config =
            SearchConfig::with_empty_candidate(Alphabet::new("ab".chars()).unwrap(), 1, 1).unwrap();
        let passwords: Vec<String> = generate(&config).collect();
        assert_eq!(passwords, ["", "a", "b"]);
    }

    #[test]
    fn test_restart_yields_same_sequence() {
        let config = config("abc", 1, 2);
        let mut first = generate(&config);
        let head: Vec<String> = first.by_ref().take(4).collect();
        assert_eq!(first.remaining(), config.total_space() - 4);

        let again: Vec<String> = generate(&config).take(4).collect();
        assert_eq!(head, again);
    }

    #[test]
    fn test_size_hint_and_fuse() {
        let mut candidates = generate(&config("ab", 1, 2));
        assert_eq!(candidates.size_hint(), (6, Some(6)));
        assert_eq!(candidates.by_ref().count(), 6);
        assert_eq!(candidates.next(), None);
        assert_eq!(candidates.next(), None);
    }

    #[test]
    fn test_lazy_over_large_space() {
        let config = SearchConfig::new(Alphabet::alphanumeric(), 6, 6).unwrap();
        let mut candidates = generate(&config);
        assert_eq!(candidates.next().as_deref(), Some("aaaaaa"));
        assert_eq!(candidates.next().as_deref(), Some("aaaaab"));
        assert_eq!(candidates.remaining(), 62u64.pow(6) - 2);
    }

    #[test]
    fn test_candidate_at_matches_iteration() {
        let config = config("abc", 3, 3);
        let symbols = config.alphabet().symbols();
        let mut buffer = String::new();
        for (index, expected) in generate(&config).enumerate() {
            candidate_at(index as u64, 3, symbols, &mut buffer);
            assert_eq!(buffer, expected);
        }
    }

    #[test]
    fn test_total_space() {
        assert_eq!(total_space(2, 1, 2), Ok(6));
        assert_eq!(total_space(62, 4, 6), Ok(57_731_144_752));
        assert_eq!(total_space(1, 3, 7), Ok(5));
        assert_eq!(total_space(0, 1, 2), Err(ConfigError::EmptyAlphabet));
    }
}
