//! Bitap (Shift-And) fuzzy matcher: locate `pattern` in `text` near `loc`,
//! tolerating a bounded number of errors.
//!
//! This crate runs Bitap over code points rather than bytes. The reference
//! implementation operates byte-wise, but every other primitive in this
//! crate is code-point aware (see [`crate::text`]) and Bitap's matches are
//! only ever used as a location hint for a subsequent exact equality check
//! (in [`crate::diff::patch`]), so there is no correctness reason to special
//! case bytes here.

use std::collections::HashMap;

use crate::config::Config;
use crate::text::{index_of, last_index_of};

/// Locates `pattern` in `text` near `loc`, returning the best start index
/// or `None` if nothing scored within `config.match_threshold`.
///
/// Tries an exact match first (including the degenerate empty-pattern case),
/// then falls back to the bit-parallel fuzzy search. `pattern` longer than
/// `config.match_max_bits` is truncated to fit the bit-parallel state;
/// callers that need the whole pattern considered should split it
/// themselves before calling.
pub fn match_main(text: &[char], pattern: &[char], loc: usize, config: &Config) -> Option<usize> {
    let loc = loc.min(text.len());

    if pattern.is_empty() {
        return Some(loc);
    }
    if text == pattern {
        return Some(0);
    }
    if loc + pattern.len() <= text.len() && text[loc..loc + pattern.len()] == *pattern {
        return Some(loc);
    }

    match_bitap(text, pattern, loc, config)
}

/// `score(errors, candidateLoc)`: how bad a candidate match at `x` is,
/// relative to `loc`, given it took `e` bit-flips to find. Lower is better.
fn score(e: usize, x: isize, loc: isize, pattern_len: usize, config: &Config) -> f64 {
    let accuracy = e as f64 / pattern_len as f64;
    let proximity = (loc - x).unsigned_abs() as f64;
    if config.match_distance == 0 {
        if proximity == 0.0 { accuracy } else { 1.0 }
    } else {
        accuracy + proximity / f64::from(config.match_distance)
    }
}

/// Builds the alphabet mask: for each code point in `pattern`, a bitmask
/// with bit `(len-1-i)` set for every position `i` at which it occurs.
fn alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let mut s: HashMap<char, u64> = HashMap::new();
    for (i, &c) in pattern.iter().enumerate() {
        let bit = 1u64 << (pattern.len() - i - 1);
        *s.entry(c).or_insert(0) |= bit;
    }
    s
}

fn match_bitap(text: &[char], pattern: &[char], loc: usize, config: &Config) -> Option<usize> {
    let max_bits = usize::from(config.match_max_bits).max(1);
    let pattern = if pattern.len() > max_bits { &pattern[..max_bits] } else { pattern };
    let pattern_len = pattern.len();
    let alphabet_map = alphabet(pattern);

    let loc_i = loc as isize;
    let text_len = text.len();

    let mut score_threshold = f64::from(config.match_threshold);

    if let Some(best) = index_of(text, pattern, loc) {
        score_threshold = score_threshold.min(score(0, best as isize, loc_i, pattern_len, config));
    }
    if let Some(best) = last_index_of(text, pattern, loc + pattern_len) {
        score_threshold = score_threshold.min(score(0, best as isize, loc_i, pattern_len, config));
    }

    let match_mask = 1u64 << (pattern_len - 1);
    let mut best_loc: Option<usize> = None;

    let mut bin_max = pattern_len + text_len;
    let mut last_rd: Vec<u64> = Vec::new();

    for d in 0..pattern_len {
        let mut bin_min: isize = 0;
        let mut bin_mid = bin_max as isize;
        while bin_min < bin_mid {
            if score(d, loc_i + bin_mid, loc_i, pattern_len, config) <= score_threshold {
                bin_min = bin_mid;
            } else {
                bin_max = usize::try_from(bin_mid).unwrap_or(0);
            }
            bin_mid = (bin_max as isize - bin_min) / 2 + bin_min;
        }
        bin_max = usize::try_from(bin_mid).unwrap_or(0);

        let mut start = (loc_i - bin_mid + 1).max(1);
        let finish_i = (loc_i + bin_mid).min(text_len as isize) + pattern_len as isize;
        let finish = usize::try_from(finish_i).unwrap_or(0);

        let mut rd = vec![0u64; finish + 2];
        rd[finish + 1] = (1u64 << d) - 1;

        let mut j = finish_i;
        while j >= start {
            let ju = usize::try_from(j).unwrap_or(0);
            let char_match = if ju == 0 || ju - 1 >= text_len { 0 } else { *alphabet_map.get(&text[ju - 1]).unwrap_or(&0) };

            let rd_j = if d == 0 {
                ((rd[ju + 1] << 1) | 1) & char_match
            } else {
                (((rd[ju + 1] << 1) | 1) & char_match) | (((last_rd[ju + 1] | last_rd[ju]) << 1) | 1) | last_rd[ju + 1]
            };
            rd[ju] = rd_j;

            if rd_j & match_mask != 0 {
                let candidate = ju - 1;
                let s = score(d, candidate as isize, loc_i, pattern_len, config);
                if s <= score_threshold {
                    score_threshold = s;
                    best_loc = Some(candidate);
                    if candidate as isize > loc_i {
                        start = (2 * loc_i - candidate as isize).max(1);
                    } else {
                        break;
                    }
                }
            }
            j -= 1;
        }

        if score(d + 1, loc_i, loc_i, pattern_len, config) > score_threshold {
            break;
        }
        last_rd = rd;
    }

    best_loc
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::text::to_chars;

    fn locate(text: &str, pattern: &str, loc: usize, config: &Config) -> Option<usize> {
        match_main(&to_chars(text), &to_chars(pattern), loc, config)
    }

    #[test]
    fn exact_match_is_found_without_bitap() {
        assert_eq!(locate("abcdef", "cd", 0, &Config::new()), Some(2));
    }

    #[test]
    fn fuzzy_match_finds_the_reference_scenario() {
        let config = Config::new().with_match_threshold(0.5).with_match_distance(100);
        assert_eq!(locate("abcdefghijk", "efxhi", 0, &config), Some(4));
    }

    #[test]
    fn returns_none_past_the_threshold() {
        let config = Config::new().with_match_threshold(0.1).with_match_distance(100);
        assert_eq!(locate("abcdefghijk", "efxhi", 0, &config), None);
    }

    #[test]
    fn empty_pattern_matches_at_loc() {
        assert_eq!(locate("abcdef", "", 3, &Config::new()), Some(3));
    }

    #[test]
    fn prefers_the_match_nearest_loc() {
        let config = Config::new().with_match_threshold(0.5).with_match_distance(1000);
        assert_eq!(locate("abc abc abc", "abc", 9, &config), Some(8));
    }
}
