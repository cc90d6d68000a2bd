//! The half-match speedup: look for a long, roughly-centred common
//! substring before falling back to full bisection.

use crate::{
    config::Config,
    text::{common_prefix_len, common_suffix_len, index_of},
};

/// A 5-way split of `(a, b)` around a shared middle substring at least half
/// the length of the longer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfMatch {
    pub a_prefix: Vec<char>,
    pub a_suffix: Vec<char>,
    pub b_prefix: Vec<char>,
    pub b_suffix: Vec<char>,
    pub common: Vec<char>,
}

/// Finds a half-match between `a` and `b`, if one exists. Disabled when
/// `config.diff_timeout <= 0`, since an unbounded search should never settle
/// for a non-optimal shortcut.
pub fn half_match(a: &[char], b: &[char], config: &Config) -> Option<HalfMatch> {
    if !config.deadline_enabled() {
        return None;
    }

    let (long, short, swapped) = if a.len() > b.len() { (a, b, false) } else { (b, a, true) };

    if long.len() < 4 || short.len() * 2 < long.len() {
        return None;
    }

    let seed1 = (long.len() + 3).div_ceil(4);
    let seed2 = (long.len() + 1) / 2;

    let hm1 = half_match_seed(long, short, seed1);
    let hm2 = half_match_seed(long, short, seed2);

    let best = match (hm1, hm2) {
        (None, None) => return None,
        (Some(hm), None) | (None, Some(hm)) => hm,
        (Some(hm1), Some(hm2)) => {
            if hm1.common.len() > hm2.common.len() {
                hm1
            } else {
                hm2
            }
        }
    };

    // `half_match_seed` computes fields as if `long` were argument 1 and
    // `short` were argument 2; undo the swap so prefixes/suffixes line back
    // up with the caller's original `(a, b)` order.
    Some(if swapped {
        HalfMatch {
            a_prefix: best.b_prefix,
            a_suffix: best.b_suffix,
            b_prefix: best.a_prefix,
            b_suffix: best.a_suffix,
            common: best.common,
        }
    } else {
        best
    })
}

/// Looks for a half-match seeded by the quarter-length window of `long`
/// starting at `i`, growing every occurrence of that window in `short`
/// bidirectionally and keeping the longest common span found.
fn half_match_seed(long: &[char], short: &[char], i: usize) -> Option<HalfMatch> {
    let seed = &long[i..i + long.len() / 4];

    let mut best: Option<HalfMatch> = None;
    let mut best_common_len = 0;

    let mut j = index_of(short, seed, 0);
    while let Some(found) = j {
        let prefix_len = common_prefix_len(&long[i..], &short[found..]);
        let suffix_len = common_suffix_len(&long[..i], &short[..found]);

        if suffix_len + prefix_len > best_common_len {
            best_common_len = suffix_len + prefix_len;
            let mut common = short[found - suffix_len..found].to_vec();
            common.extend_from_slice(&short[found..found + prefix_len]);

            best = Some(HalfMatch {
                a_prefix: long[..i - suffix_len].to_vec(),
                a_suffix: long[i + prefix_len..].to_vec(),
                b_prefix: short[..found - suffix_len].to_vec(),
                b_suffix: short[found + prefix_len..].to_vec(),
                common,
            });
        }

        j = index_of(short, seed, found + 1);
    }

    best.filter(|hm| hm.common.len() * 2 >= long.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::text::to_chars;

    fn hm(a: &str, b: &str) -> Option<HalfMatch> { half_match(&to_chars(a), &to_chars(b), &Config::new()) }

    #[test]
    fn no_match_when_too_short() {
        assert!(hm("1234567890", "abcdef").is_none());
    }

    #[test]
    fn finds_centred_common_substring() {
        let result = hm("1234567890", "a345678z").expect("expected a half-match");
        assert_eq!(result.common.iter().collect::<String>(), "345678");
        assert_eq!(result.a_prefix.iter().collect::<String>(), "12");
        assert_eq!(result.a_suffix.iter().collect::<String>(), "90");
        assert_eq!(result.b_prefix.iter().collect::<String>(), "a");
        assert_eq!(result.b_suffix.iter().collect::<String>(), "z");
    }

    #[test]
    fn disabled_when_timeout_is_non_positive() {
        let result = half_match(
            &to_chars("1234567890"),
            &to_chars("a345678z"),
            &Config::new().with_diff_timeout(0.0),
        );
        assert!(result.is_none());
    }
}
