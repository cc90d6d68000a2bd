//! Engine M: a character-granular diff between two texts, built from Myers'
//! O(ND) bisection with a half-match speedup, three cleanup passes, a
//! Bitap fuzzy matcher, a delta codec and a patch machine.

mod bitap;
mod cleanup;
mod delta;
mod half_match;
mod line_mode;
mod myers;
mod op;
mod patch;

use std::time::{Duration, Instant};

pub use bitap::match_main;
pub use cleanup::{efficiency, merge, semantic, semantic_lossless};
pub use delta::{diff_to_delta, from_delta};
pub use op::{Diff, Op, text1, text2};
pub use patch::{
    Patch, add_padding, diff_levenshtein, diff_x_index, patch_apply, patch_from_text, patch_make_diffs,
    patch_make_text_and_diffs, patch_make_texts, patch_split_max, patch_to_text,
};

use crate::{config::Config, text::common_prefix_len, text::common_suffix_len, text::index_of};

/// Computes the diff between `old` and `new`. `check_lines` enables the
/// line-mode speedup for large inputs; callers that need exact minimality
/// regardless of input size should pass `false`.
pub fn diff_main(old: &str, new: &str, check_lines: bool, config: &Config) -> Diff {
    let deadline = config.deadline_enabled().then(|| Instant::now() + Duration::from_secs_f64(config.diff_timeout));
    let a = crate::text::to_chars(old);
    let b = crate::text::to_chars(new);
    diff_main_chars(&a, &b, check_lines, deadline, config)
}

fn diff_main_chars(s1: &[char], s2: &[char], check_lines: bool, deadline: Option<Instant>, config: &Config) -> Diff {
    if s1 == s2 {
        return if s1.is_empty() { Vec::new() } else { vec![Op::Equal(s1.to_vec())] };
    }

    let prefix_len = common_prefix_len(s1, s2);
    let prefix = &s1[..prefix_len];
    let mut s1 = &s1[prefix_len..];
    let mut s2 = &s2[prefix_len..];

    let suffix_len = common_suffix_len(s1, s2);
    let suffix = &s1[s1.len() - suffix_len..];
    s1 = &s1[..s1.len() - suffix_len];
    s2 = &s2[..s2.len() - suffix_len];

    let mut diffs = diff_compute(s1, s2, check_lines, deadline, config);

    if !prefix.is_empty() {
        diffs.insert(0, Op::Equal(prefix.to_vec()));
    }
    if !suffix.is_empty() {
        diffs.push(Op::Equal(suffix.to_vec()));
    }

    merge(diffs)
}

/// Finds the differences between two slices assumed to share no common
/// prefix or suffix.
fn diff_compute(s1: &[char], s2: &[char], check_lines: bool, deadline: Option<Instant>, config: &Config) -> Diff {
    if s1.is_empty() {
        return vec![Op::Insert(s2.to_vec())];
    }
    if s2.is_empty() {
        return vec![Op::Delete(s1.to_vec())];
    }

    let (long, short) = if s1.len() > s2.len() { (s1, s2) } else { (s2, s1) };

    if let Some(i) = index_of(long, short, 0) {
        let op: fn(Vec<char>) -> Op = if s1.len() > s2.len() { Op::Delete } else { Op::Insert };
        let mut diffs = vec![op(long[..i].to_vec())];
        if !short.is_empty() {
            diffs.push(Op::Equal(short.to_vec()));
        }
        let tail = long[i + short.len()..].to_vec();
        if !tail.is_empty() {
            diffs.push(op(tail));
        }
        return diffs;
    }

    if short.len() == 1 {
        return vec![Op::Delete(s1.to_vec()), Op::Insert(s2.to_vec())];
    }

    if let Some(hm) = half_match::half_match(s1, s2, config) {
        let diffs_a = diff_main_chars(&hm.a_prefix, &hm.b_prefix, check_lines, deadline, config);
        let mut diffs_b = diff_main_chars(&hm.a_suffix, &hm.b_suffix, check_lines, deadline, config);

        let mut diffs = diffs_a;
        diffs.push(Op::Equal(hm.common));
        diffs.append(&mut diffs_b);
        return diffs;
    }

    if check_lines && s1.len() > 100 && s2.len() > 100 {
        return diff_line_mode(s1, s2, deadline, config);
    }

    myers::myers_diff(s1, s2, deadline)
}

/// Runs a quick line-level diff first, then rediffs any replacement block
/// character-by-character for accuracy. Can produce non-minimal diffs.
fn diff_line_mode(s1: &[char], s2: &[char], deadline: Option<Instant>, config: &Config) -> Diff {
    let (chars1, chars2, line_array) = line_mode::lines_to_chars(s1, s2);
    let diffs = diff_main_chars(&chars1, &chars2, false, deadline, config);
    let diffs = line_mode::chars_to_lines(diffs, &line_array);
    let diffs = semantic(diffs);

    line_mode::rediff_replacement_blocks(diffs, |del, ins| diff_main_chars(del, ins, false, deadline, config))
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn identical_texts_yield_no_diff_or_single_equal() {
        assert_eq!(diff_main("", "", false, &Config::new()), Vec::new());
        assert_eq!(diff_main("abc", "abc", false, &Config::new()), vec![Op::Equal("abc".chars().collect())]);
    }

    #[test]
    fn finds_simple_replacement() {
        assert_debug_snapshot!(diff_main("The quick brown fox", "The slow brown fox", false, &Config::new()));
    }

    #[test]
    fn apples_are_a_fruit_example() {
        let diffs = diff_main("Apples are a fruit.", "Bananas are also fruit.", false, &Config::new());
        assert_eq!(text1(&diffs), "Apples are a fruit.");
        assert_eq!(text2(&diffs), "Bananas are also fruit.");
        assert_debug_snapshot!(diffs);
    }

    #[test]
    fn shorter_text_inside_longer_is_a_shortcut() {
        let diffs = diff_main("abc", "xxxabcxxx", false, &Config::new());
        assert_eq!(text1(&diffs), "abc");
        assert_eq!(text2(&diffs), "xxxabcxxx");
    }

    #[test]
    fn large_inputs_use_line_mode_and_still_round_trip() {
        let old: String = (0..500).map(|i| format!("line {i}\n")).collect();
        let mut new = old.clone();
        new = new.replace("line 250\n", "line two-fifty\n");

        let diffs = diff_main(&old, &new, true, &Config::new());
        assert_eq!(text1(&diffs), old);
        assert_eq!(text2(&diffs), new);
    }
}
