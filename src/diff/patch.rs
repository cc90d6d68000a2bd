//! A patch is a group of diff ops anchored to a location in the source text,
//! padded with enough context to be relocated by [`crate::diff::match_main`]
//! even after nearby edits have shifted it. [`patch_apply`] is the only
//! consumer of that relocation; everything else here is bookkeeping to build
//! and serialize the group.

use crate::config::Config;
use crate::error::{DiffError, Result};
use crate::text::{index_of, last_index_of, to_chars};

use super::cleanup::semantic_lossless;
use super::delta::{decode_insert, encode_insert};
use super::op::{Diff, Op};
use super::{diff_main_chars, match_main};

/// One relocatable group of edit ops. `start1`/`length1` describe the
/// source-side window, `start2`/`length2` the destination-side window;
/// `diffs` includes the context equalities on both ends, not just the edit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub diffs: Diff,
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

impl Default for Patch {
    fn default() -> Self { Self { diffs: Vec::new(), start1: 0, start2: 0, length1: 0, length2: 0 } }
}

/// Builds patches directly from two texts, applying semantic and efficiency
/// cleanup to the intermediate diff first when it has more than two ops (a
/// cosmetic pass that keeps the resulting patches small and readable).
pub fn patch_make_texts(text1: &str, text2: &str, config: &Config) -> Vec<Patch> {
    let mut diffs = diff_main_chars(&to_chars(text1), &to_chars(text2), true, None, config);
    if diffs.len() > 2 {
        diffs = super::semantic(diffs);
        diffs = super::efficiency(diffs, config.diff_edit_cost);
    }
    patch_make_from_diffs(&to_chars(text1), diffs, config)
}

/// Builds patches from a source text and a diff already computed against it,
/// without any further cleanup.
pub fn patch_make_text_and_diffs(text1: &str, diffs: Diff, config: &Config) -> Vec<Patch> {
    patch_make_from_diffs(&to_chars(text1), diffs, config)
}

/// Builds patches from a diff alone, recovering `text1` by projecting the
/// diff onto its `Equal`/`Delete` ops.
pub fn patch_make_diffs(diffs: Diff, config: &Config) -> Vec<Patch> {
    let text1 = to_chars(&super::text1(&diffs));
    patch_make_from_diffs(&text1, diffs, config)
}

fn patch_make_from_diffs(text1: &[char], diffs: Diff, config: &Config) -> Vec<Patch> {
    if diffs.is_empty() {
        return Vec::new();
    }

    let mut patches = Vec::new();
    let mut patch = Patch::default();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    let mut prepatch_text = text1.to_vec();
    let mut postpatch_text = text1.to_vec();

    let last_index = diffs.len() - 1;

    for (x, op) in diffs.into_iter().enumerate() {
        if patch.diffs.is_empty() && !op.is_equal() {
            patch.start1 = char_count1;
            patch.start2 = char_count2;
        }

        match &op {
            Op::Insert(t) => {
                patch.length2 += t.len();
                let at = char_count2.min(postpatch_text.len());
                postpatch_text.splice(at..at, t.iter().copied());
                char_count2 += t.len();
                patch.diffs.push(op);
            }
            Op::Delete(t) => {
                patch.length1 += t.len();
                let at = char_count2.min(postpatch_text.len());
                let end = (at + t.len()).min(postpatch_text.len());
                postpatch_text.splice(at..end, std::iter::empty());
                char_count1 += t.len();
                patch.diffs.push(op);
            }
            Op::Equal(t) => {
                if t.len() <= 2 * usize::from(config.patch_margin) && !patch.diffs.is_empty() && x != last_index {
                    patch.length1 += t.len();
                    patch.length2 += t.len();
                    patch.diffs.push(op);
                } else if t.len() >= 2 * usize::from(config.patch_margin) && !patch.diffs.is_empty() {
                    add_context(&mut patch, &prepatch_text, config);
                    patches.push(std::mem::take(&mut patch));
                    prepatch_text = postpatch_text.clone();
                    char_count1 = char_count2;
                }
                char_count1 += t.len();
                char_count2 += t.len();
            }
        }
    }

    if !patch.diffs.is_empty() {
        add_context(&mut patch, &prepatch_text, config);
        patches.push(patch);
    }

    patches
}

/// Grows the context equalities at the edges of `patch` until the window
/// `source[start2 .. start2+length1]` is unique within `source`, bounded by
/// `matchMaxBits - 2*patchMargin`, then extends by one further margin on
/// each side.
fn add_context(patch: &mut Patch, source: &[char], config: &Config) {
    if source.is_empty() {
        return;
    }

    let margin = usize::from(config.patch_margin);
    let max_pattern = usize::from(config.match_max_bits).saturating_sub(2 * margin);

    let mut padding = 0usize;
    let mut pattern: Vec<char> = source[patch.start2..(patch.start2 + patch.length1).min(source.len())].to_vec();

    while index_of(source, &pattern, 0) != last_index_of(source, &pattern, source.len()) && pattern.len() < max_pattern
    {
        padding += margin;
        let lo = patch.start2.saturating_sub(padding);
        let hi = (patch.start2 + patch.length1 + padding).min(source.len());
        pattern = source[lo..hi].to_vec();
    }
    padding += margin;

    let prefix_lo = patch.start2.saturating_sub(padding);
    let prefix = source[prefix_lo..patch.start2].to_vec();
    if !prefix.is_empty() {
        patch.diffs.insert(0, Op::Equal(prefix.clone()));
    }

    let suffix_hi = (patch.start2 + patch.length1 + padding).min(source.len());
    let suffix = source[(patch.start2 + patch.length1).min(source.len())..suffix_hi].to_vec();
    if !suffix.is_empty() {
        patch.diffs.push(Op::Equal(suffix.clone()));
    }

    patch.start1 -= prefix.len();
    patch.start2 -= prefix.len();
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
}

/// Carves every patch whose `length1` exceeds `matchMaxBits` into smaller
/// patches that fit, carrying up to `patchMargin` of context between
/// consecutive pieces. A delete longer than `2*matchMaxBits` in a patch of
/// its own is passed through in one oversized chunk: Bitap cannot locate it,
/// but [`patch_apply`]'s head/tail dual match can still place it.
pub fn patch_split_max(patches: Vec<Patch>, config: &Config) -> Vec<Patch> {
    let patch_size = usize::from(config.match_max_bits);
    let margin = usize::from(config.patch_margin);
    let mut out = Vec::with_capacity(patches.len());

    for patch in patches {
        if patch.length1 <= patch_size {
            out.push(patch);
            continue;
        }

        let mut start1 = patch.start1;
        let mut start2 = patch.start2;
        let mut precontext: Vec<char> = Vec::new();
        let mut remaining: std::collections::VecDeque<Op> = patch.diffs.into_iter().collect();

        while !remaining.is_empty() {
            let mut piece = Patch::default();
            let mut empty = true;
            piece.start1 = start1.saturating_sub(precontext.len());
            piece.start2 = start2.saturating_sub(precontext.len());

            if !precontext.is_empty() {
                piece.length1 = precontext.len();
                piece.length2 = precontext.len();
                piece.diffs.push(Op::Equal(precontext.clone()));
            }

            while !remaining.is_empty() && piece.length1 < patch_size.saturating_sub(margin) {
                let is_lone_equal_prefix = piece.diffs.len() == 1 && piece.diffs[0].is_equal();
                let front_is_big_delete = remaining.front().is_some_and(|op| op.is_delete() && op.len() > 2 * patch_size);

                if remaining.front().is_some_and(Op::is_insert) {
                    let op = remaining.pop_front().unwrap();
                    start2 += op.len();
                    piece.length2 += op.len();
                    piece.diffs.push(op);
                    empty = false;
                } else if front_is_big_delete && is_lone_equal_prefix {
                    let op = remaining.pop_front().unwrap();
                    start1 += op.len();
                    piece.length1 += op.len();
                    piece.diffs.push(op);
                    empty = false;
                } else {
                    let op = remaining.front().unwrap().clone();
                    let take = op.len().min(patch_size.saturating_sub(piece.length1).saturating_sub(margin)).max(0);
                    let take = take.min(op.len());
                    let chunk: Vec<char> = op.text()[..take].to_vec();

                    piece.length1 += chunk.len();
                    start1 += chunk.len();
                    if op.is_equal() {
                        piece.length2 += chunk.len();
                        start2 += chunk.len();
                    } else {
                        empty = false;
                    }
                    piece.diffs.push(op.with_text(chunk.clone()));

                    if chunk.len() == op.len() {
                        remaining.pop_front();
                    } else {
                        let rest = op.text()[chunk.len()..].to_vec();
                        *remaining.front_mut().unwrap() = op.with_text(rest);
                    }
                }
            }

            precontext = super::text2(&piece.diffs).chars().collect();
            let keep_from = precontext.len().saturating_sub(margin);
            precontext = precontext[keep_from..].to_vec();

            let remaining_text1: Vec<char> = remaining.iter().filter(|op| !op.is_insert()).flat_map(|op| op.text().to_vec()).collect();
            let postcontext_len = margin.min(remaining_text1.len());
            let postcontext = remaining_text1[..postcontext_len].to_vec();

            if !postcontext.is_empty() {
                piece.length1 += postcontext.len();
                piece.length2 += postcontext.len();
                if let Some(Op::Equal(last)) = piece.diffs.last_mut() {
                    last.extend(postcontext);
                } else {
                    piece.diffs.push(Op::Equal(postcontext));
                }
            }

            if !empty {
                out.push(piece);
            }
        }
    }

    out
}

/// Prepends a null-padding equality of `patchMargin` distinct low code
/// points to the first patch and appends the same to the last, shifting
/// every `start1`/`start2` forward by the padding length. Returns the
/// padding so [`patch_apply`] can strip it from the final text.
pub fn add_padding(patches: &mut [Patch], config: &Config) -> Vec<char> {
    let margin = usize::from(config.patch_margin);
    let null_padding: Vec<char> = (1..=margin as u32).filter_map(char::from_u32).collect();

    for patch in patches.iter_mut() {
        patch.start1 += margin;
        patch.start2 += margin;
    }

    if let Some(first) = patches.first_mut() {
        match first.diffs.first_mut() {
            Some(Op::Equal(prefix)) if prefix.len() >= margin => {}
            Some(Op::Equal(prefix)) => {
                let extra = margin - prefix.len();
                let mut padded = null_padding[prefix.len()..].to_vec();
                padded.extend(prefix.iter().copied());
                *prefix = padded;
                first.start1 -= extra;
                first.start2 -= extra;
                first.length1 += extra;
                first.length2 += extra;
            }
            _ => {
                first.diffs.insert(0, Op::Equal(null_padding.clone()));
                first.start1 -= margin;
                first.start2 -= margin;
                first.length1 += margin;
                first.length2 += margin;
            }
        }
    }

    if let Some(last) = patches.last_mut() {
        match last.diffs.last_mut() {
            Some(Op::Equal(suffix)) if suffix.len() >= margin => {}
            Some(Op::Equal(suffix)) => {
                let extra = margin - suffix.len();
                suffix.extend(null_padding[..extra].iter().copied());
                last.length1 += extra;
                last.length2 += extra;
            }
            _ => {
                last.diffs.push(Op::Equal(null_padding.clone()));
                last.length1 += margin;
                last.length2 += margin;
            }
        }
    }

    null_padding
}

/// Applies `patches` to `source`, returning the patched text and, for each
/// patch in order, whether it was successfully located and applied.
///
/// Never fails: a patch that cannot be relocated closely enough is simply
/// skipped (reported as `false`), leaving the surrounding text untouched.
pub fn patch_apply(patches: &[Patch], source: &str, config: &Config) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (source.to_owned(), Vec::new());
    }

    let mut patches = patches.to_vec();
    let null_padding = add_padding(&mut patches, config);
    let patches = patch_split_max(patches, config);

    let mut text = null_padding.clone();
    text.extend(to_chars(source));
    text.extend(null_padding.iter().copied());

    let max_bits = usize::from(config.match_max_bits);
    let mut delta: isize = 0;
    let mut results = Vec::with_capacity(patches.len());

    for patch in &patches {
        let expected_loc = (patch.start2 as isize + delta).max(0) as usize;
        let text1: Vec<char> = patch.diffs.iter().filter(|op| !op.is_insert()).flat_map(|op| op.text().to_vec()).collect();

        let mut start_loc: Option<usize> = None;
        let mut end_loc: Option<usize> = None;

        if text1.len() > max_bits {
            start_loc = match_main(&text, &text1[..max_bits], expected_loc, config);
            if let Some(s) = start_loc {
                let tail_expected = expected_loc + text1.len() - max_bits;
                end_loc = match_main(&text, &text1[text1.len() - max_bits..], tail_expected, config);
                if end_loc.is_none_or(|e| s >= e) {
                    start_loc = None;
                }
            }
        } else {
            start_loc = match_main(&text, &text1, expected_loc, config);
        }

        let Some(start_loc) = start_loc else {
            results.push(false);
            delta -= patch.length2 as isize - patch.length1 as isize;
            continue;
        };

        results.push(true);
        delta = start_loc as isize - expected_loc as isize;

        let text2_end = match end_loc {
            Some(e) => (e + max_bits).min(text.len()),
            None => (start_loc + text1.len()).min(text.len()),
        };
        let text2 = text[start_loc..text2_end].to_vec();

        if text1 == text2 {
            let replacement = super::text2(&patch.diffs);
            text.splice(start_loc..(start_loc + text1.len()).min(text.len()), replacement.chars());
        } else {
            let diffs = diff_main_chars(&text1, &text2, false, None, config);
            if text1.len() > max_bits && diff_levenshtein(&diffs) as f64 / text1.len() as f64 > f64::from(config.patch_delete_threshold)
            {
                *results.last_mut().unwrap() = false;
                continue;
            }

            let diffs = semantic_lossless(diffs);
            let mut index1 = 0usize;

            for op in &patch.diffs {
                let index2 = if !op.is_equal() { diff_x_index(&diffs, index1) } else { 0 };

                match op {
                    Op::Insert(t) => {
                        let at = (start_loc + index2).min(text.len());
                        text.splice(at..at, t.iter().copied());
                    }
                    Op::Delete(t) => {
                        let from = (start_loc + index2).min(text.len());
                        let to = (start_loc + diff_x_index(&diffs, index1 + t.len())).min(text.len());
                        text.splice(from..to.max(from), std::iter::empty());
                    }
                    Op::Equal(_) => {}
                }

                if !op.is_delete() {
                    index1 += op.len();
                }
            }
        }
    }

    let padding_len = null_padding.len();
    let patched: String = text[padding_len..text.len() - padding_len].iter().collect();
    (patched, results)
}

/// Maps a character offset in the *old* side of `diffs` to the
/// corresponding offset on the *new* side.
pub fn diff_x_index(diffs: &[Op], loc: usize) -> usize {
    let mut chars1 = 0usize;
    let mut chars2 = 0usize;
    let mut last_chars1 = 0usize;
    let mut last_chars2 = 0usize;
    let mut broke_at: Option<usize> = None;

    for (x, op) in diffs.iter().enumerate() {
        if !op.is_insert() {
            chars1 += op.len();
        }
        if !op.is_delete() {
            chars2 += op.len();
        }
        if chars1 > loc {
            broke_at = Some(x);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    match broke_at {
        Some(x) if diffs[x].is_delete() => last_chars2,
        Some(_) => last_chars2 + (loc - last_chars1),
        None => chars2,
    }
}

/// Number of single-character edits the diff represents: each maximal run
/// of inserts/deletes between two equalities costs `max(inserted, deleted)`.
pub fn diff_levenshtein(diffs: &[Op]) -> usize {
    let mut levenshtein = 0usize;
    let mut insertions = 0usize;
    let mut deletions = 0usize;

    for op in diffs {
        match op {
            Op::Insert(t) => insertions += t.len(),
            Op::Delete(t) => deletions += t.len(),
            Op::Equal(_) => {
                levenshtein += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    levenshtein += insertions.max(deletions);
    levenshtein
}

/// Renders `patches` as the concatenation of their `@@ ... @@` text blocks.
pub fn patch_to_text(patches: &[Patch]) -> String {
    patches.iter().map(patch_one_to_text).collect()
}

fn patch_one_to_text(patch: &Patch) -> String {
    let coords1 = coords(patch.start1, patch.length1);
    let coords2 = coords(patch.start2, patch.length2);

    let mut out = format!("@@ -{coords1} +{coords2} @@\n");
    for op in &patch.diffs {
        let tag = match op {
            Op::Insert(_) => '+',
            Op::Delete(_) => '-',
            Op::Equal(_) => ' ',
        };
        out.push(tag);
        out.push_str(&encode_insert(op.text()));
        out.push('\n');
    }
    out
}

fn coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        n => format!("{},{n}", start + 1),
    }
}

/// Parses patch text produced by [`patch_to_text`]. The empty string parses
/// to zero patches.
pub fn patch_from_text(text: &str) -> Result<Vec<Patch>> {
    let mut patches = Vec::new();
    if text.is_empty() {
        return Ok(patches);
    }

    let mut lines = text.split('\n').peekable();

    while let Some(&line) = lines.peek() {
        if line.is_empty() {
            lines.next();
            continue;
        }

        let (start1, length1, start2, length2) = parse_header(line)?;
        lines.next();

        let mut patch =
            Patch { diffs: Vec::new(), start1, start2, length1, length2 };

        while let Some(&line) = lines.peek() {
            if line.is_empty() {
                lines.next();
                continue;
            }
            let Some(tag) = line.chars().next() else { break };
            if tag == '@' {
                break;
            }
            lines.next();

            let rest = &line[tag.len_utf8()..];
            let decoded = decode_insert(rest)?;
            let chars: Vec<char> = decoded.chars().collect();

            match tag {
                '+' => patch.diffs.push(Op::Insert(chars)),
                '-' => patch.diffs.push(Op::Delete(chars)),
                ' ' => patch.diffs.push(Op::Equal(chars)),
                other => return Err(DiffError::FormatError(format!("unknown patch line prefix: {other}"))),
            }
        }

        patches.push(patch);
    }

    Ok(patches)
}

/// Parses a `@@ -start1,length1 +start2,length2 @@` header, returning
/// 0-based `(start1, length1, start2, length2)`.
fn parse_header(line: &str) -> Result<(usize, usize, usize, usize)> {
    let body = line
        .strip_prefix("@@ -")
        .and_then(|s| s.strip_suffix(" @@"))
        .ok_or_else(|| DiffError::FormatError(format!("malformed patch header: {line}")))?;

    let (left, right) = body
        .split_once(" +")
        .ok_or_else(|| DiffError::FormatError(format!("malformed patch header: {line}")))?;

    let (start1, length1) = parse_range(left)?;
    let (start2, length2) = parse_range(right)?;
    Ok((start1, length1, start2, length2))
}

/// Parses one `start` or `start,length` range, per the reference's
/// `(\d+),?(\d*)` grammar: no comma means a unit-length range (1-based start
/// decremented by one); a comma followed by digits gives an explicit
/// 0-based-after-decrement length (`,0` is a genuine empty range, so the
/// start is not decremented in that case).
fn parse_range(s: &str) -> Result<(usize, usize)> {
    let err = || DiffError::FormatError(format!("malformed patch range: {s}"));

    match s.split_once(',') {
        None => {
            let start: usize = s.parse().map_err(|_| err())?;
            Ok((start.saturating_sub(1), 1))
        }
        Some((start, "")) => {
            let start: usize = start.parse().map_err(|_| err())?;
            Ok((start.saturating_sub(1), 0))
        }
        Some((start, "0")) => {
            let start: usize = start.parse().map_err(|_| err())?;
            Ok((start, 0))
        }
        Some((start, length)) => {
            let start: usize = start.parse().map_err(|_| err())?;
            let length: usize = length.parse().map_err(|_| err())?;
            Ok((start.saturating_sub(1), length))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn make_and_apply_round_trips_for_closely_related_texts() {
        let config = Config::new();
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "That quick brown fox jumped over a lazy dog.";
        let patches = patch_make_texts(text1, text2, &config);

        let (applied, results) = patch_apply(&patches, text1, &config);
        assert_eq!(applied, text2);
        assert!(results.iter().all(|&ok| ok));
    }

    #[test]
    fn apply_relocates_patches_against_a_rewritten_source() {
        let config = Config::new();
        let patches = patch_make_texts(
            "The quick brown fox jumps over the lazy dog.",
            "That quick brown fox jumped over a lazy dog.",
            &config,
        );

        let (applied, results) =
            patch_apply(&patches, "The quick red rabbit jumps over the tired tiger.", &config);

        assert_eq!(applied, "That quick red rabbit jumped over a tired tiger.");
        assert_eq!(results, vec![true, true]);
    }

    #[test]
    fn apply_on_unrelated_text_leaves_it_unchanged_and_reports_failure() {
        let config = Config::new();
        let patches = patch_make_texts("abcdefghijklmnopqrstuvwxyz", "abcXefghijklmnopqrstuvwxyz", &config);
        let (applied, results) = patch_apply(&patches, "zyxwvutsrqponmlkjihgfedcba", &config);
        assert_eq!(applied, "zyxwvutsrqponmlkjihgfedcba");
        assert!(results.iter().all(|&ok| !ok));
    }

    #[test]
    fn to_text_and_from_text_round_trip() {
        let config = Config::new();
        let patches = patch_make_texts(
            "The quick brown fox jumps over the lazy dog.",
            "That quick brown fox jumped over a lazy dog.",
            &config,
        );
        let text = patch_to_text(&patches);
        let parsed = patch_from_text(&text).unwrap();
        assert_eq!(parsed, patches);
    }

    #[test]
    fn from_text_parses_the_empty_string_to_no_patches() {
        assert_eq!(patch_from_text("").unwrap(), Vec::new());
    }

    #[test]
    fn from_text_rejects_a_malformed_header() {
        assert!(matches!(patch_from_text("not a header\n"), Err(DiffError::FormatError(_))));
    }

    #[test]
    fn header_coordinates_omit_the_comma_for_unit_length() {
        assert_eq!(coords(4, 1), "5");
        assert_eq!(coords(4, 0), "4,0");
        assert_eq!(coords(4, 3), "5,3");
    }

    #[test]
    fn split_max_breaks_an_oversized_patch_into_smaller_pieces() {
        let config = Config::new().with_match_max_bits(32);
        let long_old: String = "abcdefghij".repeat(10);
        let mut long_new = long_old.clone();
        long_new.insert_str(55, "_INSERTED_");
        let patches = patch_make_texts(&long_old, &long_new, &config);
        assert!(patches.iter().all(|p| p.length1 <= usize::from(config.match_max_bits) || p.diffs.len() == 1));

        let (applied, results) = patch_apply(&patches, &long_old, &config);
        assert_eq!(applied, long_new);
        assert!(results.iter().all(|&ok| ok));
    }

    #[test]
    fn levenshtein_counts_the_longer_side_of_each_edit_run() {
        let diffs = vec![Op::Delete(to_chars("abc")), Op::Insert(to_chars("xy")), Op::Equal(to_chars("z"))];
        assert_eq!(diff_levenshtein(&diffs), 3);
    }
}
