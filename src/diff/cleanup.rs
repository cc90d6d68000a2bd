//! The three cleanup passes run after raw Myers bisection: merge adjacent
//! same-kind ops, fold semantically trivial equalities into their
//! neighbours, and drop equalities too short to be worth an edit boundary.

use super::op::{Diff, Op};
use crate::text::{common_overlap, common_prefix_len, common_suffix_len};

/// Reorders and merges adjacent edits of the same kind. Any edit section can
/// move sideways as long as it doesn't cross an equality.
///
/// Runs in two sweeps: the first collapses runs of inserts/deletes between
/// equalities (factoring out any common prefix/suffix between the
/// accumulated insert and delete text into the surrounding equalities), the
/// second shifts a single edit flanked by two equalities across the smaller
/// of the two when doing so lets that equality disappear. If the second
/// sweep makes a change, the whole pass re-runs, since the reordering can
/// expose new merge opportunities.
pub fn merge(diffs: Diff) -> Diff {
    let mut ds = diffs;
    ds.push(Op::Equal(Vec::new()));

    let mut result: Diff = Vec::with_capacity(ds.len());
    let mut ins_text: Vec<char> = Vec::new();
    let mut del_text: Vec<char> = Vec::new();

    for op in ds {
        match op {
            Op::Insert(t) => ins_text.extend(t),
            Op::Delete(t) => del_text.extend(t),
            Op::Equal(mut t) => {
                if !ins_text.is_empty() || !del_text.is_empty() {
                    if !ins_text.is_empty() && !del_text.is_empty() {
                        let prefix = common_prefix_len(&ins_text, &del_text);
                        if prefix > 0 {
                            let prefix_text: Vec<char> = ins_text[..prefix].to_vec();
                            if let Some(Op::Equal(prev)) = result.last_mut() {
                                prev.extend(prefix_text);
                            } else {
                                result.push(Op::Equal(prefix_text));
                            }
                            ins_text.drain(..prefix);
                            del_text.drain(..prefix);
                        }

                        // Factor out any common suffix and prepend it to the
                        // equality we're about to reach, rather than to a
                        // separate op — it belongs to the same position as
                        // `t`, just ahead of the edits that produced it.
                        let suffix = common_suffix_len(&ins_text, &del_text);
                        if suffix > 0 {
                            let ins_suffix_start = ins_text.len() - suffix;
                            let suffix_text: Vec<char> = ins_text[ins_suffix_start..].to_vec();
                            ins_text.truncate(ins_suffix_start);
                            let del_suffix_start = del_text.len() - suffix;
                            del_text.truncate(del_suffix_start);
                            let mut combined = suffix_text;
                            combined.extend(t);
                            t = combined;
                        }
                    }
                    push_edits(&mut result, &del_text, &ins_text);
                    del_text.clear();
                    ins_text.clear();
                }

                if let Some(Op::Equal(prev)) = result.last_mut() {
                    prev.extend(t);
                } else if !t.is_empty() {
                    result.push(Op::Equal(t));
                }
            }
        }
    }

    if matches!(result.last(), Some(Op::Equal(t)) if t.is_empty()) {
        result.pop();
    }

    shift_edits_across_equalities(result)
}

fn push_edits(result: &mut Diff, del_text: &[char], ins_text: &[char]) {
    if !del_text.is_empty() {
        result.push(Op::Delete(del_text.to_vec()));
    }
    if !ins_text.is_empty() {
        result.push(Op::Insert(ins_text.to_vec()));
    }
}

/// Second merge sweep: a single edit flanked by two equalities is shifted
/// left or right across whichever neighbouring equality it duplicates,
/// eliminating that equality. Re-runs `merge` if any shift happened, since
/// shifting can create a fresh pair of adjacent equalities to fold.
fn shift_edits_across_equalities(mut ds: Diff) -> Diff {
    let mut changed = false;
    let mut i = 1;

    while i + 1 < ds.len() {
        let is_flanked = ds[i - 1].is_equal() && ds[i + 1].is_equal();
        if is_flanked {
            let edit_text = ds[i].text().to_vec();
            let prev_text = ds[i - 1].text().to_vec();
            let next_text = ds[i + 1].text().to_vec();

            if edit_text.ends_with(prev_text.as_slice()) {
                let new_edit_len = edit_text.len() - prev_text.len();
                let mut shifted = prev_text.clone();
                shifted.extend_from_slice(&edit_text[..new_edit_len]);
                ds[i] = ds[i].with_text(shifted);

                let mut new_next = prev_text;
                new_next.extend(next_text);
                ds[i + 1] = Op::Equal(new_next);
                ds.remove(i - 1);
                changed = true;
                continue;
            } else if edit_text.starts_with(next_text.as_slice()) {
                let mut new_prev = prev_text;
                new_prev.extend(next_text.clone());
                ds[i - 1] = Op::Equal(new_prev);

                let mut shifted = edit_text[next_text.len()..].to_vec();
                shifted.extend(next_text);
                ds[i] = ds[i].with_text(shifted);
                ds.remove(i + 1);
                changed = true;
                continue;
            }
        }
        i += 1;
    }

    if changed { merge(ds) } else { ds }
}

/// Reduces the number of edits by eliminating semantically trivial
/// equalities — ones small enough, relative to the edit activity on either
/// side, that the surrounding edits are more naturally read as a single
/// replacement.
pub fn semantic(diffs: Diff) -> Diff {
    let mut ds = diffs;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;

    let (mut ins_len1, mut del_len1) = (0usize, 0usize);
    let (mut ins_len2, mut del_len2) = (0usize, 0usize);

    let mut changed = false;
    let mut i: isize = 0;

    while (i as usize) < ds.len() {
        let idx = i as usize;
        match &ds[idx] {
            Op::Equal(t) => {
                equalities.push(idx);
                ins_len1 = ins_len2;
                del_len1 = del_len2;
                ins_len2 = 0;
                del_len2 = 0;
                last_equality = Some(t.clone());
            }
            Op::Insert(t) => ins_len2 += t.len(),
            Op::Delete(t) => del_len2 += t.len(),
        }

        if let Some(eq) = &last_equality {
            let d1 = ins_len1.max(del_len1);
            let d2 = ins_len2.max(del_len2);
            if !eq.is_empty() && eq.len() <= d1 && eq.len() <= d2 {
                let insert_point = *equalities.last().expect("equalities tracks last_equality");
                ds.insert(insert_point, Op::Delete(eq.clone()));
                ds[insert_point + 1] = Op::Insert(eq.clone());

                equalities.pop();
                if let Some(&prev) = equalities.last() {
                    equalities.pop();
                    i = prev as isize;
                } else {
                    i = -1;
                }

                ins_len1 = 0;
                del_len1 = 0;
                ins_len2 = 0;
                del_len2 = 0;
                last_equality = None;
                changed = true;
            }
        }

        i += 1;
    }

    if changed {
        ds = merge(ds);
    }
    ds = semantic_lossless(ds);
    eliminate_overlaps(ds)
}

/// For every adjacent `Delete`-then-`Insert` pair, checks whether one's
/// suffix overlaps the other's prefix by at least half the shorter text's
/// length, and if so splits an `Equal` out of the overlap.
fn eliminate_overlaps(mut ds: Diff) -> Diff {
    let mut i = 1;
    while i < ds.len() {
        if ds[i - 1].is_delete() && ds[i].is_insert() {
            let deletion = ds[i - 1].text().to_vec();
            let insertion = ds[i].text().to_vec();
            let overlap1 = common_overlap(&deletion, &insertion);
            let overlap2 = common_overlap(&insertion, &deletion);

            if overlap1 >= overlap2 {
                if overlap1 * 2 >= deletion.len() || overlap1 * 2 >= insertion.len() {
                    let equal_text = insertion[..overlap1].to_vec();
                    ds[i - 1] = Op::Delete(deletion[..deletion.len() - overlap1].to_vec());
                    ds[i] = Op::Insert(insertion[overlap1..].to_vec());
                    ds.insert(i, Op::Equal(equal_text));
                    i += 1;
                }
            } else if overlap2 * 2 >= deletion.len() || overlap2 * 2 >= insertion.len() {
                let equal_text = insertion[insertion.len() - overlap2..].to_vec();
                ds[i - 1] = Op::Insert(insertion[..insertion.len() - overlap2].to_vec());
                ds[i] = Op::Delete(deletion[overlap2..].to_vec());
                ds.insert(i, Op::Equal(equal_text));
                i += 1;
            }
        }
        i += 1;
    }
    ds
}

/// Looks for single edits surrounded on both sides by equalities that can be
/// shifted sideways to align the edit's boundary to a logical break (word,
/// sentence, or line boundary), e.g. `The c[at c]ame.` -> `The [cat ]came.`.
pub fn semantic_lossless(mut ds: Diff) -> Diff {
    if ds.len() < 3 {
        return ds;
    }

    let mut i = 1;
    while i + 1 < ds.len() {
        if ds[i - 1].is_equal() && ds[i + 1].is_equal() {
            let mut equality1 = ds[i - 1].text().to_vec();
            let mut edit = ds[i].text().to_vec();
            let mut equality2 = ds[i + 1].text().to_vec();

            let common_offset = common_suffix_len(&equality1, &edit);
            if common_offset > 0 {
                let common: Vec<char> = edit[edit.len() - common_offset..].to_vec();
                equality1.truncate(equality1.len() - common_offset);
                let mut new_edit = common.clone();
                new_edit.extend_from_slice(&edit[..edit.len() - common_offset]);
                edit = new_edit;
                let mut new_equality2 = common;
                new_equality2.extend(equality2);
                equality2 = new_equality2;
            }

            let mut best = (equality1.clone(), edit.clone(), equality2.clone());
            let mut best_score = semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);

            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                equality1.push(edit[0]);
                edit.remove(0);
                edit.push(equality2[0]);
                equality2.remove(0);

                let score = semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                if score >= best_score {
                    best_score = score;
                    best = (equality1.clone(), edit.clone(), equality2.clone());
                }
            }

            let (best_equality1, best_edit, best_equality2) = best;
            if ds[i - 1].text() != best_equality1.as_slice() {
                if best_equality1.is_empty() {
                    ds.remove(i - 1);
                    i -= 1;
                } else {
                    ds[i - 1] = Op::Equal(best_equality1);
                }

                ds[i] = ds[i].with_text(best_edit);

                if best_equality2.is_empty() {
                    ds.remove(i + 1);
                    i -= 1;
                } else {
                    ds[i + 1] = Op::Equal(best_equality2);
                }
            }
        }
        i += 1;
    }

    ds
}

/// Scores how good a split point is between `one` (ending here) and `two`
/// (starting here), from 0 (worst) to 6 (best): blank line > line break >
/// sentence end > whitespace > non-alphanumeric > anything else. Classifies
/// code points with `char` predicates rather than a regex engine — the set
/// of classes is small and fixed.
fn semantic_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&char1), Some(&char2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alnum1 = !char1.is_ascii_alphanumeric();
    let non_alnum2 = !char2.is_ascii_alphanumeric();
    let whitespace1 = non_alnum1 && is_pattern_whitespace(char1);
    let whitespace2 = non_alnum2 && is_pattern_whitespace(char2);
    let linebreak1 = whitespace1 && matches!(char1, '\r' | '\n');
    let linebreak2 = whitespace2 && matches!(char2, '\r' | '\n');
    let blank_line1 = linebreak1 && ends_with_blank_line(one);
    let blank_line2 = linebreak2 && starts_with_blank_line(two);

    if blank_line1 || blank_line2 {
        5
    } else if linebreak1 || linebreak2 {
        4
    } else if non_alnum1 && !whitespace1 && whitespace2 {
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alnum1 || non_alnum2 {
        1
    } else {
        0
    }
}

fn is_pattern_whitespace(c: char) -> bool { matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') }

fn ends_with_blank_line(text: &[char]) -> bool {
    // `\n\r?\n$`
    let n = text.len();
    if n >= 2 && text[n - 1] == '\n' && text[n - 2] == '\n' {
        return true;
    }
    n >= 3 && text[n - 1] == '\n' && text[n - 2] == '\r' && text[n - 3] == '\n'
}

fn starts_with_blank_line(text: &[char]) -> bool {
    // `^\r?\n\r?\n`
    let mut rest = text;
    if rest.first() == Some(&'\r') {
        rest = &rest[1..];
    }
    if rest.first() != Some(&'\n') {
        return false;
    }
    rest = &rest[1..];
    if rest.first() == Some(&'\r') {
        rest = &rest[1..];
    }
    rest.first() == Some(&'\n')
}

/// Eliminates equalities shorter than `edit_cost` that sit between edit
/// activity on both sides, since a short equality there reads better merged
/// into a single replacement than kept as its own no-op hunk.
pub fn efficiency(diffs: Diff, edit_cost: u16) -> Diff {
    let edit_cost = usize::from(edit_cost);
    let mut ds = diffs;
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<Vec<char>> = None;

    let (mut pre_ins, mut pre_del, mut post_ins, mut post_del) = (false, false, false, false);
    let mut changed = false;
    let mut i: isize = 0;

    while (i as usize) < ds.len() {
        let idx = i as usize;
        match &ds[idx] {
            Op::Equal(t) => {
                if t.len() < edit_cost && (post_ins || post_del) {
                    equalities.push(idx);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = Some(t.clone());
                } else {
                    equalities.clear();
                    last_equality = None;
                }
                post_ins = false;
                post_del = false;
            }
            Op::Insert(_) => post_ins = true,
            Op::Delete(_) => post_del = true,
        }

        let n_present = usize::from(pre_ins) + usize::from(pre_del) + usize::from(post_ins) + usize::from(post_del);

        if let Some(eq) = &last_equality {
            if !eq.is_empty()
                && ((pre_ins && pre_del && post_ins && post_del) || (eq.len() < edit_cost / 2 && n_present == 3))
            {
                let insert_point = *equalities.last().expect("equalities tracks last_equality");
                ds.insert(insert_point, Op::Delete(eq.clone()));
                ds[insert_point + 1] = Op::Insert(eq.clone());
                equalities.pop();
                last_equality = None;
                changed = true;

                if pre_ins && pre_del {
                    post_ins = true;
                    post_del = true;
                    equalities.clear();
                } else {
                    if let Some(&prev) = equalities.last() {
                        equalities.pop();
                        i = prev as isize;
                    } else {
                        i = -1;
                    }
                    post_ins = false;
                    post_del = false;
                }
            }
        }

        i += 1;
    }

    if changed { merge(ds) } else { ds }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::text::to_chars;

    fn d_eq(s: &str) -> Op { Op::Equal(to_chars(s)) }
    fn d_ins(s: &str) -> Op { Op::Insert(to_chars(s)) }
    fn d_del(s: &str) -> Op { Op::Delete(to_chars(s)) }

    #[test]
    fn merge_factors_common_prefix_and_suffix() {
        let diffs = vec![d_eq("a"), d_del("abc"), d_ins("abd"), d_eq("x")];
        assert_eq!(merge(diffs), vec![d_eq("aab"), d_del("c"), d_ins("d"), d_eq("x")]);
    }

    #[test]
    fn merge_drops_empty_ops() {
        let diffs = vec![d_eq(""), d_ins("a"), d_eq("b"), d_eq("c")];
        assert_eq!(merge(diffs), vec![d_ins("a"), d_eq("bc")]);
    }

    #[test]
    fn semantic_splits_trivial_equality() {
        let diffs = vec![d_del("abcxxx"), d_ins("xxxdef")];
        assert_eq!(semantic(diffs), vec![d_del("abc"), d_eq("xxx"), d_ins("def")]);
    }

    #[test]
    fn semantic_shifts_edit_to_word_boundary() {
        let diffs = vec![d_eq("The c"), d_ins("at c"), d_eq("ame.")];
        assert_eq!(semantic_lossless(diffs), vec![d_eq("The "), d_ins("cat "), d_eq("came.")]);
    }

    #[test]
    fn efficiency_merges_short_equality_between_edits() {
        let diffs = vec![d_ins("A"), d_del("B"), d_eq("wxyz"), d_del("C"), d_ins("D")];
        assert_eq!(efficiency(diffs, 4), vec![d_del("ABwxyzC"), d_ins("ADwxyzD")]);
    }

    #[test]
    fn efficiency_leaves_long_equality_alone() {
        let diffs = vec![d_ins("A"), d_del("B"), d_eq("wxyz"), d_del("C"), d_ins("D")];
        assert_eq!(efficiency(diffs, 1), diffs);
    }
}
