//! Myers' O(ND) diff algorithm over code-point slices.
//!
//! Adapted from the divide-and-conquer formulation used by the `similar`
//! crate (<https://github.com/mitsuhiko/similar>): two shared farthest-reaching
//! frontiers (`vf`, `vb`) are threaded through the whole recursion rather than
//! reallocated per level, and the middle snake is found once per subrange
//! instead of re-slicing the input strings at every recursive step.
//!
//! # Heuristics
//!
//! This bisector alone does not implement any of the speedups in
//! [`crate::diff`] (half-match, line mode) — see [`crate::diff::diff_main`]
//! for the full pipeline. It also does not implement the Myers `O(ND)`
//! worst-case blowup mitigation beyond the shared deadline: two large,
//! completely unrelated sequences will still walk every diagonal up to
//! `d_max` unless the deadline trips first.

use std::{
    ops::{Index, IndexMut, Range},
    time::Instant,
};

use super::op::Op;
use crate::text::{common_prefix_len, common_suffix_len};

/// Computes the Myers diff between `old` and `new`, honoring `deadline` (if
/// any) by degrading to a single `Delete`+`Insert` pair for any subrange
/// whose bisection would start after the deadline has passed.
///
/// Returned ops are single-character (never merged); run
/// [`crate::diff::cleanup::merge`] over the result before handing it to a
/// caller.
pub fn myers_diff(old: &[char], new: &[char], deadline: Option<Instant>) -> Vec<Op> {
    let max_d = (old.len() + new.len()).div_ceil(2) + 1;
    let mut vb = V::new(max_d);
    let mut vf = V::new(max_d);
    let mut result = Vec::new();

    conquer(old, 0..old.len(), new, 0..new.len(), &mut vf, &mut vb, deadline, &mut result);

    result
}

/// `V` contains the endpoints of the furthest reaching `D`-paths. For each
/// recorded endpoint `(x,y)` in diagonal `k`, only `x` needs to be retained
/// because `y` can be computed from `x - k`. `k` can be negative, so `V` is a
/// `Vec` plus an `offset` mapping negative `k`s back to indices `>= 0`.
#[derive(Debug)]
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        let offset = isize::try_from(max_d).unwrap_or(isize::MAX);
        Self { offset, v: vec![0; 2 * max_d] }
    }

    fn len(&self) -> usize { self.v.len() }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, index: isize) -> &Self::Output {
        let idx = usize::try_from(index + self.offset).unwrap_or(usize::MAX);
        &self.v[idx.min(self.v.len().saturating_sub(1))]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, index: isize) -> &mut Self::Output {
        let idx = usize::try_from(index + self.offset).unwrap_or(usize::MAX);
        let len = self.v.len();
        &mut self.v[idx.min(len.saturating_sub(1))]
    }
}

fn split_at(range: Range<usize>, at: usize) -> (Range<usize>, Range<usize>) {
    (range.start..at, at..range.end)
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// The divide part of a divide-and-conquer strategy: find the middle snake
/// of the optimal `D`-path by simultaneously running the basic algorithm
/// forward and backward until the two frontiers overlap on the same
/// `k`-line. Returns `None` when no snake is found before `max_d` (or the
/// deadline passes), in which case the caller degrades to a plain
/// delete+insert.
fn find_middle_snake(
    old: &[char],
    old_range: Range<usize>,
    new: &[char],
    new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    deadline: Option<Instant>,
) -> Option<(usize, usize)> {
    let n = old_range.len();
    let m = new_range.len();

    let delta = isize::try_from(n).unwrap_or(isize::MAX) - isize::try_from(m).unwrap_or(isize::MAX);
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    let d_max = (n + m).div_ceil(2) + 1;
    assert!(vf.len() >= d_max);
    assert!(vb.len() >= d_max);

    let d_max_isize = isize::try_from(d_max).unwrap_or(isize::MAX);
    for d in 0..d_max_isize {
        if deadline_passed(deadline) {
            return None;
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) { vf[k + 1] } else { vf[k - 1] + 1 };
            let y = usize::try_from(isize::try_from(x).unwrap_or(isize::MAX) - k).unwrap_or(0);

            let (x0, y0) = (x, y);
            if x < old_range.len() && y < new_range.len() {
                let advance = common_prefix_len(
                    &old[old_range.start + x..old_range.end],
                    &new[new_range.start + y..new_range.end],
                );
                x += advance;
            }

            vf[k] = x;

            if odd && (k - delta).abs() <= (d - 1) && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0 + old_range.start, y0 + new_range.start));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) { vb[k + 1] } else { vb[k - 1] + 1 };
            let mut y = usize::try_from(isize::try_from(x).unwrap_or(isize::MAX) - k).unwrap_or(0);

            if x < n && y < m {
                let advance = common_suffix_len(
                    &old[old_range.start..old_range.start + n - x],
                    &new[new_range.start..new_range.start + m - y],
                );
                x += advance;
                y += advance;
            }

            vb[k] = x;

            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((n - x + old_range.start, m - y + new_range.start));
            }
        }
    }

    None
}

#[allow(clippy::too_many_arguments)]
fn conquer(
    old: &[char],
    mut old_range: Range<usize>,
    new: &[char],
    mut new_range: Range<usize>,
    vf: &mut V,
    vb: &mut V,
    deadline: Option<Instant>,
    result: &mut Vec<Op>,
) {
    let common_prefix_len = common_prefix_len(&old[old_range.clone()], &new[new_range.clone()]);
    if common_prefix_len > 0 {
        result.push(Op::Equal(old[old_range.start..old_range.start + common_prefix_len].to_vec()));
    }
    old_range.start += common_prefix_len;
    new_range.start += common_prefix_len;

    let common_suffix_len = common_suffix_len(&old[old_range.clone()], &new[new_range.clone()]);
    let common_suffix = (old_range.end - common_suffix_len, new_range.end - common_suffix_len);
    old_range.end -= common_suffix_len;
    new_range.end -= common_suffix_len;

    if old_range.is_empty() && new_range.is_empty() {
        // nothing left between the shared prefix and suffix
    } else if new_range.is_empty() {
        result.push(Op::Delete(old[old_range.clone()].to_vec()));
    } else if old_range.is_empty() {
        result.push(Op::Insert(new[new_range.clone()].to_vec()));
    } else if let Some((x_start, y_start)) =
        find_middle_snake(old, old_range.clone(), new, new_range.clone(), vf, vb, deadline)
    {
        let (old_a, old_b) = split_at(old_range, x_start);
        let (new_a, new_b) = split_at(new_range, y_start);
        conquer(old, old_a, new, new_a, vf, vb, deadline, result);
        conquer(old, old_b, new, new_b, vf, vb, deadline, result);
    } else {
        result.push(Op::Delete(old[old_range.clone()].to_vec()));
        result.push(Op::Insert(new[new_range.clone()].to_vec()));
    }

    if common_suffix_len > 0 {
        result.push(Op::Equal(old[common_suffix.0..common_suffix.0 + common_suffix_len].to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_debug_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::text::to_chars;

    #[test]
    fn empty_diff() {
        assert_eq!(myers_diff(&[], &[], None).len(), 0);
    }

    #[test]
    fn identical_content() {
        let content = to_chars("abc");
        assert_debug_snapshot!(myers_diff(&content, &content, None));
    }

    #[test]
    fn insert_only() {
        assert_debug_snapshot!(myers_diff(&[], &to_chars("ab"), None));
    }

    #[test]
    fn delete_only() {
        assert_debug_snapshot!(myers_diff(&to_chars("ab"), &[], None));
    }

    #[test]
    fn prefix_and_suffix() {
        assert_debug_snapshot!(myers_diff(&to_chars("abcd"), &to_chars("axd"), None));
    }

    #[test]
    fn complex_diff() {
        assert_debug_snapshot!(myers_diff(&to_chars("abcd"), &to_chars("axcy"), None));
    }

    #[test]
    fn expired_deadline_degrades_to_delete_and_insert() {
        let past = Instant::now() - std::time::Duration::from_secs(1);
        let result = myers_diff(&to_chars("abcd"), &to_chars("axcy"), Some(past));
        assert!(result.iter().any(Op::is_delete));
        assert!(result.iter().any(Op::is_insert));
        assert_eq!(super::super::op::text1(&result), "abcd");
        assert_eq!(super::super::op::text2(&result), "axcy");
    }
}
