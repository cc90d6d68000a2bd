//! Ratcliff/Obershelp longest-contiguous-match sequence matcher, adapted
//! from CPython's `difflib.SequenceMatcher`: favour long contiguous runs of
//! non-junk matches over a minimal edit script.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::opcode::{OpCode, Tag};

/// A maximal contiguous common subsequence: `a[block.a..block.a+block.size]
/// == b[block.b..block.b+block.size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

/// Finds the longest contiguous runs `a` and `b` have in common, optionally
/// excluding caller-supplied junk tokens and (for large `b`) tokens so
/// common they'd swamp every match ("popular" tokens).
///
/// Unlike the rest of this crate, a matcher instance is built once per
/// comparison and its methods recompute fresh results on every call — there
/// is no internal cache to invalidate, matching the "fresh sequences, no
/// shared mutable state" posture the rest of the crate takes.
#[derive(Debug)]
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a T, Vec<usize>>,
    b_junk: HashSet<&'a T>,
}

impl<'a, T: Eq + Hash> SequenceMatcher<'a, T> {
    /// Builds a matcher with auto-junk enabled and no caller-supplied junk
    /// predicate.
    pub fn new(a: &'a [T], b: &'a [T]) -> Self { Self::with_junk(a, b, None, true) }

    /// Builds a matcher with an explicit junk predicate and auto-junk
    /// toggle. Auto-junk drops tokens occurring more than `|b|/100 + 1`
    /// times from match candidacy once `|b| >= 200`.
    pub fn with_junk(a: &'a [T], b: &'a [T], is_junk: Option<&dyn Fn(&T) -> bool>, autojunk: bool) -> Self {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (i, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(i);
        }

        let mut b_junk = HashSet::new();
        if let Some(is_junk) = is_junk {
            let junk_keys: Vec<&'a T> = b2j.keys().copied().filter(|elt| is_junk(elt)).collect();
            for elt in junk_keys {
                b_junk.insert(elt);
                b2j.remove(elt);
            }
        }

        if autojunk && b.len() >= 200 {
            let threshold = b.len() / 100 + 1;
            let popular_keys: Vec<&'a T> = b2j.iter().filter(|(_, idxs)| idxs.len() > threshold).map(|(&k, _)| k).collect();
            for elt in popular_keys {
                b2j.remove(elt);
            }
        }

        Self { a, b, b2j, b_junk }
    }

    /// The longest match within `a[alo..ahi]` x `b[blo..bhi]`, tie-broken by
    /// earliest `i` then earliest `j`. Extends the DP's seed match first
    /// over non-junk tokens, then over junk tokens (junk-aware extension
    /// isn't required for minimality, only for a more intuitive block).
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = if j == 0 { 1 } else { j2len.get(&(j - 1)).copied().unwrap_or(0) + 1 };
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        let is_junk = |elt: &'a T| self.b_junk.contains(elt);

        while besti > alo && bestj > blo && !is_junk(&self.b[bestj - 1]) && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && !is_junk(&self.b[bestj + bestsize])
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        while besti > alo && bestj > blo && is_junk(&self.b[bestj - 1]) && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && is_junk(&self.b[bestj + bestsize])
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        MatchBlock { a: besti, b: bestj, size: bestsize }
    }

    /// All non-overlapping matching blocks, strictly increasing in both `a`
    /// and `b`, terminated by the `(|a|,|b|,0)` sentinel.
    pub fn matching_blocks(&self) -> Vec<MatchBlock> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0usize, la, 0usize, lb)];
        let mut raw = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size > 0 {
                if alo < m.a && blo < m.b {
                    queue.push((alo, m.a, blo, m.b));
                }
                if m.a + m.size < ahi && m.b + m.size < bhi {
                    queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
                }
                raw.push(m);
            }
        }
        raw.sort_unstable_by_key(|m| (m.a, m.b));

        let mut collapsed: Vec<MatchBlock> = Vec::with_capacity(raw.len() + 1);
        for m in raw {
            if let Some(last) = collapsed.last_mut() {
                if last.a + last.size == m.a && last.b + last.size == m.b {
                    last.size += m.size;
                    continue;
                }
            }
            collapsed.push(m);
        }

        collapsed.push(MatchBlock { a: la, b: lb, size: 0 });
        collapsed
    }

    /// Op-codes over the gaps between (and including) each matching block.
    /// The first code starts at `(0,0)`; the last ends at `(|a|,|b|)`.
    pub fn opcodes(&self) -> Vec<OpCode> {
        let mut answer = Vec::new();
        let (mut i, mut j) = (0usize, 0usize);

        for m in self.matching_blocks() {
            let tag = if i < m.a && j < m.b {
                Some(Tag::Replace)
            } else if i < m.a {
                Some(Tag::Delete)
            } else if j < m.b {
                Some(Tag::Insert)
            } else {
                None
            };
            if let Some(tag) = tag {
                answer.push(OpCode { tag, i1: i, i2: m.a, j1: j, j2: m.b });
            }
            i = m.a + m.size;
            j = m.b + m.size;
            if m.size > 0 {
                answer.push(OpCode { tag: Tag::Equal, i1: m.a, i2: i, j1: m.b, j2: j });
            }
        }

        answer
    }

    /// [`Self::opcodes`] trimmed to `n` tokens of context on either side of
    /// each change and split into groups wherever an `Equal` run is longer
    /// than `2n`. `n < 0` is treated as the conventional default of 3. A
    /// group consisting of a single `Equal` is dropped.
    pub fn grouped_opcodes(&self, n: isize) -> Vec<Vec<OpCode>> {
        let n = if n < 0 { 3 } else { n as usize };
        let mut codes = self.opcodes();
        if codes.is_empty() {
            return Vec::new();
        }

        if let Some(first) = codes.first_mut() {
            if first.tag == Tag::Equal {
                first.i1 = first.i1.max(first.i2.saturating_sub(n));
                first.j1 = first.j1.max(first.j2.saturating_sub(n));
            }
        }
        if let Some(last) = codes.last_mut() {
            if last.tag == Tag::Equal {
                last.i2 = last.i2.min(last.i1 + n);
                last.j2 = last.j2.min(last.j1 + n);
            }
        }

        let nn = 2 * n;
        let mut groups = Vec::new();
        let mut group: Vec<OpCode> = Vec::new();

        for code in codes {
            if code.tag == Tag::Equal && code.i2 - code.i1 > nn {
                group.push(OpCode {
                    tag: Tag::Equal,
                    i1: code.i1,
                    i2: (code.i1 + n).min(code.i2),
                    j1: code.j1,
                    j2: (code.j1 + n).min(code.j2),
                });
                groups.push(std::mem::take(&mut group));
                let i1 = code.i1.max(code.i2.saturating_sub(n));
                let j1 = code.j1.max(code.j2.saturating_sub(n));
                group.push(OpCode { tag: Tag::Equal, i1, i2: code.i2, j1, j2: code.j2 });
            } else {
                group.push(code);
            }
        }

        if !group.is_empty() && !(group.len() == 1 && group[0].tag == Tag::Equal) {
            groups.push(group);
        }

        groups
    }

    /// `2*M / (|a|+|b|)` where `M` is the sum of matching block sizes.
    pub fn ratio(&self) -> f64 {
        let matches: usize = self.matching_blocks().iter().map(|m| m.size).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// An upper bound on [`Self::ratio`] computed from multiset
    /// intersection counts, without running the `O(n^2)` block search.
    pub fn quick_ratio(&self) -> f64
    where
        T: Clone,
    {
        let mut full_b_count: HashMap<&T, usize> = HashMap::new();
        for elt in self.b {
            *full_b_count.entry(elt).or_insert(0) += 1;
        }

        let mut avail: HashMap<&T, isize> = HashMap::new();
        let mut matches = 0usize;
        for elt in self.a {
            let numb = *avail.entry(elt).or_insert_with(|| *full_b_count.get(elt).unwrap_or(&0) as isize);
            avail.insert(elt, numb - 1);
            if numb > 0 {
                matches += 1;
            }
        }

        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// A looser upper bound on [`Self::ratio`]: `2*min(|a|,|b|) / (|a|+|b|)`.
    pub fn real_quick_ratio(&self) -> f64 {
        calculate_ratio(self.a.len().min(self.b.len()), self.a.len() + self.b.len())
    }
}

fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 { 1.0 } else { 2.0 * matches as f64 / length as f64 }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tokens(s: &str) -> Vec<String> { s.split(' ').map(str::to_owned).collect() }

    #[test]
    fn matching_blocks_cover_identical_sequences_in_one_block() {
        let a = tokens("a b c");
        let matcher = SequenceMatcher::new(&a, &a);
        let blocks = matcher.matching_blocks();
        assert_eq!(blocks, vec![MatchBlock { a: 0, b: 0, size: 3 }, MatchBlock { a: 3, b: 3, size: 0 }]);
    }

    #[test]
    fn opcodes_abut_and_span_the_whole_sequences() {
        let a = tokens("one two three four");
        let b = tokens("zero one tree four");
        let matcher = SequenceMatcher::new(&a, &b);
        let codes = matcher.opcodes();

        assert_eq!(codes.first().unwrap().i1, 0);
        assert_eq!(codes.first().unwrap().j1, 0);
        let last = codes.last().unwrap();
        assert_eq!((last.i2, last.j2), (a.len(), b.len()));

        for pair in codes.windows(2) {
            assert_eq!(pair[0].i2, pair[1].i1);
            assert_eq!(pair[0].j2, pair[1].j1);
        }
    }

    #[test]
    fn ratio_of_identical_sequences_is_one() {
        let a = tokens("a b c d");
        assert_eq!(SequenceMatcher::new(&a, &a).ratio(), 1.0);
    }

    #[test]
    fn ratio_is_bounded_by_quick_ratio_and_real_quick_ratio() {
        let a = tokens("one two three four");
        let b = tokens("zero one tree four");
        let matcher = SequenceMatcher::new(&a, &b);
        assert!(matcher.ratio() <= matcher.quick_ratio() + f64::EPSILON);
        assert!(matcher.quick_ratio() <= matcher.real_quick_ratio() + f64::EPSILON);
    }

    #[test]
    fn junk_predicate_excludes_matches_from_seeding_but_extension_still_crosses_them() {
        let a = tokens("x a b c");
        let b = tokens("a b c x");
        let is_junk = |t: &String| t == "x";
        let matcher = SequenceMatcher::with_junk(&a, &b, Some(&is_junk), true);
        let blocks = matcher.matching_blocks();
        assert!(blocks.iter().any(|m| m.size == 3));
    }

    #[test]
    fn grouped_opcodes_drop_a_context_only_group() {
        let a = tokens("a b c");
        let matcher = SequenceMatcher::new(&a, &a);
        assert!(matcher.grouped_opcodes(3).is_empty());
    }
}
