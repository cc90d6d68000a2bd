//! The line-mode speedup: collapse each line to a single code point, diff
//! those collapsed sequences, then re-diff any replacement block
//! character-by-character for accuracy.

use std::collections::HashMap;

use super::op::{Diff, Op};

/// Splits `old` and `new` into lines, mapping each distinct line to a code
/// point. Code point `0` is reserved as a sentinel that never appears in
/// either collapsed sequence, since a genuine `'\0'` confuses debuggers and
/// terminals that later render the intermediate diff.
pub fn lines_to_chars(old: &[char], new: &[char]) -> (Vec<char>, Vec<char>, Vec<Vec<char>>) {
    let mut line_array = vec![Vec::new()];
    let mut line_hash: HashMap<Vec<char>, u32> = HashMap::new();

    let chars_old = munge(old, &mut line_array, &mut line_hash);
    let chars_new = munge(new, &mut line_array, &mut line_hash);

    (chars_old, chars_new, line_array)
}

fn munge(text: &[char], line_array: &mut Vec<Vec<char>>, line_hash: &mut HashMap<Vec<char>, u32>) -> Vec<char> {
    let mut chars = Vec::new();
    let mut line_start = 0;

    while line_start < text.len() {
        let line_end = text[line_start..]
            .iter()
            .position(|&c| c == '\n')
            .map_or(text.len() - 1, |i| line_start + i);

        let line = text[line_start..=line_end.min(text.len() - 1)].to_vec();
        line_start = line_end + 1;

        let code = *line_hash.entry(line.clone()).or_insert_with(|| {
            line_array.push(line);
            u32::try_from(line_array.len() - 1).unwrap_or(u32::MAX)
        });

        chars.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
    }

    chars
}

/// Rehydrates a diff computed over the collapsed code-point sequences back
/// into real line text, looking each code point up in `line_array`.
pub fn chars_to_lines(diffs: Diff, line_array: &[Vec<char>]) -> Diff {
    diffs
        .into_iter()
        .map(|op| {
            let text = op
                .text()
                .iter()
                .flat_map(|&c| line_array[c as usize].iter().copied())
                .collect();
            op.with_text(text)
        })
        .collect()
}

/// Re-diffs every contiguous delete/insert run that survived the line-level
/// pass, this time character-by-character, using `redo` to recurse back into
/// the full `diff_main` pipeline.
pub fn rediff_replacement_blocks(diffs: Diff, redo: impl Fn(&[char], &[char]) -> Diff) -> Diff {
    let mut diffs = diffs;
    diffs.push(Op::Equal(Vec::new()));

    let mut result = Vec::with_capacity(diffs.len());
    let mut del_text = Vec::new();
    let mut ins_text = Vec::new();

    for op in diffs {
        match op {
            Op::Insert(t) => ins_text.extend(t),
            Op::Delete(t) => del_text.extend(t),
            Op::Equal(t) => {
                if !del_text.is_empty() && !ins_text.is_empty() {
                    result.extend(redo(&del_text, &ins_text));
                } else {
                    result.extend(del_text.drain(..).map(Op::Delete).filter(|o| !o.is_empty()));
                    result.extend(ins_text.drain(..).map(Op::Insert).filter(|o| !o.is_empty()));
                }
                del_text.clear();
                ins_text.clear();
                if !t.is_empty() {
                    result.push(Op::Equal(t));
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::text::to_chars;

    #[test]
    fn collapses_lines_to_distinct_code_points() {
        let old = to_chars("alpha\nbeta\ngamma\n");
        let new = to_chars("alpha\ndelta\ngamma\n");
        let (chars_old, chars_new, line_array) = lines_to_chars(&old, &new);

        assert_eq!(chars_old.len(), 3);
        assert_eq!(chars_new.len(), 3);
        assert_eq!(chars_old[0], chars_new[0]);
        assert_eq!(chars_old[2], chars_new[2]);
        assert_ne!(chars_old[1], chars_new[1]);
        assert_eq!(line_array[0], Vec::<char>::new());
    }

    #[test]
    fn reuses_code_point_for_repeated_lines() {
        let old = to_chars("a\nb\na\n");
        let new = to_chars("a\n");
        let (chars_old, _chars_new, _line_array) = lines_to_chars(&old, &new);
        assert_eq!(chars_old[0], chars_old[2]);
    }

    #[test]
    fn round_trips_through_chars_to_lines() {
        let old = to_chars("one\ntwo\nthree\n");
        let new = to_chars("one\ntwo\nthree\n");
        let (chars_old, _, line_array) = lines_to_chars(&old, &new);
        let diffs = vec![Op::Equal(chars_old)];
        let hydrated = chars_to_lines(diffs, &line_array);
        assert_eq!(hydrated[0].text().iter().collect::<String>(), "one\ntwo\nthree\n");
    }
}
