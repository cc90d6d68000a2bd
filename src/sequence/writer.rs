//! `patch(1)`-style text writers driven by
//! [`SequenceMatcher::grouped_opcodes`](super::matcher::SequenceMatcher::grouped_opcodes).

use super::matcher::SequenceMatcher;
use super::opcode::Tag;

/// Splits `text` into lines, each retaining its trailing `\n`, with a
/// trailing `\n` appended to a final fragment that lacks one. Joining the
/// result always reproduces `text` plus at most one appended separator —
/// deliberately not `str::lines()`, which throws away whether the input
/// ended in a newline.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' {
            lines.push(text[start..=i].to_owned());
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(format!("{}\n", &text[start..]));
    }

    lines
}

fn dated_header(marker: &str, name: &str, date: &str, line_term: &str) -> String {
    if date.is_empty() {
        format!("{marker} {name}{line_term}")
    } else {
        format!("{marker} {name}\t{date}{line_term}")
    }
}

fn format_range_unified(start: usize, stop: usize) -> String {
    let beginning = start + 1;
    let length = stop - start;
    if length == 1 {
        return format!("{beginning}");
    }
    let beginning = if length == 0 { beginning - 1 } else { beginning };
    format!("{beginning},{length}")
}

fn format_range_context(start: usize, stop: usize) -> String {
    let beginning = start + 1;
    let length = stop - start;
    let beginning = if length == 0 { beginning - 1 } else { beginning };
    if length <= 1 {
        return format!("{beginning}");
    }
    format!("{},{}", beginning, beginning + length - 1)
}

/// POSIX unified-diff text for `a` -> `b`, grouped with `context` lines of
/// surrounding equality (negative defaults to 3). Empty inputs (no hunks)
/// produce empty output, including no file header.
#[must_use]
pub fn unified_diff(a: &[String], b: &[String], from_file: &str, to_file: &str, from_date: &str, to_date: &str, context: isize, line_term: &str) -> String {
    let matcher = SequenceMatcher::new(a, b);
    let mut out = String::new();
    let mut started = false;

    for group in matcher.grouped_opcodes(context) {
        if !started {
            started = true;
            out.push_str(&dated_header("---", from_file, from_date, line_term));
            out.push_str(&dated_header("+++", to_file, to_date, line_term));
        }

        let first = group.first().unwrap();
        let last = group.last().unwrap();
        let range1 = format_range_unified(first.i1, last.i2);
        let range2 = format_range_unified(first.j1, last.j2);
        out.push_str(&format!("@@ -{range1} +{range2} @@{line_term}"));

        for op in &group {
            match op.tag {
                Tag::Equal => push_prefixed(&mut out, " ", &a[op.i1..op.i2]),
                Tag::Delete => push_prefixed(&mut out, "-", &a[op.i1..op.i2]),
                Tag::Insert => push_prefixed(&mut out, "+", &b[op.j1..op.j2]),
                Tag::Replace => {
                    push_prefixed(&mut out, "-", &a[op.i1..op.i2]);
                    push_prefixed(&mut out, "+", &b[op.j1..op.j2]);
                }
            }
        }
    }

    out
}

/// POSIX context-diff text for `a` -> `b`, with the same grouping rules as
/// [`unified_diff`].
#[must_use]
pub fn context_diff(a: &[String], b: &[String], from_file: &str, to_file: &str, from_date: &str, to_date: &str, context: isize, line_term: &str) -> String {
    let matcher = SequenceMatcher::new(a, b);
    let mut out = String::new();
    let mut started = false;

    for group in matcher.grouped_opcodes(context) {
        if !started {
            started = true;
            out.push_str(&dated_header("***", from_file, from_date, line_term));
            out.push_str(&dated_header("---", to_file, to_date, line_term));
        }

        out.push_str(&format!("***************{line_term}"));

        let first = group.first().unwrap();
        let last = group.last().unwrap();

        let range1 = format_range_context(first.i1, last.i2);
        out.push_str(&format!("*** {range1} ****{line_term}"));
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Delete)) {
            for op in &group {
                if op.tag != Tag::Insert {
                    push_prefixed(&mut out, context_prefix(op.tag), &a[op.i1..op.i2]);
                }
            }
        }

        let range2 = format_range_context(first.j1, last.j2);
        out.push_str(&format!("--- {range2} ----{line_term}"));
        if group.iter().any(|op| matches!(op.tag, Tag::Replace | Tag::Insert)) {
            for op in &group {
                if op.tag != Tag::Delete {
                    push_prefixed(&mut out, context_prefix(op.tag), &b[op.j1..op.j2]);
                }
            }
        }
    }

    out
}

fn context_prefix(tag: Tag) -> &'static str {
    match tag {
        Tag::Insert => "+ ",
        Tag::Delete => "- ",
        Tag::Replace => "! ",
        Tag::Equal => "  ",
    }
}

fn push_prefixed(out: &mut String, prefix: &str, lines: &[String]) {
    for line in lines {
        out.push_str(prefix);
        out.push_str(line);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn split_lines_keeps_separators_and_pads_a_missing_trailing_newline() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a\n", "b\n", "c\n"]);
        assert_eq!(split_lines("a\nb\n"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines(""), Vec::<String>::new());
    }

    #[test]
    fn unified_diff_of_the_reference_scenario_is_a_single_hunk() {
        let a = split_lines("one\ntwo\nthree\nfour\n");
        let b = split_lines("zero\none\ntree\nfour");
        let diff = unified_diff(&a, &b, "a", "b", "", "", 3, "\n");

        assert_eq!(
            diff,
            concat!(
                "--- a\n",
                "+++ b\n",
                "@@ -1,4 +1,4 @@\n",
                "+zero\n",
                " one\n",
                "-two\n",
                "-three\n",
                "+tree\n",
                " four\n",
            )
        );
    }

    #[test]
    fn unified_diff_of_identical_inputs_is_empty() {
        let a = split_lines("same\ntext\n");
        assert_eq!(unified_diff(&a, &a, "a", "b", "", "", 3, "\n"), "");
    }

    #[test]
    fn context_diff_uses_bang_prefix_for_replace_lines() {
        let a = split_lines("one\ntwo\nthree\n");
        let b = split_lines("one\ntwo-changed\nthree\n");
        let diff = context_diff(&a, &b, "a", "b", "", "", 3, "\n");

        assert!(diff.contains("***************\n"));
        assert!(diff.contains("! two\n"));
        assert!(diff.contains("! two-changed\n"));
    }

    #[test]
    fn range_formatting_matches_the_documented_table() {
        assert_eq!(format_range_unified(3, 3), "3,0");
        assert_eq!(format_range_unified(3, 4), "4");
        assert_eq!(format_range_unified(3, 5), "4,2");
        assert_eq!(format_range_unified(0, 0), "0,0");

        assert_eq!(format_range_context(3, 3), "3");
        assert_eq!(format_range_context(3, 5), "4,5");
        assert_eq!(format_range_context(0, 0), "0");
    }
}
