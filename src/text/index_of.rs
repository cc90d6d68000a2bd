/// Forward substring search over code points, starting no earlier than
/// `from`. An empty `needle` matches at `from` (clamped to `haystack`'s
/// length). A negative/absent start is conventionally passed as `0` by
/// callers — treated the same as "from the beginning", matching the
/// reference implementation's `runesIndexOf(..., i=-1)` behavior.
pub fn index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    let from = from.min(haystack.len());

    if needle.is_empty() {
        return Some(from);
    }
    if needle.len() > haystack.len() - from {
        return None;
    }

    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

/// Reverse substring search over code points: the rightmost occurrence of
/// `needle` whose start index is `<= from`.
pub fn last_index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }

    let search_end = (from + needle.len()).min(haystack.len());
    if needle.len() > search_end {
        return None;
    }

    haystack[..search_end]
        .windows(needle.len())
        .rposition(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::text::to_chars;

    #[test_case("hello world", "world", 0, Some(6))]
    #[test_case("hello world", "xyz", 0, None)]
    #[test_case("hello world", "o", 5, Some(7))]
    #[test_case("hello", "", 2, Some(2))]
    #[test_case("", "x", 0, None)]
    fn forward(haystack: &str, needle: &str, from: usize, expected: Option<usize>) {
        assert_eq!(index_of(&to_chars(haystack), &to_chars(needle), from), expected);
    }

    #[test_case("abcabc", "abc", 5, Some(3))]
    #[test_case("abcabc", "abc", 2, Some(0))]
    #[test_case("hello", "", 2, Some(2))]
    fn backward(haystack: &str, needle: &str, from: usize, expected: Option<usize>) {
        assert_eq!(last_index_of(&to_chars(haystack), &to_chars(needle), from), expected);
    }
}
