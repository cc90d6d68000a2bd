/// Length of the longest prefix shared by `a` and `b`, in code points.
pub fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Length of the longest suffix shared by `a` and `b`, in code points.
pub fn common_suffix_len(a: &[char], b: &[char]) -> usize {
    a.iter().rev().zip(b.iter().rev()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::*;
    use crate::text::to_chars;

    #[test_case("abc", "abc", 3)]
    #[test_case("abc", "ab", 2)]
    #[test_case("", "abc", 0)]
    #[test_case("1234abcdef", "1234xyz", 4)]
    #[test_case("123", "abc", 0)]
    fn prefix(a: &str, b: &str, expected: usize) {
        assert_eq!(common_prefix_len(&to_chars(a), &to_chars(b)), expected);
    }

    #[test_case("abc", "abc", 3)]
    #[test_case("bc", "abc", 2)]
    #[test_case("abc", "", 0)]
    #[test_case("abcdef1234", "xyz1234", 4)]
    #[test_case("abc", "xyz", 0)]
    fn suffix(a: &str, b: &str, expected: usize) {
        assert_eq!(common_suffix_len(&to_chars(a), &to_chars(b)), expected);
    }

    #[test]
    fn does_not_split_surrogate_pairs_because_it_is_code_point_aware() {
        // "🎉" is a single `char` despite being multiple UTF-16 code units;
        // treating it as a single code point keeps the common-length
        // computation from ever landing mid-codepoint.
        assert_eq!(common_prefix_len(&to_chars("a🎉b"), &to_chars("a🎉c")), 2);
    }
}
