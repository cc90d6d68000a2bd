//! A compact, tab-separated textual encoding of a diff relative to its
//! source text: `=N` retains, `-N` deletes, `+text` inserts (URL-query
//! encoded). Losing `text1`'s content from the delta itself is the point —
//! [`from_delta`] recovers it by slicing the caller-supplied source.

use crate::error::{DiffError, Result};
use crate::text::to_chars;

use super::op::{Diff, Op};

/// Characters QueryEscape-style encoding would otherwise percent-encode but
/// this format keeps literal, per the reference implementation's escape
/// whitelist.
const SAFE: &[u8] = b"!~'();/?:@&=+$,#";

/// Encodes a diff as a delta string. Total function: never fails.
pub fn diff_to_delta(diffs: &Diff) -> String {
    diffs
        .iter()
        .map(|op| match op {
            Op::Insert(t) => format!("+{}", encode_insert(t)),
            Op::Delete(t) => format!("-{}", t.len()),
            Op::Equal(t) => format!("={}", t.len()),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Recovers a diff from `text1` and a delta string produced by
/// [`diff_to_delta`]. The recovered diff's `Equal`/`Delete` projection is
/// exactly `text1`; `Insert` text round-trips exactly.
pub fn from_delta(text1: &str, delta: &str) -> Result<Diff> {
    let source = to_chars(text1);
    let mut pos = 0usize;
    let mut diffs = Diff::new();

    if !delta.is_empty() {
        for token in delta.split('\t') {
            let mut chars = token.chars();
            let Some(tag) = chars.next() else {
                return Err(DiffError::FormatError("empty delta token".to_owned()));
            };
            let rest = chars.as_str();

            match tag {
                '+' => diffs.push(Op::Insert(decode_insert(rest)?.chars().collect())),
                '=' | '-' => {
                    let n: isize = rest
                        .parse()
                        .map_err(|_| DiffError::FormatError(format!("invalid count: {rest}")))?;
                    if n < 0 {
                        return Err(DiffError::NegativeCount(format!("negative count in token {token}")));
                    }
                    let n = n as usize;
                    if pos + n > source.len() {
                        return Err(DiffError::OutOfRange(format!(
                            "delta retains/deletes past the end of source text at {token}"
                        )));
                    }
                    let chunk = source[pos..pos + n].to_vec();
                    pos += n;
                    diffs.push(if tag == '=' { Op::Equal(chunk) } else { Op::Delete(chunk) });
                }
                other => return Err(DiffError::FormatError(format!("unknown delta prefix: {other}"))),
            }
        }
    }

    if pos != source.len() {
        return Err(DiffError::OutOfRange(format!(
            "delta consumed {pos} of {} source characters",
            source.len()
        )));
    }

    Ok(diffs)
}

/// URL-query-encodes insert text: code points whose UTF-8 bytes are
/// alphanumeric, `-_.~`, or in [`SAFE`] stay literal; a space becomes `+`;
/// everything else is percent-encoded byte by byte.
pub(super) fn encode_insert(text: &[char]) -> String {
    let as_str: String = text.iter().collect();
    let mut out = String::with_capacity(as_str.len());

    for byte in as_str.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') || SAFE.contains(&byte) {
            out.push(byte as char);
        } else if byte == b' ' {
            out.push('+');
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }

    out
}

/// Reverses [`encode_insert`]: `+` becomes a space, `%XX` becomes the byte
/// `XX`, and the resulting bytes must form valid UTF-8.
pub(super) fn decode_insert(s: &str) -> Result<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .ok_or_else(|| DiffError::FormatError(format!("truncated percent-escape in {s}")))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|_| DiffError::FormatError(format!("invalid percent-escape in {s}")))?;
                out.push(byte);
                i += 3;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|e| DiffError::EncodingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diff::op::text2;

    #[test]
    fn encodes_and_decodes_a_round_trip() {
        let diffs = vec![Op::Equal(to_chars("jump")), Op::Delete(to_chars("s")), Op::Insert(to_chars("ed"))];
        let delta = diff_to_delta(&diffs);
        assert_eq!(delta, "=4\t-1\t+ed");
        assert_eq!(from_delta("jumps", &delta).unwrap(), diffs);
    }

    #[test]
    fn spaces_are_encoded_as_plus() {
        let diffs = vec![Op::Insert(to_chars("hello world"))];
        assert_eq!(diff_to_delta(&diffs), "+hello+world");
    }

    #[test]
    fn safe_characters_stay_literal_and_others_are_percent_encoded() {
        let diffs = vec![Op::Insert(to_chars("a!b@c\u{20ac}"))];
        let delta = diff_to_delta(&diffs);
        assert_eq!(delta, "+a!b@c%E2%82%AC");
        assert_eq!(from_delta("", &delta).unwrap(), diffs);
    }

    #[test]
    fn reference_scenario_round_trips_to_the_expected_text2() {
        let delta = "=4\t-1\t+ed\t=6\t-3\t+a\t=5\t+old dog";
        let diffs = from_delta("jumps over the lazy", delta).unwrap();
        assert_eq!(text2(&diffs), "jumped over a lazyold dog");
        assert_eq!(diff_to_delta(&diffs), delta);
    }

    #[test]
    fn empty_delta_and_empty_source_round_trip_to_no_diffs() {
        assert_eq!(from_delta("", "").unwrap(), Vec::new());
    }

    #[test]
    fn rejects_counts_past_the_end_of_source() {
        assert!(matches!(from_delta("abc", "=10"), Err(DiffError::OutOfRange(_))));
    }

    #[test]
    fn rejects_a_negative_count() {
        assert!(matches!(from_delta("abc", "=-1"), Err(DiffError::NegativeCount(_))));
    }

    #[test]
    fn rejects_an_unknown_prefix() {
        assert!(matches!(from_delta("abc", "?3"), Err(DiffError::FormatError(_))));
    }

    #[test]
    fn rejects_a_delta_that_does_not_consume_the_whole_source() {
        assert!(matches!(from_delta("abcdef", "=3"), Err(DiffError::OutOfRange(_))));
    }

    #[test]
    fn rejects_invalid_utf8_in_decoded_insert_text() {
        assert!(matches!(from_delta("", "+%FF"), Err(DiffError::EncodingError(_))));
    }
}
