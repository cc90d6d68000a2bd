/// One tagged fragment of a character-granular diff.
///
/// A [`Diff`] is an ordered sequence of `Op`s whose projection onto
/// `{Equal, Delete}` reconstructs the source text and whose projection onto
/// `{Equal, Insert}` reconstructs the destination text.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Equal(Vec<char>),
    Insert(Vec<char>),
    Delete(Vec<char>),
}

/// An ordered sequence of [`Op`]s.
pub type Diff = Vec<Op>;

impl Op {
    pub fn text(&self) -> &[char] {
        match self {
            Op::Equal(t) | Op::Insert(t) | Op::Delete(t) => t,
        }
    }

    pub fn into_text(self) -> Vec<char> {
        match self {
            Op::Equal(t) | Op::Insert(t) | Op::Delete(t) => t,
        }
    }

    pub fn len(&self) -> usize { self.text().len() }

    pub fn is_empty(&self) -> bool { self.text().is_empty() }

    pub fn is_equal(&self) -> bool { matches!(self, Op::Equal(_)) }

    pub fn is_insert(&self) -> bool { matches!(self, Op::Insert(_)) }

    pub fn is_delete(&self) -> bool { matches!(self, Op::Delete(_)) }

    /// Returns a new op of the same kind with different text.
    pub fn with_text(&self, text: Vec<char>) -> Op {
        match self {
            Op::Equal(_) => Op::Equal(text),
            Op::Insert(_) => Op::Insert(text),
            Op::Delete(_) => Op::Delete(text),
        }
    }
}

/// Reconstructs the source text: the concatenation of `Equal` and `Delete`
/// operands.
pub fn text1(diffs: &[Op]) -> String {
    diffs
        .iter()
        .filter(|op| !op.is_insert())
        .flat_map(|op| op.text())
        .collect()
}

/// Reconstructs the destination text: the concatenation of `Equal` and
/// `Insert` operands.
pub fn text2(diffs: &[Op]) -> String {
    diffs
        .iter()
        .filter(|op| !op.is_delete())
        .flat_map(|op| op.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn projections_reconstruct_both_texts() {
        let diffs = vec![
            Op::Equal("The ".chars().collect()),
            Op::Delete("red".chars().collect()),
            Op::Insert("blue".chars().collect()),
            Op::Equal(" car".chars().collect()),
        ];
        assert_eq!(text1(&diffs), "The red car");
        assert_eq!(text2(&diffs), "The blue car");
    }
}
