//! The op-code vocabulary [`SequenceMatcher`](super::matcher::SequenceMatcher)
//! emits: instructions for turning slice `a` into slice `b`.

/// What kind of edit an [`OpCode`] describes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `a[i1..i2] == b[j1..j2]`.
    Equal,
    /// `a[i1..i2]` is replaced by `b[j1..j2]` (both non-empty).
    Replace,
    /// `a[i1..i2]` is removed; `j1 == j2`.
    Delete,
    /// `b[j1..j2]` is inserted at `a[i1]`; `i1 == i2`.
    Insert,
}

/// One instruction in the edit script between `a` and `b`: `a[i1..i2]`
/// corresponds to `b[j1..j2]` under `tag`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCode {
    pub tag: Tag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}
